//! StoreInfoHandler - `/location` and `/menu`.

use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::outcome::{CommandKind, DispatchOutcome};
use super::replies::ReplySender;
use crate::domain::conversation::ChatRef;
use crate::ports::OutboundImage;

pub const LOCATION_NOT_CONFIGURED: &str = "Sorry, the store location is not configured yet.";
pub const MENU_NOT_CONFIGURED: &str = "Sorry, the image file is not configured yet.";
pub const MENU_READ_FAILED: &str = "Sorry, there was an error reading the image file.";
pub const MENU_CAPTION: &str = "Here is our menu.";

/// Store coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StoreLocation {
    pub latitude: f64,
    pub longitude: f64,
}

impl StoreLocation {
    /// Builds a location; an unset or zero coordinate means "not configured".
    pub fn from_coordinates(latitude: Option<f64>, longitude: Option<f64>) -> Option<Self> {
        match (latitude, longitude) {
            (Some(latitude), Some(longitude)) if latitude != 0.0 && longitude != 0.0 => {
                Some(Self {
                    latitude,
                    longitude,
                })
            }
            _ => None,
        }
    }
}

/// Auxiliary store details served by the store commands.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreInfo {
    pub location: Option<StoreLocation>,
    pub menu_image: Option<PathBuf>,
}

/// MIME type for a menu image, taken from its file extension.
fn menu_mime_type(path: &Path) -> String {
    mime_guess::from_path(path)
        .first_or_octet_stream()
        .to_string()
}

/// Handler for the store commands. Never touches history or the model.
pub struct StoreInfoHandler {
    store: StoreInfo,
    replies: ReplySender,
}

impl StoreInfoHandler {
    pub fn new(store: StoreInfo, replies: ReplySender) -> Self {
        Self { store, replies }
    }

    pub async fn send_location(&self, chat: &ChatRef) -> DispatchOutcome {
        match self.store.location {
            Some(location) => {
                self.replies
                    .location(chat, location.latitude, location.longitude)
                    .await;
            }
            None => {
                self.replies.text(chat, LOCATION_NOT_CONFIGURED).await;
            }
        }
        DispatchOutcome::CommandHandled(CommandKind::Location)
    }

    pub async fn send_menu(&self, chat: &ChatRef) -> DispatchOutcome {
        let Some(path) = &self.store.menu_image else {
            self.replies.text(chat, MENU_NOT_CONFIGURED).await;
            return DispatchOutcome::CommandHandled(CommandKind::Menu);
        };

        match tokio::fs::read(path).await {
            Ok(data) => {
                let mime_type = menu_mime_type(path);
                info!(
                    path = %path.display(),
                    bytes = data.len(),
                    mime_type = %mime_type,
                    "Sending menu image"
                );
                let image = OutboundImage {
                    mime_type,
                    data,
                    caption: MENU_CAPTION.to_string(),
                };
                self.replies.image(chat, image).await;
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "Failed to read menu image");
                self.replies.text(chat, MENU_READ_FAILED).await;
            }
        }
        DispatchOutcome::CommandHandled(CommandKind::Menu)
    }
}
