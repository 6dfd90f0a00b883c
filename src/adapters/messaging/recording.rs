//! Recording messenger for testing.
//!
//! Records every outbound action in order and serves downloads from a
//! configurable map. Sends can be made to fail or to stall for timeout tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::sleep;

use crate::domain::conversation::ChatRef;
use crate::domain::dispatch::Attachment;
use crate::ports::{Messenger, MessengerError, OutboundImage, Presence};

/// One recorded outbound action.
#[derive(Debug, Clone, PartialEq)]
pub enum Outbound {
    Text {
        chat: ChatRef,
        text: String,
    },
    Image {
        chat: ChatRef,
        image: OutboundImage,
    },
    Location {
        chat: ChatRef,
        latitude: f64,
        longitude: f64,
    },
    Presence {
        chat: ChatRef,
        presence: Presence,
    },
}

/// Messenger that records instead of sending.
#[derive(Debug, Clone, Default)]
pub struct RecordingMessenger {
    outbound: Arc<Mutex<Vec<Outbound>>>,
    downloads: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    fail_sends: Arc<AtomicBool>,
    send_delay: Duration,
}

impl RecordingMessenger {
    /// Creates an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serves `data` for downloads of the attachment with this id.
    pub fn with_download(self, attachment_id: impl Into<String>, data: Vec<u8>) -> Self {
        self.downloads
            .lock()
            .unwrap()
            .insert(attachment_id.into(), data);
        self
    }

    /// Delays every send (not presence) by `delay`.
    pub fn with_send_delay(mut self, delay: Duration) -> Self {
        self.send_delay = delay;
        self
    }

    /// Makes every send (not presence) fail.
    pub fn set_fail_sends(&self, fail: bool) {
        self.fail_sends.store(fail, Ordering::SeqCst);
    }

    /// Every recorded action, in order.
    pub fn outbound(&self) -> Vec<Outbound> {
        self.outbound.lock().unwrap().clone()
    }

    /// Texts sent, in order.
    pub fn texts(&self) -> Vec<String> {
        self.outbound()
            .into_iter()
            .filter_map(|o| match o {
                Outbound::Text { text, .. } => Some(text),
                _ => None,
            })
            .collect()
    }

    /// Presence updates, in order.
    pub fn presences(&self) -> Vec<Presence> {
        self.outbound()
            .into_iter()
            .filter_map(|o| match o {
                Outbound::Presence { presence, .. } => Some(presence),
                _ => None,
            })
            .collect()
    }

    async fn deliver(&self, action: Outbound) -> Result<(), MessengerError> {
        if !self.send_delay.is_zero() {
            sleep(self.send_delay).await;
        }
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(MessengerError::Send("injected send failure".to_string()));
        }
        self.outbound.lock().unwrap().push(action);
        Ok(())
    }
}

#[async_trait]
impl Messenger for RecordingMessenger {
    async fn send_text(&self, chat: &ChatRef, text: &str) -> Result<(), MessengerError> {
        self.deliver(Outbound::Text {
            chat: chat.clone(),
            text: text.to_string(),
        })
        .await
    }

    async fn send_image(&self, chat: &ChatRef, image: OutboundImage) -> Result<(), MessengerError> {
        self.deliver(Outbound::Image {
            chat: chat.clone(),
            image,
        })
        .await
    }

    async fn send_location(
        &self,
        chat: &ChatRef,
        latitude: f64,
        longitude: f64,
    ) -> Result<(), MessengerError> {
        self.deliver(Outbound::Location {
            chat: chat.clone(),
            latitude,
            longitude,
        })
        .await
    }

    async fn set_presence(&self, chat: &ChatRef, presence: Presence) -> Result<(), MessengerError> {
        self.outbound.lock().unwrap().push(Outbound::Presence {
            chat: chat.clone(),
            presence,
        });
        Ok(())
    }

    async fn download(&self, attachment: &Attachment) -> Result<Vec<u8>, MessengerError> {
        self.downloads
            .lock()
            .unwrap()
            .get(&attachment.id)
            .cloned()
            .ok_or_else(|| MessengerError::Download(format!("unknown attachment {}", attachment.id)))
    }
}
