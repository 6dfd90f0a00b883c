//! Store info configuration

use serde::Deserialize;
use std::path::PathBuf;

use super::error::ValidationError;
use crate::application::{StoreInfo, StoreLocation};

/// Store details served by `/location` and `/menu`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub latitude: Option<f64>,

    #[serde(default)]
    pub longitude: Option<f64>,

    /// Menu image sent by `/menu`
    #[serde(default)]
    pub menu_image_path: Option<PathBuf>,
}

impl StoreConfig {
    /// Converts to the handler's view; zero coordinates count as unset.
    pub fn store_info(&self) -> StoreInfo {
        StoreInfo {
            location: StoreLocation::from_coordinates(self.latitude, self.longitude),
            menu_image: self
                .menu_image_path
                .clone()
                .filter(|path| !path.as_os_str().is_empty()),
        }
    }

    /// Validate coordinate ranges
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(latitude) = self.latitude {
            if !(-90.0..=90.0).contains(&latitude) {
                return Err(ValidationError::InvalidLatitude);
            }
        }
        if let Some(longitude) = self.longitude {
            if !(-180.0..=180.0).contains(&longitude) {
                return Err(ValidationError::InvalidLongitude);
            }
        }
        Ok(())
    }
}
