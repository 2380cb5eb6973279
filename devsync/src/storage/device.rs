//! Device file management

use beacon_models::{DeviceConfiguration, DisplayConfig};
use serde::{Deserialize, Serialize};

use crate::errors::SyncError;
use crate::filesys::file::File;

/// Device shown by the widget, with an optional display override
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceFile {
    #[serde(flatten)]
    pub device: DeviceConfiguration,

    /// Explicit display configuration, replacing alias inference
    #[serde(default)]
    pub display: Option<DisplayConfig>,
}

/// Load the device file
pub async fn load_device(device_file: &File) -> Result<DeviceFile, SyncError> {
    if !device_file.exists().await {
        return Err(SyncError::DeviceConfigError(format!(
            "Device file {} does not exist",
            device_file.path().display()
        )));
    }

    let device: DeviceFile = device_file.read_json().await.map_err(|e| {
        SyncError::DeviceConfigError(format!("Failed to read device file: {}", e))
    })?;

    if device.device.identifier.is_empty() {
        return Err(SyncError::DeviceConfigError(
            "Device identifier is empty".to_string(),
        ));
    }

    Ok(device)
}
