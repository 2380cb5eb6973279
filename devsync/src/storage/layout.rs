//! Storage layout configuration

use std::path::PathBuf;

use crate::filesys::file::File;

/// Location of the engine's configuration files
#[derive(Debug, Clone)]
pub struct StorageLayout {
    /// Base directory for all configuration
    pub base_dir: PathBuf,
}

impl StorageLayout {
    /// Create a new storage layout
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Get the settings file path
    pub fn settings_file(&self) -> File {
        File::new(self.base_dir.join("settings.json"))
    }

    /// Get the device file path
    pub fn device_file(&self) -> File {
        File::new(self.base_dir.join("device.json"))
    }
}

impl Default for StorageLayout {
    fn default() -> Self {
        Self::new("/etc/beacon")
    }
}
