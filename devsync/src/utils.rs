//! Utility functions

use serde::{Deserialize, Serialize};

/// Version information of the engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionInfo {
    pub version: String,
    pub git_hash: String,
    pub build_time: String,
}

/// Placeholder for build metadata that could not be captured
pub const UNKNOWN: &str = "unknown";

/// Version of this build, as printed by `--version`
pub fn version_info() -> VersionInfo {
    VersionInfo {
        version: env!("CARGO_PKG_VERSION").to_string(),
        git_hash: build_metadata(option_env!("GIT_HASH")),
        build_time: build_metadata(option_env!("BUILD_TIME")),
    }
}

fn build_metadata(value: Option<&str>) -> String {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(UNKNOWN)
        .to_string()
}
