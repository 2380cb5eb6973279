//! Display configuration of a device widget

use beacon_models::{DeviceConfiguration, DisplayConfig, Icon};
use serde::Serialize;

use crate::color::{color_temperature_to_rgb, Rgb};

/// Name shown when neither a display name nor an alias is available
pub const UNKNOWN_DISPLAY_NAME: &str = "Unknown";

/// Background of an active light or motion widget (a 3000K tint)
pub const DEFAULT_HIGHLIGHT: Rgb = Rgb {
    r: 255.0,
    g: 187.0,
    b: 109.0,
};

/// Resolve the display configuration of a device.
///
/// An explicit configuration is returned as-is. Otherwise the icon and contacts
/// are inferred from the device alias. Both keywords are checked in turn, so an
/// alias naming a light and a motion sensor ends up as a motion sensor.
pub fn resolve_display_config(
    config: Option<&DeviceConfiguration>,
    explicit: Option<DisplayConfig>,
) -> DisplayConfig {
    if let Some(explicit) = explicit {
        return explicit;
    }

    let mut display = DisplayConfig::default();

    if let Some(alias) = config.and_then(|c| c.alias.as_deref()) {
        let alias = alias.to_lowercase();
        if alias.contains("light") {
            display.icon = Some(Icon::Light);
        }
        if alias.contains("motion") {
            display.icon = Some(Icon::Motion);
        }
    }

    match display.icon {
        Some(Icon::Light) => {
            display.action_contact_name = Some("state".to_string());
            display.active_contact_name = Some("state".to_string());
        }
        Some(Icon::Motion) => {
            display.active_contact_name = Some("occupancy".to_string());
        }
        _ => {}
    }

    display
}

/// Name to show for a device: the configured display name, then the alias
pub fn display_name(display: &DisplayConfig, config: Option<&DeviceConfiguration>) -> String {
    display
        .display_name
        .clone()
        .or_else(|| config.and_then(|c| c.alias.clone()))
        .unwrap_or_else(|| UNKNOWN_DISPLAY_NAME.to_string())
}

/// Colors applied to an active widget
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Highlight {
    pub background: Rgb,
    pub alpha: f64,
    pub foreground: &'static str,
}

/// Highlight of a widget in its current state.
///
/// Only active lights and motion sensors are highlighted. When the bulb
/// reports its color temperature the background follows it.
pub fn highlight(display: &DisplayConfig, is_active: bool, color_temp: Option<f64>) -> Option<Highlight> {
    if !is_active || !matches!(display.icon, Some(Icon::Light) | Some(Icon::Motion)) {
        return None;
    }

    let highlight = match color_temp {
        Some(kelvin) => Highlight {
            background: color_temperature_to_rgb(kelvin),
            alpha: 0.7,
            foreground: "#333",
        },
        None => Highlight {
            background: DEFAULT_HIGHLIGHT,
            alpha: 1.0,
            foreground: "#333",
        },
    };
    Some(highlight)
}
