//! Color temperature to RGB conversion
//!
//! Tanner Helland's curve fit of the black-body spectrum, good enough for
//! tinting a widget from a bulb's reported temperature.

use serde::Serialize;

/// An 8-bit RGB triple, channels kept as floats in `[0, 255]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rgb {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

/// Convert a color temperature in Kelvin to RGB
pub fn color_temperature_to_rgb(kelvin: f64) -> Rgb {
    let temp = kelvin / 100.0;

    let (red, green, blue) = if temp <= 66.0 {
        let green = 99.4708025861 * temp.ln() - 161.1195681661;
        let blue = if temp <= 19.0 {
            0.0
        } else {
            138.5177312231 * (temp - 10.0).ln() - 305.0447927307
        };
        (255.0, green, blue)
    } else {
        let red = 329.698727446 * (temp - 60.0).powf(-0.1332047592);
        let green = 288.1221695283 * (temp - 60.0).powf(-0.0755148492);
        (red, green, 255.0)
    };

    Rgb {
        r: clamp_channel(red),
        g: clamp_channel(green),
        b: clamp_channel(blue),
    }
}

// NaN (from ln of a non-positive temperature) maps to 0.
fn clamp_channel(x: f64) -> f64 {
    if x.is_nan() {
        return 0.0;
    }
    x.clamp(0.0, 255.0)
}
