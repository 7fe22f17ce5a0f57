//! Colours, fonts and style palettes
//!
//! Colours serialize as `#RRGGBB` / `#RRGGBBAA` strings so settings files
//! stay readable.

use serde::{Deserialize, Serialize};

use crate::error::HudError;

/// RGBA colour with components in 0..=1
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Color {
    pub const fn rgba(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self::rgba(r, g, b, 1.0)
    }

    /// Same colour with a replaced alpha component
    pub fn with_alpha(self, a: f64) -> Self {
        Self {
            a: a.clamp(0.0, 1.0),
            ..self
        }
    }

    /// Same colour with alpha multiplied by `factor`
    pub fn fade(self, factor: f64) -> Self {
        self.with_alpha(self.a * factor)
    }

    pub fn is_transparent(&self) -> bool {
        self.a <= 0.0
    }

    /// Parse `#RRGGBB` or `#RRGGBBAA` (leading `#` optional)
    pub fn from_hex(s: &str) -> Result<Self, HudError> {
        let hex = s.trim().trim_start_matches('#');
        let invalid = || HudError::InvalidColor(s.to_string());
        if !(hex.len() == 6 || hex.len() == 8) || !hex.is_ascii() {
            return Err(invalid());
        }
        let channel = |i: usize| -> Result<f64, HudError> {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .map(|v| f64::from(v) / 255.0)
                .map_err(|_| invalid())
        };
        let a = if hex.len() == 8 { channel(6)? } else { 1.0 };
        Ok(Self::rgba(channel(0)?, channel(2)?, channel(4)?, a))
    }

    pub fn to_hex(&self) -> String {
        let byte = |v: f64| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        if self.a >= 1.0 {
            format!("#{:02x}{:02x}{:02x}", byte(self.r), byte(self.g), byte(self.b))
        } else {
            format!(
                "#{:02x}{:02x}{:02x}{:02x}",
                byte(self.r),
                byte(self.g),
                byte(self.b),
                byte(self.a)
            )
        }
    }
}

impl TryFrom<String> for Color {
    type Error = HudError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Color::from_hex(&value)
    }
}

impl From<Color> for String {
    fn from(c: Color) -> Self {
        c.to_hex()
    }
}

/// Named colours used by the default palettes
pub mod colors {
    use super::Color;

    pub const CLEAR: Color = Color::rgba(0.0, 0.0, 0.0, 0.0);
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const DARK_GRAY: Color = Color::rgb(1.0 / 3.0, 1.0 / 3.0, 1.0 / 3.0);

    /// Dim for `MaskType::Black`
    pub const MASK_BLACK: Color = Color::rgba(0.0, 0.0, 0.0, 0.6);
    /// Outer stop of `MaskType::Gradient`
    pub const MASK_GRADIENT_EDGE: Color = Color::rgba(0.0, 0.0, 0.0, 0.75);
}

/// Overall look of the panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HudStyle {
    /// Light panel, dark content
    #[default]
    Light,
    /// Dark panel, light content
    Dark,
}

impl HudStyle {
    /// Panel background colour (before panel opacity is applied)
    pub fn panel(&self) -> Color {
        match self {
            HudStyle::Light => colors::WHITE,
            HudStyle::Dark => colors::BLACK,
        }
    }

    /// Colour for indicators and labels
    pub fn content(&self) -> Color {
        match self {
            HudStyle::Light => colors::BLACK,
            HudStyle::Dark => colors::WHITE,
        }
    }
}

/// Font description used for measuring and drawing labels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Font {
    #[serde(default = "default_family")]
    pub family: String,
    pub size: f64,
    #[serde(default)]
    pub bold: bool,
}

fn default_family() -> String {
    "system".to_string()
}

impl Font {
    pub fn system(size: f64) -> Self {
        Self {
            family: default_family(),
            size,
            bold: false,
        }
    }

    pub fn bold_system(size: f64) -> Self {
        Self {
            bold: true,
            ..Self::system(size)
        }
    }
}
