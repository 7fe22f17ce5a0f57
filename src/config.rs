//! HUD settings
//!
//! Every appearance and timing knob lives in `HudSettings`. Settings load
//! from TOML; anything missing falls back to the defaults below. Durations
//! are written as seconds (`grace_time = 0.5`).

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::display::geometry::Size;
use crate::display::hud::{HudPosition, ALPHA_WHEN_STOPPED, DEFAULT_FIN_COUNT};
use crate::display::styles::{colors, Color, Font, HudStyle};
use crate::error::HudError;

/// Treatment of the host area outside the panel
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaskType {
    /// No mask; touches outside the panel reach the host
    None,
    /// Invisible mask that swallows touches
    #[default]
    Clear,
    /// Dimmed black
    Black,
    /// Radial vignette, clear in the centre
    Gradient,
    /// Flat fill with a caller-chosen colour
    Custom(Color),
}

impl MaskType {
    /// True when taps outside the panel belong to the host
    pub fn passes_touches(&self) -> bool {
        matches!(self, MaskType::None)
    }
}

/// Transition used when showing and hiding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnimationType {
    /// Opacity only
    #[default]
    Fade,
    /// Opacity plus growing from half size
    ZoomIn,
    /// Opacity plus shrinking from 1.5x
    ZoomOut,
}

impl AnimationType {
    /// Scale at opacity 0; the panel reaches 1.0 at full opacity
    pub fn start_scale(&self) -> f64 {
        match self {
            AnimationType::Fade => 1.0,
            AnimationType::ZoomIn => 0.5,
            AnimationType::ZoomOut => 1.5,
        }
    }

    /// Panel scale for the given opacity
    pub fn scale_at(&self, opacity: f64) -> f64 {
        1.0 + (1.0 - opacity.clamp(0.0, 1.0)) * (self.start_scale() - 1.0)
    }
}

/// Appearance and timing of a HUD
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HudSettings {
    pub style: HudStyle,
    pub mask: MaskType,
    pub position: HudPosition,
    pub animation: AnimationType,
    /// Overrides the style's panel colour
    #[serde(skip_serializing_if = "Option::is_none")]
    pub panel_color: Option<Color>,
    /// Overrides the style's colour for indicators and labels
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_color: Option<Color>,
    /// Overrides the content colour for the title label
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title_color: Option<Color>,
    /// Overrides the content colour for the message label
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_color: Option<Color>,
    /// Background of round indicators and the unfilled part of the bar
    pub track_color: Color,
    pub title_font: Font,
    pub message_font: Font,
    /// Panel alpha multiplier
    pub opacity: f64,
    pub margin: f64,
    pub padding: f64,
    pub corner_radius: f64,
    /// Side of the square indicator slot
    pub spinner_size: f64,
    pub min_size: Size,
    pub square: bool,
    pub fin_count: usize,
    /// Fin alpha while the spinner is not animating
    pub spinner_floor: f64,
    /// Tap dismisses the HUD
    pub dismissible: bool,
    /// Detach from the host once hidden
    pub remove_on_hide: bool,
    /// Delay before the HUD may appear at all
    #[serde(with = "seconds")]
    pub grace_time: Duration,
    /// Minimum time the HUD stays visible once shown
    #[serde(with = "seconds")]
    pub min_show_time: Duration,
}

impl Default for HudSettings {
    fn default() -> Self {
        Self {
            style: HudStyle::default(),
            mask: MaskType::default(),
            position: HudPosition::default(),
            animation: AnimationType::default(),
            panel_color: None,
            content_color: None,
            title_color: None,
            message_color: None,
            track_color: colors::CLEAR,
            title_font: Font::bold_system(18.0),
            message_font: Font::system(16.0),
            opacity: 0.9,
            margin: 20.0,
            padding: 4.0,
            corner_radius: 10.0,
            spinner_size: 60.0,
            min_size: Size::ZERO,
            square: false,
            fin_count: DEFAULT_FIN_COUNT,
            spinner_floor: ALPHA_WHEN_STOPPED,
            dismissible: true,
            remove_on_hide: true,
            grace_time: Duration::ZERO,
            min_show_time: Duration::ZERO,
        }
    }
}

impl HudSettings {
    /// Panel fill before the panel opacity is applied
    pub fn panel_fill(&self) -> Color {
        self.panel_color.unwrap_or_else(|| self.style.panel())
    }

    /// Colour for indicators and labels
    pub fn content(&self) -> Color {
        self.content_color.unwrap_or_else(|| self.style.content())
    }

    pub fn title_color(&self) -> Color {
        self.title_color.unwrap_or_else(|| self.content())
    }

    pub fn message_color(&self) -> Color {
        self.message_color.unwrap_or_else(|| self.content())
    }

    /// Load settings from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::warn!("hud settings not found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;

        let settings: HudSettings = toml::from_str(&content)
            .with_context(|| format!("failed to parse {}", path.display()))?;

        tracing::info!("loaded hud settings from {}", path.display());
        Ok(settings)
    }

    /// Load from the default settings location
    pub fn load_default() -> Result<Self> {
        Self::load(crate::paths::settings_path())
    }
}

/// Convert seconds into a `Duration`, rejecting negative and non-finite values
pub fn duration_from_secs(secs: f64) -> Result<Duration, HudError> {
    Duration::try_from_secs_f64(secs).map_err(|_| HudError::InvalidDuration(secs))
}

mod seconds {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_f64(d.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(d)?;
        super::duration_from_secs(secs).map_err(serde::de::Error::custom)
    }
}
