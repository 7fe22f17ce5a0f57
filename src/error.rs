//! Configuration errors
//!
//! The overlay itself never fails at runtime (bad values are clamped and
//! misuse is a no-op). Errors only surface when settings are parsed.

use thiserror::Error;

/// Errors raised while parsing HUD settings
#[derive(Debug, Error, PartialEq)]
pub enum HudError {
    /// Colour string was not `#RRGGBB` or `#RRGGBBAA`
    #[error("invalid color {0:?}: expected #RRGGBB or #RRGGBBAA")]
    InvalidColor(String),

    /// Duration in seconds was negative or not finite
    #[error("invalid duration {0}: expected a non-negative number of seconds")]
    InvalidDuration(f64),
}
