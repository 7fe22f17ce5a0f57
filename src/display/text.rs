//! Label measurement
//!
//! Layout needs the size of each text block. Hosts with a real text system
//! plug in their own `TextMeasure`; the default approximates glyph advances
//! from the font size and the display width of each line.

use unicode_display_width::width as display_width;

use super::geometry::Size;
use super::styles::Font;

/// Measures the bounding size of a (possibly multi-line) label
pub trait TextMeasure: Send + Sync {
    fn measure(&self, text: &str, font: &Font) -> Size;
}

/// Average glyph advance as a fraction of the font size
const ADVANCE: f64 = 0.55;
/// Bold text runs slightly wider
const BOLD_ADVANCE: f64 = 0.6;
/// Line height as a multiple of the font size
const LINE_HEIGHT: f64 = 1.2;

/// Font-size based approximation of text metrics
#[derive(Debug, Clone, Copy, Default)]
pub struct ApproximateMetrics;

impl TextMeasure for ApproximateMetrics {
    fn measure(&self, text: &str, font: &Font) -> Size {
        if text.is_empty() {
            return Size::ZERO;
        }
        let advance = if font.bold { BOLD_ADVANCE } else { ADVANCE } * font.size;
        let lines: Vec<&str> = text.lines().collect();
        let columns = lines
            .iter()
            .map(|line| display_width(line))
            .max()
            .unwrap_or(0);
        let line_count = lines.len().max(1);
        Size::new(
            (columns as f64 * advance).ceil(),
            (line_count as f64 * font.size * LINE_HEIGHT).ceil(),
        )
    }
}
