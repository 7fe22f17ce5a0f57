//! Panel layout
//!
//! Stacks up to three blocks (indicator, title, message) vertically inside a
//! margin box and centres the result in the host bounds. `layout` is a pure
//! function: same inputs, same rectangles.

use serde::{Deserialize, Serialize};

use crate::display::geometry::{Point, Rect, Size};
use crate::display::styles::Font;
use crate::display::text::TextMeasure;

/// Extra width given to text blocks so glyph overhang is never clipped
pub const TEXT_WIDTH_SLACK: f64 = 10.0;

/// Vertical placement of the panel in the host
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HudPosition {
    Top,
    #[default]
    Center,
    Bottom,
    /// Explicit offset from the centre; positive `y` moves down
    Offset { x: f64, y: f64 },
}

impl HudPosition {
    /// Offset from the centred position for a host of `bounds`
    pub fn offset(&self, bounds: Size) -> Point {
        match *self {
            HudPosition::Top => Point::new(0.0, -bounds.height / 5.0),
            HudPosition::Center => Point::ZERO,
            HudPosition::Bottom => Point::new(0.0, bounds.height / 5.0),
            HudPosition::Offset { x, y } => Point::new(x, y),
        }
    }
}

/// Everything a layout pass depends on
#[derive(Debug, Clone)]
pub struct LayoutInput<'a> {
    pub bounds: Size,
    /// Natural indicator size, `Size::ZERO` when there is no indicator
    pub indicator: Size,
    pub title: &'a str,
    pub title_font: &'a Font,
    pub message: &'a str,
    pub message_font: &'a Font,
    pub margin: f64,
    pub padding: f64,
    pub min_size: Size,
    pub square: bool,
    pub position: HudPosition,
}

/// Result of one layout pass
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HudLayout {
    /// Rounded background panel
    pub panel: Rect,
    pub indicator: Option<Rect>,
    pub title: Option<Rect>,
    pub message: Option<Rect>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Block {
    Indicator,
    Title,
    Message,
}

/// Compute the panel and block rectangles
pub fn layout(input: &LayoutInput<'_>, measure: &dyn TextMeasure) -> HudLayout {
    let bounds = input.bounds;
    let margin = input.margin.max(0.0);
    let padding = input.padding.max(0.0);
    let max_width = (bounds.width - margin * 4.0).max(0.0);

    let text_block = |text: &str, font: &Font| -> Option<Size> {
        if text.is_empty() {
            return None;
        }
        let size = measure.measure(text, font);
        Some(Size::new(
            (size.width + TEXT_WIDTH_SLACK).min(max_width),
            size.height,
        ))
    };

    let mut blocks: Vec<(Block, Size)> = Vec::with_capacity(3);
    if !input.indicator.is_empty() {
        let size = Size::new(input.indicator.width.min(max_width), input.indicator.height);
        blocks.push((Block::Indicator, size));
    }
    if let Some(size) = text_block(input.title, input.title_font) {
        blocks.push((Block::Title, size));
    }
    if let Some(size) = text_block(input.message, input.message_font) {
        blocks.push((Block::Message, size));
    }

    let content_width = blocks.iter().map(|(_, s)| s.width).fold(0.0, f64::max);
    let gaps = blocks.len().saturating_sub(1) as f64;
    let content_height = blocks.iter().map(|(_, s)| s.height).sum::<f64>() + padding * gaps;

    let mut panel = Size::new(content_width + margin * 2.0, content_height + margin * 2.0);
    if input.square {
        let side = panel.width.max(panel.height);
        if side <= bounds.width - margin * 2.0 {
            panel.width = side;
        }
        if side <= bounds.height - margin * 2.0 {
            panel.height = side;
        }
    }
    panel.width = panel.width.max(input.min_size.width);
    panel.height = panel.height.max(input.min_size.height);

    let offset = input.position.offset(bounds);
    let centred_x = |w: f64| ((bounds.width - w) / 2.0).round() + offset.x;

    let mut result = HudLayout {
        panel: Rect::new(
            centred_x(panel.width),
            ((bounds.height - panel.height) / 2.0).round() - offset.y,
            panel.width,
            panel.height,
        ),
        ..Default::default()
    };

    // y-up: start at the top of the centred stack and walk downwards
    let mut cursor = ((bounds.height - content_height) / 2.0).round() - offset.y + content_height;
    for (block, size) in blocks {
        let rect = Rect::new(
            centred_x(size.width),
            cursor - size.height,
            size.width,
            size.height,
        );
        cursor = rect.min_y() - padding;
        match block {
            Block::Indicator => result.indicator = Some(rect),
            Block::Title => result.title = Some(rect),
            Block::Message => result.message = Some(rect),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::text::ApproximateMetrics;

    /// Every character is 10 wide and every line 20 high
    struct FixedMetrics;

    impl TextMeasure for FixedMetrics {
        fn measure(&self, text: &str, _font: &Font) -> Size {
            if text.is_empty() {
                return Size::ZERO;
            }
            Size::new(text.chars().count() as f64 * 10.0, 20.0)
        }
    }

    fn input<'a>(font: &'a Font, title: &'a str, message: &'a str) -> LayoutInput<'a> {
        LayoutInput {
            bounds: Size::new(400.0, 300.0),
            indicator: Size::square(60.0),
            title,
            title_font: font,
            message,
            message_font: font,
            margin: 20.0,
            padding: 4.0,
            min_size: Size::ZERO,
            square: false,
            position: HudPosition::Center,
        }
    }

    #[test]
    fn test_indicator_only() {
        let font = Font::system(12.0);
        let l = layout(&input(&font, "", ""), &FixedMetrics);
        assert_eq!(l.panel, Rect::new(150.0, 100.0, 100.0, 100.0));
        assert_eq!(l.indicator, Some(Rect::new(170.0, 120.0, 60.0, 60.0)));
        assert!(l.title.is_none());
        assert!(l.message.is_none());
    }

    #[test]
    fn test_title_below_indicator() {
        let font = Font::system(12.0);
        let l = layout(&input(&font, "Loading", ""), &FixedMetrics);
        // title block is 70 + 10 wide, 20 high; content 80 x 84
        assert_eq!(l.panel.size, Size::new(120.0, 124.0));
        let indicator = l.indicator.unwrap();
        let title = l.title.unwrap();
        assert_eq!(indicator.min_y() - title.max_y(), 4.0);
        assert_eq!(title.width(), 80.0);
        assert_eq!(title.mid_x(), 200.0);
    }

    #[test]
    fn test_empty_text_reserves_no_space() {
        let font = Font::system(12.0);
        let with_empty = layout(&input(&font, "", "Working"), &FixedMetrics);
        let title_only = layout(&input(&font, "Working", ""), &FixedMetrics);
        assert_eq!(with_empty.panel.size, title_only.panel.size);
    }

    #[test]
    fn test_text_width_clamped_to_host() {
        let font = Font::system(12.0);
        let long = "x".repeat(100);
        let l = layout(&input(&font, &long, ""), &FixedMetrics);
        assert_eq!(l.title.unwrap().width(), 400.0 - 80.0);
    }

    #[test]
    fn test_square_when_it_fits() {
        let font = Font::system(12.0);
        let mut i = input(&font, "Loading", "");
        i.square = true;
        let l = layout(&i, &FixedMetrics);
        assert_eq!(l.panel.width(), l.panel.height());
    }

    #[test]
    fn test_square_skipped_on_axis_that_does_not_fit() {
        let font = Font::system(12.0);
        let mut i = input(&font, "A fairly long status title", "");
        i.bounds = Size::new(400.0, 120.0);
        i.square = true;
        let l = layout(&i, &FixedMetrics);
        // width 270 + 40 = 310 fits horizontally, not vertically
        assert_eq!(l.panel.width(), 310.0);
        assert_eq!(l.panel.height(), 124.0);
    }

    #[test]
    fn test_min_size_grows_panel() {
        let font = Font::system(12.0);
        let mut i = input(&font, "", "");
        i.min_size = Size::new(150.0, 150.0);
        let l = layout(&i, &FixedMetrics);
        assert_eq!(l.panel.size, Size::new(150.0, 150.0));
        // content stays centred
        assert_eq!(l.indicator.unwrap().center(), l.panel.center());
    }

    #[test]
    fn test_positions_shift_vertically() {
        let font = Font::system(12.0);
        let mut i = input(&font, "Loading", "");
        let center = layout(&i, &FixedMetrics);
        i.position = HudPosition::Top;
        let top = layout(&i, &FixedMetrics);
        i.position = HudPosition::Bottom;
        let bottom = layout(&i, &FixedMetrics);

        assert_eq!(top.panel.min_y() - center.panel.min_y(), 60.0);
        assert_eq!(center.panel.min_y() - bottom.panel.min_y(), 60.0);
    }

    #[test]
    fn test_explicit_offset() {
        let font = Font::system(12.0);
        let mut i = input(&font, "", "");
        i.position = HudPosition::Offset { x: 15.0, y: 10.0 };
        let l = layout(&i, &FixedMetrics);
        assert_eq!(l.panel.origin, Point::new(165.0, 90.0));
    }

    #[test]
    fn test_layout_is_deterministic() {
        let title_font = Font::bold_system(16.0);
        let message_font = Font::system(12.0);
        let mut i = input(&title_font, "Loading", "please wait");
        i.message_font = &message_font;
        let first = layout(&i, &ApproximateMetrics);
        for _ in 0..10 {
            assert_eq!(layout(&i, &ApproximateMetrics), first);
        }
    }

    #[test]
    fn test_nothing_to_show_is_margin_box() {
        let font = Font::system(12.0);
        let mut i = input(&font, "", "");
        i.indicator = Size::ZERO;
        let l = layout(&i, &FixedMetrics);
        assert_eq!(l.panel.size, Size::new(40.0, 40.0));
        assert!(l.indicator.is_none());
    }
}
