//! Frame renderer
//!
//! Turns the current settings, content, indicator and transition state into
//! one `DrawList`: mask, rounded panel, indicator, then labels.

use std::f64::consts::{FRAC_PI_2, PI};

use super::layout::HudLayout;
use super::progress::{self, BarColors, RoundColors};
use super::state::{HudContent, Indicator};
use crate::config::{HudSettings, MaskType};
use crate::display::draw::{DrawList, DrawOp, Path};
use crate::display::geometry::{Point, Rect, Size};
use crate::display::styles::{colors, Color, Font};

/// Inputs for one paint
pub struct Frame<'a> {
    pub bounds: Size,
    pub layout: &'a HudLayout,
    pub settings: &'a HudSettings,
    pub content: &'a HudContent,
    pub indicator: &'a Indicator,
    /// Transition opacity, 0 when hidden
    pub opacity: f64,
    /// Transition scale applied to the panel about its centre
    pub scale: f64,
}

/// Build the display list for a frame; empty while fully transparent
pub fn render_frame(frame: &Frame<'_>) -> DrawList {
    let mut list = DrawList::new();
    if frame.opacity <= 0.0 {
        return list;
    }
    let host = Rect::from_size(frame.bounds);
    let settings = frame.settings;

    list.push(DrawOp::PushLayer {
        opacity: frame.opacity.min(1.0),
        scale: 1.0,
        anchor: host.center(),
    });
    render_mask(&mut list, host, &settings.mask);

    let panel = frame.layout.panel;
    list.push(DrawOp::PushLayer {
        opacity: 1.0,
        scale: frame.scale,
        anchor: panel.center(),
    });
    list.fill(rounded_panel(panel, settings.corner_radius), panel_color(settings));

    if let Some(rect) = frame.layout.indicator {
        render_indicator(&mut list, rect, frame);
    }

    let labels: [(Option<Rect>, &str, &Font, Color); 2] = [
        (
            frame.layout.title,
            frame.content.title.as_str(),
            &settings.title_font,
            settings.title_color(),
        ),
        (
            frame.layout.message,
            frame.content.message.as_str(),
            &settings.message_font,
            settings.message_color(),
        ),
    ];
    for (rect, text, font, color) in labels {
        if let Some(rect) = rect {
            list.push(DrawOp::Text {
                rect,
                text: text.to_string(),
                font: font.clone(),
                color,
            });
        }
    }

    list.push(DrawOp::PopLayer);
    list.push(DrawOp::PopLayer);
    list
}

fn render_mask(list: &mut DrawList, host: Rect, mask: &MaskType) {
    match mask {
        MaskType::None | MaskType::Clear => {}
        MaskType::Black => list.push(DrawOp::FillRect {
            rect: host,
            color: colors::MASK_BLACK,
        }),
        MaskType::Gradient => list.push(DrawOp::RadialGradient {
            center: host.center(),
            radius: host.size.min_side(),
            stops: vec![(0.0, colors::CLEAR), (1.0, colors::MASK_GRADIENT_EDGE)],
        }),
        MaskType::Custom(color) => list.push(DrawOp::FillRect {
            rect: host,
            color: *color,
        }),
    }
}

fn render_indicator(list: &mut DrawList, rect: Rect, frame: &Frame<'_>) {
    let settings = frame.settings;
    let tint = settings.content();
    let value = frame.content.progress();

    match frame.indicator {
        Indicator::None => {}
        Indicator::Spinner(spinner) => {
            list.extend(progress::spinner_frame(rect, &spinner.snapshot(), tint));
        }
        Indicator::Round { annular } => {
            let colors = RoundColors {
                progress: tint,
                background: settings.track_color,
            };
            let drawn = if *annular {
                progress::annular(rect, value, colors)
            } else {
                progress::circular(rect, value, colors)
            };
            list.extend(drawn);
        }
        Indicator::Bar => {
            let colors = BarColors {
                line: tint,
                remaining: settings.track_color,
                progress: tint,
            };
            list.extend(progress::bar(rect, value, colors));
        }
        Indicator::Glyph { success: true } => list.extend(progress::success_glyph(rect, tint)),
        Indicator::Glyph { success: false } => list.extend(progress::error_glyph(rect, tint)),
        // The owner paints the view into this slot once its lock is released
        Indicator::Custom(view) => {
            if view.is_alive() {
                list.push(DrawOp::CustomView { rect });
            }
        }
    }
}

/// Rounded rectangle traced through four corner arcs (counter-clockwise, y-up)
pub fn rounded_panel(rect: Rect, corner_radius: f64) -> Path {
    let r = corner_radius.clamp(0.0, rect.size.min_side() / 2.0);
    let (left, right) = (rect.min_x() + r, rect.max_x() - r);
    let (bottom, top) = (rect.min_y() + r, rect.max_y() - r);
    Path::new()
        .move_to(Point::new(left, rect.min_y()))
        .arc(Point::new(right, bottom), r, -FRAC_PI_2, 0.0, false)
        .arc(Point::new(right, top), r, 0.0, FRAC_PI_2, false)
        .arc(Point::new(left, top), r, FRAC_PI_2, PI, false)
        .arc(Point::new(left, bottom), r, PI, PI + FRAC_PI_2, false)
        .close()
}

/// Panel colour with the panel opacity applied
pub fn panel_color(settings: &HudSettings) -> Color {
    settings.panel_fill().fade(settings.opacity)
}
