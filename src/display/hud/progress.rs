//! Vector geometry for every progress visualization
//!
//! Pure functions: a rectangle, a progress fraction and colours in, a
//! `DrawList` out. Angles follow the y-up convention where 12 o'clock is
//! π/2 and a clockwise sweep decreases the angle.

use std::f64::consts::{FRAC_PI_2, PI, TAU};

use super::spinner::FinRing;
use crate::display::draw::{DrawList, DrawOp, LineCap, Path};
use crate::display::geometry::{Point, Rect, Size};
use crate::display::styles::Color;

/// Start angle of every round indicator (12 o'clock)
pub const START_ANGLE: f64 = FRAC_PI_2;

/// Outline width of the pie indicator
pub const CIRCULAR_LINE_WIDTH: f64 = 2.0;
/// Ring width of the annular indicator
pub const ANNULAR_LINE_WIDTH: f64 = 5.0;
/// Outline width of the capsule bar
pub const BAR_LINE_WIDTH: f64 = 2.0;
/// Stroke width of the success/error glyphs
pub const GLYPH_LINE_WIDTH: f64 = 4.0;

/// Natural size of the capsule bar indicator
pub const BAR_SIZE: Size = Size {
    width: 120.0,
    height: 20.0,
};

/// Checkmark polyline in relative coordinates of its box
const CHECKMARK: [(f64, f64); 3] = [(0.06, 0.48), (0.31, 0.19), (0.93, 0.81)];
/// Inset of the error cross diagonals
const CROSS_INSET: f64 = 0.08;

/// Fin width and height as fractions of the spinner's min side
const FIN_WIDTH: f64 = 0.095;
const FIN_HEIGHT: f64 = 0.30;

/// Colours for the pie and ring indicators
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoundColors {
    pub progress: Color,
    pub background: Color,
}

/// Colours for the capsule bar
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarColors {
    pub line: Color,
    pub remaining: Color,
    pub progress: Color,
}

/// Clamp to [0, 1]; NaN counts as no progress
pub fn clamp_progress(progress: f64) -> f64 {
    if progress.is_nan() {
        0.0
    } else {
        progress.clamp(0.0, 1.0)
    }
}

/// End angle after sweeping clockwise from 12 o'clock by `progress` of a turn
pub fn progress_end_angle(progress: f64) -> f64 {
    START_ANGLE - TAU * clamp_progress(progress)
}

/// Filled pie wedge with a stroked circular outline
pub fn circular(rect: Rect, progress: f64, colors: RoundColors) -> DrawList {
    let mut list = DrawList::new();
    let circle = rect.centered_square();
    let outline = circle.inset(CIRCULAR_LINE_WIDTH, CIRCULAR_LINE_WIDTH);

    if !colors.background.is_transparent() {
        list.fill(Path::new().ellipse(outline), colors.background);
    }
    list.stroke(
        Path::new().ellipse(outline),
        colors.progress,
        CIRCULAR_LINE_WIDTH,
        LineCap::Butt,
    );

    let center = circle.center();
    let radius = ((circle.width() - 4.0) / 2.0).max(0.0);
    let wedge = Path::new()
        .move_to(center)
        .arc(center, radius, START_ANGLE, progress_end_angle(progress), true)
        .close();
    list.fill(wedge, colors.progress);
    list
}

/// Ring indicator: full background arc plus a foreground arc swept by progress
pub fn annular(rect: Rect, progress: f64, colors: RoundColors) -> DrawList {
    let mut list = DrawList::new();
    let circle = rect.centered_square();
    let center = circle.center();
    let radius = ((circle.width() - ANNULAR_LINE_WIDTH) / 2.0).max(0.0);

    let background = Path::new().arc(center, radius, START_ANGLE, START_ANGLE - TAU, true);
    list.stroke(background, colors.background, ANNULAR_LINE_WIDTH, LineCap::Round);

    let foreground = Path::new().arc(
        center,
        radius,
        START_ANGLE,
        progress_end_angle(progress),
        true,
    );
    list.stroke(foreground, colors.progress, ANNULAR_LINE_WIDTH, LineCap::Round);
    list
}

/// Where the filled amount of a capsule bar ends
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BarFill {
    /// Nothing to fill
    Empty,
    /// Inside the left cap: only a partial left cap is drawn
    LeftCap,
    /// In the flat middle: full left cap plus a rectangle up to the amount
    Middle,
    /// Inside the right cap: `angle` is the remaining cap sweep (0 = cap full)
    RightCap { angle: f64 },
}

/// Classify a fill `amount` for a bar of `width` with fill cap `radius`
///
/// The right-cap sweep is `acos((amount - (width - radius - 4)) / radius)`;
/// an out-of-domain argument (NaN) means the cap is fully filled.
pub fn classify_bar_fill(amount: f64, width: f64, radius: f64) -> BarFill {
    let left_edge = radius + 4.0;
    let right_edge = width - radius - 4.0;
    if amount >= left_edge && amount <= right_edge {
        BarFill::Middle
    } else if amount > left_edge {
        let x = amount - right_edge;
        let mut angle = (x / radius).acos();
        if angle.is_nan() {
            angle = 0.0;
        }
        BarFill::RightCap { angle }
    } else if amount > 0.0 {
        BarFill::LeftCap
    } else {
        BarFill::Empty
    }
}

/// Pill outline through the four corners of `rect` inset by `inset`
fn capsule_outline(rect: Rect, inset: f64, radius: f64) -> Path {
    let at = |x: f64, y: f64| Point::new(rect.min_x() + x, rect.min_y() + y);
    let (w, h) = (rect.width(), rect.height());
    Path::new()
        .move_to(at(inset, h / 2.0))
        .arc_to(at(inset, inset), at(radius + inset, inset), radius)
        .line_to(at(w - radius - inset, inset))
        .arc_to(at(w - inset, inset), at(w - inset, h / 2.0), radius)
        .arc_to(at(w - inset, h - inset), at(w - radius - inset, h - inset), radius)
        .line_to(at(radius + inset, h - inset))
        .arc_to(at(inset, h - inset), at(inset, h / 2.0), radius)
        .close()
}

/// Horizontal capsule progress bar
pub fn bar(rect: Rect, progress: f64, colors: BarColors) -> DrawList {
    let mut list = DrawList::new();
    let (w, h) = (rect.width(), rect.height());
    let outline_radius = h / 2.0 - 2.0;
    if outline_radius <= 0.0 || w <= 0.0 {
        return list;
    }

    let outline = capsule_outline(rect, 2.0, outline_radius);
    list.fill(outline.clone(), colors.remaining);
    list.stroke(outline, colors.line, BAR_LINE_WIDTH, LineCap::Butt);

    let radius = outline_radius - 2.0;
    if radius <= 0.0 {
        return list;
    }

    let amount = clamp_progress(progress) * w;
    let at = |x: f64, y: f64| Point::new(rect.min_x() + x, rect.min_y() + y);
    let mid = h / 2.0;
    let top_cap = |path: Path| {
        path.move_to(at(4.0, mid))
            .arc_to(at(4.0, 4.0), at(radius + 4.0, 4.0), radius)
    };
    let bottom_cap = |path: Path| {
        path.move_to(at(4.0, mid))
            .arc_to(at(4.0, h - 4.0), at(radius + 4.0, h - 4.0), radius)
    };

    let fill = match classify_bar_fill(amount, w, radius) {
        BarFill::Empty => return list,
        BarFill::LeftCap => {
            let path = top_cap(Path::new()).line_to(at(radius + 4.0, mid));
            bottom_cap(path).line_to(at(radius + 4.0, mid))
        }
        BarFill::Middle => {
            let path = top_cap(Path::new())
                .line_to(at(amount, 4.0))
                .line_to(at(amount, radius + 4.0));
            bottom_cap(path)
                .line_to(at(amount, h - 4.0))
                .line_to(at(amount, radius + 4.0))
        }
        BarFill::RightCap { angle } => {
            let cap_center = at(w - radius - 4.0, mid);
            let path = top_cap(Path::new())
                .line_to(at(w - radius - 4.0, 4.0))
                .arc(cap_center, radius, PI, -angle, false)
                .line_to(at(amount, mid));
            bottom_cap(path)
                .line_to(at(w - radius - 4.0, h - 4.0))
                .arc(cap_center, radius, -PI, angle, true)
                .line_to(at(amount, mid))
        }
    };
    list.fill(fill, colors.progress);
    list
}

/// Checkmark glyph scaled to the square inside `rect`
pub fn success_glyph(rect: Rect, color: Color) -> DrawList {
    let square = rect.centered_square();
    let [first, rest @ ..] = CHECKMARK;
    let path = rest.iter().fold(
        Path::new().move_to(square.relative(first.0, first.1)),
        |path, &(x, y)| path.line_to(square.relative(x, y)),
    );
    let mut list = DrawList::new();
    list.stroke(path, color, GLYPH_LINE_WIDTH, LineCap::Round);
    list
}

/// Cross glyph scaled to the square inside `rect`
pub fn error_glyph(rect: Rect, color: Color) -> DrawList {
    let square = rect.centered_square();
    let (lo, hi) = (CROSS_INSET, 1.0 - CROSS_INSET);
    let path = Path::new()
        .move_to(square.relative(lo, hi))
        .line_to(square.relative(hi, lo))
        .move_to(square.relative(lo, lo))
        .line_to(square.relative(hi, hi));
    let mut list = DrawList::new();
    list.stroke(path, color, GLYPH_LINE_WIDTH, LineCap::Round);
    list
}

/// Local rect of a single fin, pointing up from the ring centre
pub fn fin_rect(min_side: f64) -> Rect {
    let width = min_side * FIN_WIDTH;
    let height = min_side * FIN_HEIGHT;
    Rect::new(-width / 2.0, min_side / 2.0 - height, width, height)
}

/// One spinner frame: every fin rotated into place with its current opacity
pub fn spinner_frame(rect: Rect, ring: &FinRing, color: Color) -> DrawList {
    let mut list = DrawList::new();
    let min_side = rect.size.min_side();
    if min_side <= 0.0 {
        return list;
    }
    let fin = fin_rect(min_side);
    let step = TAU / ring.fin_count() as f64;

    for i in 0..ring.fin_count() {
        list.push(DrawOp::PushTransform {
            translate: rect.center(),
            rotate: -(i as f64) * step,
        });
        list.fill(
            Path::new().rounded_rect(fin, fin.width() / 2.0),
            color.fade(ring.opacity(i)),
        );
        list.push(DrawOp::PopTransform);
    }
    list
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::hud::spinner::{ALPHA_WHEN_STOPPED, DEFAULT_FIN_COUNT};
    use crate::display::styles::colors;

    const ROUND: RoundColors = RoundColors {
        progress: colors::BLACK,
        background: colors::CLEAR,
    };

    const BAR: BarColors = BarColors {
        line: colors::BLACK,
        remaining: colors::CLEAR,
        progress: colors::DARK_GRAY,
    };

    fn indicator() -> Rect {
        Rect::new(0.0, 0.0, 60.0, 60.0)
    }

    fn last_sweep(list: &DrawList) -> f64 {
        *list
            .paths()
            .flat_map(|p| p.arc_sweeps())
            .collect::<Vec<_>>()
            .last()
            .unwrap()
    }

    #[test]
    fn test_circular_zero_progress_has_zero_sweep() {
        let list = circular(indicator(), 0.0, ROUND);
        assert_eq!(last_sweep(&list), 0.0);
    }

    #[test]
    fn test_circular_full_progress_sweeps_full_turn() {
        let list = circular(indicator(), 1.0, ROUND);
        assert!((last_sweep(&list) + TAU).abs() < 1e-12);
    }

    #[test]
    fn test_circular_draws_background_fill_when_tinted() {
        let tinted = RoundColors {
            background: colors::WHITE,
            ..ROUND
        };
        assert_eq!(circular(indicator(), 0.5, tinted).len(), 3);
        assert_eq!(circular(indicator(), 0.5, ROUND).len(), 2);
    }

    #[test]
    fn test_annular_foreground_matches_background_at_full() {
        let list = annular(indicator(), 1.0, ROUND);
        let sweeps: Vec<f64> = list.paths().flat_map(|p| p.arc_sweeps()).collect();
        assert_eq!(sweeps.len(), 2);
        assert!((sweeps[0] - sweeps[1]).abs() < 1e-12);
        assert!(sweeps[0] < 0.0, "arcs must run clockwise");
    }

    #[test]
    fn test_annular_uses_round_caps() {
        let list = annular(indicator(), 0.3, ROUND);
        for op in list.ops() {
            if let DrawOp::Stroke { cap, width, .. } = op {
                assert_eq!(*cap, LineCap::Round);
                assert_eq!(*width, ANNULAR_LINE_WIDTH);
            }
        }
    }

    #[test]
    fn test_progress_is_clamped() {
        assert_eq!(progress_end_angle(-1.0), START_ANGLE);
        assert_eq!(progress_end_angle(f64::NAN), START_ANGLE);
        assert_eq!(progress_end_angle(3.0), START_ANGLE - TAU);
    }

    #[test]
    fn test_classify_bar_cases() {
        // 120 wide, fill radius 6: left edge 10, right edge 110
        assert_eq!(classify_bar_fill(0.0, 120.0, 6.0), BarFill::Empty);
        assert_eq!(classify_bar_fill(5.0, 120.0, 6.0), BarFill::LeftCap);
        assert_eq!(classify_bar_fill(10.0, 120.0, 6.0), BarFill::Middle);
        assert_eq!(classify_bar_fill(110.0, 120.0, 6.0), BarFill::Middle);
        match classify_bar_fill(113.0, 120.0, 6.0) {
            BarFill::RightCap { angle } => assert!((angle - 0.5f64.acos()).abs() < 1e-12),
            other => panic!("expected right cap, got {other:?}"),
        }
    }

    #[test]
    fn test_right_cap_out_of_domain_falls_back_to_zero() {
        // x / radius = 10 / 6 > 1
        assert_eq!(
            classify_bar_fill(120.0, 120.0, 6.0),
            BarFill::RightCap { angle: 0.0 }
        );
    }

    #[test]
    fn test_bar_never_emits_nan() {
        let rect = Rect::new(10.0, 10.0, BAR_SIZE.width, BAR_SIZE.height);
        for step in 0..=100 {
            let list = bar(rect, step as f64 / 100.0, BAR);
            assert!(list.is_finite(), "NaN at progress {}", step);
        }
    }

    #[test]
    fn test_bar_fill_amount_tracks_progress() {
        let rect = Rect::from_size(BAR_SIZE);
        let list = bar(rect, 0.5, BAR);
        let fill = list.paths().last().unwrap();
        assert!(fill
            .segments()
            .contains(&crate::display::draw::PathSegment::LineTo(Point::new(60.0, 4.0))));
    }

    #[test]
    fn test_bar_empty_draws_only_outline() {
        let list = bar(Rect::from_size(BAR_SIZE), 0.0, BAR);
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_bar_too_short_draws_nothing() {
        assert!(bar(Rect::new(0.0, 0.0, 100.0, 3.0), 0.5, BAR).is_empty());
    }

    #[test]
    fn test_checkmark_points_scale_with_box() {
        let list = success_glyph(Rect::new(0.0, 0.0, 100.0, 100.0), colors::BLACK);
        let path = list.paths().next().unwrap();
        assert_eq!(
            path.segments()[1],
            crate::display::draw::PathSegment::LineTo(Point::new(31.0, 19.0))
        );
    }

    #[test]
    fn test_cross_has_two_diagonals() {
        let list = error_glyph(Rect::new(0.0, 0.0, 50.0, 50.0), colors::BLACK);
        let path = list.paths().next().unwrap();
        assert_eq!(path.segments().len(), 4);
        assert_eq!(
            path.segments()[0],
            crate::display::draw::PathSegment::MoveTo(Point::new(4.0, 46.0))
        );
    }

    #[test]
    fn test_fin_reaches_ring_edge() {
        let fin = fin_rect(60.0);
        assert!((fin.max_y() - 30.0).abs() < 1e-9);
        assert!((fin.width() - 5.7).abs() < 1e-9);
        assert!((fin.height() - 18.0).abs() < 1e-9);
    }

    #[test]
    fn test_spinner_frame_one_fill_per_fin() {
        let mut ring = FinRing::new(DEFAULT_FIN_COUNT, ALPHA_WHEN_STOPPED);
        ring.start();
        let list = spinner_frame(indicator(), &ring, colors::WHITE);
        assert_eq!(list.paths().count(), DEFAULT_FIN_COUNT);
        let lit = list
            .ops()
            .iter()
            .filter(|op| matches!(op, DrawOp::Fill { color, .. } if color.a == 1.0))
            .count();
        assert_eq!(lit, 1);
    }
}
