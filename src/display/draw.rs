//! Immediate-mode drawing program
//!
//! Every paint produces a fresh `DrawList`: an ordered sequence of fill,
//! stroke, text and layer operations that a host renderer replays onto its
//! own graphics context. Nothing here is cached between frames.
//!
//! Arc angles are radians in the y-up convention (π/2 is 12 o'clock) and
//! `clockwise` arcs run toward decreasing angles, matching Core Graphics.

use serde::Serialize;

use super::geometry::{Point, Rect};
use super::styles::{Color, Font};

/// One segment of a vector path
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PathSegment {
    MoveTo(Point),
    LineTo(Point),
    /// Circular arc around `center` from `start_angle` to `end_angle`
    Arc {
        center: Point,
        radius: f64,
        start_angle: f64,
        end_angle: f64,
        clockwise: bool,
    },
    /// Arc tangent to the lines (current → `tangent1`) and (`tangent1` → `tangent2`)
    ArcTo {
        tangent1: Point,
        tangent2: Point,
        radius: f64,
    },
    /// Full ellipse inscribed in a rect
    Ellipse(Rect),
    /// Rounded rectangle
    RoundedRect { rect: Rect, radius: f64 },
    Close,
}

impl PathSegment {
    fn is_finite(&self) -> bool {
        match self {
            PathSegment::MoveTo(p) | PathSegment::LineTo(p) => p.is_finite(),
            PathSegment::Arc {
                center,
                radius,
                start_angle,
                end_angle,
                ..
            } => {
                center.is_finite()
                    && radius.is_finite()
                    && start_angle.is_finite()
                    && end_angle.is_finite()
            }
            PathSegment::ArcTo {
                tangent1,
                tangent2,
                radius,
            } => tangent1.is_finite() && tangent2.is_finite() && radius.is_finite(),
            PathSegment::Ellipse(r) => {
                r.origin.is_finite() && r.size.width.is_finite() && r.size.height.is_finite()
            }
            PathSegment::RoundedRect { rect, radius } => {
                rect.origin.is_finite()
                    && rect.size.width.is_finite()
                    && rect.size.height.is_finite()
                    && radius.is_finite()
            }
            PathSegment::Close => true,
        }
    }
}

/// A vector path assembled from segments
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Path {
    segments: Vec<PathSegment>,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn move_to(mut self, p: Point) -> Self {
        self.segments.push(PathSegment::MoveTo(p));
        self
    }

    pub fn line_to(mut self, p: Point) -> Self {
        self.segments.push(PathSegment::LineTo(p));
        self
    }

    pub fn arc(
        mut self,
        center: Point,
        radius: f64,
        start_angle: f64,
        end_angle: f64,
        clockwise: bool,
    ) -> Self {
        self.segments.push(PathSegment::Arc {
            center,
            radius,
            start_angle,
            end_angle,
            clockwise,
        });
        self
    }

    pub fn arc_to(mut self, tangent1: Point, tangent2: Point, radius: f64) -> Self {
        self.segments.push(PathSegment::ArcTo {
            tangent1,
            tangent2,
            radius,
        });
        self
    }

    pub fn ellipse(mut self, rect: Rect) -> Self {
        self.segments.push(PathSegment::Ellipse(rect));
        self
    }

    pub fn rounded_rect(mut self, rect: Rect, radius: f64) -> Self {
        self.segments.push(PathSegment::RoundedRect { rect, radius });
        self
    }

    pub fn close(mut self) -> Self {
        self.segments.push(PathSegment::Close);
        self
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// True when no coordinate, radius or angle is NaN or infinite
    pub fn is_finite(&self) -> bool {
        self.segments.iter().all(PathSegment::is_finite)
    }

    /// Signed sweeps (`end - start`) of every `Arc` segment, in order
    pub fn arc_sweeps(&self) -> Vec<f64> {
        self.segments
            .iter()
            .filter_map(|s| match s {
                PathSegment::Arc {
                    start_angle,
                    end_angle,
                    ..
                } => Some(end_angle - start_angle),
                _ => None,
            })
            .collect()
    }
}

/// Line cap used when stroking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LineCap {
    Butt,
    Round,
}

/// A single drawing operation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawOp {
    Fill {
        path: Path,
        color: Color,
    },
    Stroke {
        path: Path,
        color: Color,
        width: f64,
        cap: LineCap,
    },
    FillRect {
        rect: Rect,
        color: Color,
    },
    /// Radial gradient drawn past its end radius
    RadialGradient {
        center: Point,
        radius: f64,
        stops: Vec<(f64, Color)>,
    },
    Text {
        rect: Rect,
        text: String,
        font: Font,
        color: Color,
    },
    /// Slot where a caller-owned custom view paints itself
    CustomView {
        rect: Rect,
    },
    /// Begin a group composited with `opacity` and scaled about `anchor`
    PushLayer {
        opacity: f64,
        scale: f64,
        anchor: Point,
    },
    PopLayer,
    /// Translate then rotate the coordinate system (radians, counter-clockwise)
    PushTransform {
        translate: Point,
        rotate: f64,
    },
    PopTransform,
}

/// Ordered list of drawing operations for one frame
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DrawList {
    ops: Vec<DrawOp>,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, op: DrawOp) {
        self.ops.push(op);
    }

    pub fn extend(&mut self, other: DrawList) {
        self.ops.extend(other.ops);
    }

    pub fn fill(&mut self, path: Path, color: Color) {
        self.push(DrawOp::Fill { path, color });
    }

    pub fn stroke(&mut self, path: Path, color: Color, width: f64, cap: LineCap) {
        self.push(DrawOp::Stroke {
            path,
            color,
            width,
            cap,
        });
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// All paths referenced by fill and stroke operations
    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Fill { path, .. } | DrawOp::Stroke { path, .. } => Some(path),
            _ => None,
        })
    }

    /// True when every emitted path is free of NaN/infinite values
    pub fn is_finite(&self) -> bool {
        self.paths().all(Path::is_finite)
    }

    /// Replace every custom-view slot with whatever `paint` draws for it
    pub fn expand_custom_views(self, mut paint: impl FnMut(Rect, &mut DrawList)) -> DrawList {
        let mut out = DrawList::new();
        for op in self.ops {
            match op {
                DrawOp::CustomView { rect } => paint(rect, &mut out),
                op => out.push(op),
            }
        }
        out
    }

    /// Text strings drawn in this frame, in order
    pub fn texts(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}
