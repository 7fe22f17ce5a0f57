//! Drawing layer
//!
//! Geometry primitives, colours and fonts, the immediate-mode display list
//! and text metrics. The `hud` module builds the overlay panel on top of them.

pub mod draw;
pub mod geometry;
pub mod hud;
pub mod styles;
pub mod text;

pub use draw::{DrawList, DrawOp, LineCap, Path, PathSegment};
pub use geometry::{Point, Rect, Size};
pub use styles::{colors, Color, Font, HudStyle};
pub use text::{ApproximateMetrics, TextMeasure};
