// Copyright 2025 the Sseq Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Sseq Imaging: the drawing-surface IR used by the chart renderer.
//!
//! The renderer never talks to a canvas directly. It issues a flat stream of
//! imaging operations against a [`Surface`]:
//!
//! - [`StateOp`] mutates the current drawing state (transform, fill and
//!   stroke paints, stroke style, text style, clip stack).
//! - [`DrawOp`] produces marks using that state.
//!
//! Hosts implement [`Surface`] on top of whatever 2D API they have. This crate
//! ships [`RecordingSurface`], which records ops together with a snapshot of
//! the state they were drawn under; it is the surface used in tests.
//!
//! Geometry is expressed with `kurbo` shapes in pixel space, and colors with
//! `peniko`'s [`Color`].
//!
//! # Example
//!
//! ```rust
//! use sseq_imaging::{Circle, Color, DrawOp, RecordingSurface, StateOp, Surface};
//!
//! let mut surface = RecordingSurface::default();
//! surface.state(StateOp::SetFill(Color::BLACK));
//! surface.draw(DrawOp::FillCircle(Circle::new((10.0, 10.0), 3.0)));
//!
//! assert_eq!(surface.draw_count(), 1);
//! ```

mod recording;

use std::sync::Arc;

pub use kurbo::{Affine, BezPath, Circle, Line, Point, Rect, Size, Stroke as StrokeStyle};
pub use peniko::Color;
pub use recording::{Event, RecordingSurface, StateSnapshot};

/// Identifier for a raster image owned by the host.
///
/// Pixel data never travels through the IR; surfaces look the image up by id.
#[repr(transparent)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ImageId(pub u32);

/// Horizontal placement of text relative to its origin.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum TextAnchor {
    /// Text starts at the origin.
    #[default]
    Start,
    /// Text is centered on the origin.
    Middle,
    /// Text ends at the origin.
    End,
}

/// Vertical placement of text relative to its origin.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum TextBaseline {
    /// Origin is on the alphabetic baseline.
    #[default]
    Alphabetic,
    /// Origin is at the vertical middle of the em box.
    Middle,
    /// Origin is at the top of the em box.
    Hanging,
}

/// Text state used by [`DrawOp::Text`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TextStyle {
    /// Font size in pixels.
    pub size: f32,
    /// Horizontal anchor.
    pub anchor: TextAnchor,
    /// Vertical anchor.
    pub baseline: TextBaseline,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            size: 12.0,
            anchor: TextAnchor::Start,
            baseline: TextBaseline::Alphabetic,
        }
    }
}

/// An image drawn over the chart, stretched to a destination rectangle.
#[derive(Clone, Debug, PartialEq)]
pub enum OverlayImage {
    /// A host raster image with its intrinsic pixel size.
    Raster {
        /// Host image.
        id: ImageId,
        /// Intrinsic width in pixels.
        width: u32,
        /// Intrinsic height in pixels.
        height: u32,
    },
    /// Inline SVG markup.
    Svg(Arc<str>),
}

/// Operations that mutate the drawing state.
#[derive(Clone, Debug)]
pub enum StateOp {
    /// Replace the current transform.
    SetTransform(Affine),
    /// Set the paint used by fill operations.
    SetFill(Color),
    /// Set the paint used by stroke operations.
    SetStrokePaint(Color),
    /// Set the stroke geometry (width, dashes, caps and joins).
    SetStroke(StrokeStyle),
    /// Set the text style.
    SetTextStyle(TextStyle),
    /// Intersect the clip with a rectangle until the matching [`StateOp::PopClip`].
    PushClip(Rect),
    /// Pop the innermost clip.
    PopClip,
}

/// Operations that produce marks.
#[derive(Clone, Debug)]
pub enum DrawOp {
    /// Fill the whole surface, ignoring transform and clip.
    Clear(Color),
    /// Fill a rectangle with the fill paint.
    FillRect(Rect),
    /// Stroke a straight segment.
    StrokeLine(Line),
    /// Stroke an arbitrary path.
    StrokePath(BezPath),
    /// Fill an arbitrary path.
    FillPath(BezPath),
    /// Fill a disc.
    FillCircle(Circle),
    /// Stroke the outline of a disc.
    StrokeCircle(Circle),
    /// Draw a run of text with the fill paint and current text style.
    Text {
        /// Anchor point of the run.
        origin: Point,
        /// The text.
        text: String,
    },
    /// Draw an image stretched to `dst`.
    DrawImage {
        /// Image source.
        image: OverlayImage,
        /// Destination rectangle in user space.
        dst: Rect,
    },
}

/// A recorded imaging operation.
#[derive(Clone, Debug)]
pub enum ImagingOp {
    /// State change.
    State(StateOp),
    /// Draw.
    Draw(DrawOp),
}

/// A host drawing surface.
pub trait Surface {
    /// Apply a state operation.
    fn state(&mut self, op: StateOp);

    /// Apply a draw operation.
    fn draw(&mut self, op: DrawOp);
}

/// Convenience helpers on top of [`Surface`].
pub trait SurfaceExt: Surface {
    /// Run `f` inside a rectangular clip, popping it afterwards.
    ///
    /// Note: if `f` panics, the clip will not be popped.
    #[inline]
    fn with_clip<R>(&mut self, rect: Rect, f: impl FnOnce(&mut Self) -> R) -> R {
        self.state(StateOp::PushClip(rect));
        let out = f(self);
        self.state(StateOp::PopClip);
        out
    }

    /// Set the stroke paint and a solid stroke of `width` in one go.
    #[inline]
    fn set_solid_stroke(&mut self, color: Color, width: f64) {
        self.state(StateOp::SetStrokePaint(color));
        self.state(StateOp::SetStroke(StrokeStyle::new(width)));
    }
}

impl<S: Surface + ?Sized> SurfaceExt for S {}

/// Replay recorded ops onto another surface.
pub fn replay<S: Surface + ?Sized>(surface: &mut S, ops: &[ImagingOp]) {
    for op in ops {
        match op {
            ImagingOp::State(s) => surface.state(s.clone()),
            ImagingOp::Draw(d) => surface.draw(d.clone()),
        }
    }
}
