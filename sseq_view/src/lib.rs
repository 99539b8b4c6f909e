// Copyright 2025 the Sseq Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Sseq View: pan/zoom viewport for bidegree charts.
//!
//! This crate provides a small, headless model of a chart viewport whose
//! extents are expressed in device pixels. It focuses on:
//! - Linear axis scales between domain coordinates and pixels.
//! - A uniform zoom + translate transform driven by user gestures.
//! - Clamping that keeps the visible domain inside configured ranges.
//! - Integer bidegree bounds for culling and grid drawing.
//! - A fixed-step "seek" animation that recenters the plot.
//!
//! It does **not** draw anything. Callers are expected to:
//! - Feed wheel and drag input into [`ChartViewport::zoom_by`] /
//!   [`ChartViewport::pan_by`], and schedule a frame when
//!   [`ChartViewport::take_zoom_changed`] reports a change.
//! - Call [`ChartViewport::recompute`] once at the start of every frame.
//! - Drive [`ChartViewport::advance_seek`] from a step timer.
//!
//! ## Minimal example
//!
//! ```rust
//! use kurbo::Point;
//! use sseq_view::{ChartViewport, DomainConfig, Margins};
//!
//! let domain = DomainConfig {
//!     x_range: Some([0.0, 40.0]),
//!     y_range: Some([0.0, 20.0]),
//!     initial_x_range: [0.0, 20.0],
//!     initial_y_range: [0.0, 10.0],
//!     domain_offset: 0.5,
//! };
//! let mut view = ChartViewport::new(Margins::default(), domain);
//! view.initialize(800.0, 600.0);
//!
//! // Zoom in around the canvas center, then render a frame.
//! view.zoom_by(2.0, Point::new(400.0, 300.0));
//! let live = view.recompute();
//! assert!(live.bounds.x_min >= 0);
//!
//! // Pointer position back into bidegree space.
//! let domain_pt = view.to_domain(Point::new(410.0, 290.0));
//! let nearest = (domain_pt.x.round(), domain_pt.y.round());
//! # let _ = nearest;
//! ```
//!
//! ## Clamping
//!
//! [`recompute_scales`] is a pure function of the requested transform, the
//! previously committed transform, the domain limits and the base scales.
//! Per bounded axis it either pins the axis to its padded range (the axis is
//! "maxed") or translates the transform so the range bound sits exactly on
//! the plot edge. A zoom-out never takes `k` below the point where both axes
//! are maxed: it stops there, or keeps the previous transform if that is
//! already maxed, so zooming back in takes effect on the very next gesture.

mod recompute;
mod scale;
mod seek;
mod viewport;
mod zoom;

pub use recompute::{
    BaseScales, Correction, DomainBounds, DomainConfig, LiveScales, recompute_scales,
};
pub use scale::{Axis, LinearScale};
pub use seek::{SeekAnimation, SeekEnd, SeekId};
pub use viewport::{ChartViewport, Margins, SeekTick};
pub use zoom::{ZoomBehavior, ZoomTransform};
