// Copyright 2025 the Sseq Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Events emitted by the display.

use sseq_chart::{ClassId, PageRange};
use sseq_view::SeekId;

use crate::hit::Bidegree;

/// What a click hit.
#[derive(Clone, Debug, PartialEq)]
pub struct ClickEvent {
    /// Pointer position in domain coordinates.
    pub real_x: f64,
    /// Pointer position in domain coordinates.
    pub real_y: f64,
    /// Nearest bidegree.
    pub x: i64,
    /// Nearest bidegree.
    pub y: i64,
    /// Distance from the pointer to the nearest bidegree, in domain units.
    pub distance: f64,
    /// Class under the pointer.
    pub class: Option<ClassId>,
    /// Hovered bidegree; the current one wins while still within the hover
    /// threshold.
    pub bidegree: Option<Bidegree>,
}

/// Summary of a painted frame.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameInfo {
    /// Page range drawn.
    pub page: PageRange,
    /// Number of classes drawn.
    pub classes: usize,
    /// Number of edges drawn.
    pub edges: usize,
}

/// Display notifications, delivered through `Display::events`.
#[derive(Clone, Debug, PartialEq)]
pub enum DisplayEvent {
    /// A frame was painted.
    FrameDrawn(FrameInfo),
    /// The pointer entered a class.
    MouseoverClass(ClassId),
    /// The pointer left a class.
    MouseoutClass(ClassId),
    /// The pointer came within range of a bidegree.
    MouseoverBidegree(Bidegree),
    /// The pointer moved out of range of a bidegree.
    MouseoutBidegree(Bidegree),
    /// A press was released without dragging.
    Click(ClickEvent),
    /// The current page changed.
    PageChanged {
        /// New index into the page list.
        index: usize,
        /// The range at that index.
        range: PageRange,
    },
    /// The undo history changed the chart.
    ChartChanged,
    /// A seek animation reached its target.
    SeekFinished(SeekId),
}
