// Copyright 2025 the Sseq Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pointer press tracking that tells clicks from drags.
//!
//! 1) Call [`DragState::start`] on pointer down.
//! 2) Feed pointer moves to [`DragState::update`]; it yields pan deltas once
//!    the pointer has travelled further than the slop radius.
//! 3) Call [`DragState::end`] on pointer up to learn whether the press was a
//!    click or a drag.
//!
//! ```
//! use kurbo::{Point, Vec2};
//! use sseq_event::drag::{DragOutcome, DragState};
//!
//! let mut drag = DragState::new(3.0);
//! drag.start(Point::new(10.0, 20.0));
//! // Within the slop radius: still a potential click.
//! assert_eq!(drag.update(Point::new(11.0, 20.0)), None);
//! // Past the slop radius: the whole offset so far is released at once.
//! assert_eq!(drag.update(Point::new(15.0, 20.0)), Some(Vec2::new(5.0, 0.0)));
//! assert_eq!(drag.update(Point::new(15.0, 22.0)), Some(Vec2::new(0.0, 2.0)));
//! assert_eq!(drag.end(), Some(DragOutcome::Drag(Vec2::new(5.0, 2.0))));
//! ```

use kurbo::{Point, Vec2};

/// How a press ended.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DragOutcome {
    /// The pointer never left the slop radius; this is the press position.
    Click(Point),
    /// The pointer was dragged; total offset from the press position.
    Drag(Vec2),
}

/// Tracks one pointer press.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DragState {
    slop: f64,
    start_pos: Option<Point>,
    last_pos: Option<Point>,
    dragging: bool,
}

impl Default for DragState {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl DragState {
    /// Creates an idle tracker with the given slop radius in pixels.
    #[must_use]
    pub fn new(slop: f64) -> Self {
        Self {
            slop: slop.max(0.0),
            start_pos: None,
            last_pos: None,
            dragging: false,
        }
    }

    /// Begins tracking a press at `pos`, discarding any previous press.
    pub fn start(&mut self, pos: Point) {
        self.start_pos = Some(pos);
        self.last_pos = Some(pos);
        self.dragging = false;
    }

    /// Records a pointer move and returns the pan delta to apply, if any.
    pub fn update(&mut self, pos: Point) -> Option<Vec2> {
        let start = self.start_pos?;
        if !self.dragging {
            if (pos - start).hypot() <= self.slop {
                return None;
            }
            self.dragging = true;
        }
        let last = self.last_pos.replace(pos).unwrap_or(start);
        Some(pos - last)
    }

    /// Ends the press. Returns `None` if no press was active.
    pub fn end(&mut self) -> Option<DragOutcome> {
        let start = self.start_pos.take()?;
        let last = self.last_pos.take().unwrap_or(start);
        let outcome = if self.dragging {
            DragOutcome::Drag(last - start)
        } else {
            DragOutcome::Click(start)
        };
        self.dragging = false;
        Some(outcome)
    }

    /// Whether a press is active.
    #[must_use]
    pub fn is_pressed(&self) -> bool {
        self.start_pos.is_some()
    }

    /// Whether the active press has turned into a drag.
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.dragging
    }
}
