// Copyright 2025 the Sseq Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A surface that records ops and the state they were applied under.
//!
//! It does not rasterize. It exists so renderers can be tested by asserting on
//! the emitted op stream.

use crate::{Affine, Color, DrawOp, ImagingOp, StateOp, StrokeStyle, Surface, TextStyle};

/// Snapshot of the current drawing state.
#[derive(Clone, Debug)]
pub struct StateSnapshot {
    /// Current transform.
    pub transform: Affine,
    /// Current fill paint, if set.
    pub fill: Option<Color>,
    /// Current stroke paint, if set.
    pub stroke_paint: Option<Color>,
    /// Current stroke style, if set.
    pub stroke: Option<StrokeStyle>,
    /// Current text style.
    pub text: TextStyle,
    /// Number of pushed clips.
    pub clip_depth: u32,
}

impl Default for StateSnapshot {
    fn default() -> Self {
        Self {
            transform: Affine::IDENTITY,
            fill: None,
            stroke_paint: None,
            stroke: None,
            text: TextStyle::default(),
            clip_depth: 0,
        }
    }
}

/// Event recorded by [`RecordingSurface`].
#[derive(Clone, Debug)]
pub enum Event {
    /// State operation and the resulting state.
    State {
        /// Operation that was applied.
        op: StateOp,
        /// State after applying it.
        state: StateSnapshot,
    },
    /// Draw operation and the state used for drawing.
    Draw {
        /// Operation that was applied.
        op: DrawOp,
        /// State at the time of drawing.
        state: StateSnapshot,
    },
}

/// Recording implementation of [`Surface`].
#[derive(Default, Debug)]
pub struct RecordingSurface {
    events: Vec<Event>,
    ops: Vec<ImagingOp>,
    state: StateSnapshot,
}

impl RecordingSurface {
    /// Recorded events, oldest first.
    #[must_use]
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Raw recorded ops, oldest first.
    #[must_use]
    pub fn ops(&self) -> &[ImagingOp] {
        &self.ops
    }

    /// The current state.
    #[must_use]
    pub fn snapshot(&self) -> &StateSnapshot {
        &self.state
    }

    /// Draw ops with the state they were drawn under.
    pub fn draws(&self) -> impl Iterator<Item = (&DrawOp, &StateSnapshot)> {
        self.events.iter().filter_map(|e| match e {
            Event::Draw { op, state } => Some((op, state)),
            Event::State { .. } => None,
        })
    }

    /// Number of recorded draw ops.
    #[must_use]
    pub fn draw_count(&self) -> usize {
        self.draws().count()
    }

    /// Drops everything recorded so far and resets the state.
    pub fn clear(&mut self) {
        self.events.clear();
        self.ops.clear();
        self.state = StateSnapshot::default();
    }
}

impl Surface for RecordingSurface {
    fn state(&mut self, op: StateOp) {
        match &op {
            StateOp::SetTransform(tx) => self.state.transform = *tx,
            StateOp::SetFill(c) => self.state.fill = Some(*c),
            StateOp::SetStrokePaint(c) => self.state.stroke_paint = Some(*c),
            StateOp::SetStroke(style) => self.state.stroke = Some(style.clone()),
            StateOp::SetTextStyle(style) => self.state.text = *style,
            StateOp::PushClip(_) => self.state.clip_depth += 1,
            StateOp::PopClip => self.state.clip_depth = self.state.clip_depth.saturating_sub(1),
        }
        self.ops.push(ImagingOp::State(op.clone()));
        self.events.push(Event::State {
            op,
            state: self.state.clone(),
        });
    }

    fn draw(&mut self, op: DrawOp) {
        self.ops.push(ImagingOp::Draw(op.clone()));
        self.events.push(Event::Draw {
            op,
            state: self.state.clone(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Circle, Rect};

    #[test]
    fn draws_capture_the_state_at_draw_time() {
        let mut s = RecordingSurface::default();
        s.state(StateOp::SetFill(Color::from_rgba8(255, 0, 0, 255)));
        s.draw(DrawOp::FillCircle(Circle::new((0.0, 0.0), 1.0)));
        s.state(StateOp::SetFill(Color::from_rgba8(0, 0, 255, 255)));
        s.draw(DrawOp::FillRect(Rect::new(0.0, 0.0, 1.0, 1.0)));

        let fills: Vec<_> = s
            .draws()
            .map(|(_, st)| st.fill.map(|c| c.to_rgba8().r))
            .collect();
        assert_eq!(fills, vec![Some(255), Some(0)]);
        assert_eq!(s.events().len(), 4);
    }

    #[test]
    fn unbalanced_pop_does_not_underflow() {
        let mut s = RecordingSurface::default();
        s.state(StateOp::PopClip);
        assert_eq!(s.snapshot().clip_depth, 0);
    }

    #[test]
    fn clear_resets_state() {
        let mut s = RecordingSurface::default();
        s.state(StateOp::SetTransform(Affine::translate((3.0, 4.0))));
        s.clear();
        assert!(s.ops().is_empty());
        assert_eq!(s.snapshot().transform, Affine::IDENTITY);
    }
}
