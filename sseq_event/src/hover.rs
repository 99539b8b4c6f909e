// Copyright 2025 the Sseq Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Single-target hover tracking.
//!
//! [`HoverState::update`] takes the target currently under the pointer (or
//! `None`) and returns the leave/enter transitions needed to get there. No
//! events are produced while the target stays the same.
//!
//! ```
//! use sseq_event::hover::{HoverEvent, HoverState};
//!
//! let mut hover = HoverState::new();
//! assert_eq!(hover.update(Some(3)).as_slice(), &[HoverEvent::Enter(3)]);
//! assert!(hover.update(Some(3)).is_empty());
//! assert_eq!(
//!     hover.update(Some(4)).as_slice(),
//!     &[HoverEvent::Leave(3), HoverEvent::Enter(4)]
//! );
//! assert_eq!(hover.update(None).as_slice(), &[HoverEvent::Leave(4)]);
//! ```

use smallvec::SmallVec;

/// A hover transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HoverEvent<K> {
    /// The pointer entered `K`.
    Enter(K),
    /// The pointer left `K`.
    Leave(K),
}

/// Transitions produced by one update; at most a leave followed by an enter.
pub type HoverTransitions<K> = SmallVec<[HoverEvent<K>; 2]>;

/// Tracks which single target is hovered.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HoverState<K> {
    current: Option<K>,
}

impl<K> Default for HoverState<K> {
    fn default() -> Self {
        Self { current: None }
    }
}

impl<K: Clone + PartialEq> HoverState<K> {
    /// Creates a state with nothing hovered.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The hovered target.
    #[must_use]
    pub fn current(&self) -> Option<&K> {
        self.current.as_ref()
    }

    /// Moves hover to `next`, returning the transitions.
    pub fn update(&mut self, next: Option<K>) -> HoverTransitions<K> {
        let mut out = HoverTransitions::new();
        if self.current == next {
            return out;
        }
        if let Some(old) = self.current.take() {
            out.push(HoverEvent::Leave(old));
        }
        if let Some(new) = next.clone() {
            out.push(HoverEvent::Enter(new));
        }
        self.current = next;
        out
    }

    /// Forgets the hovered target without producing events.
    pub fn reset(&mut self) {
        self.current = None;
    }
}
