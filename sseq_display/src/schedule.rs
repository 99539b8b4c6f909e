// Copyright 2025 the Sseq Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frame scheduling and redraw coalescing.
//!
//! The display never blocks and never spawns threads. Deferred work goes
//! through a host [`FrameScheduler`]: the host calls back into the display
//! on its next animation frame, and drives the seek animation from a
//! repeating step timer.
//!
//! Batched redraw requests are coalesced by a pending counter. Every request
//! bumps the counter and asks for one frame callback; every callback drops
//! the counter by one and only the callback that brings it back to zero
//! paints. N requests issued in one turn therefore paint once.

use core::time::Duration;

/// Host hooks for deferred work.
pub trait FrameScheduler {
    /// Asks for one call to `Display::on_animation_frame`.
    fn request_frame(&mut self);

    /// Starts calling `Display::on_seek_step` every `interval` until stopped.
    fn start_step_timer(&mut self, interval: Duration);

    /// Stops the step timer.
    fn stop_step_timer(&mut self);
}

/// A scheduler that only counts what was asked of it.
///
/// Useful for headless use and tests: the caller plays the host and invokes
/// the display callbacks itself.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ManualScheduler {
    /// Frame callbacks requested and not yet taken.
    pub frames: usize,
    /// Interval of the running step timer.
    pub step_timer: Option<Duration>,
}

impl ManualScheduler {
    /// Creates a scheduler with nothing requested.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of requested frames and resets it.
    pub fn take_frames(&mut self) -> usize {
        core::mem::take(&mut self.frames)
    }
}

impl FrameScheduler for ManualScheduler {
    fn request_frame(&mut self) {
        self.frames += 1;
    }

    fn start_step_timer(&mut self, interval: Duration) {
        self.step_timer = Some(interval);
    }

    fn stop_step_timer(&mut self) {
        self.step_timer = None;
    }
}

/// Pending-frame counter behind batched redraws.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RedrawQueue {
    pending: u32,
}

impl RedrawQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one batched request.
    pub fn request(&mut self) {
        self.pending = self.pending.saturating_add(1);
    }

    /// Consumes one frame callback; returns whether this one should paint.
    ///
    /// A callback with nothing pending never paints.
    pub fn on_frame(&mut self) -> bool {
        if self.pending == 0 {
            return false;
        }
        self.pending -= 1;
        self.pending == 0
    }

    /// Requests not yet matched by a frame callback.
    #[must_use]
    pub fn pending(&self) -> u32 {
        self.pending
    }
}
