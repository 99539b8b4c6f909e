// Copyright 2025 the Sseq Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use kurbo::Vec2;

/// Identifies one seek animation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SeekId(pub u64);

/// Terminal state of a seek.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SeekEnd {
    /// Every step was applied.
    Finished(SeekId),
    /// A newer seek replaced this one before it completed.
    Cancelled(SeekId),
}

#[derive(Clone, Copy, Debug)]
struct ActiveSeek {
    id: SeekId,
    step: Vec2,
    remaining: u32,
}

/// Fixed-step pan animation.
///
/// A seek splits a total pixel delta into equal steps. The host calls
/// [`SeekAnimation::advance`] on every timer tick and applies the returned
/// step. Only one seek runs at a time: starting a new one cancels the
/// one in flight.
#[derive(Clone, Debug, Default)]
pub struct SeekAnimation {
    active: Option<ActiveSeek>,
    next_id: u64,
}

impl SeekAnimation {
    /// Creates an idle animation.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a seek over `delta` pixels in `steps` ticks (at least one).
    ///
    /// Returns the new seek's id and, if one was running, its cancellation.
    pub fn start(&mut self, delta: Vec2, steps: u32) -> (SeekId, Option<SeekEnd>) {
        let cancelled = self.cancel();
        let steps = steps.max(1);
        let id = SeekId(self.next_id);
        self.next_id += 1;
        self.active = Some(ActiveSeek {
            id,
            step: delta / f64::from(steps),
            remaining: steps,
        });
        (id, cancelled)
    }

    /// Cancels the running seek, if any.
    pub fn cancel(&mut self) -> Option<SeekEnd> {
        self.active.take().map(|s| SeekEnd::Cancelled(s.id))
    }

    /// Returns the id of the running seek.
    #[must_use]
    pub fn active(&self) -> Option<SeekId> {
        self.active.map(|s| s.id)
    }

    /// Whether a seek is running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }

    /// Consumes one tick.
    ///
    /// Returns the pixel step to apply and, on the last step, the finish
    /// notice. Returns `None` when idle.
    pub fn advance(&mut self) -> Option<(Vec2, Option<SeekEnd>)> {
        let seek = self.active.as_mut()?;
        seek.remaining -= 1;
        let step = seek.step;
        if seek.remaining == 0 {
            let id = seek.id;
            self.active = None;
            Some((step, Some(SeekEnd::Finished(id))))
        } else {
            Some((step, None))
        }
    }
}

#[cfg(test)]
mod tests {
    use kurbo::Vec2;

    use super::{SeekAnimation, SeekEnd, SeekId};

    #[test]
    fn steps_sum_to_total_delta() {
        let mut anim = SeekAnimation::new();
        let (id, cancelled) = anim.start(Vec2::new(100.0, -40.0), 4);
        assert_eq!(cancelled, None);

        let mut total = Vec2::ZERO;
        let mut end = None;
        while let Some((step, done)) = anim.advance() {
            total += step;
            end = done;
        }
        assert_eq!(end, Some(SeekEnd::Finished(id)));
        assert!((total - Vec2::new(100.0, -40.0)).hypot() < 1e-9);
        assert!(!anim.is_running());
    }

    #[test]
    fn new_seek_cancels_in_flight_one() {
        let mut anim = SeekAnimation::new();
        let (first, _) = anim.start(Vec2::new(10.0, 0.0), 5);
        let _ = anim.advance();
        let (second, cancelled) = anim.start(Vec2::new(0.0, 10.0), 2);
        assert_eq!(cancelled, Some(SeekEnd::Cancelled(first)));
        assert_ne!(first, second);
        assert_eq!(anim.active(), Some(second));
        assert_eq!(anim.advance(), Some((Vec2::new(0.0, 5.0), None)));
        assert_eq!(
            anim.advance(),
            Some((Vec2::new(0.0, 5.0), Some(SeekEnd::Finished(SeekId(1)))))
        );
        assert_eq!(anim.advance(), None);
    }

    #[test]
    fn zero_steps_means_single_jump() {
        let mut anim = SeekAnimation::new();
        let (id, _) = anim.start(Vec2::new(3.0, 3.0), 0);
        assert_eq!(
            anim.advance(),
            Some((Vec2::new(3.0, 3.0), Some(SeekEnd::Finished(id))))
        );
    }
}
