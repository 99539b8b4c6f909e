// Copyright 2025 the Sseq Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use kurbo::{Affine, Point, Vec2};

use crate::scale::Axis;

/// Uniform zoom plus pixel translation: `pixel' = k * pixel + t`.
///
/// This is the viewport state proper. It is applied on top of the base axis
/// scales; see [`crate::LinearScale::rescaled`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ZoomTransform {
    /// Scale factor.
    pub k: f64,
    /// Horizontal translation in pixels.
    pub tx: f64,
    /// Vertical translation in pixels.
    pub ty: f64,
}

impl Default for ZoomTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl ZoomTransform {
    /// The identity transform.
    pub const IDENTITY: Self = Self {
        k: 1.0,
        tx: 0.0,
        ty: 0.0,
    };

    /// Creates a transform from its components.
    #[must_use]
    pub fn new(k: f64, tx: f64, ty: f64) -> Self {
        Self { k, tx, ty }
    }

    /// Applies the transform to one pixel coordinate.
    #[must_use]
    pub fn apply(&self, axis: Axis, pixel: f64) -> f64 {
        match axis {
            Axis::X => pixel * self.k + self.tx,
            Axis::Y => pixel * self.k + self.ty,
        }
    }

    /// Inverse of [`ZoomTransform::apply`].
    #[must_use]
    pub fn invert(&self, axis: Axis, pixel: f64) -> f64 {
        match axis {
            Axis::X => (pixel - self.tx) / self.k,
            Axis::Y => (pixel - self.ty) / self.k,
        }
    }

    /// Returns this transform followed by a pixel translation.
    #[must_use]
    pub fn translated(self, delta: Vec2) -> Self {
        Self {
            tx: self.tx + delta.x,
            ty: self.ty + delta.y,
            ..self
        }
    }

    /// Returns the transform with `k` replaced so that `anchor` stays put.
    #[must_use]
    pub fn scaled_to(self, k: f64, anchor: Point) -> Self {
        let base_x = self.invert(Axis::X, anchor.x);
        let base_y = self.invert(Axis::Y, anchor.y);
        Self {
            k,
            tx: anchor.x - base_x * k,
            ty: anchor.y - base_y * k,
        }
    }

    /// The transform as a Kurbo affine.
    #[must_use]
    pub fn to_affine(&self) -> Affine {
        Affine::new([self.k, 0.0, 0.0, self.k, self.tx, self.ty])
    }
}

/// Owner of the live [`ZoomTransform`] that user gestures act on.
///
/// Changes made while the change listener is attached are recorded as a
/// pending change, which the host drains with [`ZoomBehavior::take_changed`]
/// to schedule a redraw. Corrections computed from inside a redraw run
/// through [`ZoomBehavior::detached`] so they never feed back into another
/// redraw.
#[derive(Clone, Debug)]
pub struct ZoomBehavior {
    transform: ZoomTransform,
    scale_extent: [f64; 2],
    listening: bool,
    changed: bool,
}

impl Default for ZoomBehavior {
    fn default() -> Self {
        Self::new()
    }
}

impl ZoomBehavior {
    /// Creates a behavior at the identity transform with an unbounded scale extent.
    #[must_use]
    pub fn new() -> Self {
        Self {
            transform: ZoomTransform::IDENTITY,
            scale_extent: [0.0, f64::INFINITY],
            listening: true,
            changed: false,
        }
    }

    /// Returns the current transform.
    #[must_use]
    pub fn transform(&self) -> ZoomTransform {
        self.transform
    }

    /// Returns the allowed `[min, max]` range of `k`.
    #[must_use]
    pub fn scale_extent(&self) -> [f64; 2] {
        self.scale_extent
    }

    /// Sets the allowed range of `k`, normalizing the order of the bounds.
    pub fn set_scale_extent(&mut self, min: f64, max: f64) {
        self.scale_extent = if min <= max { [min, max] } else { [max, min] };
    }

    /// Returns whether the change listener is currently attached.
    #[must_use]
    pub fn is_listening(&self) -> bool {
        self.listening
    }

    /// Replaces the transform.
    pub fn set_transform(&mut self, transform: ZoomTransform) {
        if self.transform == transform {
            return;
        }
        self.transform = transform;
        if self.listening {
            self.changed = true;
        }
    }

    /// Pans by a pixel delta.
    pub fn translate_by(&mut self, delta: Vec2) {
        if delta == Vec2::ZERO {
            return;
        }
        self.set_transform(self.transform.translated(delta));
    }

    /// Multiplies `k` by `factor` about a pixel anchor, clamped to the scale extent.
    pub fn scale_by(&mut self, factor: f64, anchor: Point) {
        if factor.is_nan() || factor <= 0.0 {
            return;
        }
        let [min, max] = self.scale_extent;
        let k = (self.transform.k * factor).clamp(min, max);
        self.set_transform(self.transform.scaled_to(k, anchor));
    }

    /// Runs `f` with the change listener detached, reattaching it afterwards.
    pub fn detached<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        let was_listening = self.listening;
        self.listening = false;
        let out = f(self);
        self.listening = was_listening;
        out
    }

    /// Returns whether a listened change happened since the last call, and resets it.
    pub fn take_changed(&mut self) -> bool {
        core::mem::take(&mut self.changed)
    }
}
