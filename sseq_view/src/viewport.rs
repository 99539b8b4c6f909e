// Copyright 2025 the Sseq Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use kurbo::{Point, Rect, Vec2};

use crate::recompute::{
    BaseScales, Correction, DomainBounds, DomainConfig, LiveScales, recompute_scales,
};
use crate::scale::LinearScale;
use crate::seek::{SeekAnimation, SeekEnd, SeekId};
use crate::zoom::{ZoomBehavior, ZoomTransform};

/// Pixel space reserved around the plot area for axis labels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Margins {
    /// Left margin (y axis labels).
    pub left: f64,
    /// Right margin.
    pub right: f64,
    /// Top margin.
    pub top: f64,
    /// Bottom margin (x axis labels).
    pub bottom: f64,
}

impl Default for Margins {
    fn default() -> Self {
        Self {
            left: 40.0,
            right: 20.0,
            top: 20.0,
            bottom: 40.0,
        }
    }
}

impl Margins {
    /// Shrinks margins proportionally so they use at most half of each canvas dimension.
    #[must_use]
    pub fn fitted(self, width: f64, height: f64) -> Self {
        let fx = shrink_factor(self.left + self.right, width);
        let fy = shrink_factor(self.top + self.bottom, height);
        Self {
            left: self.left * fx,
            right: self.right * fx,
            top: self.top * fy,
            bottom: self.bottom * fy,
        }
    }
}

fn shrink_factor(total: f64, extent: f64) -> f64 {
    let limit = extent * 0.5;
    if total > limit && total > 0.0 {
        (limit / total).max(0.0)
    } else {
        1.0
    }
}

/// Progress reported by [`ChartViewport::advance_seek`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SeekTick {
    /// No seek is running.
    Idle,
    /// One step was applied; more remain.
    Stepped,
    /// The last step was applied.
    Finished(SeekId),
}

/// Pan/zoom viewport for a bidegree chart.
///
/// The viewport owns the [`ZoomBehavior`] that gestures act on, the base
/// scales fixed by the canvas size and margins, and the live scales of the
/// last [`ChartViewport::recompute`]. All conversions go through the live
/// scales.
#[derive(Clone, Debug)]
pub struct ChartViewport {
    margins: Margins,
    active_margins: Margins,
    domain: DomainConfig,
    width: f64,
    height: f64,
    zoom: ZoomBehavior,
    base: BaseScales,
    live: LiveScales,
    committed: Option<ZoomTransform>,
    seek: SeekAnimation,
}

impl ChartViewport {
    /// Creates a viewport; call [`ChartViewport::initialize`] once the canvas size is known.
    #[must_use]
    pub fn new(margins: Margins, domain: DomainConfig) -> Self {
        let base = BaseScales {
            x: LinearScale::new([0.0, 1.0], [0.0, 1.0]),
            y: LinearScale::new([0.0, 1.0], [1.0, 0.0]),
        };
        let mut vp = Self {
            margins,
            active_margins: margins,
            domain,
            width: 0.0,
            height: 0.0,
            zoom: ZoomBehavior::new(),
            base,
            live: LiveScales::unclamped(&base, ZoomTransform::IDENTITY),
            committed: None,
            seek: SeekAnimation::new(),
        };
        vp.rebuild_base();
        vp
    }

    /// Sets up the base scales for a canvas of the given pixel size and resets the zoom.
    pub fn initialize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
        self.rebuild_base();
        self.committed = None;
        self.zoom.detached(|z| z.set_transform(ZoomTransform::IDENTITY));
        self.recompute();
    }

    /// Changes the canvas size while keeping the current transform.
    pub fn resize(&mut self, width: f64, height: f64) {
        if self.width == width && self.height == height {
            return;
        }
        self.width = width;
        self.height = height;
        self.rebuild_base();
        self.recompute();
    }

    /// Replaces the domain limits; the base scales are reseeded from the new initial ranges.
    pub fn set_domain(&mut self, domain: DomainConfig) {
        if self.domain == domain {
            return;
        }
        self.domain = domain;
        self.rebuild_base();
        self.recompute();
    }

    /// Returns the domain limits.
    #[must_use]
    pub fn domain(&self) -> &DomainConfig {
        &self.domain
    }

    /// Returns the margins currently in effect.
    #[must_use]
    pub fn margins(&self) -> Margins {
        self.active_margins
    }

    /// Canvas size in pixels.
    #[must_use]
    pub fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    /// The plot area in pixels.
    #[must_use]
    pub fn plot_rect(&self) -> Rect {
        let m = self.active_margins;
        Rect::new(m.left, m.top, self.width - m.right, self.height - m.bottom)
    }

    /// Derives the live scales from the current transform.
    ///
    /// Corrections are pushed back into the zoom behavior with its listener
    /// detached, so the correction itself does not request another frame.
    pub fn recompute(&mut self) -> &LiveScales {
        let live = recompute_scales(
            self.zoom.transform(),
            self.committed,
            &self.domain,
            &self.base,
        );
        match live.correction {
            Correction::None => {}
            Correction::Translated(shift) => {
                tracing::trace!(dx = shift.x, dy = shift.y, "viewport clamped to domain");
                self.zoom.detached(|z| z.set_transform(live.transform));
            }
            Correction::RestoredPrevious => {
                tracing::trace!(k = live.transform.k, "zoom-out past domain rejected");
                self.zoom.detached(|z| z.set_transform(live.transform));
            }
            Correction::ZoomCapped => {
                tracing::trace!(k = live.transform.k, "zoom-out capped at full domain");
                self.zoom.detached(|z| z.set_transform(live.transform));
            }
        }
        self.committed = Some(live.transform);
        self.live = live;
        &self.live
    }

    /// Live scales of the last recomputation.
    #[must_use]
    pub fn live(&self) -> &LiveScales {
        &self.live
    }

    /// Live horizontal scale.
    #[must_use]
    pub fn x_scale(&self) -> &LinearScale {
        &self.live.x
    }

    /// Live vertical scale.
    #[must_use]
    pub fn y_scale(&self) -> &LinearScale {
        &self.live.y
    }

    /// Visible float and integer domain bounds.
    #[must_use]
    pub fn bounds(&self) -> DomainBounds {
        self.live.bounds
    }

    /// The current (corrected) zoom transform.
    #[must_use]
    pub fn transform(&self) -> ZoomTransform {
        self.zoom.transform()
    }

    /// Read access to the zoom behavior.
    #[must_use]
    pub fn zoom(&self) -> &ZoomBehavior {
        &self.zoom
    }

    /// Sets the allowed zoom factor range.
    pub fn set_zoom_extent(&mut self, min: f64, max: f64) {
        self.zoom.set_scale_extent(min, max);
    }

    /// Domain point to pixel.
    #[must_use]
    pub fn to_pixel(&self, domain: Point) -> Point {
        Point::new(self.live.x.apply(domain.x), self.live.y.apply(domain.y))
    }

    /// Pixel to domain point.
    #[must_use]
    pub fn to_domain(&self, pixel: Point) -> Point {
        Point::new(self.live.x.invert(pixel.x), self.live.y.invert(pixel.y))
    }

    /// Pixel displacement corresponding to a domain displacement.
    #[must_use]
    pub fn pixel_delta(&self, domain_delta: Vec2) -> Vec2 {
        Vec2::new(
            self.live.x.apply(domain_delta.x) - self.live.x.apply(0.0),
            self.live.y.apply(domain_delta.y) - self.live.y.apply(0.0),
        )
    }

    /// Pans immediately by a pixel delta and recomputes.
    pub fn translate_by(&mut self, delta: Vec2) {
        self.zoom.detached(|z| z.translate_by(delta));
        self.recompute();
    }

    /// Gesture zoom about a pixel anchor.
    ///
    /// The change goes through the zoom listener; drain it with
    /// [`ChartViewport::take_zoom_changed`] to schedule a redraw.
    pub fn zoom_by(&mut self, factor: f64, anchor: Point) {
        self.zoom.scale_by(factor, anchor);
    }

    /// Gesture pan by a pixel delta; reported like [`ChartViewport::zoom_by`].
    pub fn pan_by(&mut self, delta: Vec2) {
        self.zoom.translate_by(delta);
    }

    /// Returns whether a gesture changed the transform since the last call.
    pub fn take_zoom_changed(&mut self) -> bool {
        self.zoom.take_changed()
    }

    /// Starts animating the plot center towards `target` over `steps` ticks.
    ///
    /// A seek already in flight is cancelled and reported in the return value.
    pub fn seek(&mut self, target: Point, steps: u32) -> (SeekId, Option<SeekEnd>) {
        let center = self.to_domain(self.plot_rect().center());
        let delta = self.pixel_delta(center - target);
        tracing::debug!(x = target.x, y = target.y, steps, "seek started");
        self.seek.start(delta, steps)
    }

    /// Cancels the running seek.
    pub fn cancel_seek(&mut self) -> Option<SeekEnd> {
        self.seek.cancel()
    }

    /// Whether a seek animation is running.
    #[must_use]
    pub fn is_seeking(&self) -> bool {
        self.seek.is_running()
    }

    /// Applies one seek step; call this from the host's step timer.
    pub fn advance_seek(&mut self) -> SeekTick {
        match self.seek.advance() {
            None => SeekTick::Idle,
            Some((step, end)) => {
                self.translate_by(step);
                match end {
                    Some(SeekEnd::Finished(id)) => SeekTick::Finished(id),
                    _ => SeekTick::Stepped,
                }
            }
        }
    }

    fn rebuild_base(&mut self) {
        let m = self.margins.fitted(self.width, self.height);
        self.active_margins = m;
        let off = self.domain.domain_offset;
        let [x0, x1] = self.domain.initial_x_range;
        let [y0, y1] = self.domain.initial_y_range;
        self.base = BaseScales {
            x: LinearScale::new([x0 - off, x1 + off], [m.left, self.width - m.right]),
            y: LinearScale::new([y0 - off, y1 + off], [self.height - m.bottom, m.top]),
        };
    }
}
