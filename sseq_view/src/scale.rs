// Copyright 2025 the Sseq Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::zoom::ZoomTransform;

/// Which screen axis a scale or transform component belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Horizontal axis; pixels grow to the right.
    X,
    /// Vertical axis; the chart's y grows upwards, pixels grow downwards.
    Y,
}

/// Continuous linear map from a domain interval onto a pixel interval.
///
/// Either interval may be reversed. The vertical chart axis is built with a
/// reversed range (`[bottom, top]`) so that larger domain values sit higher
/// on screen.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinearScale {
    domain: [f64; 2],
    range: [f64; 2],
}

impl LinearScale {
    /// Creates a scale mapping `domain[0] -> range[0]` and `domain[1] -> range[1]`.
    #[must_use]
    pub fn new(domain: [f64; 2], range: [f64; 2]) -> Self {
        Self { domain, range }
    }

    /// Returns the domain interval.
    #[must_use]
    pub fn domain(&self) -> [f64; 2] {
        self.domain
    }

    /// Returns the pixel interval.
    #[must_use]
    pub fn range(&self) -> [f64; 2] {
        self.range
    }

    /// Returns a copy with the domain replaced, keeping the pixel range.
    #[must_use]
    pub fn with_domain(self, domain: [f64; 2]) -> Self {
        Self { domain, ..self }
    }

    /// Maps a domain value to pixels.
    #[must_use]
    pub fn apply(&self, value: f64) -> f64 {
        let [d0, d1] = self.domain;
        let [r0, r1] = self.range;
        if d1 == d0 {
            return (r0 + r1) * 0.5;
        }
        r0 + (value - d0) * (r1 - r0) / (d1 - d0)
    }

    /// Maps a pixel coordinate back to the domain.
    #[must_use]
    pub fn invert(&self, pixel: f64) -> f64 {
        let [d0, d1] = self.domain;
        let [r0, r1] = self.range;
        if r1 == r0 {
            return (d0 + d1) * 0.5;
        }
        d0 + (pixel - r0) * (d1 - d0) / (r1 - r0)
    }

    /// Pixel length of one domain unit (always non-negative).
    #[must_use]
    pub fn unit_span(&self) -> f64 {
        (self.apply(1.0) - self.apply(0.0)).abs()
    }

    /// Pixel length of the range interval (always non-negative).
    #[must_use]
    pub fn range_extent(&self) -> f64 {
        (self.range[1] - self.range[0]).abs()
    }

    /// Returns the scale seen through `transform` along `axis`.
    ///
    /// The pixel range is kept and the domain becomes whatever the base scale
    /// would have shown at the un-transformed pixel positions, so that
    /// `rescaled.apply(v) == transform.apply(axis, self.apply(v))`.
    #[must_use]
    pub fn rescaled(&self, transform: &ZoomTransform, axis: Axis) -> Self {
        let [r0, r1] = self.range;
        let d0 = self.invert(transform.invert(axis, r0));
        let d1 = self.invert(transform.invert(axis, r1));
        self.with_domain([d0, d1])
    }

    /// Returns roughly `count` round tick values covering the domain.
    ///
    /// Tick spacing follows the 1-2-5 ladder: every returned value is a
    /// multiple of `{1, 2, 5} * 10^n`.
    #[must_use]
    pub fn ticks(&self, count: usize) -> Vec<f64> {
        let (lo, hi) = ordered(self.domain);
        if hi <= lo || count == 0 {
            return vec![lo];
        }
        let step = tick_increment(lo, hi, count);
        let first = (lo / step).ceil();
        let last = (hi / step).floor();
        let mut ticks = Vec::new();
        let mut i = first;
        while i <= last {
            ticks.push(i * step);
            i += 1.0;
        }
        ticks
    }
}

// Thresholds between the 1, 2, 5 and 10 rungs, in log space halfway points.
const E10: f64 = 7.0710678118654755;
const E5: f64 = 3.1622776601683795;
const E2: f64 = 1.4142135623730951;

fn tick_increment(lo: f64, hi: f64, count: usize) -> f64 {
    let raw = (hi - lo) / count as f64;
    let power = raw.log10().floor();
    let magnitude = 10_f64.powf(power);
    let error = raw / magnitude;
    let factor = if error >= E10 {
        10.0
    } else if error >= E5 {
        5.0
    } else if error >= E2 {
        2.0
    } else {
        1.0
    };
    factor * magnitude
}

fn ordered([a, b]: [f64; 2]) -> (f64, f64) {
    if a <= b { (a, b) } else { (b, a) }
}
