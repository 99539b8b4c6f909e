// Copyright 2025 the Sseq Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Axis tick and grid steps.

use sseq_view::LinearScale;

use crate::config::DisplayConfig;

/// Integer ticks of one axis for one frame.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AxisTicks {
    /// Distance between labelled ticks, at least 1.
    pub tick_step: i64,
    /// Distance between grid lines, at least 1.
    pub grid_step: i64,
    /// Tick positions: multiples of `tick_step` covering the visible domain,
    /// plus one extra step at each end.
    pub ticks: Vec<i64>,
}

/// Tick step of `scale` at about one tick per `spacing_px` pixels.
///
/// The step is the ceiling of the distance between the first two round
/// ticks, or 1 if the scale yields fewer than two.
#[must_use]
pub fn tick_step(scale: &LinearScale, spacing_px: f64) -> i64 {
    let count = tick_count(scale.range_extent(), spacing_px);
    let candidates = scale.ticks(count);
    match candidates.as_slice() {
        [t0, t1, ..] => float_to_step((t1 - t0).ceil()),
        _ => 1,
    }
}

fn tick_count(extent: f64, spacing_px: f64) -> usize {
    let n = (extent / spacing_px).round();
    if n.is_finite() && n >= 1.0 {
        #[allow(
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss,
            reason = "rounded, finite and at least one"
        )]
        let n = n as usize;
        n
    } else {
        1
    }
}

fn float_to_step(step: f64) -> i64 {
    if step.is_finite() && step >= 1.0 {
        #[allow(
            clippy::cast_possible_truncation,
            reason = "steps are small integers; out-of-range values saturate"
        )]
        let s = step as i64;
        s
    } else {
        1
    }
}

/// Multiples of `step` from below `lo` to above `hi`.
///
/// The first and last entries lie one step outside `[lo, hi]`.
#[must_use]
pub fn tick_positions(lo: f64, hi: f64, step: i64) -> Vec<i64> {
    let step = step.max(1);
    let s = step as f64;
    #[allow(
        clippy::cast_possible_truncation,
        reason = "visible bounds are far inside the i64 range"
    )]
    let first = (lo / s).ceil() as i64;
    #[allow(
        clippy::cast_possible_truncation,
        reason = "visible bounds are far inside the i64 range"
    )]
    let last = (hi / s).floor() as i64;
    let mut ticks = Vec::with_capacity(usize::try_from(last - first + 3).unwrap_or(2));
    ticks.push((first - 1) * step);
    for i in first..=last {
        ticks.push(i * step);
    }
    ticks.push((last + 1) * step);
    ticks
}

/// Grid steps for both axes.
///
/// Each defaults to a fifth of the tick step; a manual step overrides its
/// own axis, and `square_aspect_ratio` draws every line on both.
#[must_use]
pub fn grid_steps(x_tick_step: i64, y_tick_step: i64, config: &DisplayConfig) -> (i64, i64) {
    if config.square_aspect_ratio {
        return (1, 1);
    }
    let x = config
        .manual_x_grid_step
        .unwrap_or_else(|| (x_tick_step / 5).max(1));
    let y = config
        .manual_y_grid_step
        .unwrap_or_else(|| (y_tick_step / 5).max(1));
    (x.max(1), y.max(1))
}

/// Ticks and grid steps of both axes for the live scales.
#[must_use]
pub fn axis_ticks(
    x_scale: &LinearScale,
    y_scale: &LinearScale,
    config: &DisplayConfig,
) -> (AxisTicks, AxisTicks) {
    let x_step = tick_step(x_scale, config.tick_spacing_px);
    let y_step = tick_step(y_scale, config.tick_spacing_px);
    let (x_grid, y_grid) = grid_steps(x_step, y_step, config);
    let [x0, x1] = x_scale.domain();
    let [y0, y1] = y_scale.domain();
    (
        AxisTicks {
            tick_step: x_step,
            grid_step: x_grid,
            ticks: tick_positions(x0.min(x1), x0.max(x1), x_step),
        },
        AxisTicks {
            tick_step: y_step,
            grid_step: y_grid,
            ticks: tick_positions(y0.min(y1), y0.max(y1), y_step),
        },
    )
}
