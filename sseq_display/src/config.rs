// Copyright 2025 the Sseq Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Display configuration.

use serde::{Deserialize, Serialize};
use sseq_view::Margins;
use thiserror::Error;

/// Errors from loading or validating a [`DisplayConfig`].
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration is not valid JSON for [`DisplayConfig`].
    #[error("failed to parse display config: {0}")]
    Json(#[from] serde_json::Error),
    /// A field holds a value the display cannot work with.
    #[error("invalid display config: {field} {reason}")]
    Invalid {
        /// Offending field.
        field: &'static str,
        /// What is wrong with it.
        reason: &'static str,
    },
}

/// Pixel margins around the plot area, in serializable form.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarginConfig {
    /// Left margin.
    pub left: f64,
    /// Right margin.
    pub right: f64,
    /// Top margin.
    pub top: f64,
    /// Bottom margin.
    pub bottom: f64,
}

impl Default for MarginConfig {
    fn default() -> Self {
        let m = Margins::default();
        Self {
            left: m.left,
            right: m.right,
            top: m.top,
            bottom: m.bottom,
        }
    }
}

impl From<MarginConfig> for Margins {
    fn from(m: MarginConfig) -> Self {
        Self {
            left: m.left,
            right: m.right,
            top: m.top,
            bottom: m.bottom,
        }
    }
}

/// Tunables of the chart display.
///
/// Every field has a default, so a JSON config only needs to name what it
/// changes:
///
/// ```rust
/// use sseq_display::DisplayConfig;
///
/// let config = DisplayConfig::from_json_str(r#"{"tick_spacing_px": 90}"#).unwrap();
/// assert_eq!(config.tick_spacing_px, 90.0);
/// assert_eq!(config.seek_steps, DisplayConfig::default().seek_steps);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Space around the plot for axis labels.
    pub margins: MarginConfig,
    /// Padding in domain units around the chart ranges.
    pub domain_offset: f64,
    /// Approximate pixel distance between axis ticks.
    pub tick_spacing_px: f64,
    /// Pixel radius within which the pointer hovers a bidegree.
    pub bidegree_distance_threshold: f64,
    /// Lower clamp for the class diameter before scaling.
    pub min_class_size: f64,
    /// Upper clamp for the class diameter before scaling.
    pub max_class_size: f64,
    /// Allowed zoom factor range `[min, max]`; the minimum must be positive.
    pub zoom_extent: [f64; 2],
    /// Number of steps in a seek animation.
    pub seek_steps: u32,
    /// Milliseconds between seek steps.
    pub seek_interval_ms: u64,
    /// Fixed horizontal grid step.
    pub manual_x_grid_step: Option<i64>,
    /// Fixed vertical grid step.
    pub manual_y_grid_step: Option<i64>,
    /// Draw every grid line on both axes.
    pub square_aspect_ratio: bool,
    /// Pointer travel in pixels before a press becomes a drag.
    pub drag_slop: f64,
    /// Font size of axis labels.
    pub label_font_size: f32,
    /// Background color as RGBA8.
    pub background: [u8; 4],
    /// Grid line and chess cell color as RGBA8.
    pub grid_color: [u8; 4],
    /// Axis and tick label color as RGBA8.
    pub axis_color: [u8; 4],
    /// Highlight ring color as RGBA8.
    pub highlight_color: [u8; 4],
    /// Hovered class outline color as RGBA8.
    pub hover_color: [u8; 4],
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            margins: MarginConfig::default(),
            domain_offset: 0.5,
            tick_spacing_px: 70.0,
            bidegree_distance_threshold: 15.0,
            min_class_size: 1.0,
            max_class_size: 20.0,
            zoom_extent: [0.05, 50.0],
            seek_steps: 20,
            seek_interval_ms: 10,
            manual_x_grid_step: None,
            manual_y_grid_step: None,
            square_aspect_ratio: false,
            drag_slop: 3.0,
            label_font_size: 12.0,
            background: [255, 255, 255, 255],
            grid_color: [204, 204, 204, 255],
            axis_color: [0, 0, 0, 255],
            highlight_color: [255, 0, 0, 160],
            hover_color: [255, 0, 0, 255],
        }
    }
}

impl DisplayConfig {
    /// Parses and validates a JSON config.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the invariants the display relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |field, reason| Err(ConfigError::Invalid { field, reason });
        if self.tick_spacing_px.is_nan() || self.tick_spacing_px <= 0.0 {
            return invalid("tick_spacing_px", "must be positive");
        }
        if self.min_class_size.is_nan() || self.min_class_size > self.max_class_size {
            return invalid("min_class_size", "must not exceed max_class_size");
        }
        if self.zoom_extent[0].is_nan() || self.zoom_extent[0] <= 0.0 {
            return invalid("zoom_extent", "minimum must be positive");
        }
        if self.zoom_extent[0] > self.zoom_extent[1] {
            return invalid("zoom_extent", "must be ordered");
        }
        if self.seek_steps == 0 {
            return invalid("seek_steps", "must be at least 1");
        }
        if self.manual_x_grid_step.is_some_and(|s| s < 1) {
            return invalid("manual_x_grid_step", "must be at least 1");
        }
        if self.manual_y_grid_step.is_some_and(|s| s < 1) {
            return invalid("manual_y_grid_step", "must be at least 1");
        }
        Ok(())
    }

    /// Margins in the viewport's form.
    #[must_use]
    pub fn view_margins(&self) -> Margins {
        self.margins.into()
    }
}
