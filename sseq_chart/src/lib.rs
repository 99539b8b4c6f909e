// Copyright 2025 the Sseq Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Sseq Chart: the data model behind a spectral sequence chart.
//!
//! A [`Chart`] holds integer-grid [`Class`]es, [`Edge`]s between them, and the
//! chart-wide [`ChartSettings`] (page list, clamp ranges, grid style, ...).
//! Classes and edges live in append-only [`Arena`]s and refer to each other
//! by [`ClassId`]; an edge never owns its endpoints.
//!
//! - Snapshots load and save as JSON ([`Chart::from_json_str`]).
//! - [`Chart::elements_to_draw`] culls the chart for one frame.
//! - [`ChartCommand`] decodes remote edit envelopes; [`Chart::apply`] runs
//!   them, and [`apply_with_history`] runs them as one undo step.
//! - [`PageState`] is the current-page cursor over the page list.
//!
//! ## Minimal example
//!
//! ```rust
//! use sseq_chart::{Chart, ChartCommand, ChartHistory, PageRange, apply_with_history};
//!
//! let mut chart = Chart::new();
//! let mut history = ChartHistory::new();
//!
//! let cmd = ChartCommand::from_json_str(
//!     r#"{"cmd": ["chart", "class", "add"], "args": [{"x": 1, "y": 0}]}"#,
//! )
//! .unwrap();
//! apply_with_history(&mut chart, &mut history, cmd).unwrap();
//!
//! let visible = chart.elements_to_draw(PageRange::Page(2), 0, 10, 0, 10);
//! assert_eq!(visible.classes.len(), 1);
//!
//! history.undo(&mut chart);
//! assert!(chart.classes().is_empty());
//! ```

mod arena;
mod chart;
mod command;
mod element;
mod error;
mod history;
mod page;

pub use arena::{Arena, ArenaId, ClassId, EdgeId};
pub use chart::{Chart, ChartSettings, ElementKey, ElementMemento, ElementsToDraw};
pub use command::{ChartCommand, Envelope};
pub use element::{
    BLACK, Class, ClassCanvas, Edge, EdgeFlags, EdgeKind, Overlay, OverlaySource,
};
pub use error::{ChartError, CommandError};
pub use history::{ChartHistory, apply_with_history};
pub use page::{
    INFINITY, PageRange, PageState, PageView, base_page, describe_page_range, normalize_page_list,
};
