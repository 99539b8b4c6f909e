// Copyright 2025 the Sseq Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Sseq Display: an interactive spectral sequence chart display.
//!
//! [`Display`] ties the workspace together. It owns a [`Chart`] and its undo
//! history, a page cursor, a pan/zoom viewport and the hover/drag state,
//! paints frames into a host [`Surface`], and reports what happens on an
//! [`EventBus`] of [`DisplayEvent`]s.
//!
//! - [`pipeline`] lays out and paints one frame.
//! - [`hit`] resolves the pointer to a class and a bidegree.
//! - [`ticks`] derives axis ticks and grid steps from the live scales.
//! - [`FrameScheduler`] is the host's frame-callback and timer hook; batched
//!   redraw requests are coalesced into one paint per frame.
//!
//! ## Minimal example
//!
//! ```rust
//! use kurbo::Point;
//! use sseq_chart::Chart;
//! use sseq_display::{Display, DisplayConfig, DisplayEvent, ManualScheduler};
//! use sseq_imaging::RecordingSurface;
//!
//! let chart = Chart::from_json_str(r#"{"classes": [{"x": 1, "y": 1}]}"#).unwrap();
//! let mut display = Display::new(
//!     chart,
//!     DisplayConfig::default(),
//!     RecordingSurface::default(),
//!     ManualScheduler::new(),
//! )
//! .unwrap();
//! display.events().subscribe(|e: &DisplayEvent| {
//!     if let DisplayEvent::MouseoverClass(id) = e {
//!         println!("over {id}");
//!     }
//! });
//! display.initialize(800.0, 600.0).unwrap();
//!
//! // Hovering the class redraws at once.
//! let center = display.viewport().to_pixel(Point::new(1.0, 1.0));
//! display.pointer_move(center).unwrap();
//! assert!(display.hovered_class().is_some());
//!
//! // Edits are batched into the next frame callback.
//! display
//!     .apply_message(r#"{"cmd": ["chart", "class", "add"], "args": [{"x": 2, "y": 0}]}"#)
//!     .unwrap();
//! assert!(display.on_animation_frame().unwrap());
//! assert!(display.export_svg().unwrap().contains("<circle"));
//! ```
//!
//! [`Chart`]: sseq_chart::Chart
//! [`Surface`]: sseq_imaging::Surface
//! [`EventBus`]: sseq_event::bus::EventBus

mod config;
mod display;
mod event;
pub mod hit;
pub mod pipeline;
mod schedule;
pub mod ticks;

pub use config::{ConfigError, DisplayConfig, MarginConfig};
pub use display::{Display, domain_config};
pub use event::{ClickEvent, DisplayEvent, FrameInfo};
pub use pipeline::{GridStyle, RenderError};
pub use schedule::{FrameScheduler, ManualScheduler, RedrawQueue};
