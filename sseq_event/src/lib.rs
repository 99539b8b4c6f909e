// Copyright 2025 the Sseq Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Sseq Event: event plumbing for chart interaction.
//!
//! This crate provides small, focused pieces that the chart display composes
//! instead of inheriting from an emitter base:
//!
//! - [`bus`]: typed observer lists with explicit subscribe/unsubscribe
//! - [`hover`]: enter/leave transitions for a single hovered target
//! - [`drag`]: press tracking that tells clicks from drags
//!
//! Each piece is generic over the application's event or target type and
//! makes no assumption about how pointer input is delivered.
//!
//! ## Example
//!
//! ```rust
//! use sseq_event::bus::EventBus;
//! use sseq_event::hover::{HoverEvent, HoverState};
//!
//! #[derive(Debug)]
//! enum ChartEvent {
//!     Over(u32),
//!     Out(u32),
//! }
//!
//! let mut bus = EventBus::new();
//! bus.subscribe(|e: &ChartEvent| println!("{e:?}"));
//!
//! let mut hover = HoverState::new();
//! for t in hover.update(Some(5)) {
//!     bus.emit(&match t {
//!         HoverEvent::Enter(k) => ChartEvent::Over(k),
//!         HoverEvent::Leave(k) => ChartEvent::Out(k),
//!     });
//! }
//! ```

pub mod bus;
pub mod drag;
pub mod hover;
