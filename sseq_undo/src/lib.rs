// Copyright 2025 the Sseq Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Sseq Undo: memento-based undo/redo.
//!
//! This crate focuses on the _bookkeeping_ of reversible edits. It does not
//! know what a model looks like; the model implements [`UndoTarget`] to
//! capture and restore objects by key, and the [`UndoManager`] records
//! before/after pairs grouped into atomic transactions.
//!
//! - Recording the same object twice in one transaction collapses to one
//!   pair holding the first `before` and the last `after`.
//! - Committing pushes the transaction as one undo step and clears redo.
//! - Single property changes can bypass transactions with
//!   [`UndoManager::record_value_change`].
//! - Undo and redo on an empty stack do nothing.
//! - The undo stack can be persisted with [`UndoManager::to_log`] and
//!   rebuilt with [`UndoManager::from_log`].
//!
//! Entities with their own notion of state implement [`Mementoable`];
//! plain data records just implement the [`PlainRecord`] marker and are
//! snapshotted by clone.
//!
//! ## Minimal example
//!
//! ```rust
//! use std::collections::HashMap;
//! use sseq_undo::{UndoManager, UndoTarget};
//!
//! #[derive(Default)]
//! struct Sizes(HashMap<u32, f64>);
//!
//! impl UndoTarget for Sizes {
//!     type Key = u32;
//!     type Memento = Option<f64>;
//!     type Value = f64;
//!
//!     fn capture(&self, key: &u32) -> Option<f64> {
//!         self.0.get(key).copied()
//!     }
//!     fn restore(&mut self, key: &u32, memento: &Option<f64>) {
//!         match memento {
//!             Some(v) => { self.0.insert(*key, *v); }
//!             None => { self.0.remove(key); }
//!         }
//!     }
//!     fn set_value(&mut self, key: &u32, _prop: &str, value: &f64) {
//!         self.0.insert(*key, *value);
//!     }
//! }
//!
//! let mut model = Sizes::default();
//! let mut undo = UndoManager::new();
//!
//! undo.begin_transaction();
//! undo.capture(&mut model, 1, |m| m.0.insert(1, 0.5));
//! undo.capture(&mut model, 1, |m| m.0.insert(1, 2.0));
//! undo.commit_transaction();
//!
//! assert!(undo.undo(&mut model));
//! assert!(model.0.is_empty());
//! assert!(undo.redo(&mut model));
//! assert_eq!(model.0[&1], 2.0);
//! ```

mod log;
mod manager;
mod memento;

pub use log::{LogEntry, UndoLogEntry};
pub use manager::{
    ApplyHook, HistoryStep, Mutation, Transaction, UndoEntry, UndoEvent, UndoManager, ValueChange,
};
pub use memento::{Mementoable, PlainRecord, UndoTarget};
