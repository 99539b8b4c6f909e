// Copyright 2025 the Sseq Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Persisted undo log.
//!
//! The log stores only what is needed to rebuild history against a model
//! that is already in its latest state: every transaction keeps the `before`
//! memento of each touched object, and the matching `after` is recovered
//! from the next entry that touches the same object, or from the model.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::manager::{Transaction, UndoEntry, UndoManager, ValueChange};
use crate::memento::UndoTarget;

/// One persisted undo step.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LogEntry<K, M, V> {
    /// A transaction: `[key, before]` pairs in recording order.
    Normal {
        /// Touched objects with their state before the transaction.
        mutations: Vec<(K, M)>,
    },
    /// A single property change.
    Value {
        /// Object identity.
        key: K,
        /// Property name.
        prop: String,
        /// Value before the change.
        before: V,
        /// Value after the change.
        after: V,
    },
}

/// A log entry for the manager of target `T`.
pub type UndoLogEntry<T> =
    LogEntry<<T as UndoTarget>::Key, <T as UndoTarget>::Memento, <T as UndoTarget>::Value>;

impl<T: UndoTarget> UndoManager<T> {
    /// Serializable view of the undo stack, oldest first.
    ///
    /// The redo stack and value-change hooks are not persisted.
    #[must_use]
    pub fn to_log(&self) -> Vec<UndoLogEntry<T>> {
        self.undo_stack
            .iter()
            .map(|entry| match entry {
                UndoEntry::Transaction(tx) => LogEntry::Normal {
                    mutations: tx
                        .mutations()
                        .iter()
                        .map(|m| (m.key.clone(), m.before.clone()))
                        .collect(),
                },
                UndoEntry::Value(change) => LogEntry::Value {
                    key: change.key.clone(),
                    prop: change.prop.clone(),
                    before: change.before.clone(),
                    after: change.after.clone(),
                },
            })
            .collect()
    }

    /// Rebuilds an undo stack from a log, given the model in its latest state.
    #[must_use]
    pub fn from_log(entries: Vec<UndoLogEntry<T>>, target: &T) -> Self {
        let mut manager = Self::new();
        let mut stack = Vec::with_capacity(entries.len());
        // Walk newest to oldest so `after` is the next-newer `before` of the key.
        let mut later: HashMap<T::Key, T::Memento> = HashMap::new();
        for entry in entries.into_iter().rev() {
            match entry {
                LogEntry::Normal { mutations } => {
                    let mut tx = Transaction::new();
                    for (key, before) in mutations {
                        let after = later
                            .get(&key)
                            .cloned()
                            .unwrap_or_else(|| target.capture(&key));
                        later.insert(key.clone(), before.clone());
                        tx.record(key, before, after);
                    }
                    stack.push(UndoEntry::Transaction(tx));
                }
                LogEntry::Value {
                    key,
                    prop,
                    before,
                    after,
                } => stack.push(UndoEntry::Value(ValueChange {
                    key,
                    prop,
                    before,
                    after,
                    on_apply: None,
                })),
            }
        }
        stack.reverse();
        tracing::debug!(entries = stack.len(), "undo history restored from log");
        manager.undo_stack = stack;
        manager
    }
}
