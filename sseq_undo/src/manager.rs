// Copyright 2025 the Sseq Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::fmt;

use hashbrown::HashMap;
use sseq_event::bus::EventBus;

use crate::memento::UndoTarget;

/// Before/after pair for one object.
#[derive(Clone, Debug, PartialEq)]
pub struct Mutation<K, M> {
    /// Object identity.
    pub key: K,
    /// State before the first recorded change.
    pub before: M,
    /// State after the last recorded change.
    pub after: M,
}

/// Mutations grouped into one undo step.
///
/// Recording the same key twice keeps the first `before` and the last
/// `after`, so an object appears at most once per transaction.
#[derive(Clone, Debug)]
pub struct Transaction<K, M> {
    mutations: Vec<Mutation<K, M>>,
    index: HashMap<K, usize>,
}

impl<K, M> Default for Transaction<K, M> {
    fn default() -> Self {
        Self {
            mutations: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<K: Clone + Eq + core::hash::Hash, M> Transaction<K, M> {
    /// Creates an empty transaction.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a change of `key`, collapsing with an earlier record of the same key.
    pub fn record(&mut self, key: K, before: M, after: M) {
        if let Some(&i) = self.index.get(&key) {
            self.mutations[i].after = after;
            return;
        }
        self.index.insert(key.clone(), self.mutations.len());
        self.mutations.push(Mutation { key, before, after });
    }

    /// The pair recorded for `key`.
    #[must_use]
    pub fn get(&self, key: &K) -> Option<&Mutation<K, M>> {
        self.index.get(key).map(|&i| &self.mutations[i])
    }

    /// Mutations in first-recorded order.
    #[must_use]
    pub fn mutations(&self) -> &[Mutation<K, M>] {
        &self.mutations
    }

    /// Number of distinct objects touched.
    #[must_use]
    pub fn len(&self) -> usize {
        self.mutations.len()
    }

    /// Whether nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mutations.is_empty()
    }
}

/// Callback run with the applied value after an undo or redo of a value change.
pub type ApplyHook<V> = Box<dyn FnMut(&V)>;

/// Change of a single scalar property, recorded outside any transaction.
pub struct ValueChange<K, V> {
    /// Object identity.
    pub key: K,
    /// Property name.
    pub prop: String,
    /// Value before the change.
    pub before: V,
    /// Value after the change.
    pub after: V,
    pub(crate) on_apply: Option<ApplyHook<V>>,
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for ValueChange<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueChange")
            .field("key", &self.key)
            .field("prop", &self.prop)
            .field("before", &self.before)
            .field("after", &self.after)
            .field("on_apply", &self.on_apply.is_some())
            .finish()
    }
}

/// One step on the undo or redo stack.
#[derive(Debug)]
pub enum UndoEntry<K, M, V> {
    /// A committed transaction.
    Transaction(Transaction<K, M>),
    /// A single property change.
    Value(ValueChange<K, V>),
}

/// Direction of a history step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HistoryStep {
    /// An entry was undone.
    Undo,
    /// An entry was redone.
    Redo,
}

/// Notifications from an [`UndoManager`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UndoEvent {
    /// A new entry was pushed onto the undo stack.
    Recorded {
        /// Revision after the push.
        revision: u64,
    },
    /// The model was changed by undo or redo.
    ModelUpdated {
        /// Revision after the step.
        revision: u64,
        /// Which way history moved.
        step: HistoryStep,
    },
}

type EntryOf<T> =
    UndoEntry<<T as UndoTarget>::Key, <T as UndoTarget>::Memento, <T as UndoTarget>::Value>;

/// Undo/redo stacks over an [`UndoTarget`].
///
/// Changes are grouped into transactions: open one with
/// [`UndoManager::begin_transaction`], record mutations, then
/// [`UndoManager::commit_transaction`] pushes them as a single step. Undo
/// and redo on an empty stack are no-ops.
pub struct UndoManager<T: UndoTarget> {
    pub(crate) undo_stack: Vec<EntryOf<T>>,
    pub(crate) redo_stack: Vec<EntryOf<T>>,
    open: Option<Transaction<T::Key, T::Memento>>,
    max_depth: Option<usize>,
    revision: u64,
    events: EventBus<UndoEvent>,
}

impl<T: UndoTarget> fmt::Debug for UndoManager<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UndoManager")
            .field("undo", &self.undo_stack.len())
            .field("redo", &self.redo_stack.len())
            .field("open", &self.open.as_ref().map(Transaction::len))
            .field("max_depth", &self.max_depth)
            .field("revision", &self.revision)
            .finish_non_exhaustive()
    }
}

impl<T: UndoTarget> Default for UndoManager<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: UndoTarget> UndoManager<T> {
    /// Creates an empty manager with unbounded history.
    #[must_use]
    pub fn new() -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            open: None,
            max_depth: None,
            revision: 0,
            events: EventBus::new(),
        }
    }

    /// Creates an empty manager keeping at most `max_depth` undo steps.
    #[must_use]
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self {
            max_depth: Some(max_depth.max(1)),
            ..Self::new()
        }
    }

    /// The notification bus.
    pub fn events(&mut self) -> &mut EventBus<UndoEvent> {
        &mut self.events
    }

    /// Bumps on every push, undo and redo.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Opens a transaction. An already open transaction stays open and keeps accumulating.
    pub fn begin_transaction(&mut self) {
        if self.open.is_some() {
            tracing::debug!("begin_transaction while a transaction is open; continuing it");
            return;
        }
        self.open = Some(Transaction::new());
    }

    /// Whether a transaction is open.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    /// The open transaction.
    #[must_use]
    pub fn pending(&self) -> Option<&Transaction<T::Key, T::Memento>> {
        self.open.as_ref()
    }

    /// Records a before/after pair.
    ///
    /// Outside a transaction the pair is pushed as a transaction of its own.
    pub fn record_mutation(&mut self, key: T::Key, before: T::Memento, after: T::Memento) {
        match &mut self.open {
            Some(tx) => tx.record(key, before, after),
            None => {
                let mut tx = Transaction::new();
                tx.record(key, before, after);
                self.push(UndoEntry::Transaction(tx));
            }
        }
    }

    /// Captures `key` around `f` and records the change.
    pub fn capture<R>(
        &mut self,
        target: &mut T,
        key: T::Key,
        f: impl FnOnce(&mut T) -> R,
    ) -> R {
        let before = target.capture(&key);
        let out = f(target);
        let after = target.capture(&key);
        self.record_mutation(key, before, after);
        out
    }

    /// Closes the open transaction and pushes it. Empty transactions are dropped.
    ///
    /// Returns whether an entry was pushed.
    pub fn commit_transaction(&mut self) -> bool {
        match self.open.take() {
            Some(tx) if !tx.is_empty() => {
                self.push(UndoEntry::Transaction(tx));
                true
            }
            _ => false,
        }
    }

    /// Discards the open transaction without touching the model.
    pub fn abort_transaction(&mut self) -> Option<Transaction<T::Key, T::Memento>> {
        self.open.take()
    }

    /// Records a single property change as its own undo step.
    pub fn record_value_change(
        &mut self,
        key: T::Key,
        prop: impl Into<String>,
        before: T::Value,
        after: T::Value,
        on_apply: Option<ApplyHook<T::Value>>,
    ) {
        self.push(UndoEntry::Value(ValueChange {
            key,
            prop: prop.into(),
            before,
            after,
            on_apply,
        }));
    }

    /// Whether [`UndoManager::undo`] would do anything.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty() || self.open.as_ref().is_some_and(|t| !t.is_empty())
    }

    /// Whether [`UndoManager::redo`] would do anything.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Number of undo steps.
    #[must_use]
    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    /// Number of redo steps.
    #[must_use]
    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    /// Drops all history and any open transaction.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.open = None;
    }

    /// Restores the most recent step's `before` state. Returns `false` on an empty stack.
    ///
    /// An open transaction is committed first.
    pub fn undo(&mut self, target: &mut T) -> bool {
        self.commit_transaction();
        let Some(mut entry) = self.undo_stack.pop() else {
            return false;
        };
        match &mut entry {
            UndoEntry::Transaction(tx) => {
                for m in tx.mutations.iter().rev() {
                    target.restore(&m.key, &m.before);
                }
            }
            UndoEntry::Value(change) => {
                target.set_value(&change.key, &change.prop, &change.before);
                if let Some(hook) = &mut change.on_apply {
                    hook(&change.before);
                }
            }
        }
        self.redo_stack.push(entry);
        self.updated(HistoryStep::Undo);
        true
    }

    /// Re-applies the most recently undone step. Returns `false` on an empty stack.
    pub fn redo(&mut self, target: &mut T) -> bool {
        let Some(mut entry) = self.redo_stack.pop() else {
            return false;
        };
        match &mut entry {
            UndoEntry::Transaction(tx) => {
                for m in &tx.mutations {
                    target.restore(&m.key, &m.after);
                }
            }
            UndoEntry::Value(change) => {
                target.set_value(&change.key, &change.prop, &change.after);
                if let Some(hook) = &mut change.on_apply {
                    hook(&change.after);
                }
            }
        }
        self.undo_stack.push(entry);
        self.updated(HistoryStep::Redo);
        true
    }

    pub(crate) fn push(&mut self, entry: EntryOf<T>) {
        if let Some(max) = self.max_depth {
            while self.undo_stack.len() >= max {
                self.undo_stack.remove(0);
            }
        }
        self.undo_stack.push(entry);
        self.redo_stack.clear();
        self.revision += 1;
        self.events.emit(&UndoEvent::Recorded {
            revision: self.revision,
        });
    }

    fn updated(&mut self, step: HistoryStep) {
        self.revision += 1;
        tracing::debug!(revision = self.revision, ?step, "undo history moved");
        self.events.emit(&UndoEvent::ModelUpdated {
            revision: self.revision,
            step,
        });
    }
}
