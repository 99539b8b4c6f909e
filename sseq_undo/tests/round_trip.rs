// Copyright 2025 the Sseq Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! History round-trip properties of `UndoManager`.
//!
//! A small keyed store stands in for a chart: objects are created, edited
//! and deleted inside transactions, then history is walked back and forth.

use std::collections::BTreeMap;

use proptest::prelude::*;
use sseq_undo::{UndoManager, UndoTarget};

#[derive(Clone, Debug, Default, PartialEq)]
struct Store(BTreeMap<u8, (i32, String)>);

impl UndoTarget for Store {
    type Key = u8;
    type Memento = Option<(i32, String)>;
    type Value = i32;

    fn capture(&self, key: &u8) -> Self::Memento {
        self.0.get(key).cloned()
    }

    fn restore(&mut self, key: &u8, memento: &Self::Memento) {
        match memento {
            Some(v) => {
                self.0.insert(*key, v.clone());
            }
            None => {
                self.0.remove(key);
            }
        }
    }

    fn set_value(&mut self, key: &u8, _prop: &str, value: &i32) {
        if let Some(entry) = self.0.get_mut(key) {
            entry.0 = *value;
        }
    }
}

#[derive(Clone, Debug)]
enum Op {
    Put(u8, i32),
    Rename(u8, String),
    Delete(u8),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0u8..6, -50i32..50).prop_map(|(k, v)| Op::Put(k, v)),
        (0u8..6, "[a-z]{1,4}").prop_map(|(k, s)| Op::Rename(k, s)),
        (0u8..6).prop_map(Op::Delete),
    ]
}

fn apply(store: &mut Store, op: &Op) {
    match op {
        Op::Put(k, v) => {
            store.0.entry(*k).or_insert_with(|| (0, String::new())).0 = *v;
        }
        Op::Rename(k, s) => {
            if let Some(e) = store.0.get_mut(k) {
                e.1 = s.clone();
            }
        }
        Op::Delete(k) => {
            store.0.remove(k);
        }
    }
}

fn key_of(op: &Op) -> u8 {
    match op {
        Op::Put(k, _) | Op::Rename(k, _) | Op::Delete(k) => *k,
    }
}

proptest! {
    /// N transactions, N undos, N redos reproduce the post-transaction state.
    #[test]
    fn prop_undo_all_then_redo_all_round_trips(
        txs in prop::collection::vec(prop::collection::vec(op_strategy(), 1..5), 1..12)
    ) {
        let mut store = Store::default();
        let initial = store.clone();
        let mut undo = UndoManager::<Store>::new();

        for tx in &txs {
            undo.begin_transaction();
            for op in tx {
                undo.capture(&mut store, key_of(op), |s| apply(s, op));
            }
            undo.commit_transaction();
        }
        let after = store.clone();

        while undo.undo(&mut store) {}
        prop_assert_eq!(&store, &initial);
        while undo.redo(&mut store) {}
        prop_assert_eq!(&store, &after);
    }

    /// Undo immediately followed by redo is the identity.
    #[test]
    fn prop_undo_then_redo_is_identity(
        txs in prop::collection::vec(prop::collection::vec(op_strategy(), 1..4), 1..8),
        back in 0usize..8,
    ) {
        let mut store = Store::default();
        let mut undo = UndoManager::<Store>::new();
        for tx in &txs {
            undo.begin_transaction();
            for op in tx {
                undo.capture(&mut store, key_of(op), |s| apply(s, op));
            }
            undo.commit_transaction();
        }
        for _ in 0..back {
            undo.undo(&mut store);
        }
        let snapshot = store.clone();
        if undo.undo(&mut store) {
            prop_assert!(undo.redo(&mut store));
        }
        prop_assert_eq!(&store, &snapshot);
    }
}

#[test]
fn collapsed_transaction_keeps_first_before_and_last_after() {
    let mut store = Store::default();
    let mut undo = UndoManager::<Store>::new();
    store.0.insert(1, (1, "a".into()));

    undo.begin_transaction();
    undo.capture(&mut store, 1, |s| apply(s, &Op::Put(1, 2)));
    undo.capture(&mut store, 1, |s| apply(s, &Op::Rename(1, "b".into())));
    let tx = undo.pending().cloned();
    undo.commit_transaction();

    let tx = tx.expect("transaction was open");
    assert_eq!(tx.len(), 1);
    let m = &tx.mutations()[0];
    assert_eq!(m.before, Some((1, "a".to_string())));
    assert_eq!(m.after, Some((2, "b".to_string())));
    assert_eq!(undo.undo_len(), 1);
}

#[test]
fn value_changes_interleave_with_transactions() {
    let mut store = Store::default();
    let mut undo = UndoManager::<Store>::new();
    undo.capture(&mut store, 3, |s| apply(s, &Op::Put(3, 10)));
    if let Some(e) = store.0.get_mut(&3) {
        e.0 = 11;
    }
    undo.record_value_change(3, "value", 10, 11, None);

    undo.undo(&mut store);
    assert_eq!(store.0[&3].0, 10);
    undo.undo(&mut store);
    assert!(store.0.is_empty());
    undo.redo(&mut store);
    undo.redo(&mut store);
    assert_eq!(store.0[&3].0, 11);
}
