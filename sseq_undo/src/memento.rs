// Copyright 2025 the Sseq Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::fmt::Debug;
use core::hash::Hash;

/// An entity that can snapshot and restore its own state.
///
/// `restore_from_memento(&memento())` must leave the entity observably
/// unchanged. Entities carrying derived, per-frame data restore only the
/// persistent part and drop the derived part.
pub trait Mementoable {
    /// Snapshot type.
    type Memento: Clone + Debug;

    /// Captures the current state.
    fn memento(&self) -> Self::Memento;

    /// Overwrites the state with `memento`.
    fn restore_from_memento(&mut self, memento: &Self::Memento);
}

/// Marker for plain data records whose memento is a full clone.
///
/// Records implementing this get a field-copy [`Mementoable`] impl for free.
pub trait PlainRecord: Clone + Debug {}

impl<T: PlainRecord> Mementoable for T {
    type Memento = T;

    fn memento(&self) -> T {
        self.clone()
    }

    fn restore_from_memento(&mut self, memento: &T) {
        self.clone_from(memento);
    }
}

/// A model that the undo manager can capture and restore by key.
///
/// Keys name objects inside the model. Whether an object can be absent is up
/// to the model: models whose objects are created and deleted usually use an
/// `Option` memento, so that restoring `None` deletes the object.
pub trait UndoTarget {
    /// Identity of a mutable object in the model.
    type Key: Clone + Eq + Hash + Debug;
    /// Captured state of one object.
    type Memento: Clone + Debug;
    /// Value of a single scalar property.
    type Value: Clone + Debug;

    /// Captures the object named by `key`.
    fn capture(&self, key: &Self::Key) -> Self::Memento;

    /// Restores the object named by `key`.
    fn restore(&mut self, key: &Self::Key, memento: &Self::Memento);

    /// Sets one scalar property of the object named by `key`.
    fn set_value(&mut self, key: &Self::Key, prop: &str, value: &Self::Value);
}

#[cfg(test)]
mod tests {
    use super::{Mementoable, PlainRecord};

    #[derive(Clone, Debug, PartialEq)]
    struct Label {
        text: String,
        size: f64,
    }

    impl PlainRecord for Label {}

    #[test]
    fn plain_records_restore_by_field_copy() {
        let mut label = Label {
            text: "h0".into(),
            size: 1.0,
        };
        let saved = label.memento();
        label.text.push_str("^2");
        label.size = 3.0;
        label.restore_from_memento(&saved);
        assert_eq!(
            label,
            Label {
                text: "h0".into(),
                size: 1.0
            }
        );
    }
}
