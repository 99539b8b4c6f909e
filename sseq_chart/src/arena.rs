// Copyright 2025 the Sseq Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Slot arenas for chart elements.
//!
//! Elements refer to each other by id rather than by reference. Slots are
//! never reused: deleting an element leaves a hole, so a stale id is always
//! detected as an empty slot instead of aliasing a newer element.

use core::fmt;
use core::marker::PhantomData;

use serde::{Deserialize, Serialize};

/// A typed slot index.
pub trait ArenaId: Copy + fmt::Debug {
    /// Builds the id naming `slot`.
    fn from_slot(slot: u32) -> Self;
    /// The slot this id names.
    fn slot(self) -> usize;
}

macro_rules! arena_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u32);

        impl ArenaId for $name {
            fn from_slot(slot: u32) -> Self {
                Self(slot)
            }

            fn slot(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "{}"), self.0)
            }
        }
    };
}

arena_id!(
    /// Identifier of a [`Class`](crate::Class) in a chart.
    ClassId,
    "class#"
);
arena_id!(
    /// Identifier of an [`Edge`](crate::Edge) in a chart.
    EdgeId,
    "edge#"
);

/// Append-only storage addressed by typed ids.
///
/// Serializes as a plain list with `null` holes, so ids are list positions.
#[derive(Clone, Serialize, Deserialize)]
#[serde(
    transparent,
    bound(serialize = "T: Serialize", deserialize = "T: Deserialize<'de>")
)]
pub struct Arena<I, T> {
    slots: Vec<Option<T>>,
    #[serde(skip)]
    _id: PhantomData<fn() -> I>,
}

impl<I, T: fmt::Debug> fmt::Debug for Arena<I, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Arena")
            .field("slots", &self.slots)
            .finish_non_exhaustive()
    }
}

/// Arenas are equal when the same ids hold equal elements; trailing holes
/// are ignored.
impl<I: ArenaId + PartialEq, T: PartialEq> PartialEq for Arena<I, T> {
    fn eq(&self, other: &Self) -> bool {
        self.iter().eq(other.iter())
    }
}

impl<I, T> Default for Arena<I, T> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            _id: PhantomData,
        }
    }
}

impl<I: ArenaId, T> Arena<I, T> {
    /// Creates an empty arena.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The id the next [`Arena::insert`] will return.
    #[must_use]
    pub fn next_id(&self) -> I {
        I::from_slot(slot_u32(self.slots.len()))
    }

    /// Stores `value` in a fresh slot.
    pub fn insert(&mut self, value: T) -> I {
        let id = self.next_id();
        self.slots.push(Some(value));
        id
    }

    /// Puts `value` (or a hole) at `id`, growing the arena if needed.
    ///
    /// Used to restore elements from history.
    pub fn put(&mut self, id: I, value: Option<T>) {
        let slot = id.slot();
        if slot >= self.slots.len() {
            if value.is_none() {
                return;
            }
            self.slots.resize_with(slot + 1, || None);
        }
        self.slots[slot] = value;
    }

    /// The element at `id`, if alive.
    #[must_use]
    pub fn get(&self, id: I) -> Option<&T> {
        self.slots.get(id.slot()).and_then(Option::as_ref)
    }

    /// Mutable access to the element at `id`, if alive.
    pub fn get_mut(&mut self, id: I) -> Option<&mut T> {
        self.slots.get_mut(id.slot()).and_then(Option::as_mut)
    }

    /// Whether `id` names a live element.
    #[must_use]
    pub fn contains(&self, id: I) -> bool {
        self.get(id).is_some()
    }

    /// Removes and returns the element at `id`.
    pub fn remove(&mut self, id: I) -> Option<T> {
        self.slots.get_mut(id.slot()).and_then(Option::take)
    }

    /// Live elements in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (I, &T)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.as_ref().map(|v| (I::from_slot(slot_u32(i)), v)))
    }

    /// Mutable live elements in slot order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (I, &mut T)> {
        self.slots
            .iter_mut()
            .enumerate()
            .filter_map(|(i, s)| s.as_mut().map(|v| (I::from_slot(slot_u32(i)), v)))
    }

    /// Number of live elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Whether no element is alive.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }
}

#[allow(
    clippy::cast_possible_truncation,
    reason = "charts never hold more than u32::MAX elements"
)]
fn slot_u32(slot: usize) -> u32 {
    slot as u32
}

#[cfg(test)]
mod tests {
    use super::{Arena, ClassId};

    #[test]
    fn slots_are_not_reused() {
        let mut a: Arena<ClassId, &str> = Arena::new();
        let x = a.insert("x");
        assert_eq!(a.remove(x), Some("x"));
        let y = a.insert("y");
        assert_ne!(x, y);
        assert!(a.get(x).is_none());
        assert_eq!(a.len(), 1);
    }

    #[test]
    fn put_restores_a_hole() {
        let mut a: Arena<ClassId, u8> = Arena::new();
        let id = a.insert(1);
        a.remove(id);
        a.put(id, Some(2));
        assert_eq!(a.get(id), Some(&2));
        a.put(ClassId(5), Some(9));
        assert_eq!(a.next_id(), ClassId(6));
        assert_eq!(a.iter().map(|(i, _)| i).collect::<Vec<_>>(), [id, ClassId(5)]);
    }

    #[test]
    fn serializes_as_list_with_holes() {
        let mut a: Arena<ClassId, u8> = Arena::new();
        let id = a.insert(1);
        a.insert(2);
        a.remove(id);
        assert_eq!(serde_json::to_string(&a).unwrap(), "[null,2]");
        let back: Arena<ClassId, u8> = serde_json::from_str("[null,2]").unwrap();
        assert_eq!(back, a);
    }
}
