//! Append-only storage for value nodes and arrays.
//!
//! Entries are never removed or reordered, so an id stays valid for as long
//! as its [`ValueDb`](crate::db::ValueDb) lives and ids order by creation.

use std::marker::PhantomData;
use std::ops::{Index, IndexMut};

/// Id types that address an [`Arena`].
pub trait ArenaId: Copy {
    /// The id of the entry at `index`.
    fn from_raw(index: u32) -> Self;

    /// The entry index this id names.
    fn as_raw(self) -> u32;
}

/// Entries of type `T` addressed by ids of type `I`.
pub struct Arena<I, T> {
    items: Vec<T>,
    _id: PhantomData<fn() -> I>,
}

impl<I: ArenaId, T> Arena<I, T> {
    /// Creates an empty arena.
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            _id: PhantomData,
        }
    }

    /// Stores `item`; the returned id is one past the previous one.
    pub fn alloc(&mut self, item: T) -> I {
        let id = I::from_raw(self.items.len() as u32);
        self.items.push(item);
        id
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if nothing was stored yet.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Entries with their ids, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = (I, &T)> {
        self.items
            .iter()
            .enumerate()
            .map(|(i, item)| (I::from_raw(i as u32), item))
    }
}

impl<I: ArenaId, T> Index<I> for Arena<I, T> {
    type Output = T;

    fn index(&self, id: I) -> &T {
        &self.items[id.as_raw() as usize]
    }
}

impl<I: ArenaId, T> IndexMut<I> for Arena<I, T> {
    fn index_mut(&mut self, id: I) -> &mut T {
        &mut self.items[id.as_raw() as usize]
    }
}
