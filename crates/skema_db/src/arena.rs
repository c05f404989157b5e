//! Arena storage for database entities.
//!
//! Every entity in the database (library, cell, cell-view, instance, design
//! unit) lives in a typed [`Arena`] and is referred to by an opaque handle.
//! Parent and child links are plain handles, which sidesteps the reference
//! cycles a pointer-based tree would create.
//!
//! Arenas are append-only: removing an entity from the database detaches it
//! from every index but leaves its slot allocated, so handles held by
//! observers never dangle.

use serde::{Deserialize, Serialize};
use std::marker::PhantomData;
use std::ops::{Index, IndexMut};

/// Trait for opaque handle types used as arena keys.
pub trait ArenaId: Copy {
    /// Creates a handle from a raw `u32` slot index.
    fn from_raw(index: u32) -> Self;

    /// Returns the raw `u32` slot index.
    fn as_raw(self) -> u32;
}

/// A dense, handle-indexed container for one kind of database entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Arena<I: ArenaId, T> {
    items: Vec<T>,
    #[serde(skip)]
    _marker: PhantomData<I>,
}

impl<I: ArenaId, T> Default for Arena<I, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: ArenaId, T> Arena<I, T> {
    /// Creates a new, empty arena.
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            _marker: PhantomData,
        }
    }

    /// Allocates a slot for `item` and returns its handle.
    pub fn alloc(&mut self, item: T) -> I {
        let id = I::from_raw(self.items.len() as u32);
        self.items.push(item);
        id
    }

    /// Returns a reference to the entity behind `id`.
    ///
    /// # Panics
    ///
    /// Panics if the handle was not produced by this arena.
    pub fn get(&self, id: I) -> &T {
        &self.items[id.as_raw() as usize]
    }

    /// Returns a mutable reference to the entity behind `id`.
    ///
    /// # Panics
    ///
    /// Panics if the handle was not produced by this arena.
    pub fn get_mut(&mut self, id: I) -> &mut T {
        &mut self.items[id.as_raw() as usize]
    }

    /// Returns the number of slots ever allocated (detached ones included).
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if nothing has been allocated yet.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterates over `(handle, &entity)` pairs in allocation order.
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
        self.get(id)
    }
}

impl<I: ArenaId, T> IndexMut<I> for Arena<I, T> {
    fn index_mut(&mut self, id: I) -> &mut T {
        self.get_mut(id)
    }
}
