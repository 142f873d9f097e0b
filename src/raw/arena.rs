use alloc::vec::Vec;

use super::handle::Handle;
use crate::error::{Error, Result};

/// Append-only node storage addressed by [`Handle`].
///
/// Neither collection removes single nodes, so there is no free list: a handle stays
/// valid until [`clear`](Arena::clear), which drops every node in one pass.
#[derive(Clone)]
pub(crate) struct Arena<T> {
    slots: Vec<T>,
}

impl<T> Arena<T> {
    pub(crate) const fn new() -> Self {
        Self { slots: Vec::new() }
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity.min(Handle::MAX + 1)),
        }
    }

    pub(crate) fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    pub(crate) const fn len(&self) -> usize {
        self.slots.len()
    }

    pub(crate) const fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Stores `element` and returns its handle.
    ///
    /// Fails without touching the arena if the handle space is exhausted or the
    /// backing vector cannot grow.
    pub(crate) fn try_alloc(&mut self, element: T) -> Result<Handle> {
        let handle =
            Handle::try_from_index(self.slots.len()).ok_or(Error::CapacityExceeded { max: Handle::MAX + 1 })?;
        self.slots.try_reserve(1).map_err(|_| Error::OutOfMemory)?;
        self.slots.push(element);
        Ok(handle)
    }

    #[inline]
    pub(crate) fn get(&self, handle: Handle) -> &T {
        &self.slots[handle.to_index()]
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, handle: Handle) -> &mut T {
        &mut self.slots[handle.to_index()]
    }

    /// Like [`get`](Arena::get), but tolerates handles from outside this arena.
    #[inline]
    pub(crate) fn try_get(&self, handle: Handle) -> Option<&T> {
        self.slots.get(handle.to_index())
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
    }
}
