//! Dispatch table from native window handles to application window objects.

use core::mem::size_of;

use crate::compare::NativeEndian;
use crate::error::{Error, Result};
use crate::keyed_map::KeyedMap;

const WORD: usize = size_of::<usize>();

/// Maps opaque handle values to pointer-sized payloads (typically the address of the object
/// that owns the window).
///
/// A window is registered once, when it is created, and looked up on every message it
/// receives. Registrations are never withdrawn individually; [`clear`](HandleRegistry::clear)
/// drops them all.
///
/// ```
/// use keylist::HandleRegistry;
///
/// let mut windows = HandleRegistry::new();
/// windows.register(0x0004_01A2, 0x7ff6_1000).unwrap();
/// assert_eq!(windows.lookup(0x0004_01A2).unwrap(), Some(0x7ff6_1000));
/// assert_eq!(windows.lookup(0x0004_01A4).unwrap(), None);
/// ```
#[derive(Debug)]
pub struct HandleRegistry {
    map: KeyedMap<NativeEndian<usize>>,
}

impl HandleRegistry {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            map: KeyedMap::new(WORD, NativeEndian::new()),
        }
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.map.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Associates `object` with `handle`, returning the object previously registered for it.
    ///
    /// # Errors
    ///
    /// [`Error::OutOfMemory`](crate::Error::OutOfMemory) or
    /// [`Error::CapacityExceeded`](crate::Error::CapacityExceeded); the registry is unchanged.
    pub fn register(&mut self, handle: usize, object: usize) -> Result<Option<usize>> {
        let previous = self.map.insert(&handle.to_ne_bytes(), &object.to_ne_bytes())?;
        tracing::trace!(handle, replaced = previous.is_some(), "registered window handle");
        previous.as_deref().map(decode).transpose()
    }

    /// The object registered for `handle`, if any.
    ///
    /// # Errors
    ///
    /// [`Error::ValueSizeMismatch`](crate::Error::ValueSizeMismatch) if the stored object is not
    /// pointer-sized, which `register` never produces.
    pub fn lookup(&self, handle: usize) -> Result<Option<usize>> {
        self.map.get(&handle.to_ne_bytes())?.map(decode).transpose()
    }

    pub fn clear(&mut self) {
        self.map.clear();
    }
}

impl Default for HandleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn decode(bytes: &[u8]) -> Result<usize> {
    let word: [u8; WORD] = bytes.try_into().map_err(|_| Error::ValueSizeMismatch {
        expected: WORD,
        actual: bytes.len(),
    })?;
    Ok(usize::from_ne_bytes(word))
}
