use core::fmt;
use core::iter::FusedIterator;

use alloc::vec::Vec;
use smallvec::SmallVec;

use crate::compare::{Bytewise, Comparator};
use crate::error::{Error, Result};
use crate::raw::{Handle, RawRbTree};

/// An ordered map from fixed-width byte keys to variable-length byte values, backed by a
/// [red-black tree].
///
/// Every key must be exactly [`key_size`](KeyedMap::key_size) bytes long; values may have any
/// length, and each entry's value is sized independently. Key order is defined entirely by
/// the [`Comparator`] supplied at construction.
///
/// The map supports upsert and lookup but has no single-key removal: entries
/// live until [`clear`](KeyedMap::clear) or until the map is dropped.
///
/// # Examples
///
/// ```
/// use keylist::{KeyedMap, NativeEndian};
///
/// let mut map = KeyedMap::new(4, NativeEndian::<i32>::new());
/// map.insert(&1000i32.to_ne_bytes(), b"thousand").unwrap();
/// map.insert(&50i32.to_ne_bytes(), b"fifty").unwrap();
///
/// assert_eq!(map.get(&50i32.to_ne_bytes()).unwrap(), Some(&b"fifty"[..]));
/// assert_eq!(map.get(&7i32.to_ne_bytes()).unwrap(), None);
///
/// // Inserting an existing key replaces its value and hands back the old one.
/// let old = map.insert(&50i32.to_ne_bytes(), b"FIFTY").unwrap();
/// assert_eq!(old.as_deref(), Some(&b"fifty"[..]));
/// assert_eq!(map.len(), 2);
/// ```
///
/// [red-black tree]: https://en.wikipedia.org/wiki/Red%E2%80%93black_tree
pub struct KeyedMap<C = Bytewise> {
    raw: RawRbTree,
    key_size: usize,
    comparator: C,
}

impl<C: Comparator> KeyedMap<C> {
    /// Creates an empty map for keys of exactly `key_size` bytes, ordered by `comparator`.
    #[must_use]
    pub const fn new(key_size: usize, comparator: C) -> Self {
        Self {
            raw: RawRbTree::new(),
            key_size,
            comparator,
        }
    }

    /// Creates an empty map with room for at least `capacity` entries before reallocating
    /// its node storage.
    #[must_use]
    pub fn with_capacity(key_size: usize, comparator: C, capacity: usize) -> Self {
        Self {
            raw: RawRbTree::with_capacity(capacity),
            key_size,
            comparator,
        }
    }

    /// The configured key width in bytes.
    #[must_use]
    pub const fn key_size(&self) -> usize {
        self.key_size
    }

    /// The comparator that orders the keys.
    #[must_use]
    pub const fn comparator(&self) -> &C {
        &self.comparator
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.raw.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of entries the node storage can hold without reallocating.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.raw.capacity()
    }

    fn check_key(&self, key: &[u8]) -> Result<()> {
        if key.len() == self.key_size {
            Ok(())
        } else {
            Err(Error::KeySizeMismatch {
                expected: self.key_size,
                actual: key.len(),
            })
        }
    }

    /// Inserts `value` under `key`, or replaces the value already stored there.
    ///
    /// Returns the replaced value if the key was present. Replacing a value never
    /// restructures the tree; only new keys trigger rebalancing.
    ///
    /// # Errors
    ///
    /// - [`Error::KeySizeMismatch`] if `key` is not [`key_size`](KeyedMap::key_size) bytes.
    /// - [`Error::Compare`] if the comparator rejects a key.
    /// - [`Error::OutOfMemory`] or [`Error::CapacityExceeded`] if the entry cannot be stored.
    ///
    /// On error the map is unchanged.
    pub fn insert(&mut self, key: &[u8], value: &[u8]) -> Result<Option<Vec<u8>>> {
        self.check_key(key)?;
        self.raw.upsert(&self.comparator, key, value)
    }

    /// Returns the value stored under `key`, or `None` if the key was never inserted.
    ///
    /// # Errors
    ///
    /// [`Error::KeySizeMismatch`] or [`Error::Compare`], as for [`insert`](KeyedMap::insert).
    pub fn get(&self, key: &[u8]) -> Result<Option<&[u8]>> {
        self.check_key(key)?;
        let found = self.raw.search(&self.comparator, key)?;
        Ok(found.map(|handle| self.raw.node(handle).value()))
    }

    /// Returns `true` if `key` has been inserted.
    ///
    /// # Errors
    ///
    /// [`Error::KeySizeMismatch`] or [`Error::Compare`], as for [`insert`](KeyedMap::insert).
    pub fn contains_key(&self, key: &[u8]) -> Result<bool> {
        self.check_key(key)?;
        Ok(self.raw.search(&self.comparator, key)?.is_some())
    }
}

impl<C> KeyedMap<C> {
    /// Removes every entry. The key width and comparator are kept.
    pub fn clear(&mut self) {
        tracing::debug!(len = self.raw.len(), "clearing keyed map");
        self.raw.clear();
    }

    /// Iterates over `(key, value)` pairs in ascending key order.
    pub fn iter(&self) -> Iter<'_> {
        Iter::new(&self.raw)
    }
}

impl<C> fmt::Debug for KeyedMap<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<'a, C> IntoIterator for &'a KeyedMap<C> {
    type Item = (&'a [u8], &'a [u8]);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Iter<'a> {
        self.iter()
    }
}

/// In-order iterator over a [`KeyedMap`].
///
/// This `struct` is created by [`KeyedMap::iter`]. It walks the tree with an explicit stack
/// of ancestors, so it never recurses.
#[derive(Clone)]
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Iter<'a> {
    tree: &'a RawRbTree,
    // Ancestors whose left subtree has been walked but which have not been yielded yet.
    stack: SmallVec<[Handle; 32]>,
    remaining: usize,
}

impl<'a> Iter<'a> {
    fn new(tree: &'a RawRbTree) -> Self {
        let mut iter = Self {
            tree,
            stack: SmallVec::new(),
            remaining: tree.len(),
        };
        iter.push_left_spine(tree.root());
        iter
    }

    fn push_left_spine(&mut self, mut current: Option<Handle>) {
        while let Some(handle) = current {
            self.stack.push(handle);
            current = self.tree.node(handle).left();
        }
    }
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a [u8], &'a [u8]);

    fn next(&mut self) -> Option<Self::Item> {
        let handle = self.stack.pop()?;
        let tree = self.tree;
        let node = tree.node(handle);
        self.push_left_spine(node.right());
        self.remaining -= 1;
        Some((node.key(), node.value()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Iter<'_> {}

impl FusedIterator for Iter<'_> {}
