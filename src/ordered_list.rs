use core::cmp::Ordering;
use core::fmt;
use core::iter::FusedIterator;

use alloc::vec::Vec;

use crate::compare::{Bytewise, Comparator, CompareError};
use crate::error::{Error, Result};
use crate::raw::{Arena, Handle, copy_bytes};

struct Link {
    value: Vec<u8>,
    next: Option<Handle>,
    prev: Option<Handle>,
}

/// A position in an [`OrderedList`], returned by [`push_front`](OrderedList::push_front) and
/// [`push_back`](OrderedList::push_back).
///
/// A cursor names a node, not a payload: after [`sort`](OrderedList::sort) the node may hold a
/// different value. Cursors issued before [`clear`](OrderedList::clear) no longer resolve.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct Cursor {
    handle: Handle,
    epoch: u32,
}

/// A doubly linked list of owned byte buffers with an optional [`Comparator`].
///
/// Every push copies its payload into a buffer owned by the list. The comparator is only
/// needed for [`sort`](OrderedList::sort) and [`find`](OrderedList::find).
///
/// # Examples
///
/// ```
/// use keylist::{Bytewise, OrderedList};
///
/// let mut list = OrderedList::with_comparator(Bytewise);
/// list.push_front(b"banana").unwrap();
/// let cherry = list.push_front(b"cherry").unwrap();
/// list.push_back(b"apple").unwrap();
///
/// assert_eq!(list.get(cherry), Some(&b"cherry"[..]));
///
/// list.sort().unwrap();
/// let sorted: Vec<&[u8]> = list.iter().collect();
/// assert_eq!(sorted, [&b"apple"[..], b"banana", b"cherry"]);
/// ```
pub struct OrderedList<C = Bytewise> {
    nodes: Arena<Link>,
    begin: Option<Handle>,
    end: Option<Handle>,
    comparator: Option<C>,
    // Bumped by `clear` so stale cursors stop resolving.
    epoch: u32,
}

impl OrderedList {
    /// Creates an empty list without a comparator. [`sort`](OrderedList::sort) on such a list
    /// fails with [`Error::MissingComparator`].
    #[must_use]
    pub const fn new() -> Self {
        Self::from_parts(Arena::new(), None)
    }
}

impl Default for OrderedList {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> OrderedList<C> {
    const fn from_parts(nodes: Arena<Link>, comparator: Option<C>) -> Self {
        Self {
            nodes,
            begin: None,
            end: None,
            comparator,
            epoch: 0,
        }
    }

    /// Creates an empty list ordered by `comparator`.
    #[must_use]
    pub const fn with_comparator(comparator: C) -> Self {
        Self::from_parts(Arena::new(), Some(comparator))
    }

    /// Creates an empty list with room for `capacity` nodes.
    #[must_use]
    pub fn with_capacity(capacity: usize, comparator: Option<C>) -> Self {
        Self::from_parts(Arena::with_capacity(capacity), comparator)
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[must_use]
    pub const fn comparator(&self) -> Option<&C> {
        self.comparator.as_ref()
    }

    const fn cursor(&self, handle: Handle) -> Cursor {
        Cursor {
            handle,
            epoch: self.epoch,
        }
    }

    fn resolve(&self, cursor: Cursor) -> Option<&Link> {
        if cursor.epoch == self.epoch { self.nodes.try_get(cursor.handle) } else { None }
    }

    /// Copies `value` into a new node at the head of the list.
    ///
    /// # Errors
    ///
    /// [`Error::OutOfMemory`] or [`Error::CapacityExceeded`]; the list is unchanged.
    pub fn push_front(&mut self, value: &[u8]) -> Result<Cursor> {
        let link = Link {
            value: copy_bytes(value)?,
            next: self.begin,
            prev: None,
        };
        let handle = self.nodes.try_alloc(link)?;
        match self.begin {
            Some(old) => self.nodes.get_mut(old).prev = Some(handle),
            None => self.end = Some(handle),
        }
        self.begin = Some(handle);
        Ok(self.cursor(handle))
    }

    /// Copies `value` into a new node at the tail of the list.
    ///
    /// # Errors
    ///
    /// [`Error::OutOfMemory`] or [`Error::CapacityExceeded`]; the list is unchanged.
    pub fn push_back(&mut self, value: &[u8]) -> Result<Cursor> {
        let link = Link {
            value: copy_bytes(value)?,
            next: None,
            prev: self.end,
        };
        let handle = self.nodes.try_alloc(link)?;
        match self.end {
            Some(old) => self.nodes.get_mut(old).next = Some(handle),
            None => self.begin = Some(handle),
        }
        self.end = Some(handle);
        Ok(self.cursor(handle))
    }

    /// Cursor to the first node.
    #[must_use]
    pub fn begin(&self) -> Option<Cursor> {
        self.begin.map(|h| self.cursor(h))
    }

    /// Cursor to the last node.
    #[must_use]
    pub fn end(&self) -> Option<Cursor> {
        self.end.map(|h| self.cursor(h))
    }

    #[must_use]
    pub fn front(&self) -> Option<&[u8]> {
        self.begin.map(|h| self.nodes.get(h).value.as_slice())
    }

    #[must_use]
    pub fn back(&self) -> Option<&[u8]> {
        self.end.map(|h| self.nodes.get(h).value.as_slice())
    }

    /// The payload currently stored at `cursor`, or `None` for a stale cursor.
    #[must_use]
    pub fn get(&self, cursor: Cursor) -> Option<&[u8]> {
        self.resolve(cursor).map(|link| link.value.as_slice())
    }

    #[must_use]
    pub fn next(&self, cursor: Cursor) -> Option<Cursor> {
        self.resolve(cursor)?.next.map(|h| self.cursor(h))
    }

    #[must_use]
    pub fn prev(&self, cursor: Cursor) -> Option<Cursor> {
        self.resolve(cursor)?.prev.map(|h| self.cursor(h))
    }

    /// Iterates over payloads from `begin` to `end`.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            nodes: &self.nodes,
            front: self.begin,
            back: self.end,
            remaining: self.len(),
        }
    }

    /// Drops every node and payload. The comparator is kept; outstanding cursors are
    /// invalidated.
    pub fn clear(&mut self) {
        tracing::debug!(len = self.len(), "clearing ordered list");
        self.nodes.clear();
        self.begin = None;
        self.end = None;
        self.epoch = self.epoch.wrapping_add(1);
    }

    /// Node handles in chain order.
    fn chain(&self) -> Result<Vec<Handle>> {
        let mut handles = Vec::new();
        handles.try_reserve_exact(self.len()).map_err(|_| Error::OutOfMemory)?;
        let mut current = self.begin;
        while let Some(handle) = current {
            handles.push(handle);
            current = self.nodes.get(handle).next;
        }
        Ok(handles)
    }
}

impl<C: Comparator> OrderedList<C> {
    /// Sorts the payloads into ascending order by the list's comparator.
    ///
    /// Payloads move between nodes; the nodes themselves and their links stay put, so a
    /// [`Cursor`] keeps its position but may see a different value afterwards. The sort is
    /// not stable. Sorting an already sorted list leaves it unchanged.
    ///
    /// # Errors
    ///
    /// - [`Error::MissingComparator`] if the list was built without one.
    /// - [`Error::Compare`] if the comparator rejects a payload.
    /// - [`Error::OutOfMemory`] if scratch space cannot be allocated.
    ///
    /// On error the list is unchanged.
    pub fn sort(&mut self) -> Result<()> {
        let Some(comparator) = self.comparator.as_ref() else {
            tracing::warn!("sort called on a list without a comparator");
            return Err(Error::MissingComparator);
        };
        if self.len() < 2 {
            return Ok(());
        }

        let chain = self.chain()?;
        let mut ranked = Vec::new();
        ranked.try_reserve_exact(chain.len()).map_err(|_| Error::OutOfMemory)?;
        ranked.extend_from_slice(&chain);

        let mut failure: Option<CompareError> = None;
        ranked.sort_unstable_by(|&a, &b| {
            if failure.is_some() {
                return Ordering::Equal;
            }
            comparator
                .compare(&self.nodes.get(a).value, &self.nodes.get(b).value)
                .unwrap_or_else(|err| {
                    failure = Some(err);
                    Ordering::Equal
                })
        });
        if let Some(err) = failure {
            tracing::debug!(%err, "sort aborted, list left unchanged");
            return Err(err.into());
        }

        let mut payloads = Vec::new();
        payloads.try_reserve_exact(ranked.len()).map_err(|_| Error::OutOfMemory)?;
        for &handle in &ranked {
            payloads.push(core::mem::take(&mut self.nodes.get_mut(handle).value));
        }
        for (&handle, payload) in chain.iter().zip(payloads) {
            self.nodes.get_mut(handle).value = payload;
        }

        tracing::debug!(len = chain.len(), "sorted ordered list");
        Ok(())
    }

    /// Finds the first node, from `begin`, whose payload equals `value`.
    ///
    /// Equality is decided by the comparator; a list without one compares bytes.
    ///
    /// # Errors
    ///
    /// [`Error::Compare`] if the comparator rejects a payload.
    pub fn find(&self, value: &[u8]) -> Result<Option<Cursor>> {
        let mut current = self.begin;
        while let Some(handle) = current {
            let link = self.nodes.get(handle);
            let equal = match &self.comparator {
                Some(comparator) => comparator.compare(&link.value, value)? == Ordering::Equal,
                None => link.value == value,
            };
            if equal {
                return Ok(Some(self.cursor(handle)));
            }
            current = link.next;
        }
        Ok(None)
    }
}

impl<C> fmt::Debug for OrderedList<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<'a, C> IntoIterator for &'a OrderedList<C> {
    type Item = &'a [u8];
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Iter<'a> {
        self.iter()
    }
}

/// Double-ended iterator over the payloads of an [`OrderedList`].
///
/// This `struct` is created by [`OrderedList::iter`].
#[derive(Clone)]
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Iter<'a> {
    nodes: &'a Arena<Link>,
    front: Option<Handle>,
    back: Option<Handle>,
    remaining: usize,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<&'a [u8]> {
        if self.remaining == 0 {
            return None;
        }
        let nodes = self.nodes;
        let link = nodes.get(self.front?);
        self.front = link.next;
        self.remaining -= 1;
        Some(&link.value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a> DoubleEndedIterator for Iter<'a> {
    fn next_back(&mut self) -> Option<&'a [u8]> {
        if self.remaining == 0 {
            return None;
        }
        let nodes = self.nodes;
        let link = nodes.get(self.back?);
        self.back = link.prev;
        self.remaining -= 1;
        Some(&link.value)
    }
}

impl ExactSizeIterator for Iter<'_> {}

impl FusedIterator for Iter<'_> {}
