//! Wrap-around stepping through a sorted [`OrderedList`].
//!
//! This is the "next/previous file in the same directory" walk of an image viewer: the
//! directory's entries go into a list, the list is sorted, and the entry after (or before)
//! the current one is picked, wrapping from the last entry back to the first and vice versa.
//! How the entries were enumerated or filtered is up to the caller.

use alloc::vec::Vec;

use crate::compare::Comparator;
use crate::error::Result;
use crate::ordered_list::{Cursor, OrderedList};
use crate::raw::copy_bytes;

/// Which way to step from the current entry.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Direction {
    Next,
    Previous,
}

/// The node after or before `cursor`, wrapping around at either end.
///
/// Returns `None` only for a cursor that does not belong to the list.
#[must_use]
pub fn step<C>(list: &OrderedList<C>, cursor: Cursor, direction: Direction) -> Option<Cursor> {
    list.get(cursor)?;
    match direction {
        Direction::Next => list.next(cursor).or_else(|| list.begin()),
        Direction::Previous => list.prev(cursor).or_else(|| list.end()),
    }
}

/// Finds `current` in `list` and returns the payload one step away in `direction`.
///
/// The list is expected to be sorted already. `None` means `current` is not in the list. In a
/// one-element list the neighbor of the only entry is that entry itself.
///
/// # Errors
///
/// [`Error::Compare`](crate::Error::Compare) if the comparator rejects an entry.
pub fn neighbor<'a, C: Comparator>(
    list: &'a OrderedList<C>,
    current: &[u8],
    direction: Direction,
) -> Result<Option<&'a [u8]>> {
    let Some(found) = list.find(current)? else {
        return Ok(None);
    };
    Ok(step(list, found, direction).and_then(|cursor| list.get(cursor)))
}

/// Sorts `entries` with `comparator` and returns a copy of the entry that follows (or
/// precedes) `current`, wrapping at the ends.
///
/// The scratch list is dropped before returning.
///
/// # Errors
///
/// Any error from building, sorting or searching the list; see [`OrderedList::sort`].
///
/// # Examples
///
/// ```
/// use keylist::{Bytewise, Direction, navigate};
///
/// let dir = ["c.png", "a.png", "b.png"];
/// let next = navigate::sibling_entry(dir, b"c.png", Direction::Next, Bytewise).unwrap();
/// assert_eq!(next.as_deref(), Some(&b"a.png"[..]));
///
/// let prev = navigate::sibling_entry(dir, b"b.png", Direction::Previous, Bytewise).unwrap();
/// assert_eq!(prev.as_deref(), Some(&b"a.png"[..]));
/// ```
pub fn sibling_entry<I, C>(entries: I, current: &[u8], direction: Direction, comparator: C) -> Result<Option<Vec<u8>>>
where
    I: IntoIterator,
    I::Item: AsRef<[u8]>,
    C: Comparator,
{
    let mut list = OrderedList::with_comparator(comparator);
    for entry in entries {
        list.push_front(entry.as_ref())?;
    }
    list.sort()?;

    let sibling = neighbor(&list, current, direction)?.map(copy_bytes).transpose()?;
    tracing::debug!(entries = list.len(), found = sibling.is_some(), ?direction, "looked up sibling entry");
    Ok(sibling)
}
