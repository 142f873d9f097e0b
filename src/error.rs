//! Error types for `keylist`.

use thiserror::Error;

use crate::compare::CompareError;

/// Result type alias using [`Error`].
pub type Result<T> = core::result::Result<T, Error>;

/// Errors reported by [`KeyedMap`](crate::KeyedMap) and [`OrderedList`](crate::OrderedList).
///
/// Every failing operation leaves its collection exactly as it was before the call.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// A key buffer or node could not be allocated.
    #[error("out of memory")]
    OutOfMemory,

    /// The collection already holds as many nodes as its handles can address.
    #[error("node capacity exceeded (max {max})")]
    CapacityExceeded { max: usize },

    /// The key does not have the width the map was configured with.
    #[error("key size mismatch: expected {expected} bytes, got {actual}")]
    KeySizeMismatch { expected: usize, actual: usize },

    /// A stored value does not have the width its owner always writes.
    #[error("value size mismatch: expected {expected} bytes, got {actual}")]
    ValueSizeMismatch { expected: usize, actual: usize },

    /// `sort` was called on a list created without a comparator.
    #[error("list has no comparator")]
    MissingComparator,

    /// The comparator rejected one of its operands.
    #[error("comparator failed: {0}")]
    Compare(#[from] CompareError),
}
