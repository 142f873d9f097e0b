//! Byte-keyed red-black tree map and comparator-sorted doubly linked list.
//!
//! This crate provides two independent collections over opaque byte payloads:
//!
//! - [`KeyedMap`] - a red-black tree from fixed-width byte keys to variable-length byte
//!   values, with upsert, lookup and whole-map teardown
//! - [`OrderedList`] - a doubly linked list of owned byte buffers that can be sorted in place
//!   by a pluggable [`Comparator`]
//!
//! Both delegate ordering to a [`Comparator`], which may reject malformed input with a
//! [`CompareError`] instead of returning an ordering that merely looks like "less than".
//!
//! # Example
//!
//! ```
//! use keylist::{Direction, KeyedMap, NativeEndian, OrderedList, WideStr, navigate};
//!
//! // Window dispatch: an opaque handle maps to the object behind it.
//! let mut windows = KeyedMap::new(8, NativeEndian::<u64>::new());
//! windows.insert(&0x1a2b_u64.to_ne_bytes(), &0xdead_beef_u64.to_ne_bytes()).unwrap();
//! assert!(windows.contains_key(&0x1a2b_u64.to_ne_bytes()).unwrap());
//!
//! // Directory navigation: sort the entries, then step to the next one.
//! let mut files = OrderedList::with_comparator(WideStr);
//! for name in ["b.png", "c.png", "a.png"] {
//!     files.push_front(&WideStr::encode(name)).unwrap();
//! }
//! files.sort().unwrap();
//! let next = navigate::neighbor(&files, &WideStr::encode("c.png"), Direction::Next).unwrap();
//! assert_eq!(next, Some(&WideStr::encode("a.png")[..]));
//! ```
//!
//! # Features
//!
//! - **`no_std` compatible** - Only requires `alloc`, no standard library dependency
//! - **Fallible allocation** - Running out of memory is an [`Error`], and a failed operation
//!   leaves its collection untouched
//! - **Handle-linked nodes** - Nodes live in an arena and link to each other by index, so
//!   rotations and teardown never chase freed pointers
//!
//! # Implementation
//!
//! The map is a classic red-black tree: new keys are attached as red leaves by plain binary
//! search descent, then a bottom-up fixup recolors and rotates until no red node has a red
//! child and the root is black. Replacing the value of an existing key never touches the tree
//! shape. There is no single-key removal.
//!
//! The list sorts by moving payloads between nodes, never by relinking nodes, so node
//! positions handed out as [`Cursor`]s stay valid across a sort.

#![no_std]
#![forbid(unsafe_code)]
#![forbid(keyword_idents)]
#![forbid(non_ascii_idents)]
#![forbid(unreachable_pub)]
#![warn(clippy::all)]
#![warn(clippy::cargo)]
#![warn(clippy::pedantic)]
// Enable coverage attributes for nightly builds.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

extern crate alloc;

mod compare;
mod error;
mod keyed_map;
mod ordered_list;
mod raw;
mod registry;

pub mod navigate;

pub use compare::{Bytewise, CompareError, Comparator, NativeEndian, NativeInteger, WideStr};
pub use error::{Error, Result};
pub use keyed_map::{Iter as MapIter, KeyedMap};
pub use navigate::Direction;
pub use ordered_list::{Cursor, Iter as ListIter, OrderedList};
pub use registry::HandleRegistry;
