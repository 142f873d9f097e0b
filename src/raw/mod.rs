mod arena;
mod handle;
mod rb_tree;

pub(crate) use arena::Arena;
pub(crate) use handle::Handle;
pub(crate) use rb_tree::{RawRbTree, copy_bytes};
