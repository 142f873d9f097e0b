use core::cmp::Ordering;

use alloc::vec::Vec;

use super::arena::Arena;
use super::handle::Handle;
use crate::compare::Comparator;
use crate::error::{Error, Result};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Color {
    Red,
    Black,
}

/// A tree node. Links are arena handles; the arena owns every node.
pub(crate) struct RbNode {
    key: Vec<u8>,
    value: Vec<u8>,
    parent: Option<Handle>,
    left: Option<Handle>,
    right: Option<Handle>,
    color: Color,
}

impl RbNode {
    pub(crate) fn key(&self) -> &[u8] {
        &self.key
    }

    pub(crate) fn value(&self) -> &[u8] {
        &self.value
    }

    pub(crate) fn left(&self) -> Option<Handle> {
        self.left
    }

    pub(crate) fn right(&self) -> Option<Handle> {
        self.right
    }
}

/// Copies `bytes` into a new exactly-sized buffer, reporting allocation failure.
pub(crate) fn copy_bytes(bytes: &[u8]) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    buffer.try_reserve_exact(bytes.len()).map_err(|_| Error::OutOfMemory)?;
    buffer.extend_from_slice(bytes);
    Ok(buffer)
}

/// The red-black tree backing `KeyedMap`.
///
/// Knows nothing about key widths; the caller validates keys and supplies the comparator.
pub(crate) struct RawRbTree {
    nodes: Arena<RbNode>,
    root: Option<Handle>,
}

impl RawRbTree {
    pub(crate) const fn new() -> Self {
        Self {
            nodes: Arena::new(),
            root: None,
        }
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Arena::with_capacity(capacity),
            root: None,
        }
    }

    pub(crate) const fn len(&self) -> usize {
        self.nodes.len()
    }

    pub(crate) fn capacity(&self) -> usize {
        self.nodes.capacity()
    }

    pub(crate) fn root(&self) -> Option<Handle> {
        self.root
    }

    pub(crate) fn node(&self, handle: Handle) -> &RbNode {
        self.nodes.get(handle)
    }

    /// Drops every node at once.
    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
    }

    /// Finds the node whose key compares equal to `key`.
    pub(crate) fn search<C>(&self, comparator: &C, key: &[u8]) -> Result<Option<Handle>>
    where
        C: Comparator + ?Sized,
    {
        let mut current = self.root;
        while let Some(handle) = current {
            let node = self.nodes.get(handle);
            current = match comparator.compare(key, &node.key)? {
                Ordering::Equal => return Ok(Some(handle)),
                Ordering::Less => node.left,
                Ordering::Greater => node.right,
            };
        }
        Ok(None)
    }

    /// Inserts or updates `key`. Returns the previous value on update.
    ///
    /// Every step that can fail (comparisons, buffer copies, node allocation) runs before
    /// the tree is modified, so an error leaves the tree as it was.
    pub(crate) fn upsert<C>(&mut self, comparator: &C, key: &[u8], value: &[u8]) -> Result<Option<Vec<u8>>>
    where
        C: Comparator + ?Sized,
    {
        if let Some(existing) = self.search(comparator, key)? {
            let value = copy_bytes(value)?;
            tracing::trace!(len = value.len(), "replacing value of existing key");
            let node = self.nodes.get_mut(existing);
            return Ok(Some(core::mem::replace(&mut node.value, value)));
        }

        let (parent, attach_left) = self.attach_point(comparator, key)?;
        let node = RbNode {
            key: copy_bytes(key)?,
            value: copy_bytes(value)?,
            parent,
            left: None,
            right: None,
            color: Color::Red,
        };
        let z = self.nodes.try_alloc(node)?;

        match parent {
            None => self.root = Some(z),
            Some(p) if attach_left => self.nodes.get_mut(p).left = Some(z),
            Some(p) => self.nodes.get_mut(p).right = Some(z),
        }
        tracing::trace!(len = self.len(), "inserted new node");

        self.insert_fixup(z);
        Ok(None)
    }

    /// Plain BST descent: left on `Less`, right otherwise.
    fn attach_point<C>(&self, comparator: &C, key: &[u8]) -> Result<(Option<Handle>, bool)>
    where
        C: Comparator + ?Sized,
    {
        let mut parent = None;
        let mut attach_left = false;
        let mut current = self.root;
        while let Some(handle) = current {
            let node = self.nodes.get(handle);
            parent = Some(handle);
            attach_left = comparator.compare(key, &node.key)? == Ordering::Less;
            current = if attach_left { node.left } else { node.right };
        }
        Ok((parent, attach_left))
    }

    #[inline]
    fn parent(&self, handle: Handle) -> Option<Handle> {
        self.nodes.get(handle).parent
    }

    #[inline]
    fn is_red(&self, handle: Option<Handle>) -> bool {
        handle.is_some_and(|h| self.nodes.get(h).color == Color::Red)
    }

    #[inline]
    fn set_color(&mut self, handle: Handle, color: Color) {
        self.nodes.get_mut(handle).color = color;
    }

    /// Points whichever child link of `old`'s parent referenced `old` at `new`
    /// (or the root, if `old` had no parent).
    fn replace_child(&mut self, parent: Option<Handle>, old: Handle, new: Handle) {
        match parent {
            None => self.root = Some(new),
            Some(p) => {
                let p = self.nodes.get_mut(p);
                if p.left == Some(old) {
                    p.left = Some(new);
                } else {
                    p.right = Some(new);
                }
            }
        }
    }

    /// Lifts `x`'s right child into `x`'s place.
    fn rotate_left(&mut self, x: Handle) {
        let Some(y) = self.nodes.get(x).right else {
            debug_assert!(false, "rotate_left without a right child");
            return;
        };
        tracing::trace!(?x, ?y, "rotate left");

        let y_left = self.nodes.get(y).left;
        self.nodes.get_mut(x).right = y_left;
        if let Some(b) = y_left {
            self.nodes.get_mut(b).parent = Some(x);
        }

        let x_parent = self.parent(x);
        self.nodes.get_mut(y).parent = x_parent;
        self.replace_child(x_parent, x, y);

        self.nodes.get_mut(y).left = Some(x);
        self.nodes.get_mut(x).parent = Some(y);
    }

    /// Lifts `y`'s left child into `y`'s place.
    fn rotate_right(&mut self, y: Handle) {
        let Some(x) = self.nodes.get(y).left else {
            debug_assert!(false, "rotate_right without a left child");
            return;
        };
        tracing::trace!(?x, ?y, "rotate right");

        let x_right = self.nodes.get(x).right;
        self.nodes.get_mut(y).left = x_right;
        if let Some(b) = x_right {
            self.nodes.get_mut(b).parent = Some(y);
        }

        let y_parent = self.parent(y);
        self.nodes.get_mut(x).parent = y_parent;
        self.replace_child(y_parent, y, x);

        self.nodes.get_mut(x).right = Some(y);
        self.nodes.get_mut(y).parent = Some(x);
    }

    /// Restores the red-black properties after `z` was attached as a red leaf.
    fn insert_fixup(&mut self, mut z: Handle) {
        while let Some(p) = self.parent(z).filter(|&p| self.is_red(Some(p))) {
            // A red node is never the root, so `p` has a parent.
            let Some(g) = self.parent(p) else { break };

            if self.nodes.get(g).left == Some(p) {
                let uncle = self.nodes.get(g).right;
                if let Some(u) = uncle.filter(|&u| self.is_red(Some(u))) {
                    self.set_color(p, Color::Black);
                    self.set_color(u, Color::Black);
                    self.set_color(g, Color::Red);
                    z = g;
                    continue;
                }

                // Inner grandchild: rotate it into the outer position first.
                let (p, lower) = if self.nodes.get(p).right == Some(z) {
                    self.rotate_left(p);
                    (z, p)
                } else {
                    (p, z)
                };
                self.set_color(p, Color::Black);
                self.set_color(g, Color::Red);
                self.rotate_right(g);
                z = lower;
            } else {
                let uncle = self.nodes.get(g).left;
                if let Some(u) = uncle.filter(|&u| self.is_red(Some(u))) {
                    self.set_color(p, Color::Black);
                    self.set_color(u, Color::Black);
                    self.set_color(g, Color::Red);
                    z = g;
                    continue;
                }

                let (p, lower) = if self.nodes.get(p).left == Some(z) {
                    self.rotate_right(p);
                    (z, p)
                } else {
                    (p, z)
                };
                self.set_color(p, Color::Black);
                self.set_color(g, Color::Red);
                self.rotate_left(g);
                z = lower;
            }
        }

        if let Some(root) = self.root {
            self.set_color(root, Color::Black);
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
mod tests {
    use super::*;
    use crate::compare::{CompareError, NativeEndian};
    use alloc::format;
    use alloc::string::String;
    use proptest::prelude::*;

    const INT: NativeEndian<i32> = NativeEndian::new();

    fn key(k: i32) -> [u8; 4] {
        k.to_ne_bytes()
    }

    fn decode(bytes: &[u8]) -> i32 {
        i32::from_ne_bytes(bytes.try_into().unwrap())
    }

    impl RawRbTree {
        /// Checks every red-black and BST invariant. Panics with a list of violations.
        pub(crate) fn validate_invariants<C: Comparator + ?Sized>(&self, comparator: &C) {
            let Some(root) = self.root else {
                assert_eq!(self.len(), 0, "Empty tree should have no nodes");
                return;
            };

            let mut errors: Vec<String> = Vec::new();
            if self.nodes.get(root).color != Color::Black {
                errors.push(String::from("Root is red"));
            }
            if self.nodes.get(root).parent.is_some() {
                errors.push(String::from("Root has a parent"));
            }

            let mut visited = 0;
            self.validate_node(root, &mut visited, &mut errors);
            if visited != self.len() {
                errors.push(format!("Reachable nodes={visited}, arena len={}", self.len()));
            }

            let keys: Vec<&[u8]> = self.in_order().into_iter().map(|h| self.nodes.get(h).key()).collect();
            if keys.windows(2).any(|w| comparator.compare(w[0], w[1]) != Ok(Ordering::Less)) {
                errors.push(format!("In-order keys not ascending: {keys:?}"));
            }

            assert!(errors.is_empty(), "Tree invariant violations:\n{}", errors.join("\n"));
        }

        /// Returns the black height of the subtree rooted at `handle`.
        fn validate_node(&self, handle: Handle, visited: &mut usize, errors: &mut Vec<String>) -> usize {
            *visited += 1;
            let node = self.nodes.get(handle);

            for child in [node.left, node.right].into_iter().flatten() {
                if self.nodes.get(child).parent != Some(handle) {
                    errors.push(format!("Child {child:?} of {handle:?} has wrong parent link"));
                }
                if node.color == Color::Red && self.nodes.get(child).color == Color::Red {
                    errors.push(format!("Red node {handle:?} has red child {child:?}"));
                }
            }

            let left = node.left.map_or(1, |h| self.validate_node(h, visited, errors));
            let right = node.right.map_or(1, |h| self.validate_node(h, visited, errors));
            if left != right {
                errors.push(format!("Black height mismatch at {handle:?}: left={left}, right={right}"));
            }
            left + usize::from(node.color == Color::Black)
        }

        fn in_order(&self) -> Vec<Handle> {
            let mut out = Vec::new();
            let mut stack = Vec::new();
            let mut current = self.root;
            while current.is_some() || !stack.is_empty() {
                while let Some(h) = current {
                    stack.push(h);
                    current = self.nodes.get(h).left;
                }
                let h = stack.pop().unwrap();
                out.push(h);
                current = self.nodes.get(h).right;
            }
            out
        }

        fn height(&self, handle: Option<Handle>) -> usize {
            handle.map_or(0, |h| {
                let node = self.nodes.get(h);
                1 + self.height(node.left).max(self.height(node.right))
            })
        }
    }

    fn key_at(tree: &RawRbTree, handle: Option<Handle>) -> i32 {
        decode(&tree.node(handle.unwrap()).key)
    }

    #[test]
    fn reference_insert_sequence_shape() {
        let mut tree = RawRbTree::new();

        tree.upsert(&INT, &key(1000), &key(51000)).unwrap();
        assert_eq!(key_at(&tree, tree.root), 1000);

        tree.upsert(&INT, &key(50), &key(50)).unwrap();
        assert_eq!(key_at(&tree, tree.root), 1000);
        assert_eq!(key_at(&tree, tree.node(tree.root.unwrap()).left), 50);

        tree.upsert(&INT, &key(40), &key(40)).unwrap();
        let root = tree.node(tree.root.unwrap());
        assert_eq!(key_at(&tree, tree.root), 50);
        assert_eq!(key_at(&tree, root.left), 40);
        assert_eq!(key_at(&tree, root.right), 1000);

        tree.upsert(&INT, &key(80), &key(80)).unwrap();
        tree.upsert(&INT, &key(1500), &key(1500)).unwrap();
        let root = tree.node(tree.root.unwrap());
        let right = tree.node(root.right.unwrap());
        assert_eq!(key_at(&tree, tree.root), 50);
        assert_eq!(key_at(&tree, root.left), 40);
        assert_eq!(key_at(&tree, root.right), 1000);
        assert_eq!(key_at(&tree, right.left), 80);
        assert_eq!(key_at(&tree, right.right), 1500);

        // (50) black; (40) and (1000) black; [80] and [1500] red.
        assert_eq!(tree.node(root.left.unwrap()).color, Color::Black);
        assert_eq!(right.color, Color::Black);
        assert_eq!(tree.node(right.left.unwrap()).color, Color::Red);
        assert_eq!(tree.node(right.right.unwrap()).color, Color::Red);
        tree.validate_invariants(&INT);
    }

    #[test]
    fn update_keeps_shape() {
        let mut tree = RawRbTree::new();
        for k in [10, 20, 30, 40, 50] {
            tree.upsert(&INT, &key(k), &key(k)).unwrap();
        }
        let before = tree.in_order();
        let root = tree.root;

        let old = tree.upsert(&INT, &key(30), b"a much longer replacement value").unwrap();
        assert_eq!(old.as_deref(), Some(&key(30)[..]));
        assert_eq!(tree.in_order(), before);
        assert_eq!(tree.root, root);
        assert_eq!(tree.len(), 5);

        let found = tree.search(&INT, &key(30)).unwrap().unwrap();
        assert_eq!(tree.node(found).value(), b"a much longer replacement value");
    }

    #[test]
    fn ascending_inserts_stay_logarithmic() {
        let mut tree = RawRbTree::new();
        for k in 0..4096 {
            tree.upsert(&INT, &key(k), &[]).unwrap();
        }
        tree.validate_invariants(&INT);
        // Red-black height bound: h <= 2 * log2(n + 1).
        assert!(tree.height(tree.root) <= 2 * 13, "height {}", tree.height(tree.root));
    }

    #[test]
    fn comparator_failure_leaves_tree_untouched() {
        let mut tree = RawRbTree::new();
        tree.upsert(&INT, &key(1), &key(1)).unwrap();
        tree.upsert(&INT, &key(2), &key(2)).unwrap();

        let err = tree.upsert(&INT, &[1, 2, 3], &[]).unwrap_err();
        assert_eq!(err, Error::Compare(CompareError::InvalidLength { expected: 4, actual: 3 }));
        assert_eq!(tree.len(), 2);
        tree.validate_invariants(&INT);
    }

    #[test]
    fn clear_resets_root() {
        let mut tree = RawRbTree::with_capacity(8);
        for k in 0..8 {
            tree.upsert(&INT, &key(k), &key(k)).unwrap();
        }
        tree.clear();
        assert!(tree.root().is_none());
        assert_eq!(tree.len(), 0);
        assert_eq!(tree.search(&INT, &key(3)).unwrap(), None);
        tree.validate_invariants(&INT);
    }

    proptest! {
        #[test]
        fn invariants_hold_after_every_insert(keys in prop::collection::vec(-500i32..500, 0..400)) {
            let mut tree = RawRbTree::new();
            for k in keys {
                tree.upsert(&INT, &key(k), &key(k.wrapping_mul(3))).unwrap();
                tree.validate_invariants(&INT);
                let found = tree.search(&INT, &key(k)).unwrap();
                prop_assert!(found.is_some());
                prop_assert_eq!(tree.node(found.unwrap()).value(), &key(k.wrapping_mul(3))[..]);
            }
        }
    }
}
