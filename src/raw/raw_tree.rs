use alloc::vec::Vec;

use smallvec::SmallVec;

use super::arena::Arena;
use super::handle::Handle;
use super::node::{Node, Side};
use crate::OutOfRange;

/// Inline capacity of traversal stacks. An AVL tree addressable by a `u32`
/// handle is never taller than this. Must be a length `smallvec::Array` is
/// implemented for.
const STACK_DEPTH: usize = 64;

/// The AVL tree backing `OSTreeVec`, indexed by in-order position.
#[derive(Clone)]
pub(crate) struct RawTree<T> {
    /// Arena storing all tree nodes.
    nodes: Arena<Node<T>>,
    /// Handle to the root node, if the tree is non-empty.
    root: Option<Handle>,
}

impl<T> RawTree<T> {
    /// Creates a new, empty tree.
    pub(crate) const fn new() -> Self {
        Self {
            nodes: Arena::new(),
            root: None,
        }
    }

    /// Creates a new tree with room for `capacity` elements.
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Arena::with_capacity(capacity),
            root: None,
        }
    }

    /// Returns the number of elements in the tree.
    pub(crate) const fn len(&self) -> usize {
        self.nodes.len()
    }

    pub(crate) const fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub(crate) fn capacity(&self) -> usize {
        self.nodes.capacity()
    }

    /// Height of the whole tree, `None` when empty.
    pub(crate) fn height(&self) -> Option<u8> {
        self.root.map(|root| self.nodes.get(root).height())
    }

    /// Drops every node. The arena releases its storage in one go, so this
    /// does not recurse over the tree.
    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
    }

    pub(crate) fn value(&self, handle: Handle) -> &T {
        &self.nodes.get(handle).value
    }

    /// Returns the element at `index`, or `None` if `index >= len`.
    pub(crate) fn get(&self, index: usize) -> Option<&T> {
        self.find(index).map(|h| self.value(h))
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        let handle = self.find(index)?;
        Some(&mut self.nodes.get_mut(handle).value)
    }

    /// Locates the node at in-order position `index` by descending on subtree
    /// sizes.
    fn find(&self, index: usize) -> Option<Handle> {
        if index >= self.len() {
            return None;
        }

        let mut current = self.root;
        let mut remaining = index;
        while let Some(handle) = current {
            let node = self.nodes.get(handle);
            let left_size = self.size_of(node.left);
            if remaining == left_size {
                return Some(handle);
            }
            if remaining < left_size {
                current = node.left;
            } else {
                remaining -= left_size + 1;
                current = node.right;
            }
        }

        debug_assert!(false, "find: size invariant violated - index {index} not found (len {})", self.len());
        None
    }

    /// Inserts `value` so that it ends up at position `index`.
    pub(crate) fn insert(&mut self, index: usize, value: T) -> Result<(), OutOfRange> {
        let len = self.len();
        if index > len {
            return Err(OutOfRange::Index { index, len });
        }

        let Some(root) = self.root else {
            self.root = Some(self.nodes.alloc(Node::leaf(value, None)));
            return Ok(());
        };

        // Walk down to the first empty child slot on the path to `index`.
        let mut parent = root;
        let mut remaining = index;
        let side = loop {
            let node = self.nodes.get(parent);
            let left_size = self.size_of(node.left);
            let (side, next) = if remaining <= left_size {
                (Side::Left, node.left)
            } else {
                remaining -= left_size + 1;
                (Side::Right, node.right)
            };
            match next {
                Some(child) => parent = child,
                None => break side,
            }
        };

        let leaf = self.nodes.alloc(Node::leaf(value, Some(parent)));
        self.nodes.get_mut(parent).set_child(side, Some(leaf));
        self.rebalance_from(Some(parent));
        Ok(())
    }

    /// Removes and returns the element at position `index`.
    pub(crate) fn remove(&mut self, index: usize) -> Result<T, OutOfRange> {
        let len = self.len();
        let target = self.find(index).ok_or(OutOfRange::Index { index, len })?;

        let node = self.nodes.get(target);
        match (node.left, node.right) {
            (Some(_), Some(right)) => {
                // The in-order successor has no left child, so it is the one
                // physically unlinked; its value moves into `target`, which keeps
                // its own height and size.
                let successor = self.extreme(right, Side::Left);
                log::trace!("remove: {target:?} has two children, taking value of successor {successor:?}");
                let successor_value = self.unlink(successor);
                Ok(core::mem::replace(&mut self.nodes.get_mut(target).value, successor_value))
            }
            _ => Ok(self.unlink(target)),
        }
    }

    /// Splices out a node with at most one child and frees it.
    fn unlink(&mut self, handle: Handle) -> T {
        let node = self.nodes.get(handle);
        debug_assert!(node.left.is_none() || node.right.is_none(), "unlink: node has two children");
        let child = node.left.or(node.right);
        let parent = node.parent;

        if let Some(child) = child {
            self.nodes.get_mut(child).parent = parent;
        }
        self.replace_child(parent, handle, child);

        let removed = self.nodes.take(handle);
        self.rebalance_from(parent);
        removed.value
    }

    /// Points whichever slot held `old` (a child slot of `parent`, or the root)
    /// at `new`. The caller fixes `new`'s parent link.
    fn replace_child(&mut self, parent: Option<Handle>, old: Handle, new: Option<Handle>) {
        match parent {
            None => self.root = new,
            Some(parent) => {
                let node = self.nodes.get_mut(parent);
                if node.left == Some(old) {
                    node.left = new;
                } else {
                    debug_assert_eq!(node.right, Some(old), "replace_child: {old:?} is not a child of {parent:?}");
                    node.right = new;
                }
            }
        }
    }

    /// Walks from `start` to the root, refreshing cached metadata and rotating
    /// wherever the balance factor has left `[-1, 1]`.
    fn rebalance_from(&mut self, start: Option<Handle>) {
        let mut current = start;
        while let Some(mut handle) = current {
            self.update(handle);
            let balance = self.balance_factor(handle);
            if balance < -1 {
                let left = self.nodes.get(handle).left.expect("left-heavy node has a left child");
                if self.balance_factor(left) > 0 {
                    self.rotate(left, Side::Left);
                }
                handle = self.rotate(handle, Side::Right);
            } else if balance > 1 {
                let right = self.nodes.get(handle).right.expect("right-heavy node has a right child");
                if self.balance_factor(right) < 0 {
                    self.rotate(right, Side::Right);
                }
                handle = self.rotate(handle, Side::Left);
            }
            current = self.nodes.get(handle).parent;
        }
    }

    /// Rotates the subtree rooted at `pivot` in `direction`, promoting the
    /// child on the opposite side. Returns the new subtree root.
    fn rotate(&mut self, pivot: Handle, direction: Side) -> Handle {
        let promoted_side = direction.opposite();
        let promoted = self
            .nodes
            .get(pivot)
            .child(promoted_side)
            .expect("rotation needs a child on the promoted side");
        log::trace!("rotate {direction:?} at {pivot:?}, promoting {promoted:?}");

        let middle = self.nodes.get(promoted).child(direction);
        let parent = self.nodes.get(pivot).parent;

        self.nodes.get_mut(pivot).set_child(promoted_side, middle);
        if let Some(middle) = middle {
            self.nodes.get_mut(middle).parent = Some(pivot);
        }

        self.replace_child(parent, pivot, Some(promoted));
        let node = self.nodes.get_mut(promoted);
        node.parent = parent;
        node.set_child(direction, Some(pivot));
        self.nodes.get_mut(pivot).parent = Some(promoted);

        // The demoted node is now below the promoted one.
        self.update(pivot);
        self.update(promoted);
        promoted
    }

    /// Recomputes height and size of `handle` from its children.
    fn update(&mut self, handle: Handle) {
        let node = self.nodes.get(handle);
        let (left, right) = (node.left, node.right);
        let (left_height, left_size) = (self.height1_of(left), self.size_of(left));
        let (right_height, right_size) = (self.height1_of(right), self.size_of(right));
        self.nodes
            .get_mut(handle)
            .set_metadata(left_height, left_size, right_height, right_size);
    }

    /// Returns `height(right) - height(left)`.
    fn balance_factor(&self, handle: Handle) -> i16 {
        let node = self.nodes.get(handle);
        i16::from(self.height1_of(node.right)) - i16::from(self.height1_of(node.left))
    }

    /// Height plus one, so that an empty subtree is 0.
    #[inline]
    fn height1_of(&self, handle: Option<Handle>) -> u8 {
        handle.map_or(0, |h| self.nodes.get(h).height() + 1)
    }

    #[inline]
    fn size_of(&self, handle: Option<Handle>) -> usize {
        handle.map_or(0, |h| self.nodes.get(h).size())
    }

    /// Follows `side` links from `handle` as far as they go.
    fn extreme(&self, mut handle: Handle, side: Side) -> Handle {
        while let Some(child) = self.nodes.get(handle).child(side) {
            handle = child;
        }
        handle
    }

    /// Handle of the first element in order.
    pub(crate) fn first(&self) -> Option<Handle> {
        self.root.map(|root| self.extreme(root, Side::Left))
    }

    /// Handle of the last element in order.
    pub(crate) fn last(&self) -> Option<Handle> {
        self.root.map(|root| self.extreme(root, Side::Right))
    }

    /// In-order successor.
    pub(crate) fn next(&self, handle: Handle) -> Option<Handle> {
        self.step(handle, Side::Right)
    }

    /// In-order predecessor.
    pub(crate) fn prev(&self, handle: Handle) -> Option<Handle> {
        self.step(handle, Side::Left)
    }

    fn step(&self, handle: Handle, side: Side) -> Option<Handle> {
        if let Some(child) = self.nodes.get(handle).child(side) {
            return Some(self.extreme(child, side.opposite()));
        }

        // Climb until we arrive from the other side.
        let mut child = handle;
        let mut parent = self.nodes.get(handle).parent;
        while let Some(p) = parent {
            let node = self.nodes.get(p);
            if node.child(side) != Some(child) {
                return Some(p);
            }
            child = p;
            parent = node.parent;
        }
        None
    }

    /// Moves every element out in order, leaving the tree empty.
    /// This is O(n) and uses an explicit stack rather than recursion.
    pub(crate) fn drain_to_vec(&mut self) -> Vec<T> {
        let mut result = Vec::with_capacity(self.len());
        let mut stack: SmallVec<[Handle; STACK_DEPTH]> = SmallVec::new();
        let mut current = self.root.take();

        loop {
            while let Some(handle) = current {
                stack.push(handle);
                current = self.nodes.get(handle).left;
            }
            let Some(handle) = stack.pop() else {
                break;
            };
            let node = self.nodes.take(handle);
            current = node.right;
            result.push(node.value);
        }

        self.nodes.clear();
        result
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
#[allow(clippy::manual_assert, clippy::uninlined_format_args, clippy::cast_possible_wrap)]
mod tests {
    use super::*;
    use alloc::string::String;
    use alloc::vec;
    use proptest::prelude::*;
    use static_assertions::assert_impl_all;

    assert_impl_all!([Handle; STACK_DEPTH]: smallvec::Array);

    impl<T> RawTree<T> {
        /// Validates all AVL and order-statistic invariants. Panics with a
        /// descriptive message listing every violation found.
        pub(crate) fn validate_invariants(&self) {
            let mut errors: Vec<String> = Vec::new();

            match self.root {
                None => {
                    if !self.nodes.is_empty() {
                        errors.push(alloc::format!("empty tree still owns {} nodes", self.nodes.len()));
                    }
                }
                Some(root) => {
                    if let Some(parent) = self.nodes.get(root).parent {
                        errors.push(alloc::format!("root {:?} has parent {:?}", root, parent));
                    }
                    let (_, size) = self.validate_node(root, &mut errors);
                    if size != self.nodes.len() {
                        errors.push(alloc::format!(
                            "reachable nodes ({}) differ from arena population ({})",
                            size,
                            self.nodes.len()
                        ));
                    }
                }
            }

            assert!(errors.is_empty(), "Tree invariant violations:\n{}", errors.join("\n"));
        }

        /// Returns `(height + 1, size)` recomputed from scratch.
        fn validate_node(&self, handle: Handle, errors: &mut Vec<String>) -> (i32, usize) {
            let node = self.nodes.get(handle);
            let mut heights = [0i32; 2];
            let mut sizes = [0usize; 2];

            for (i, side) in [Side::Left, Side::Right].into_iter().enumerate() {
                if let Some(child) = node.child(side) {
                    let parent = self.nodes.get(child).parent;
                    if parent != Some(handle) {
                        errors.push(alloc::format!(
                            "{:?} child {:?} of {:?} points back at {:?}",
                            side,
                            child,
                            handle,
                            parent
                        ));
                    }
                    (heights[i], sizes[i]) = self.validate_node(child, errors);
                }
            }

            let height1 = heights[0].max(heights[1]) + 1;
            let size = sizes[0] + sizes[1] + 1;

            if i32::from(node.height()) + 1 != height1 {
                errors.push(alloc::format!(
                    "height mismatch at {:?}: stored={}, computed={}",
                    handle,
                    node.height(),
                    height1 - 1
                ));
            }
            if node.size() != size {
                errors.push(alloc::format!(
                    "size mismatch at {:?}: stored={}, computed={}",
                    handle,
                    node.size(),
                    size
                ));
            }
            if (heights[1] - heights[0]).abs() > 1 {
                errors.push(alloc::format!(
                    "{:?} is not AVL balanced: left height {}, right height {}",
                    handle,
                    heights[0] - 1,
                    heights[1] - 1
                ));
            }

            (height1, size)
        }

        fn to_vec(&self) -> Vec<T>
        where
            T: Clone,
        {
            let mut out = Vec::new();
            let mut current = self.first();
            while let Some(handle) = current {
                out.push(self.value(handle).clone());
                current = self.next(handle);
            }
            out
        }
    }

    #[derive(Clone, Debug)]
    enum Op {
        Insert(usize, i32),
        Remove(usize),
        Assign(usize, i32),
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            4 => (any::<usize>(), any::<i32>()).prop_map(|(at, v)| Op::Insert(at, v)),
            2 => any::<usize>().prop_map(Op::Remove),
            1 => (any::<usize>(), any::<i32>()).prop_map(|(at, v)| Op::Assign(at, v)),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(50))]

        #[test]
        fn tree_matches_vec_after_every_operation(ops in prop::collection::vec(op_strategy(), 0..400)) {
            let mut tree: RawTree<i32> = RawTree::new();
            let mut model: Vec<i32> = Vec::new();

            for op in ops {
                match op {
                    Op::Insert(at, value) => {
                        let at = at % (model.len() + 1);
                        tree.insert(at, value).expect("index within 0..=len");
                        model.insert(at, value);
                    }
                    Op::Remove(at) => {
                        if model.is_empty() {
                            prop_assert_eq!(tree.remove(0), Err(OutOfRange::Index { index: 0, len: 0 }));
                            continue;
                        }
                        let at = at % model.len();
                        prop_assert_eq!(tree.remove(at), Ok(model.remove(at)));
                    }
                    Op::Assign(at, value) => {
                        if model.is_empty() {
                            continue;
                        }
                        let at = at % model.len();
                        *tree.get_mut(at).expect("index within 0..len") = value;
                        model[at] = value;
                    }
                }

                tree.validate_invariants();
                prop_assert_eq!(tree.len(), model.len());
                prop_assert_eq!(tree.to_vec(), model.clone());
            }

            for (i, value) in model.iter().enumerate() {
                prop_assert_eq!(tree.get(i), Some(value));
            }
            prop_assert_eq!(tree.get(model.len()), None);
        }

        #[test]
        fn drain_yields_in_order(values in prop::collection::vec(any::<u16>(), 0..300)) {
            let mut tree: RawTree<u16> = RawTree::new();
            for &v in &values {
                tree.insert(tree.len(), v).expect("append");
            }
            prop_assert_eq!(tree.drain_to_vec(), values);
            prop_assert!(tree.is_empty());
            tree.validate_invariants();
        }
    }

    #[test]
    fn insert_in_middle_then_remove() {
        let mut tree = RawTree::new();
        tree.insert(0, 'a').unwrap();
        tree.insert(1, 'b').unwrap();
        tree.insert(1, 'c').unwrap();
        tree.validate_invariants();
        assert_eq!(tree.to_vec(), vec!['a', 'c', 'b']);

        assert_eq!(tree.remove(1), Ok('c'));
        tree.validate_invariants();
        assert_eq!(tree.to_vec(), vec!['a', 'b']);
    }

    #[test]
    fn prepending_stays_balanced() {
        let mut tree = RawTree::new();
        for i in 0..10 {
            tree.insert(0, i).unwrap();
            tree.validate_invariants();
        }
        assert_eq!(tree.to_vec(), (0..10).rev().collect::<Vec<_>>());
        // ceil(log2(10)) == 4
        assert!(tree.height().unwrap() <= 4);
    }

    #[test]
    fn out_of_range_positions_are_rejected() {
        let mut tree = RawTree::new();
        assert_eq!(tree.insert(1, 0), Err(OutOfRange::Index { index: 1, len: 0 }));
        tree.insert(0, 10).unwrap();
        assert_eq!(tree.get(1), None);
        assert_eq!(tree.remove(1), Err(OutOfRange::Index { index: 1, len: 1 }));
        assert_eq!(tree.insert(3, 0), Err(OutOfRange::Index { index: 3, len: 1 }));
        tree.validate_invariants();
        assert_eq!(tree.to_vec(), vec![10]);
    }

    #[test]
    fn removing_two_child_node_keeps_positions() {
        let mut tree = RawTree::new();
        for i in 0..31 {
            tree.insert(i, i).unwrap();
        }
        // Position 15 is the root of a perfect tree built by appends.
        let mut model: Vec<usize> = (0..31).collect();
        for at in [15, 7, 22, 0, 26] {
            assert_eq!(tree.remove(at), Ok(model.remove(at)));
            tree.validate_invariants();
            assert_eq!(tree.to_vec(), model);
        }
    }

    #[test]
    fn stepping_backwards_visits_reverse_order() {
        let mut tree = RawTree::new();
        for i in 0..50 {
            tree.insert(i / 2, i).unwrap();
        }
        let forward = tree.to_vec();
        let mut backward = Vec::new();
        let mut current = tree.last();
        while let Some(handle) = current {
            backward.push(*tree.value(handle));
            current = tree.prev(handle);
        }
        backward.reverse();
        assert_eq!(backward, forward);
    }

    #[test]
    fn empty_tree_has_no_height() {
        let mut tree: RawTree<u8> = RawTree::with_capacity(4);
        assert_eq!(tree.height(), None);
        assert!(tree.capacity() >= 4);
        tree.insert(0, 1).unwrap();
        assert_eq!(tree.height(), Some(0));
        tree.clear();
        assert!(tree.is_empty());
        tree.validate_invariants();
    }

    #[test]
    fn fills_to_handle_max() {
        let mut tree: RawTree<u8> = RawTree::new();
        for i in 0..Handle::MAX {
            tree.insert(i, 0).unwrap();
        }
        tree.validate_invariants();
        assert_eq!(tree.len(), Handle::MAX);

        // A freed slot is reused without growing past the limit.
        assert_eq!(tree.remove(0), Ok(0));
        tree.insert(0, 1).unwrap();
        tree.validate_invariants();
        assert_eq!(tree.get(0), Some(&1));
    }

    #[test]
    fn insert_past_handle_max_leaves_tree_intact() {
        extern crate std;
        use std::panic::{AssertUnwindSafe, catch_unwind};

        let mut tree: RawTree<u8> = RawTree::new();
        for i in 0..Handle::MAX {
            tree.insert(i, 0).unwrap();
        }
        let result = catch_unwind(AssertUnwindSafe(|| tree.insert(Handle::MAX, 1)));
        assert!(result.is_err(), "inserting past the arena limit should panic");
        tree.validate_invariants();
        assert_eq!(tree.len(), Handle::MAX);
    }
}
