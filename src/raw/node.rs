use super::handle::Handle;
use super::size::Size;

/// Which child slot of a parent a node occupies.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Side {
    Left,
    Right,
}

/// A node of the order-statistic AVL tree.
///
/// Nodes carry no key: a node's position is its in-order rank, derived from
/// the cached subtree sizes on the way down.
#[derive(Clone)]
pub(crate) struct Node<T> {
    pub(crate) value: T,
    pub(crate) parent: Option<Handle>,
    pub(crate) left: Option<Handle>,
    pub(crate) right: Option<Handle>,
    // Height of the subtree rooted here; a leaf has height 0.
    height: u8,
    // Number of nodes in the subtree rooted here, this one included.
    size: Size,
}

impl<T> Node<T> {
    /// Creates a detached leaf.
    pub(crate) fn leaf(value: T, parent: Option<Handle>) -> Self {
        Self {
            value,
            parent,
            left: None,
            right: None,
            height: 0,
            size: Size::ONE,
        }
    }

    #[inline]
    pub(crate) fn height(&self) -> u8 {
        self.height
    }

    #[inline]
    pub(crate) fn size(&self) -> usize {
        self.size.to_usize()
    }

    #[inline]
    pub(crate) fn child(&self, side: Side) -> Option<Handle> {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    #[inline]
    pub(crate) fn set_child(&mut self, side: Side, child: Option<Handle>) {
        match side {
            Side::Left => self.left = child,
            Side::Right => self.right = child,
        }
    }

    /// Stores metadata recomputed from the children's cached values.
    ///
    /// Heights are passed as `height + 1` so that an absent child is 0.
    #[inline]
    pub(crate) fn set_metadata(&mut self, left_height1: u8, left_size: usize, right_height1: u8, right_size: usize) {
        self.height = left_height1.max(right_height1);
        self.size = Size::of_parent(left_size, right_size);
    }
}

impl Side {
    #[inline]
    pub(crate) const fn opposite(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}
