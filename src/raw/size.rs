use super::handle::Handle;

/// Cached subtree size of a tree node.
///
/// A subtree can never hold more nodes than the arena can address, so the size
/// shares the handle's width and niche.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(transparent)]
pub(crate) struct Size(Handle);

impl Size {
    pub(crate) const MAX: usize = Handle::MAX;
    pub(crate) const ONE: Self = Self::from_usize(1);

    #[inline]
    pub(crate) const fn from_usize(size: usize) -> Self {
        assert!(size <= Self::MAX, "`Size::from_usize()` - `size` > `Size::MAX`!");
        Self(Handle::from_index(size))
    }

    #[inline]
    pub(crate) const fn to_usize(self) -> usize {
        self.0.to_index()
    }

    /// Size of a node whose children have sizes `left` and `right`.
    #[inline]
    pub(crate) const fn of_parent(left: usize, right: usize) -> Self {
        Self::from_usize(left + right + 1)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use static_assertions::assert_eq_size;

    assert_eq_size!(Size, Option<Size>);
    assert_eq_size!(Size, Handle);

    #[test]
    #[should_panic(expected = "`Size::from_usize()` - `size` > `Size::MAX`!")]
    fn size_past_max_is_rejected() {
        let _ = Size::from_usize(Size::MAX + 1);
    }

    #[test]
    fn leaf_has_size_one() {
        assert_eq!(Size::of_parent(0, 0), Size::ONE);
        assert_eq!(Size::of_parent(3, 4).to_usize(), 8);
    }

    proptest! {
        #[test]
        fn size_survives_encoding(size in 0..=Size::MAX) {
            prop_assert_eq!(Size::from_usize(size).to_usize(), size);
        }
    }
}
