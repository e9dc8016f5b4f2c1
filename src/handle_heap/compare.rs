/// A strict weak ordering used by [`HandleHeap`](crate::HandleHeap) to decide
/// which element is the minimum.
///
/// `less(a, b)` must be irreflexive and transitive, and incomparability must
/// be transitive. The heap keeps the element `m` for which no other element
/// `e` has `less(e, m)` at its root.
///
/// Any `Fn(&T, &T) -> bool` closure is a `Compare<T>`:
///
/// ```
/// use osvec::HandleHeap;
///
/// // Closest to zero first.
/// let mut heap = HandleHeap::with_comparator(|a: &i32, b: &i32| a.abs() < b.abs());
/// heap.push(-7);
/// heap.push(2);
/// heap.push(-1);
/// assert_eq!(heap.min(), Ok(&-1));
/// ```
pub trait Compare<T: ?Sized> {
    /// Returns `true` if `a` is strictly ordered before `b`.
    fn less(&self, a: &T, b: &T) -> bool;
}

/// Orders elements by their [`Ord`] impl, making [`HandleHeap`](crate::HandleHeap)
/// a min-heap.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct Natural;

/// Orders elements by the reverse of their [`Ord`] impl, making
/// [`HandleHeap`](crate::HandleHeap) a max-heap.
///
/// # Examples
///
/// ```
/// use osvec::{HandleHeap, Reversed};
///
/// let mut heap = HandleHeap::with_comparator(Reversed);
/// heap.extend([3, 9, 4]);
/// assert_eq!(heap.extract_min(), Ok(9));
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct Reversed;

impl<T: Ord + ?Sized> Compare<T> for Natural {
    #[inline]
    fn less(&self, a: &T, b: &T) -> bool {
        a < b
    }
}

impl<T: Ord + ?Sized> Compare<T> for Reversed {
    #[inline]
    fn less(&self, a: &T, b: &T) -> bool {
        a > b
    }
}

impl<T: ?Sized, F> Compare<T> for F
where
    F: Fn(&T, &T) -> bool,
{
    #[inline]
    fn less(&self, a: &T, b: &T) -> bool {
        self(a, b)
    }
}
