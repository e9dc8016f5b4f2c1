use core::cmp::Ordering;
use core::fmt;
use core::hash::{Hash, Hasher};
use core::iter::FusedIterator;
use core::ops::{Index, IndexMut};

use crate::OutOfRange;
use crate::raw::{Handle, RawTree};

mod capacity;

/// A sequence stored in an AVL tree, addressed by position.
///
/// Every node caches the height and the size of its subtree, so reading,
/// inserting and erasing at an arbitrary position are all O(log n). Unlike a
/// [`Vec`](alloc::vec::Vec), inserting in the middle does not shift the elements
/// after it in memory; they simply move one position to the right.
///
/// The tree never compares elements. `T` needs no [`Ord`] bound, and equal
/// elements are kept in the order they were placed.
///
/// # Examples
///
/// ```
/// use osvec::OSTreeVec;
///
/// let mut seq = OSTreeVec::new();
/// seq.insert(0, 'a')?;
/// seq.insert(1, 'b')?;
/// seq.insert(1, 'c')?;
/// assert_eq!(seq.iter().collect::<String>(), "acb");
///
/// assert_eq!(seq.erase(1)?, 'c');
/// assert_eq!(seq.iter().collect::<String>(), "ab");
/// # Ok::<(), osvec::OutOfRange>(())
/// ```
///
/// Positions past the end are rejected rather than panicking:
///
/// ```
/// use osvec::{OSTreeVec, OutOfRange};
///
/// let mut seq = OSTreeVec::from([1, 2, 3]);
/// assert_eq!(seq.at(3), Err(OutOfRange::Index { index: 3, len: 3 }));
/// assert!(seq.erase(3).is_err());
/// assert_eq!(seq.len(), 3);
/// ```
pub struct OSTreeVec<T> {
    raw: RawTree<T>,
}

/// An iterator over the elements of an `OSTreeVec`, front to back.
///
/// This `struct` is created by the [`iter`] method on [`OSTreeVec`]. See its
/// documentation for more.
///
/// # Examples
///
/// ```
/// use osvec::OSTreeVec;
///
/// let seq = OSTreeVec::from([1, 2, 3]);
/// let mut iter = seq.iter();
/// assert_eq!(iter.next(), Some(&1));
/// assert_eq!(iter.next_back(), Some(&3));
/// assert_eq!(iter.len(), 1);
/// ```
///
/// [`iter`]: OSTreeVec::iter
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Iter<'a, T> {
    tree: &'a RawTree<T>,
    front: Option<Handle>,
    back: Option<Handle>,
    remaining: usize,
}

/// An owning iterator over the elements of an `OSTreeVec`.
///
/// This `struct` is created by the [`into_iter`] method on [`OSTreeVec`]
/// (provided by the [`IntoIterator`] trait).
///
/// [`into_iter`]: OSTreeVec#method.into_iter
pub struct IntoIter<T> {
    inner: alloc::vec::IntoIter<T>,
}

impl<T> OSTreeVec<T> {
    /// Makes a new, empty `OSTreeVec`.
    ///
    /// Does not allocate anything on its own.
    ///
    /// # Examples
    ///
    /// ```
    /// use osvec::OSTreeVec;
    ///
    /// let mut seq = OSTreeVec::new();
    /// seq.push_back(1);
    /// ```
    #[must_use]
    pub const fn new() -> OSTreeVec<T> {
        OSTreeVec { raw: RawTree::new() }
    }

    /// Returns the number of elements in the sequence.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub const fn len(&self) -> usize {
        self.raw.len()
    }

    /// Returns `true` if the sequence contains no elements.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Returns the height of the underlying tree: `-1` when empty, `0` for a
    /// single element.
    ///
    /// The AVL invariant keeps this below `1.45 * log2(len + 2)`.
    ///
    /// # Examples
    ///
    /// ```
    /// use osvec::OSTreeVec;
    ///
    /// let mut seq = OSTreeVec::new();
    /// assert_eq!(seq.height(), -1);
    /// for i in 0..10 {
    ///     seq.push_front(i);
    /// }
    /// assert!(seq.height() <= 4);
    /// ```
    #[must_use]
    pub fn height(&self) -> isize {
        self.raw.height().map_or(-1, isize::from)
    }

    /// Clears the sequence, removing all elements.
    ///
    /// # Complexity
    ///
    /// O(n)
    pub fn clear(&mut self) {
        self.raw.clear();
    }

    /// Returns a reference to the element at position `index`.
    ///
    /// # Errors
    ///
    /// Returns [`OutOfRange::Index`] if `index >= len()`.
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn at(&self, index: usize) -> Result<&T, OutOfRange> {
        let len = self.len();
        self.raw.get(index).ok_or(OutOfRange::Index { index, len })
    }

    /// Returns a mutable reference to the element at position `index`.
    ///
    /// # Errors
    ///
    /// Returns [`OutOfRange::Index`] if `index >= len()`.
    ///
    /// # Examples
    ///
    /// ```
    /// use osvec::OSTreeVec;
    ///
    /// let mut seq = OSTreeVec::from([1, 2, 3]);
    /// *seq.at_mut(1)? *= 10;
    /// assert_eq!(seq.at(1), Ok(&20));
    /// # Ok::<(), osvec::OutOfRange>(())
    /// ```
    pub fn at_mut(&mut self, index: usize) -> Result<&mut T, OutOfRange> {
        let len = self.len();
        self.raw.get_mut(index).ok_or(OutOfRange::Index { index, len })
    }

    /// Returns a reference to the element at position `index`, or `None` if
    /// it is out of bounds.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.raw.get(index)
    }

    /// Returns a mutable reference to the element at position `index`, or
    /// `None` if it is out of bounds.
    #[must_use]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.raw.get_mut(index)
    }

    /// Inserts `value` so that it becomes the element at position `index`,
    /// shifting every element at `index` or after one position to the right.
    /// `index == len()` appends.
    ///
    /// # Errors
    ///
    /// Returns [`OutOfRange::Index`] if `index > len()`; the sequence is left
    /// unchanged and `value` is dropped.
    ///
    /// # Complexity
    ///
    /// O(log n)
    ///
    /// # Examples
    ///
    /// ```
    /// use osvec::OSTreeVec;
    ///
    /// let mut seq = OSTreeVec::from([1, 3]);
    /// seq.insert(1, 2)?;
    /// seq.insert(3, 4)?;
    /// assert!(seq.insert(9, 0).is_err());
    /// assert_eq!(seq, OSTreeVec::from([1, 2, 3, 4]));
    /// # Ok::<(), osvec::OutOfRange>(())
    /// ```
    pub fn insert(&mut self, index: usize, value: T) -> Result<(), OutOfRange> {
        self.raw.insert(index, value)
    }

    /// Removes and returns the element at position `index`, shifting every
    /// element after it one position to the left.
    ///
    /// # Errors
    ///
    /// Returns [`OutOfRange::Index`] if `index >= len()`.
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn erase(&mut self, index: usize) -> Result<T, OutOfRange> {
        self.raw.remove(index)
    }

    /// Appends an element to the back of the sequence.
    pub fn push_back(&mut self, value: T) {
        let len = self.len();
        if self.raw.insert(len, value).is_err() {
            unreachable!("appending at len is always in range");
        }
    }

    /// Prepends an element to the front of the sequence.
    pub fn push_front(&mut self, value: T) {
        if self.raw.insert(0, value).is_err() {
            unreachable!("prepending is always in range");
        }
    }

    /// Removes the last element and returns it, or `None` if the sequence is
    /// empty.
    pub fn pop_back(&mut self) -> Option<T> {
        let last = self.len().checked_sub(1)?;
        self.raw.remove(last).ok()
    }

    /// Removes the first element and returns it, or `None` if the sequence is
    /// empty.
    pub fn pop_front(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }
        self.raw.remove(0).ok()
    }

    /// Returns the first element, or `None` if the sequence is empty.
    ///
    /// # Complexity
    ///
    /// O(log n)
    #[must_use]
    pub fn first(&self) -> Option<&T> {
        self.raw.first().map(|h| self.raw.value(h))
    }

    /// Returns the last element, or `None` if the sequence is empty.
    #[must_use]
    pub fn last(&self) -> Option<&T> {
        self.raw.last().map(|h| self.raw.value(h))
    }

    /// Gets an iterator over the elements in position order.
    ///
    /// Stepping follows parent links, so a full traversal is O(n) and each
    /// step is amortized O(1).
    ///
    /// # Examples
    ///
    /// ```
    /// use osvec::OSTreeVec;
    ///
    /// let mut seq = OSTreeVec::new();
    /// for i in 0..5 {
    ///     seq.push_front(i);
    /// }
    /// let items: Vec<_> = seq.iter().copied().collect();
    /// assert_eq!(items, [4, 3, 2, 1, 0]);
    /// ```
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            tree: &self.raw,
            front: self.raw.first(),
            back: self.raw.last(),
            remaining: self.len(),
        }
    }
}

impl<T: Clone> Clone for OSTreeVec<T> {
    fn clone(&self) -> Self {
        OSTreeVec { raw: self.raw.clone() }
    }
}

impl<T: Hash> Hash for OSTreeVec<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.len().hash(state);
        for value in self {
            value.hash(state);
        }
    }
}

impl<T: PartialEq> PartialEq for OSTreeVec<T> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<T: Eq> Eq for OSTreeVec<T> {}

impl<T: PartialOrd> PartialOrd for OSTreeVec<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.iter().partial_cmp(other.iter())
    }
}

impl<T: Ord> Ord for OSTreeVec<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.iter().cmp(other.iter())
    }
}

impl<T: fmt::Debug> fmt::Debug for OSTreeVec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T> Default for OSTreeVec<T> {
    fn default() -> Self {
        OSTreeVec::new()
    }
}

impl<T> FromIterator<T> for OSTreeVec<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut seq = OSTreeVec::new();
        seq.extend(iter);
        seq
    }
}

impl<T> Extend<T> for OSTreeVec<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.push_back(value);
        }
    }
}

impl<'a, T: Copy + 'a> Extend<&'a T> for OSTreeVec<T> {
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        for &value in iter {
            self.push_back(value);
        }
    }
}

impl<T, const N: usize> From<[T; N]> for OSTreeVec<T> {
    fn from(arr: [T; N]) -> Self {
        arr.into_iter().collect()
    }
}

impl<'a, T> IntoIterator for &'a OSTreeVec<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

impl<T> IntoIterator for OSTreeVec<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    /// Gets an owning iterator over the elements in position order.
    ///
    /// # Examples
    ///
    /// ```
    /// use osvec::OSTreeVec;
    ///
    /// let seq = OSTreeVec::from(["x", "y"]);
    /// let mut iter = seq.into_iter();
    /// assert_eq!(iter.next(), Some("x"));
    /// assert_eq!(iter.next_back(), Some("y"));
    /// ```
    fn into_iter(mut self) -> IntoIter<T> {
        IntoIter {
            inner: self.raw.drain_to_vec().into_iter(),
        }
    }
}

/// Indexes into the sequence by position.
///
/// # Panics
///
/// Panics if `index` is out of bounds.
///
/// # Examples
///
/// ```
/// use osvec::OSTreeVec;
///
/// let seq = OSTreeVec::from([10, 20]);
/// assert_eq!(seq[1], 20);
/// ```
impl<T> Index<usize> for OSTreeVec<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        self.get(index).expect("index out of bounds")
    }
}

/// Mutably indexes into the sequence by position.
///
/// # Panics
///
/// Panics if `index` is out of bounds.
///
/// # Examples
///
/// ```
/// use osvec::OSTreeVec;
///
/// let mut seq = OSTreeVec::from([10, 20]);
/// seq[0] = 5;
/// assert_eq!(seq.first(), Some(&5));
/// ```
impl<T> IndexMut<usize> for OSTreeVec<T> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        self.get_mut(index).expect("index out of bounds")
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        if self.remaining == 0 {
            return None;
        }
        let handle = self.front?;
        self.remaining -= 1;
        self.front = self.tree.next(handle);
        Some(self.tree.value(handle))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> DoubleEndedIterator for Iter<'_, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let handle = self.back?;
        self.remaining -= 1;
        self.back = self.tree.prev(handle);
        Some(self.tree.value(handle))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {
    fn len(&self) -> usize {
        self.remaining
    }
}

impl<T> FusedIterator for Iter<'_, T> {}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Iter {
            tree: self.tree,
            front: self.front,
            back: self.back,
            remaining: self.remaining,
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Iter<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> DoubleEndedIterator for IntoIter<T> {
    fn next_back(&mut self) -> Option<T> {
        self.inner.next_back()
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<T> FusedIterator for IntoIter<T> {}

impl<T: fmt::Debug> fmt::Debug for IntoIter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntoIter").field("len", &self.inner.len()).finish()
    }
}

impl<T> Default for IntoIter<T> {
    /// Creates an empty `os_tree_vec::IntoIter`.
    ///
    /// ```
    /// # use osvec::os_tree_vec;
    /// let iter: os_tree_vec::IntoIter<u8> = Default::default();
    /// assert_eq!(iter.len(), 0);
    /// ```
    fn default() -> Self {
        IntoIter {
            inner: alloc::vec::Vec::new().into_iter(),
        }
    }
}
