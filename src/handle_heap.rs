use alloc::vec::Vec;
use core::fmt;
use core::iter::FusedIterator;
use core::slice;

use crate::OutOfRange;
use crate::raw::{Arena, Generation, Handle};

mod compare;

pub use compare::{Compare, Natural, Reversed};

/// A binary min-heap whose elements can be changed or removed through
/// handles.
///
/// [`push`](Self::push) returns a [`HeapHandle`] naming the new element. The
/// handle keeps naming that element however often sifting moves it around the
/// backing array, until the element leaves the heap through
/// [`extract_min`](Self::extract_min), [`erase`](Self::erase) or
/// [`clear`](Self::clear). After that every operation taking the handle fails
/// with [`OutOfRange::InvalidHandle`], even if the storage behind it has been
/// reused by a later `push`.
///
/// Ordering is decided by the comparator `C`, [`Natural`] by default.
///
/// # Examples
///
/// ```
/// use osvec::HandleHeap;
///
/// let mut heap = HandleHeap::new();
/// heap.push(5);
/// let h = heap.push(10);
/// heap.push(8);
/// assert_eq!(heap.min(), Ok(&5));
///
/// heap.change(h, |v| *v = 1)?;
/// assert_eq!(heap.min(), Ok(&1));
/// assert_eq!(heap.get(h), Ok(&1));
///
/// assert_eq!(heap.extract_min(), Ok(1));
/// assert!(heap.get(h).is_err());
/// # Ok::<(), osvec::OutOfRange>(())
/// ```
#[derive(Clone)]
pub struct HandleHeap<T, C = Natural> {
    /// Heap-ordered slots: children of `p` at `2p + 1` and `2p + 2`.
    slots: Vec<Entry<T>>,
    /// Current slot index of each live element, keyed by its handle.
    positions: Arena<usize>,
    cmp: C,
}

#[derive(Clone)]
struct Entry<T> {
    value: T,
    id: Handle,
}

/// Names one element of a [`HandleHeap`].
///
/// Handles are plain data: they do not borrow the heap and can be copied
/// freely. A handle is only meaningful to the heap that issued it.
///
/// Once its element leaves the heap a handle stays invalid for good: the
/// storage it names is reused only until its reuse counter runs out, and is
/// then retired rather than wrapped around.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct HeapHandle {
    id: Handle,
    generation: Generation,
}

/// An iterator over the elements of a `HandleHeap` in array order.
///
/// This `struct` is created by the [`iter`] method on [`HandleHeap`]. The
/// first element is the minimum; the order of the rest is unspecified.
///
/// [`iter`]: HandleHeap::iter
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Iter<'a, T> {
    inner: slice::Iter<'a, Entry<T>>,
}

impl<T> HandleHeap<T> {
    /// Makes a new, empty min-heap ordered by [`Ord`].
    ///
    /// Does not allocate anything on its own. Other orderings are built with
    /// [`with_comparator`](Self::with_comparator).
    #[must_use]
    pub const fn new() -> Self {
        Self::with_comparator(Natural)
    }

    /// Makes a new, empty min-heap with room for at least `capacity` elements.
    ///
    /// # Examples
    ///
    /// ```
    /// use osvec::HandleHeap;
    ///
    /// let heap: HandleHeap<u8> = HandleHeap::with_capacity(64);
    /// assert!(heap.capacity() >= 64);
    /// ```
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        HandleHeap {
            slots: Vec::with_capacity(capacity),
            positions: Arena::with_capacity(capacity),
            cmp: Natural,
        }
    }
}

impl<T, C> HandleHeap<T, C> {
    /// Makes a new, empty heap ordered by `cmp`.
    #[must_use]
    pub const fn with_comparator(cmp: C) -> Self {
        HandleHeap {
            slots: Vec::new(),
            positions: Arena::new(),
            cmp,
        }
    }

    /// Returns the number of elements in the heap.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns `true` if the heap contains no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Returns how many elements the heap can hold without reallocating.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    /// Returns the comparator ordering this heap.
    #[must_use]
    pub fn comparator(&self) -> &C {
        &self.cmp
    }

    /// Returns the minimum element.
    ///
    /// # Errors
    ///
    /// Returns [`OutOfRange::EmptyHeap`] if the heap is empty.
    ///
    /// # Complexity
    ///
    /// O(1)
    pub fn min(&self) -> Result<&T, OutOfRange> {
        self.peek().ok_or(OutOfRange::EmptyHeap)
    }

    /// Returns the minimum element, or `None` if the heap is empty.
    #[must_use]
    pub fn peek(&self) -> Option<&T> {
        self.slots.first().map(|entry| &entry.value)
    }

    /// Returns the element named by `handle`.
    ///
    /// # Errors
    ///
    /// Returns [`OutOfRange::InvalidHandle`] if the element has left the heap.
    pub fn get(&self, handle: HeapHandle) -> Result<&T, OutOfRange> {
        let index = self.position(handle)?;
        Ok(&self.slots[index].value)
    }

    /// Returns `true` if the element named by `handle` is still in the heap.
    #[must_use]
    pub fn contains(&self, handle: HeapHandle) -> bool {
        self.position(handle).is_ok()
    }

    /// Removes every element. All outstanding handles become invalid.
    pub fn clear(&mut self) {
        log::trace!("heap: clearing, retiring {} handles", self.slots.len());
        self.slots.clear();
        self.positions.retire_all();
    }

    /// Gets an iterator over the elements in array order.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            inner: self.slots.iter(),
        }
    }

    fn position(&self, handle: HeapHandle) -> Result<usize, OutOfRange> {
        self.positions
            .try_get(handle.id, handle.generation)
            .copied()
            .ok_or(OutOfRange::InvalidHandle)
    }

    /// Swaps two slots and points both handles at their new positions.
    fn swap(&mut self, i: usize, j: usize) {
        self.slots.swap(i, j);
        *self.positions.get_mut(self.slots[i].id) = i;
        *self.positions.get_mut(self.slots[j].id) = j;
    }
}

impl<T, C: Compare<T>> HandleHeap<T, C> {
    /// Adds an element and returns a handle naming it.
    ///
    /// # Panics
    ///
    /// Panics if the heap would hold more live elements than a handle can
    /// address.
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn push(&mut self, value: T) -> HeapHandle {
        let index = self.slots.len();
        let id = self.positions.alloc(index);
        let generation = self.positions.generation(id);
        self.slots.push(Entry { value, id });
        self.sift_up(index);
        HeapHandle { id, generation }
    }

    /// Removes and returns the minimum element. Its handle becomes invalid.
    ///
    /// # Errors
    ///
    /// Returns [`OutOfRange::EmptyHeap`] if the heap is empty.
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn extract_min(&mut self) -> Result<T, OutOfRange> {
        if self.is_empty() {
            return Err(OutOfRange::EmptyHeap);
        }
        Ok(self.remove_at(0))
    }

    /// Removes and returns the minimum element, or `None` if the heap is
    /// empty.
    pub fn pop(&mut self) -> Option<T> {
        self.extract_min().ok()
    }

    /// Modifies the element named by `handle` in place, then moves it to
    /// where it now belongs.
    ///
    /// `f` must only modify the element it is given. The heap relies on every
    /// other element keeping its place relative to its neighbours; comparing
    /// the changed element with its parent once is enough to pick the
    /// direction it travels.
    ///
    /// # Errors
    ///
    /// Returns [`OutOfRange::InvalidHandle`] if the element has left the heap.
    /// `f` is not called in that case.
    ///
    /// # Complexity
    ///
    /// O(log n)
    ///
    /// # Examples
    ///
    /// ```
    /// use osvec::HandleHeap;
    ///
    /// let mut heap = HandleHeap::new();
    /// let low = heap.push(1);
    /// heap.push(4);
    /// heap.change(low, |v| *v = 7)?;
    /// assert_eq!(heap.min(), Ok(&4));
    /// # Ok::<(), osvec::OutOfRange>(())
    /// ```
    pub fn change<F>(&mut self, handle: HeapHandle, f: F) -> Result<(), OutOfRange>
    where
        F: FnOnce(&mut T),
    {
        let index = self.position(handle)?;
        f(&mut self.slots[index].value);
        self.restore(index);
        Ok(())
    }

    /// Removes and returns the element named by `handle`, wherever it sits in
    /// the heap. The handle becomes invalid.
    ///
    /// # Errors
    ///
    /// Returns [`OutOfRange::InvalidHandle`] if the element has already left
    /// the heap.
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn erase(&mut self, handle: HeapHandle) -> Result<T, OutOfRange> {
        let index = self.position(handle)?;
        Ok(self.remove_at(index))
    }

    /// Swaps slot `index` with the last one, pops it, and re-sifts whatever
    /// landed at `index`.
    fn remove_at(&mut self, index: usize) -> T {
        let last = self.slots.len() - 1;
        if index != last {
            self.swap(index, last);
        }
        let Some(entry) = self.slots.pop() else {
            unreachable!("`remove_at` is only called on a non-empty heap");
        };
        self.positions.take(entry.id);
        log::trace!("heap: handle {:?} retired from slot {index}", entry.id);
        if index < self.slots.len() {
            self.restore(index);
        }
        entry.value
    }

    /// Moves slot `index` up if it is now less than its parent, else down.
    fn restore(&mut self, index: usize) {
        if index != 0 && self.less(index, parent(index)) {
            self.sift_up(index);
        } else {
            self.sift_down(index);
        }
    }

    fn sift_up(&mut self, mut index: usize) {
        while index > 0 {
            let p = parent(index);
            if !self.less(index, p) {
                break;
            }
            self.swap(index, p);
            index = p;
        }
    }

    fn sift_down(&mut self, mut index: usize) {
        let len = self.slots.len();
        loop {
            let left = 2 * index + 1;
            if left >= len {
                break;
            }
            let right = left + 1;
            let child = if right < len && self.less(right, left) { right } else { left };
            if !self.less(child, index) {
                break;
            }
            self.swap(index, child);
            index = child;
        }
    }

    #[inline]
    fn less(&self, i: usize, j: usize) -> bool {
        self.cmp.less(&self.slots[i].value, &self.slots[j].value)
    }
}

#[inline]
fn parent(index: usize) -> usize {
    debug_assert!(index > 0, "the root slot has no parent");
    (index - 1) / 2
}

impl<T, C: Default> Default for HandleHeap<T, C> {
    fn default() -> Self {
        Self::with_comparator(C::default())
    }
}

impl<T: fmt::Debug, C> fmt::Debug for HandleHeap<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T, C: Compare<T>> Extend<T> for HandleHeap<T, C> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.push(value);
        }
    }
}

impl<T, C: Compare<T> + Default> FromIterator<T> for HandleHeap<T, C> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut heap = Self::default();
        heap.extend(iter);
        heap
    }
}

impl<'a, T, C> IntoIterator for &'a HandleHeap<T, C> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        self.inner.next().map(|entry| &entry.value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> DoubleEndedIterator for Iter<'_, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|entry| &entry.value)
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<T> FusedIterator for Iter<'_, T> {}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Iter {
            inner: self.inner.clone(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Iter<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}
