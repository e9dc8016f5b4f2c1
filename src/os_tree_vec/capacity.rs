use super::OSTreeVec;
use crate::raw::RawTree;

impl<T> OSTreeVec<T> {
    /// Creates an empty sequence with room for at least `capacity` elements
    /// before the node storage reallocates.
    ///
    /// # Examples
    ///
    /// ```
    /// use osvec::OSTreeVec;
    ///
    /// let seq: OSTreeVec<i32> = OSTreeVec::with_capacity(16);
    /// assert!(seq.is_empty());
    /// ```
    ///
    /// # Complexity
    ///
    /// O(capacity) for memory allocation.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        OSTreeVec {
            raw: RawTree::with_capacity(capacity),
        }
    }

    /// Returns how many elements the sequence can hold without reallocating.
    ///
    /// # Examples
    ///
    /// ```
    /// use osvec::OSTreeVec;
    ///
    /// let seq: OSTreeVec<i32> = OSTreeVec::with_capacity(32);
    /// assert!(seq.capacity() >= 32);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.raw.capacity()
    }
}
