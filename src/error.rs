use core::fmt;

/// The error returned when an operation addresses something that is not there.
///
/// Every variant is a caller error: the operation that returned it left the
/// collection exactly as it was.
///
/// # Examples
///
/// ```
/// use osvec::{OSTreeVec, OutOfRange};
///
/// let mut seq = OSTreeVec::from(['a', 'b']);
/// assert_eq!(seq.erase(2), Err(OutOfRange::Index { index: 2, len: 2 }));
/// assert_eq!(seq.len(), 2);
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum OutOfRange {
    /// A position outside the valid range of an [`OSTreeVec`](crate::OSTreeVec).
    Index {
        /// The position that was asked for.
        index: usize,
        /// The length of the sequence at the time of the call.
        len: usize,
    },
    /// `min` or `extract_min` on a [`HandleHeap`](crate::HandleHeap) with no elements.
    EmptyHeap,
    /// A [`HeapHandle`](crate::HeapHandle) whose element has already been removed.
    InvalidHandle,
}

impl fmt::Display for OutOfRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutOfRange::Index { index, len } => {
                write!(f, "index out of range: the len is {len} but the index is {index}")
            }
            OutOfRange::EmptyHeap => f.write_str("heap is empty"),
            OutOfRange::InvalidHandle => f.write_str("handle is no longer valid (element was removed)"),
        }
    }
}

impl core::error::Error for OutOfRange {}
