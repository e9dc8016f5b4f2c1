//! Positional sequences and handle-addressable heaps for Rust.
//!
//! This crate provides two collections:
//!
//! - [`OSTreeVec`] - a sequence stored in an order-statistic AVL tree. Reading,
//!   inserting and erasing at any position costs O(log n).
//! - [`HandleHeap`] - a binary min-heap whose [`push`](HandleHeap::push) returns a
//!   [`HeapHandle`]. The handle follows its element as the heap reorders, so the
//!   element can later be read, changed or erased in O(log n).
//!
//! # Example
//!
//! ```
//! use osvec::{HandleHeap, OSTreeVec};
//!
//! // A sequence with cheap insertion in the middle.
//! let mut line = OSTreeVec::from(['h', 'l', 'o']);
//! line.insert(1, 'e')?;
//! line.insert(2, 'l')?;
//! assert_eq!(line.iter().collect::<String>(), "hello");
//! assert_eq!(line[4], 'o');
//!
//! // A priority queue with decrease-key.
//! let mut queue = HandleHeap::new();
//! let far = queue.push(40);
//! queue.push(15);
//! queue.change(far, |d| *d = 3)?;
//! assert_eq!(queue.extract_min(), Ok(3));
//! # Ok::<(), osvec::OutOfRange>(())
//! ```
//!
//! # Features
//!
//! - **`no_std` compatible** - Only requires `alloc`, no standard library dependency
//! - **No unsafe code** - Tree nodes live in an arena and link to each other by index
//! - **Recoverable errors** - Out-of-range positions and stale handles return [`OutOfRange`]
//!   and leave the collection untouched
//!
//! # Implementation
//!
//! Both collections store their elements in a slot arena addressed by small
//! `NonZero` handles. The tree caches the height and the subtree size of every
//! node; the heap keeps a table from handle to array position that every swap
//! updates, plus a generation per slot so that a handle to a removed element is
//! recognised even after its slot is reused.

#![no_std]
// These forbid rules and lint groups are meant to be very restrictive.
#![forbid(unsafe_code)]
#![forbid(keyword_idents)]
#![forbid(non_ascii_idents)]
#![forbid(unreachable_pub)]
#![warn(clippy::all)]
#![warn(clippy::cargo)]
#![warn(clippy::pedantic)]
// Enable coverage attributes for nightly builds.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

extern crate alloc;

mod error;
mod raw;

pub mod handle_heap;
pub mod os_tree_vec;

pub use error::OutOfRange;
pub use handle_heap::{Compare, HandleHeap, HeapHandle, Natural, Reversed};
pub use os_tree_vec::OSTreeVec;
