//! A growable contiguous array that manages its own storage through a
//! pluggable [`Allocator`].
//!
//! [`Vector`] keeps its elements in a single buffer obtained from its
//! allocator, grows it by `max(required, capacity + capacity / 2 + 1)` slots,
//! and reports every failure (bad index, empty vector, oversized request,
//! exhausted allocator) as a typed [`Error`] after leaving itself unchanged.
//! Traversal goes through random-access [`Cursor`]s in either direction, or
//! through ordinary Rust iterators.

pub mod cursor;
pub mod error;
pub mod iter;
mod raw;
mod vector;

pub use cursor::{Cursor, CursorMut, Direction, Forward, Position, Reverse};
pub use error::{Error, ErrorKind, Result};
pub use iter::IntoIter;
pub use raw::{DEFAULT_CAPACITY, grown_capacity};
pub use vector::Vector;
pub use vessel_alloc::{AllocError, Allocator, Budget, BudgetAllocator, Global};

#[cfg(test)]
mod tests;
