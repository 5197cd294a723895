//! Allocator capability consumed by the `vessel` containers.
//!
//! A container never talks to the system allocator directly. It asks an
//! [`Allocator`] for raw, uninitialized blocks described by a [`Layout`],
//! constructs and destroys elements through it, and returns the blocks when
//! it is done. Two implementations ship with this crate:
//!
//! - [`Global`]: stateless, backed by `std::alloc`.
//! - [`BudgetAllocator`]: charges every block against a shared [`Budget`] and
//!   fails once the budget is exhausted.
//!
//! [`Layout`]: std::alloc::Layout

mod allocator;
mod error;

pub mod budget;

pub use allocator::{Allocator, Global, max_elements};
pub use budget::{Budget, BudgetAllocator};
pub use error::AllocError;
