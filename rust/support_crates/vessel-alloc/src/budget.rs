//! Byte budgets and an allocator that charges against them.

use std::alloc::Layout;
use std::ptr::NonNull;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::{AllocError, Allocator, Global, max_elements};

/// A shared byte budget.
///
/// Cloning a `Budget` yields another handle to the same pool; every
/// [`BudgetAllocator`] built over it draws from and returns to that pool.
#[derive(Clone)]
pub struct Budget(Arc<BudgetPool>);

struct BudgetPool {
    limit: u64,
    remaining: AtomicU64,
}

impl Budget {
    /// Creates a budget holding `limit` bytes.
    pub fn new(limit: u64) -> Budget {
        Budget(Arc::new(BudgetPool {
            limit,
            remaining: AtomicU64::new(limit),
        }))
    }

    /// Total number of bytes this budget was created with.
    pub fn limit(&self) -> u64 {
        self.0.limit
    }

    /// Bytes still available.
    ///
    /// **Note**: intended for diagnostics; the value may be stale as soon as
    /// another handle allocates.
    pub fn remaining(&self) -> u64 {
        self.0.remaining.load(Ordering::Relaxed)
    }

    /// Bytes currently charged against the budget.
    pub fn used(&self) -> u64 {
        self.limit() - self.remaining()
    }

    /// Takes `amount` bytes out of the pool if enough remain.
    fn charge(&self, amount: u64) -> Result<(), AllocError> {
        self.0
            .remaining
            .fetch_update(Ordering::AcqRel, Ordering::Relaxed, |current| {
                current.checked_sub(amount)
            })
            .map(|_| ())
            .map_err(|remaining| AllocError::BudgetExhausted {
                requested: amount,
                remaining,
            })
    }

    /// Returns `amount` bytes to the pool.
    fn refund(&self, amount: u64) {
        let previous = self.0.remaining.fetch_add(amount, Ordering::AcqRel);
        debug_assert!(previous + amount <= self.0.limit);
    }
}

impl PartialEq for Budget {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Budget {}

impl std::fmt::Debug for Budget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Budget")
            .field("limit", &self.limit())
            .field("remaining", &self.remaining())
            .finish()
    }
}

/// An allocator that charges every block against a [`Budget`] before
/// forwarding the request to an inner allocator.
///
/// Allocations that would overdraw the budget fail with
/// [`AllocError::BudgetExhausted`]. The allocator always travels with the
/// memory it produced, so all propagation flags are set.
#[derive(Clone, Debug)]
pub struct BudgetAllocator<A = Global> {
    budget: Budget,
    inner: A,
}

impl BudgetAllocator<Global> {
    /// Creates an allocator over `budget` backed by the system allocator.
    pub fn new(budget: Budget) -> BudgetAllocator<Global> {
        BudgetAllocator {
            budget,
            inner: Global,
        }
    }
}

impl<A> BudgetAllocator<A> {
    /// Creates an allocator over `budget` backed by `inner`.
    pub fn with_inner(budget: Budget, inner: A) -> BudgetAllocator<A> {
        BudgetAllocator { budget, inner }
    }

    /// The budget this allocator charges.
    pub fn budget(&self) -> &Budget {
        &self.budget
    }

    /// The allocator that supplies the actual memory.
    pub fn inner(&self) -> &A {
        &self.inner
    }
}

unsafe impl<A: Allocator> Allocator for BudgetAllocator<A> {
    const PROPAGATE_ON_COPY_ASSIGNMENT: bool = true;
    const PROPAGATE_ON_MOVE_ASSIGNMENT: bool = true;
    const PROPAGATE_ON_SWAP: bool = true;

    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        let amount = layout.size() as u64;
        self.budget.charge(amount)?;
        self.inner.allocate(layout).inspect_err(|_| {
            self.budget.refund(amount);
        })
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        unsafe { self.inner.deallocate(ptr, layout) };
        self.budget.refund(layout.size() as u64);
    }

    unsafe fn shrink(
        &self,
        ptr: NonNull<u8>,
        old_layout: Layout,
        new_layout: Layout,
    ) -> Result<NonNull<u8>, AllocError> {
        let shrunk = unsafe { self.inner.shrink(ptr, old_layout, new_layout)? };
        self.budget
            .refund((old_layout.size() - new_layout.size()) as u64);
        Ok(shrunk)
    }

    fn max_size<T>(&self) -> usize {
        let size = std::mem::size_of::<T>();
        if size == 0 {
            return max_elements::<T>();
        }
        let by_budget = usize::try_from(self.budget.limit()).unwrap_or(usize::MAX) / size;
        by_budget.min(self.inner.max_size::<T>())
    }

    fn is_equal(&self, other: &Self) -> bool {
        self.budget == other.budget && self.inner.is_equal(&other.inner)
    }
}
