//! An instrumented allocator for verifying allocation behavior.

use std::alloc::Layout;
use std::mem;
use std::ptr::{self, NonNull};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use vessel_alloc::{AllocError, Allocator, Global, max_elements};

/// An allocator that counts what passes through it and can be told to fail.
///
/// Besides blocks, it counts element construction and destruction in bytes:
/// once a container has let go of every element, the two byte counts match.
///
/// Every call to a constructor creates a distinct arena: instances from
/// different constructors compare unequal, clones of one instance share the
/// arena and its counters. `PROPAGATE` sets all three propagation flags.
#[derive(Clone)]
pub struct TrackingAllocator<const PROPAGATE: bool = false> {
    state: Arc<TrackerState>,
}

/// A [`TrackingAllocator`] that travels with its memory on copy, move and swap.
pub type PropagatingTracker = TrackingAllocator<true>;

struct TrackerState {
    allocations: AtomicUsize,
    deallocations: AtomicUsize,
    failed_allocations: AtomicUsize,
    in_place_shrinks: AtomicUsize,
    live_bytes: AtomicUsize,
    peak_bytes: AtomicUsize,
    constructs: AtomicUsize,
    destroys: AtomicUsize,
    constructed_bytes: AtomicUsize,
    destroyed_bytes: AtomicUsize,
    /// When non-zero, the allocation that brings it to zero fails.
    fail_countdown: AtomicUsize,
    /// When non-zero, the `construct` that brings it to zero panics.
    construct_countdown: AtomicUsize,
    in_place_shrink: AtomicBool,
    max_len: usize,
}

/// A snapshot of a [`TrackingAllocator`]'s counters.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TrackerStats {
    pub allocations: usize,
    pub deallocations: usize,
    pub live_allocations: usize,
    pub failed_allocations: usize,
    pub in_place_shrinks: usize,
    pub live_bytes: usize,
    pub peak_bytes: usize,
    /// Calls to `construct`.
    pub constructs: usize,
    /// Calls to `destroy`, each covering one value or a slice of them.
    pub destroys: usize,
    pub constructed_bytes: usize,
    pub destroyed_bytes: usize,
}

impl TrackingAllocator<false> {
    /// Creates a tracker in a fresh arena.
    pub fn new() -> TrackingAllocator<false> {
        Self::build(usize::MAX)
    }

    /// Creates a tracker whose `max_size` is capped at `max_len` elements.
    pub fn with_max_len(max_len: usize) -> TrackingAllocator<false> {
        Self::build(max_len)
    }
}

impl TrackingAllocator<true> {
    /// Creates a propagating tracker in a fresh arena.
    pub fn propagating() -> TrackingAllocator<true> {
        Self::build(usize::MAX)
    }
}

impl Default for TrackingAllocator<false> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const PROPAGATE: bool> TrackingAllocator<PROPAGATE> {
    fn build(max_len: usize) -> Self {
        TrackingAllocator {
            state: Arc::new(TrackerState {
                allocations: AtomicUsize::new(0),
                deallocations: AtomicUsize::new(0),
                failed_allocations: AtomicUsize::new(0),
                in_place_shrinks: AtomicUsize::new(0),
                live_bytes: AtomicUsize::new(0),
                peak_bytes: AtomicUsize::new(0),
                constructs: AtomicUsize::new(0),
                destroys: AtomicUsize::new(0),
                constructed_bytes: AtomicUsize::new(0),
                destroyed_bytes: AtomicUsize::new(0),
                fail_countdown: AtomicUsize::new(0),
                construct_countdown: AtomicUsize::new(0),
                in_place_shrink: AtomicBool::new(true),
                max_len,
            }),
        }
    }

    pub fn stats(&self) -> TrackerStats {
        let s = &self.state;
        let allocations = s.allocations.load(Ordering::Relaxed);
        let deallocations = s.deallocations.load(Ordering::Relaxed);
        TrackerStats {
            allocations,
            deallocations,
            live_allocations: allocations - deallocations,
            failed_allocations: s.failed_allocations.load(Ordering::Relaxed),
            in_place_shrinks: s.in_place_shrinks.load(Ordering::Relaxed),
            live_bytes: s.live_bytes.load(Ordering::Relaxed),
            peak_bytes: s.peak_bytes.load(Ordering::Relaxed),
            constructs: s.constructs.load(Ordering::Relaxed),
            destroys: s.destroys.load(Ordering::Relaxed),
            constructed_bytes: s.constructed_bytes.load(Ordering::Relaxed),
            destroyed_bytes: s.destroyed_bytes.load(Ordering::Relaxed),
        }
    }

    /// Makes the next allocation fail.
    pub fn fail_next_allocation(&self) {
        self.fail_allocation_after(0);
    }

    /// Lets `successes` allocations through, then fails the one after.
    pub fn fail_allocation_after(&self, successes: usize) {
        self.state
            .fail_countdown
            .store(successes + 1, Ordering::Relaxed);
    }

    /// Lets `successes` calls to `construct` through, then panics in the one
    /// after.
    pub fn panic_on_construct_after(&self, successes: usize) {
        self.state
            .construct_countdown
            .store(successes + 1, Ordering::Relaxed);
    }

    /// Enables or disables support for in-place shrinking.
    pub fn set_in_place_shrink(&self, enabled: bool) {
        self.state.in_place_shrink.store(enabled, Ordering::Relaxed);
    }

    /// Fails when the countdown armed by `fail_allocation_after` runs out.
    fn should_fail(&self) -> bool {
        run_down(&self.state.fail_countdown)
    }

    fn add_live_bytes(&self, bytes: usize) {
        let live = self.state.live_bytes.fetch_add(bytes, Ordering::Relaxed) + bytes;
        self.state.peak_bytes.fetch_max(live, Ordering::Relaxed);
    }
}

unsafe impl<const PROPAGATE: bool> Allocator for TrackingAllocator<PROPAGATE> {
    const PROPAGATE_ON_COPY_ASSIGNMENT: bool = PROPAGATE;
    const PROPAGATE_ON_MOVE_ASSIGNMENT: bool = PROPAGATE;
    const PROPAGATE_ON_SWAP: bool = PROPAGATE;

    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        if self.should_fail() {
            self.state.failed_allocations.fetch_add(1, Ordering::Relaxed);
            return Err(AllocError::OutOfMemory {
                size: layout.size(),
                align: layout.align(),
            });
        }
        let ptr = Global.allocate(layout)?;
        self.state.allocations.fetch_add(1, Ordering::Relaxed);
        self.add_live_bytes(layout.size());
        Ok(ptr)
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        unsafe { Global.deallocate(ptr, layout) };
        self.state.deallocations.fetch_add(1, Ordering::Relaxed);
        self.state
            .live_bytes
            .fetch_sub(layout.size(), Ordering::Relaxed);
    }

    unsafe fn shrink(
        &self,
        ptr: NonNull<u8>,
        old_layout: Layout,
        new_layout: Layout,
    ) -> Result<NonNull<u8>, AllocError> {
        if !self.state.in_place_shrink.load(Ordering::Relaxed) {
            return Err(AllocError::Unsupported);
        }
        let shrunk = unsafe { Global.shrink(ptr, old_layout, new_layout)? };
        self.state.in_place_shrinks.fetch_add(1, Ordering::Relaxed);
        self.state
            .live_bytes
            .fetch_sub(old_layout.size() - new_layout.size(), Ordering::Relaxed);
        Ok(shrunk)
    }

    unsafe fn construct<T>(&self, ptr: *mut T, value: T) {
        if run_down(&self.state.construct_countdown) {
            panic!("TrackingAllocator: construct refused");
        }
        self.state.constructs.fetch_add(1, Ordering::Relaxed);
        self.state
            .constructed_bytes
            .fetch_add(mem::size_of::<T>(), Ordering::Relaxed);
        unsafe { ptr.write(value) }
    }

    unsafe fn destroy<T: ?Sized>(&self, ptr: *mut T) {
        let bytes = unsafe { mem::size_of_val(&*ptr) };
        self.state.destroys.fetch_add(1, Ordering::Relaxed);
        self.state
            .destroyed_bytes
            .fetch_add(bytes, Ordering::Relaxed);
        unsafe { ptr::drop_in_place(ptr) }
    }

    fn max_size<T>(&self) -> usize {
        self.state.max_len.min(max_elements::<T>())
    }

    fn is_equal(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.state, &other.state)
    }
}

/// Decrements an armed countdown; `true` when it reaches zero.
fn run_down(countdown: &AtomicUsize) -> bool {
    let remaining = countdown.load(Ordering::Relaxed);
    if remaining == 0 {
        return false;
    }
    countdown.store(remaining - 1, Ordering::Relaxed);
    remaining == 1
}

impl<const PROPAGATE: bool> std::fmt::Debug for TrackingAllocator<PROPAGATE> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrackingAllocator")
            .field("propagate", &PROPAGATE)
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}
