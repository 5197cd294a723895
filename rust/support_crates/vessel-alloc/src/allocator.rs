use std::alloc::Layout;
use std::ptr::NonNull;

use crate::AllocError;

/// A policy object that supplies raw memory to a container and manages the
/// lifetime of the elements placed into it.
///
/// The allocator is a value owned by each container. Instances may carry
/// state (an arena, a budget); the `PROPAGATE_*` constants decide whether a
/// container hands its allocator over on copy assignment, move assignment
/// and swap, and [`is_equal`](Allocator::is_equal) decides whether memory
/// obtained from one instance may be released through another.
///
/// Containers pair every [`construct`](Allocator::construct) with one
/// [`destroy`](Allocator::destroy) of the same slot. When a value leaves a
/// container by move (popped, erased, yielded, or relocated to another
/// slot), the emptied slot is still passed to `destroy`, typed as
/// `ManuallyDrop<T>` so that nothing is dropped. Element types without drop
/// glue are relocated with a plain copy that calls neither hook.
///
/// # Safety
///
/// Implementors must guarantee that:
/// - A block returned by `allocate(layout)` is valid for reads and writes of
///   `layout.size()` bytes, is aligned to `layout.align()`, and is not handed
///   out again until it is passed back to `deallocate`.
/// - A block may be released through any instance that `is_equal` to the
///   instance that produced it (including clones of that instance).
/// - `shrink` either fails and leaves the block untouched, or returns a block
///   of the new layout whose first `new_layout.size()` bytes equal the old
///   block's, after which the old pointer must no longer be used.
pub unsafe trait Allocator: Clone {
    /// Copy assignment replaces the destination's allocator with the source's.
    const PROPAGATE_ON_COPY_ASSIGNMENT: bool = false;

    /// Move assignment replaces the destination's allocator with the source's.
    const PROPAGATE_ON_MOVE_ASSIGNMENT: bool = false;

    /// Swapping two containers also swaps their allocators.
    const PROPAGATE_ON_SWAP: bool = false;

    /// Every pair of instances of this type compares equal.
    const IS_ALWAYS_EQUAL: bool = false;

    /// Allocates an uninitialized block described by `layout`.
    ///
    /// Containers never request zero-sized blocks.
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError>;

    /// Releases a block previously obtained from `allocate` or `shrink`.
    ///
    /// # Safety
    ///
    /// `ptr` must denote a live block produced by an instance equal to `self`,
    /// and `layout` must be the layout that block was allocated with.
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout);

    /// Attempts to shrink a block to `new_layout`, preserving its leading bytes.
    ///
    /// Allocators that cannot reallocate return [`AllocError::Unsupported`],
    /// in which case the caller relocates the contents itself.
    ///
    /// # Safety
    ///
    /// Same contract as [`deallocate`](Allocator::deallocate) for `ptr` and
    /// `old_layout`; `new_layout` must have the same alignment and a size no
    /// larger than `old_layout`, and must not be zero-sized.
    unsafe fn shrink(
        &self,
        ptr: NonNull<u8>,
        old_layout: Layout,
        new_layout: Layout,
    ) -> Result<NonNull<u8>, AllocError> {
        let _ = (ptr, old_layout, new_layout);
        Err(AllocError::Unsupported)
    }

    /// Constructs `value` in the uninitialized slot at `ptr`.
    ///
    /// # Safety
    ///
    /// `ptr` must be valid for writes and properly aligned. Any previous value
    /// at `ptr` is overwritten without being dropped.
    #[inline]
    unsafe fn construct<T>(&self, ptr: *mut T, value: T) {
        unsafe { ptr.write(value) }
    }

    /// Destroys the value (or slice of values) at `ptr`, leaving the memory
    /// uninitialized.
    ///
    /// # Safety
    ///
    /// `ptr` must point to initialized values that are not used afterwards.
    #[inline]
    unsafe fn destroy<T: ?Sized>(&self, ptr: *mut T) {
        unsafe { std::ptr::drop_in_place(ptr) }
    }

    /// Largest number of `T` elements a single block from this allocator can hold.
    #[inline]
    fn max_size<T>(&self) -> usize {
        max_elements::<T>()
    }

    /// Allocator to use for a container copy-constructed from one that uses `self`.
    #[inline]
    fn select_on_copy(&self) -> Self {
        self.clone()
    }

    /// Returns `true` when memory allocated by `self` can be released by `other`
    /// and vice versa.
    #[inline]
    fn is_equal(&self, other: &Self) -> bool {
        let _ = other;
        Self::IS_ALWAYS_EQUAL
    }
}

/// Largest element count whose byte size still fits in `isize::MAX`.
///
/// Zero-sized types are unbounded.
#[inline]
pub const fn max_elements<T>() -> usize {
    let size = std::mem::size_of::<T>();
    if size == 0 {
        usize::MAX
    } else {
        isize::MAX as usize / size
    }
}

/// The system allocator (`std::alloc`), as a stateless [`Allocator`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Global;

unsafe impl Allocator for Global {
    const PROPAGATE_ON_MOVE_ASSIGNMENT: bool = true;
    const IS_ALWAYS_EQUAL: bool = true;

    #[inline]
    fn allocate(&self, layout: Layout) -> Result<NonNull<u8>, AllocError> {
        if layout.size() == 0 {
            return Ok(dangling(layout));
        }
        let ptr = unsafe { std::alloc::alloc(layout) };
        NonNull::new(ptr).ok_or_else(|| AllocError::out_of_memory(layout))
    }

    #[inline]
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        if layout.size() != 0 {
            unsafe { std::alloc::dealloc(ptr.as_ptr(), layout) }
        }
    }

    unsafe fn shrink(
        &self,
        ptr: NonNull<u8>,
        old_layout: Layout,
        new_layout: Layout,
    ) -> Result<NonNull<u8>, AllocError> {
        debug_assert_eq!(old_layout.align(), new_layout.align());
        debug_assert!(new_layout.size() <= old_layout.size());
        debug_assert_ne!(new_layout.size(), 0);
        let ptr = unsafe { std::alloc::realloc(ptr.as_ptr(), old_layout, new_layout.size()) };
        NonNull::new(ptr).ok_or_else(|| AllocError::out_of_memory(new_layout))
    }
}

/// A well-aligned, non-null pointer for zero-sized blocks.
fn dangling(layout: Layout) -> NonNull<u8> {
    NonNull::new(std::ptr::without_provenance_mut(layout.align())).unwrap_or(NonNull::dangling())
}
