//! Storage manager: the sole owner of a vector's contiguous buffer.
//!
//! `RawStorage` is the only place that allocates, reallocates or frees
//! element memory. It tracks the logical length alongside the capacity, so
//! that it can destroy exactly the live slots `[0, len)` when the buffer is
//! released, and so that a half-built storage (a clone interrupted by a
//! panicking `Clone`) cleans up after itself when dropped.

use std::alloc::Layout;
use std::marker::PhantomData;
use std::mem::{self, ManuallyDrop};
use std::ptr::{self, NonNull};

use vessel_alloc::Allocator;

use crate::error::{Error, Result};

/// Initial capacity of [`Vector::with_default_capacity`](crate::Vector::with_default_capacity).
pub const DEFAULT_CAPACITY: usize = 5;

/// Capacity a buffer of `capacity` slots grows to when it must hold `required`.
///
/// The 1.5x-plus-one step keeps `push_back` amortized O(1) while bounding the
/// unused tail to a constant factor. An empty buffer grows to one slot.
///
/// ```
/// use vessel::grown_capacity;
///
/// assert_eq!(grown_capacity(0, 1), 1);
/// assert_eq!(grown_capacity(1, 2), 2);
/// assert_eq!(grown_capacity(4, 5), 7);
/// assert_eq!(grown_capacity(4, 100), 100);
/// ```
#[inline]
pub fn grown_capacity(capacity: usize, required: usize) -> usize {
    let amortized = capacity.saturating_add(capacity / 2).saturating_add(1);
    required.max(amortized)
}

pub(crate) struct RawStorage<T, A: Allocator> {
    /// Start of the buffer; dangling while `cap == 0` or for zero-sized `T`.
    ptr: NonNull<T>,
    /// Allocated slots.
    cap: usize,
    /// Constructed slots, always a prefix of the buffer.
    len: usize,
    alloc: A,
    _owns: PhantomData<T>,
}

unsafe impl<T: Send, A: Allocator + Send> Send for RawStorage<T, A> {}

unsafe impl<T: Sync, A: Allocator + Sync> Sync for RawStorage<T, A> {}

impl<T, A: Allocator> RawStorage<T, A> {
    const IS_ZST: bool = mem::size_of::<T>() == 0;

    /// Types without drop glue are relocated with one bulk copy instead of
    /// per-element construction, which also skips the `construct` and
    /// `destroy` hooks for the moved values.
    const BULK_TRANSFER: bool = !mem::needs_drop::<T>();

    /// Capacity of a storage that holds no buffer.
    const UNALLOCATED_CAP: usize = if Self::IS_ZST { usize::MAX } else { 0 };

    pub(crate) fn new_in(alloc: A) -> Self {
        RawStorage {
            ptr: NonNull::dangling(),
            cap: Self::UNALLOCATED_CAP,
            len: 0,
            alloc,
            _owns: PhantomData,
        }
    }

    pub(crate) fn with_capacity_in(capacity: usize, alloc: A) -> Result<Self> {
        let mut storage = Self::new_in(alloc);
        if capacity > storage.cap {
            storage.ptr = Self::allocate(&storage.alloc, capacity)?;
            storage.cap = capacity;
        }
        Ok(storage)
    }

    /// Builds a storage holding clones of `src`.
    ///
    /// If a `clone` panics, the partially built storage is dropped during
    /// unwinding: it destroys the clones made so far and frees its buffer.
    pub(crate) fn clone_from_slice_in(src: &[T], alloc: A) -> Result<Self>
    where
        T: Clone,
    {
        let mut storage = Self::with_capacity_in(src.len(), alloc)?;
        for item in src {
            let index = storage.len;
            unsafe {
                storage.construct_at(index, item.clone());
                storage.set_len(index + 1);
            }
        }
        Ok(storage)
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.cap
    }

    #[inline]
    pub(crate) fn allocator(&self) -> &A {
        &self.alloc
    }

    #[inline]
    pub(crate) fn as_ptr(&self) -> *const T {
        self.ptr.as_ptr()
    }

    #[inline]
    pub(crate) fn as_mut_ptr(&mut self) -> *mut T {
        self.ptr.as_ptr()
    }

    #[inline]
    pub(crate) fn as_slice(&self) -> &[T] {
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }

    #[inline]
    pub(crate) fn as_mut_slice(&mut self) -> &mut [T] {
        unsafe { std::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }

    /// Sets the number of constructed slots.
    ///
    /// # Safety
    ///
    /// `len <= capacity`, and slots `[0, len)` must be constructed.
    #[inline]
    pub(crate) unsafe fn set_len(&mut self, len: usize) {
        debug_assert!(len <= self.cap);
        self.len = len;
    }

    /// Constructs `value` in slot `index` through the allocator.
    ///
    /// # Safety
    ///
    /// `index < capacity` and the slot must not hold a live value.
    #[inline]
    pub(crate) unsafe fn construct_at(&mut self, index: usize, value: T) {
        debug_assert!(index < self.cap);
        unsafe { self.alloc.construct(self.ptr.as_ptr().add(index), value) }
    }

    /// Makes room for at least `required` slots.
    #[inline]
    pub(crate) fn ensure_capacity(&mut self, required: usize) -> Result<()> {
        if required <= self.cap {
            return Ok(());
        }
        self.grow(required)
    }

    /// Makes room for one more element.
    #[inline]
    pub(crate) fn ensure_spare_slot(&mut self) -> Result<()> {
        if self.len < self.cap {
            return Ok(());
        }
        let required = self
            .len
            .checked_add(1)
            .ok_or_else(|| Error::length(usize::MAX, self.alloc.max_size::<T>()))?;
        self.grow(required)
    }

    /// Moves the live elements into a new buffer of
    /// `grown_capacity(capacity, required)` slots and frees the old one.
    ///
    /// On failure nothing has been touched: an allocation failure happens
    /// before any element moves, and a panicking `construct` releases the new
    /// buffer while the old one still owns every element.
    #[cold]
    pub(crate) fn grow(&mut self, required: usize) -> Result<()> {
        let max = self.alloc.max_size::<T>();
        if Self::IS_ZST || required > max {
            return Err(Error::length(required, max));
        }
        let old_cap = self.cap;
        let new_cap = grown_capacity(old_cap, required).min(max);
        self.relocate(new_cap)?;
        log::trace!("buffer grew from {old_cap} to {new_cap} slots");
        Ok(())
    }

    /// Grows to exactly `required` slots if the buffer is smaller.
    pub(crate) fn reserve_exact(&mut self, required: usize) -> Result<()> {
        if required <= self.cap {
            return Ok(());
        }
        let max = self.alloc.max_size::<T>();
        if Self::IS_ZST || required > max {
            return Err(Error::length(required, max));
        }
        let old_cap = self.cap;
        self.relocate(required)?;
        log::trace!("buffer reserved from {old_cap} to {required} slots");
        Ok(())
    }

    /// Reallocates to exactly `to` slots when `to` is below the capacity.
    ///
    /// Types without drop glue are first offered to the allocator's in-place
    /// `shrink`; everything else, and allocators that decline, relocate into a
    /// fresh exact-size buffer. Shrinking to zero frees the buffer.
    pub(crate) fn shrink(&mut self, to: usize) -> Result<()> {
        debug_assert!(to >= self.len);
        let to = to.max(self.len);
        if Self::IS_ZST || to >= self.cap {
            return Ok(());
        }
        let old_cap = self.cap;
        if to == 0 {
            self.free_buffer();
            return Ok(());
        }

        if Self::BULK_TRANSFER {
            let old_layout = self.current_layout();
            let new_layout = Self::checked_layout(&self.alloc, to)?;
            match unsafe { self.alloc.shrink(self.ptr.cast(), old_layout, new_layout) } {
                Ok(ptr) => {
                    self.ptr = ptr.cast();
                    self.cap = to;
                    log::trace!("buffer shrunk in place from {old_cap} to {to} slots");
                    return Ok(());
                }
                Err(e) => log::trace!("in-place shrink declined ({e}), relocating"),
            }
        }

        self.relocate(to)?;
        log::trace!("buffer relocated from {old_cap} to {to} slots");
        Ok(())
    }

    /// Destroys the elements at `[new_len, len)`.
    pub(crate) fn truncate(&mut self, new_len: usize) {
        if new_len >= self.len {
            return;
        }
        let tail = ptr::slice_from_raw_parts_mut(
            unsafe { self.ptr.as_ptr().add(new_len) },
            self.len - new_len,
        );
        // Shorten first: a panicking destructor must not cause a double drop.
        self.len = new_len;
        unsafe { self.alloc.destroy(tail) };
    }

    pub(crate) fn clear(&mut self) {
        self.truncate(0);
    }

    /// Destroys all live elements and frees the buffer. Safe on an empty storage.
    pub(crate) fn release(&mut self) {
        self.clear();
        self.free_buffer();
    }

    /// Takes the buffer out, leaving `self` unallocated with a clone of the allocator.
    pub(crate) fn take(&mut self) -> Self {
        let alloc = self.alloc.clone();
        mem::replace(self, Self::new_in(alloc))
    }

    /// Exchanges buffers, lengths and capacities, keeping each allocator in place.
    pub(crate) fn swap_buffers(&mut self, other: &mut Self) {
        mem::swap(&mut self.ptr, &mut other.ptr);
        mem::swap(&mut self.cap, &mut other.cap);
        mem::swap(&mut self.len, &mut other.len);
    }

    /// Moves every element of `other` to the end of `self`, leaving `other`
    /// empty. `self` must already have room for them.
    ///
    /// If `self`'s allocator panics in `construct`, `other` keeps all of its
    /// elements and `self` keeps its length.
    pub(crate) fn append_moved(&mut self, other: &mut Self) {
        let count = other.len;
        debug_assert!(self.cap - self.len >= count);
        unsafe {
            Self::transfer(
                &self.alloc,
                other.ptr.as_ptr(),
                self.ptr.as_ptr().add(self.len),
                count,
            );
            self.len += count;
            other.set_len(0);
            Self::release_transferred(&other.alloc, other.ptr.as_ptr(), count);
        }
    }

    /// Moves the value out of slot `index` and hands the emptied slot to the
    /// allocator's `destroy`, so that every `construct` is matched by one.
    ///
    /// # Safety
    ///
    /// Slot `index` must hold a live value that the storage no longer counts
    /// as live.
    pub(crate) unsafe fn read_out(&self, index: usize) -> T {
        unsafe {
            let slot = self.ptr.as_ptr().add(index);
            let value = ptr::read(slot);
            self.alloc.destroy(slot.cast::<ManuallyDrop<T>>());
            value
        }
    }

    /// Moves the live elements into a fresh buffer of `new_cap` slots.
    fn relocate(&mut self, new_cap: usize) -> Result<()> {
        debug_assert!(new_cap >= self.len);
        let fresh = FreshBuffer {
            alloc: &self.alloc,
            ptr: Self::allocate(&self.alloc, new_cap)?,
            cap: new_cap,
        };
        unsafe {
            Self::transfer(&self.alloc, self.ptr.as_ptr(), fresh.ptr.as_ptr(), self.len);
        }
        let new_ptr = fresh.keep();

        let old_ptr = mem::replace(&mut self.ptr, new_ptr);
        let old_cap = mem::replace(&mut self.cap, new_cap);
        unsafe {
            Self::release_transferred(&self.alloc, old_ptr.as_ptr(), self.len);
            Self::deallocate(&self.alloc, old_ptr, old_cap);
        }
        Ok(())
    }

    fn allocate(alloc: &A, capacity: usize) -> Result<NonNull<T>> {
        debug_assert!(!Self::IS_ZST && capacity != 0);
        let layout = Self::checked_layout(alloc, capacity)?;
        let ptr = alloc.allocate(layout)?;
        log::trace!(
            "allocated buffer of {capacity} slots ({} bytes)",
            layout.size()
        );
        Ok(ptr.cast())
    }

    fn checked_layout(alloc: &A, capacity: usize) -> Result<Layout> {
        let max = alloc.max_size::<T>();
        if capacity > max {
            return Err(Error::length(capacity, max));
        }
        Layout::array::<T>(capacity).map_err(|_| Error::length(capacity, max))
    }

    fn current_layout(&self) -> Layout {
        Self::layout_of(self.cap)
    }

    fn layout_of(capacity: usize) -> Layout {
        // Validated by `checked_layout` when the buffer was allocated.
        unsafe {
            Layout::from_size_align_unchecked(mem::size_of::<T>() * capacity, mem::align_of::<T>())
        }
    }

    /// Returns the buffer to the allocator without touching the elements.
    fn free_buffer(&mut self) {
        unsafe { Self::deallocate(&self.alloc, self.ptr, self.cap) };
        self.ptr = NonNull::dangling();
        self.cap = Self::UNALLOCATED_CAP;
    }

    /// # Safety
    ///
    /// `ptr` must be a buffer of `capacity` slots obtained from `alloc`, or
    /// dangling with the unallocated capacity.
    unsafe fn deallocate(alloc: &A, ptr: NonNull<T>, capacity: usize) {
        if !Self::IS_ZST && capacity != 0 {
            unsafe { alloc.deallocate(ptr.cast(), Self::layout_of(capacity)) };
            log::trace!("released buffer of {capacity} slots");
        }
    }

    /// Copies `count` initialized values from `src` into uninitialized `dst`.
    ///
    /// The source slots stay untouched and still own their values: when this
    /// returns they must be passed to `release_transferred`, and when it unwinds the
    /// copies in `dst` must be forgotten.
    ///
    /// # Safety
    ///
    /// Both ranges must be valid and must not overlap.
    unsafe fn transfer(alloc: &A, src: *const T, dst: *mut T, count: usize) {
        if Self::BULK_TRANSFER {
            unsafe { ptr::copy_nonoverlapping(src, dst, count) }
        } else {
            // A panicking `construct` drops its argument, and a `ManuallyDrop`
            // drops nothing.
            let src = src.cast::<ManuallyDrop<T>>();
            let dst = dst.cast::<ManuallyDrop<T>>();
            for i in 0..count {
                unsafe { alloc.construct(dst.add(i), ptr::read(src.add(i))) }
            }
        }
    }

    /// Hands the `count` source slots of a finished `transfer` to the
    /// allocator's `destroy` without dropping what they held.
    ///
    /// # Safety
    ///
    /// The slots must not be read again.
    unsafe fn release_transferred(alloc: &A, src: *mut T, count: usize) {
        if Self::BULK_TRANSFER || count == 0 {
            return;
        }
        let shells = ptr::slice_from_raw_parts_mut(src.cast::<ManuallyDrop<T>>(), count);
        unsafe { alloc.destroy(shells) }
    }
}

/// A newly allocated buffer that goes back to the allocator unless kept.
struct FreshBuffer<'a, T, A: Allocator> {
    alloc: &'a A,
    ptr: NonNull<T>,
    cap: usize,
}

impl<T, A: Allocator> FreshBuffer<'_, T, A> {
    fn keep(self) -> NonNull<T> {
        let ptr = self.ptr;
        mem::forget(self);
        ptr
    }
}

impl<T, A: Allocator> Drop for FreshBuffer<'_, T, A> {
    fn drop(&mut self) {
        unsafe { RawStorage::<T, A>::deallocate(self.alloc, self.ptr, self.cap) };
    }
}

impl<T, A: Allocator> Drop for RawStorage<T, A> {
    fn drop(&mut self) {
        self.release();
    }
}

/// Rolls a storage back to its length at creation unless committed.
///
/// Bulk appends run through this guard so that an error or a panic midway
/// leaves the previously live elements exactly as they were.
pub(crate) struct AppendGuard<'a, T, A: Allocator> {
    storage: &'a mut RawStorage<T, A>,
    start: usize,
}

impl<'a, T, A: Allocator> AppendGuard<'a, T, A> {
    pub(crate) fn new(storage: &'a mut RawStorage<T, A>) -> Self {
        let start = storage.len;
        AppendGuard { storage, start }
    }

    /// Appends one element, growing the buffer when needed.
    pub(crate) fn push(&mut self, value: T) -> Result<()> {
        self.storage.ensure_spare_slot()?;
        let index = self.storage.len;
        unsafe {
            self.storage.construct_at(index, value);
            self.storage.set_len(index + 1);
        }
        Ok(())
    }

    pub(crate) fn reserve(&mut self, additional: usize) -> Result<()> {
        let required = self
            .storage
            .len
            .checked_add(additional)
            .ok_or_else(|| Error::length(usize::MAX, self.storage.alloc.max_size::<T>()))?;
        self.storage.ensure_capacity(required)
    }

    pub(crate) fn commit(self) {
        mem::forget(self);
    }
}

impl<T, A: Allocator> Drop for AppendGuard<'_, T, A> {
    fn drop(&mut self) {
        self.storage.truncate(self.start);
    }
}
