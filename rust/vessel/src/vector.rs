//! The growable array container.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::mem;
use std::ops::{Deref, DerefMut, Index, IndexMut};
use std::ptr;
use std::slice::SliceIndex;

use vessel_alloc::{Allocator, Global};

use crate::cursor::{Cursor, CursorMut, Forward, Position, Reverse};
use crate::error::{Error, Result};
use crate::iter::IntoIter;
use crate::raw::{AppendGuard, DEFAULT_CAPACITY, RawStorage};

/// A contiguous growable array with a pluggable [`Allocator`].
///
/// Slots `[0, len)` hold live elements, slots `[len, capacity)` are allocated
/// but uninitialized. Every operation that can fail validates its arguments
/// and secures memory before it mutates anything, so an `Err` always leaves
/// the vector exactly as it was.
///
/// Fallible operations return [`Result`]; the standard trait impls that
/// cannot report failure (`Clone`, `Extend`, `FromIterator`) panic instead.
pub struct Vector<T, A: Allocator = Global> {
    buf: RawStorage<T, A>,
}

impl<T> Vector<T> {
    /// Creates an empty vector without allocating.
    pub fn new() -> Self {
        Self::new_in(Global)
    }

    pub fn with_capacity(capacity: usize) -> Result<Self> {
        Self::with_capacity_in(capacity, Global)
    }

    /// Creates an empty vector with room for [`DEFAULT_CAPACITY`] elements.
    pub fn with_default_capacity() -> Result<Self> {
        Self::with_capacity_in(DEFAULT_CAPACITY, Global)
    }

    /// Creates a vector of `len` default values.
    pub fn with_len(len: usize) -> Result<Self>
    where
        T: Default,
    {
        Self::with_len_in(len, Global)
    }

    /// Creates a vector of `len` copies of `value`.
    pub fn from_elem(value: T, len: usize) -> Result<Self>
    where
        T: Clone,
    {
        Self::from_elem_in(value, len, Global)
    }

    pub fn from_slice(items: &[T]) -> Result<Self>
    where
        T: Clone,
    {
        Self::from_slice_in(items, Global)
    }
}

impl<T, A: Allocator> Vector<T, A> {
    pub fn new_in(alloc: A) -> Self {
        Vector {
            buf: RawStorage::new_in(alloc),
        }
    }

    pub fn with_capacity_in(capacity: usize, alloc: A) -> Result<Self> {
        Ok(Vector {
            buf: RawStorage::with_capacity_in(capacity, alloc)?,
        })
    }

    pub fn with_len_in(len: usize, alloc: A) -> Result<Self>
    where
        T: Default,
    {
        let mut v = Self::with_capacity_in(len, alloc)?;
        let mut guard = AppendGuard::new(&mut v.buf);
        for _ in 0..len {
            guard.push(T::default())?;
        }
        guard.commit();
        Ok(v)
    }

    pub fn from_elem_in(value: T, len: usize, alloc: A) -> Result<Self>
    where
        T: Clone,
    {
        let mut v = Self::with_capacity_in(len, alloc)?;
        if len > 0 {
            let mut guard = AppendGuard::new(&mut v.buf);
            for _ in 1..len {
                guard.push(value.clone())?;
            }
            guard.push(value)?;
            guard.commit();
        }
        Ok(v)
    }

    pub fn from_slice_in(items: &[T], alloc: A) -> Result<Self>
    where
        T: Clone,
    {
        Ok(Vector {
            buf: RawStorage::clone_from_slice_in(items, alloc)?,
        })
    }

    /// Collects `iter` into a new vector.
    pub fn try_from_iter_in<I>(iter: I, alloc: A) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
    {
        let mut v = Self::new_in(alloc);
        v.try_extend(iter)?;
        Ok(v)
    }

    /// Deep copy into independent storage.
    ///
    /// The copy's allocator comes from [`Allocator::select_on_copy`].
    pub fn try_clone(&self) -> Result<Self>
    where
        T: Clone,
    {
        Self::from_slice_in(self.as_slice(), self.buf.allocator().select_on_copy())
    }

    /// Moves the contents of `other` into a new vector.
    ///
    /// `other` is left empty with no buffer; it keeps a clone of its allocator.
    /// No memory is allocated or copied.
    pub fn take_from(other: &mut Self) -> Self {
        Vector {
            buf: other.buf.take(),
        }
    }

    /// Replaces the contents with a copy of `other`.
    ///
    /// The copy is built completely before it replaces the current contents,
    /// so a failure or a panicking `clone` leaves `self` untouched. With
    /// [`Allocator::PROPAGATE_ON_COPY_ASSIGNMENT`] the copy is made with, and
    /// `self` then keeps, `other`'s allocator.
    pub fn assign_from(&mut self, other: &Self) -> Result<()>
    where
        T: Clone,
    {
        let alloc = if A::PROPAGATE_ON_COPY_ASSIGNMENT {
            other.allocator().clone()
        } else {
            self.allocator().clone()
        };
        let mut copy = RawStorage::clone_from_slice_in(other.as_slice(), alloc)?;
        mem::swap(&mut self.buf, &mut copy);
        Ok(())
    }

    /// Replaces the contents with those of `other`, leaving `other` empty.
    ///
    /// The buffer itself changes hands when the allocator propagates on move
    /// or the two allocators are equal. Otherwise `self`'s allocator cannot
    /// release `other`'s memory, so the elements are moved one by one into a
    /// new buffer from `self`'s allocator; only that case can fail.
    pub fn assign_take(&mut self, other: &mut Self) -> Result<()> {
        if A::PROPAGATE_ON_MOVE_ASSIGNMENT {
            self.buf = other.buf.take();
        } else if self.allocator().is_equal(other.allocator()) {
            self.buf.clear();
            self.buf.swap_buffers(&mut other.buf);
            other.buf.release();
        } else {
            let mut moved = RawStorage::with_capacity_in(other.len(), self.allocator().clone())?;
            moved.append_moved(&mut other.buf);
            other.buf.release();
            self.buf = moved;
        }
        Ok(())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buf.len() == 0
    }

    /// Number of allocated slots. `usize::MAX` for zero-sized `T`.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    /// Largest length the allocator can back.
    pub fn max_len(&self) -> usize {
        self.allocator().max_size::<T>()
    }

    #[inline]
    pub fn allocator(&self) -> &A {
        self.buf.allocator()
    }

    #[inline]
    pub fn as_slice(&self) -> &[T] {
        self.buf.as_slice()
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        self.buf.as_mut_slice()
    }

    #[inline]
    pub fn as_ptr(&self) -> *const T {
        self.buf.as_ptr()
    }

    #[inline]
    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.buf.as_mut_ptr()
    }

    /// Ensures a capacity of at least `capacity`, allocating exactly that
    /// many slots if the buffer is smaller. Never shrinks.
    pub fn reserve(&mut self, capacity: usize) -> Result<()> {
        self.buf.reserve_exact(capacity)
    }

    /// Reallocates so that the capacity equals the length.
    pub fn shrink_to_fit(&mut self) -> Result<()> {
        self.buf.shrink(self.len())
    }

    /// Bounds-checked access.
    pub fn at(&self, index: usize) -> Result<&T> {
        let len = self.len();
        self.as_slice()
            .get(index)
            .ok_or_else(|| Error::out_of_range(index, len))
    }

    pub fn at_mut(&mut self, index: usize) -> Result<&mut T> {
        let len = self.len();
        self.as_mut_slice()
            .get_mut(index)
            .ok_or_else(|| Error::out_of_range(index, len))
    }

    /// # Safety
    ///
    /// `index` must be less than `len()`.
    #[inline]
    pub unsafe fn get_unchecked(&self, index: usize) -> &T {
        debug_assert!(index < self.len());
        unsafe { &*self.as_ptr().add(index) }
    }

    /// # Safety
    ///
    /// `index` must be less than `len()`.
    #[inline]
    pub unsafe fn get_unchecked_mut(&mut self, index: usize) -> &mut T {
        debug_assert!(index < self.len());
        unsafe { &mut *self.as_mut_ptr().add(index) }
    }

    pub fn front(&self) -> Result<&T> {
        self.as_slice().first().ok_or_else(|| Error::underflow("front"))
    }

    pub fn front_mut(&mut self) -> Result<&mut T> {
        self.as_mut_slice()
            .first_mut()
            .ok_or_else(|| Error::underflow("front_mut"))
    }

    pub fn back(&self) -> Result<&T> {
        self.as_slice().last().ok_or_else(|| Error::underflow("back"))
    }

    pub fn back_mut(&mut self) -> Result<&mut T> {
        self.as_mut_slice()
            .last_mut()
            .ok_or_else(|| Error::underflow("back_mut"))
    }

    /// Appends `value`, growing the buffer if it is full.
    ///
    /// On failure `value` is dropped and the vector is unchanged.
    pub fn push_back(&mut self, value: T) -> Result<()> {
        self.buf.ensure_spare_slot()?;
        let len = self.len();
        unsafe {
            self.buf.construct_at(len, value);
            self.buf.set_len(len + 1);
        }
        Ok(())
    }

    /// Secures a slot first, then constructs the element from `make` directly
    /// in it. `make` is not called if the slot cannot be obtained.
    pub fn emplace_back<F>(&mut self, make: F) -> Result<&mut T>
    where
        F: FnOnce() -> T,
    {
        self.buf.ensure_spare_slot()?;
        let len = self.len();
        unsafe {
            self.buf.construct_at(len, make());
            self.buf.set_len(len + 1);
            Ok(&mut *self.as_mut_ptr().add(len))
        }
    }

    /// Appends clones of `items`. All of them are appended or none are.
    pub fn extend_from_slice(&mut self, items: &[T]) -> Result<()>
    where
        T: Clone,
    {
        let mut guard = AppendGuard::new(&mut self.buf);
        guard.reserve(items.len())?;
        for item in items {
            guard.push(item.clone())?;
        }
        guard.commit();
        Ok(())
    }

    /// Appends every item of `iter`. All of them are appended or none are.
    pub fn try_extend<I>(&mut self, iter: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
    {
        let iter = iter.into_iter();
        let mut guard = AppendGuard::new(&mut self.buf);
        guard.reserve(iter.size_hint().0)?;
        for item in iter {
            guard.push(item)?;
        }
        guard.commit();
        Ok(())
    }

    /// Removes and returns the last element.
    pub fn pop_back(&mut self) -> Result<T> {
        let len = self.len();
        if len == 0 {
            return Err(Error::underflow("pop_back"));
        }
        unsafe {
            self.buf.set_len(len - 1);
            Ok(self.buf.read_out(len - 1))
        }
    }

    /// Inserts `value` before the element at `index`, shifting the tail right.
    /// `index == len()` appends.
    ///
    /// The value is constructed in the spare slot at the end and then rotated
    /// into place, so nothing has moved if construction panics.
    pub fn insert(&mut self, value: T, index: usize) -> Result<()> {
        let len = self.len();
        if index > len {
            return Err(Error::out_of_range(index, len));
        }
        self.buf.ensure_spare_slot()?;
        unsafe {
            self.buf.construct_at(len, value);
            self.buf.set_len(len + 1);
        }
        self.as_mut_slice()[index..].rotate_right(1);
        Ok(())
    }

    /// Removes and returns the element at `index`, shifting the tail left.
    pub fn erase(&mut self, index: usize) -> Result<T> {
        let len = self.len();
        if index >= len {
            return Err(Error::out_of_range(index, len));
        }
        unsafe {
            // The tail is not live while the slot is handed back.
            self.buf.set_len(index);
            let value = self.buf.read_out(index);
            let slot = self.as_mut_ptr().add(index);
            ptr::copy(slot.add(1), slot, len - index - 1);
            self.buf.set_len(len - 1);
            Ok(value)
        }
    }

    /// Destroys the elements in `[first, last)` and closes the gap.
    pub fn erase_range(&mut self, first: usize, last: usize) -> Result<()> {
        let len = self.len();
        if first > last || last > len {
            return Err(Error::invalid_range(first, last, len));
        }
        if first == last {
            return Ok(());
        }

        /// Moves the tail down over the erased gap, even when a destructor
        /// in the gap panics.
        struct CloseGap<'a, T, A: Allocator> {
            buf: &'a mut RawStorage<T, A>,
            first: usize,
            last: usize,
            len: usize,
        }

        impl<T, A: Allocator> Drop for CloseGap<'_, T, A> {
            fn drop(&mut self) {
                let tail = self.len - self.last;
                unsafe {
                    let base = self.buf.as_mut_ptr();
                    ptr::copy(base.add(self.last), base.add(self.first), tail);
                    self.buf.set_len(self.first + tail);
                }
            }
        }

        let erased =
            ptr::slice_from_raw_parts_mut(unsafe { self.as_mut_ptr().add(first) }, last - first);
        unsafe { self.buf.set_len(first) };
        let gap = CloseGap {
            buf: &mut self.buf,
            first,
            last,
            len,
        };
        unsafe { gap.buf.allocator().destroy(erased) };
        drop(gap);
        Ok(())
    }

    /// Removes the element at `position`, as given by a cursor's
    /// [`element_position`](Cursor::element_position).
    pub fn erase_at(&mut self, position: Position) -> Result<T> {
        self.erase(position.index())
    }

    /// Removes the elements between two positions, as given by
    /// [`Cursor::position`].
    pub fn erase_between(&mut self, first: Position, last: Position) -> Result<()> {
        self.erase_range(first.index(), last.index())
    }

    /// Destroys every element and keeps the buffer.
    pub fn clear(&mut self) {
        self.buf.clear();
    }

    pub fn find(&self, value: &T) -> bool
    where
        T: PartialEq,
    {
        self.as_slice().contains(value)
    }

    /// Index of the first element equal to `value`.
    pub fn index_of(&self, value: &T) -> Option<usize>
    where
        T: PartialEq,
    {
        self.as_slice().iter().position(|item| item == value)
    }

    pub fn begin(&self) -> Cursor<'_, T> {
        Cursor::new(self.as_slice(), 0)
    }

    pub fn end(&self) -> Cursor<'_, T> {
        Cursor::new(self.as_slice(), self.len())
    }

    /// Cursor on the last element.
    pub fn rbegin(&self) -> Cursor<'_, T, Reverse> {
        Cursor::new(self.as_slice(), 0)
    }

    /// Cursor one step before the first element.
    pub fn rend(&self) -> Cursor<'_, T, Reverse> {
        Cursor::new(self.as_slice(), self.len())
    }

    pub fn begin_mut(&mut self) -> CursorMut<'_, T, Forward> {
        CursorMut::new(self.as_mut_slice(), 0)
    }

    pub fn end_mut(&mut self) -> CursorMut<'_, T, Forward> {
        let len = self.len();
        CursorMut::new(self.as_mut_slice(), len)
    }

    pub fn rbegin_mut(&mut self) -> CursorMut<'_, T, Reverse> {
        CursorMut::new(self.as_mut_slice(), 0)
    }

    pub fn rend_mut(&mut self) -> CursorMut<'_, T, Reverse> {
        let len = self.len();
        CursorMut::new(self.as_mut_slice(), len)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.as_slice().iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.as_mut_slice().iter_mut()
    }

    /// Exchanges contents with `other`.
    ///
    /// Allocators are exchanged too when [`Allocator::PROPAGATE_ON_SWAP`] is
    /// set. Otherwise each side keeps its allocator, which is only sound
    /// when the two are equal; unequal allocators are reported as
    /// [`AllocatorMismatch`](crate::ErrorKind::AllocatorMismatch) and nothing is swapped.
    pub fn swap(&mut self, other: &mut Self) -> Result<()> {
        if A::PROPAGATE_ON_SWAP {
            mem::swap(&mut self.buf, &mut other.buf);
        } else if self.allocator().is_equal(other.allocator()) {
            self.buf.swap_buffers(&mut other.buf);
        } else {
            return Err(Error::allocator_mismatch("swap"));
        }
        Ok(())
    }

    /// The live elements as raw bytes.
    #[cfg(feature = "bytemuck")]
    pub fn as_bytes(&self) -> &[u8]
    where
        T: bytemuck::NoUninit,
    {
        bytemuck::cast_slice(self.as_slice())
    }
}

impl<T> Default for Vector<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, A: Allocator> Deref for Vector<T, A> {
    type Target = [T];

    #[inline]
    fn deref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T, A: Allocator> DerefMut for Vector<T, A> {
    #[inline]
    fn deref_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

/// Panics when `index` is out of bounds; see [`Vector::at`] for the checked form.
impl<T, A: Allocator, I: SliceIndex<[T]>> Index<I> for Vector<T, A> {
    type Output = I::Output;

    #[inline]
    fn index(&self, index: I) -> &Self::Output {
        Index::index(self.as_slice(), index)
    }
}

impl<T, A: Allocator, I: SliceIndex<[T]>> IndexMut<I> for Vector<T, A> {
    #[inline]
    fn index_mut(&mut self, index: I) -> &mut Self::Output {
        IndexMut::index_mut(self.as_mut_slice(), index)
    }
}

impl<T: Clone, A: Allocator> Clone for Vector<T, A> {
    fn clone(&self) -> Self {
        match self.try_clone() {
            Ok(copy) => copy,
            Err(e) => panic!("failed to clone vector: {e}"),
        }
    }

    fn clone_from(&mut self, source: &Self) {
        if let Err(e) = self.assign_from(source) {
            panic!("failed to clone vector: {e}");
        }
    }
}

impl<T: fmt::Debug, A: Allocator> fmt::Debug for Vector<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T, U, A, B> PartialEq<Vector<U, B>> for Vector<T, A>
where
    T: PartialEq<U>,
    A: Allocator,
    B: Allocator,
{
    fn eq(&self, other: &Vector<U, B>) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: Eq, A: Allocator> Eq for Vector<T, A> {}

impl<T, U, A: Allocator> PartialEq<[U]> for Vector<T, A>
where
    T: PartialEq<U>,
{
    fn eq(&self, other: &[U]) -> bool {
        self.as_slice() == other
    }
}

impl<T, U, A: Allocator> PartialEq<&[U]> for Vector<T, A>
where
    T: PartialEq<U>,
{
    fn eq(&self, other: &&[U]) -> bool {
        self.as_slice() == *other
    }
}

impl<T, U, A: Allocator, const N: usize> PartialEq<[U; N]> for Vector<T, A>
where
    T: PartialEq<U>,
{
    fn eq(&self, other: &[U; N]) -> bool {
        self.as_slice() == other
    }
}

impl<T: Hash, A: Allocator> Hash for Vector<T, A> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_slice().hash(state);
    }
}

impl<T, A: Allocator> Extend<T> for Vector<T, A> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        if let Err(e) = self.try_extend(iter) {
            panic!("failed to extend vector: {e}");
        }
    }
}

impl<'a, T: Copy + 'a, A: Allocator> Extend<&'a T> for Vector<T, A> {
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        self.extend(iter.into_iter().copied());
    }
}

impl<T> FromIterator<T> for Vector<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        match Self::try_from_iter_in(iter, Global) {
            Ok(v) => v,
            Err(e) => panic!("failed to collect into vector: {e}"),
        }
    }
}

impl<T, A: Allocator> IntoIterator for Vector<T, A> {
    type Item = T;
    type IntoIter = IntoIter<T, A>;

    fn into_iter(self) -> IntoIter<T, A> {
        IntoIter::new(self.buf)
    }
}

impl<'a, T, A: Allocator> IntoIterator for &'a Vector<T, A> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T, A: Allocator> IntoIterator for &'a mut Vector<T, A> {
    type Item = &'a mut T;
    type IntoIter = std::slice::IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

/// Creates a [`Vector`](crate::Vector) from a list of elements or from
/// `value; count`. Panics if memory cannot be obtained.
///
/// ```
/// use vessel::vector;
///
/// let v = vector![1, 2, 3];
/// assert_eq!(v, [1, 2, 3]);
/// let zeros = vector![0u8; 4];
/// assert_eq!(zeros.len(), 4);
/// ```
#[macro_export]
macro_rules! vector {
    () => {
        $crate::Vector::new()
    };
    ($value:expr; $count:expr) => {
        match $crate::Vector::from_elem($value, $count) {
            ::core::result::Result::Ok(v) => v,
            ::core::result::Result::Err(e) => ::core::panic!("{e}"),
        }
    };
    ($($item:expr),+ $(,)?) => {
        <$crate::Vector<_> as ::core::iter::FromIterator<_>>::from_iter([$($item),+])
    };
}
