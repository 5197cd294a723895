//! Random-access position handles over a vector's live elements.
//!
//! A cursor pairs a borrowed view of the elements with a logical position
//! `p` in `[0, len]`. `p == len` is the end position, which holds no element.
//! The direction parameter decides which element sits under position `p`:
//! a [`Forward`] cursor reads element `p`, a [`Reverse`] cursor reads element
//! `len - 1 - p`, so that `rbegin` is the last element and `rend` lies past
//! the first one. Arithmetic and comparisons act on the logical position in
//! both directions.
//!
//! Cursors borrow the vector. Anything that reallocates or shifts elements
//! needs `&mut Vector`, which cannot coexist with a live cursor, so a cursor
//! can never observe a stale buffer. A [`Position`] is a plain index that
//! outlives the borrow and is validated again wherever it is consumed.

use std::cmp::Ordering;
use std::fmt;
use std::marker::PhantomData;
use std::ops::{Add, AddAssign, Sub, SubAssign};

mod sealed {
    pub trait Sealed {}
}

/// Traversal direction of a cursor.
pub trait Direction: sealed::Sealed {
    /// `true` when position `p` maps to element `len - 1 - p`.
    const REVERSED: bool;
}

/// Traversal from the first element to the last.
#[derive(Debug)]
pub enum Forward {}

/// Traversal from the last element to the first.
#[derive(Debug)]
pub enum Reverse {}

impl sealed::Sealed for Forward {}
impl sealed::Sealed for Reverse {}

impl Direction for Forward {
    const REVERSED: bool = false;
}

impl Direction for Reverse {
    const REVERSED: bool = true;
}

/// A forward index into a vector, in `[0, len]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position(usize);

impl Position {
    pub const fn new(index: usize) -> Position {
        Position(index)
    }

    pub const fn index(self) -> usize {
        self.0
    }
}

impl From<usize> for Position {
    fn from(index: usize) -> Self {
        Position(index)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Logical position `pos` moved by `delta`, if it stays within `[0, len]`.
#[inline]
fn offset_within(pos: usize, len: usize, delta: isize) -> Option<usize> {
    pos.checked_add_signed(delta).filter(|&p| p <= len)
}

#[inline]
fn element_index<D: Direction>(pos: usize, len: usize) -> Option<usize> {
    if pos >= len {
        None
    } else if D::REVERSED {
        Some(len - 1 - pos)
    } else {
        Some(pos)
    }
}

/// Forward index that a logical position stands for. For reverse cursors
/// this is the base position, one past the element under the cursor.
#[inline]
fn base_index<D: Direction>(pos: usize, len: usize) -> usize {
    if D::REVERSED { len - pos } else { pos }
}

#[track_caller]
fn moved_or_panic(pos: usize, len: usize, delta: isize) -> usize {
    match offset_within(pos, len, delta) {
        Some(p) => p,
        None => panic!("cursor moved by {delta} from {pos} leaves the range 0..={len}"),
    }
}

/// A read-only cursor.
pub struct Cursor<'a, T, D: Direction = Forward> {
    elements: &'a [T],
    pos: usize,
    _direction: PhantomData<D>,
}

impl<'a, T, D: Direction> Cursor<'a, T, D> {
    pub(crate) fn new(elements: &'a [T], pos: usize) -> Self {
        debug_assert!(pos <= elements.len());
        Cursor {
            elements,
            pos,
            _direction: PhantomData,
        }
    }

    /// Element under the cursor, `None` at the end position.
    #[inline]
    pub fn get(&self) -> Option<&'a T> {
        let elements = self.elements;
        element_index::<D>(self.pos, elements.len()).map(|i| &elements[i])
    }

    /// Element `delta` steps away from the cursor.
    pub fn peek(&self, delta: isize) -> Option<&'a T> {
        let elements = self.elements;
        let pos = offset_within(self.pos, elements.len(), delta)?;
        element_index::<D>(pos, elements.len()).map(|i| &elements[i])
    }

    /// Logical distance from the first position of this direction.
    #[inline]
    pub fn offset(&self) -> usize {
        self.pos
    }

    #[inline]
    pub fn is_end(&self) -> bool {
        self.pos == self.elements.len()
    }

    /// Forward index this cursor denotes as a range boundary.
    ///
    /// For a reverse cursor this is the base position: `rbegin` maps to `len`
    /// and `rend` to `0`, so the reverse range `[a, b)` covers the forward
    /// range `[b.position(), a.position())`.
    pub fn position(&self) -> Position {
        Position(base_index::<D>(self.pos, self.elements.len()))
    }

    /// Forward index of the element under the cursor.
    pub fn element_position(&self) -> Option<Position> {
        element_index::<D>(self.pos, self.elements.len()).map(Position)
    }

    /// Steps towards the end. Returns `false` if already there.
    pub fn move_next(&mut self) -> bool {
        if self.is_end() {
            return false;
        }
        self.pos += 1;
        true
    }

    /// Steps towards the beginning. Returns `false` if already there.
    pub fn move_prev(&mut self) -> bool {
        if self.pos == 0 {
            return false;
        }
        self.pos -= 1;
        true
    }

    /// Cursor moved by `delta`, or `None` if that leaves `[0, len]`.
    pub fn checked_offset(self, delta: isize) -> Option<Self> {
        let pos = offset_within(self.pos, self.elements.len(), delta)?;
        Some(Cursor::new(self.elements, pos))
    }

    /// Signed number of steps from `origin` to `self`.
    ///
    /// # Panics
    ///
    /// If the two cursors do not walk the same elements.
    #[track_caller]
    pub fn distance_from(&self, origin: &Cursor<'_, T, D>) -> isize {
        assert!(
            self.same_elements(origin.elements),
            "distance between cursors over different elements"
        );
        self.pos as isize - origin.pos as isize
    }

    fn same_elements(&self, other: &[T]) -> bool {
        std::ptr::eq(self.elements, other)
    }
}

impl<T, D: Direction> Clone for Cursor<'_, T, D> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, D: Direction> Copy for Cursor<'_, T, D> {}

impl<T: fmt::Debug, D: Direction> fmt::Debug for Cursor<'_, T, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursor")
            .field("reversed", &D::REVERSED)
            .field("offset", &self.pos)
            .field("len", &self.elements.len())
            .field("element", &self.get())
            .finish()
    }
}

impl<'a, T, D: Direction> Add<isize> for Cursor<'a, T, D> {
    type Output = Cursor<'a, T, D>;

    #[track_caller]
    fn add(self, delta: isize) -> Self::Output {
        Cursor::new(self.elements, moved_or_panic(self.pos, self.elements.len(), delta))
    }
}

impl<'a, T, D: Direction> Sub<isize> for Cursor<'a, T, D> {
    type Output = Cursor<'a, T, D>;

    #[track_caller]
    fn sub(self, delta: isize) -> Self::Output {
        self + delta.wrapping_neg()
    }
}

impl<T, D: Direction> AddAssign<isize> for Cursor<'_, T, D> {
    #[track_caller]
    fn add_assign(&mut self, delta: isize) {
        self.pos = moved_or_panic(self.pos, self.elements.len(), delta);
    }
}

impl<T, D: Direction> SubAssign<isize> for Cursor<'_, T, D> {
    #[track_caller]
    fn sub_assign(&mut self, delta: isize) {
        *self += delta.wrapping_neg();
    }
}

/// Panics unless both cursors walk the same elements; see
/// [`Cursor::distance_from`].
impl<'a, T, D: Direction> Sub for Cursor<'a, T, D> {
    type Output = isize;

    #[track_caller]
    fn sub(self, origin: Cursor<'a, T, D>) -> isize {
        self.distance_from(&origin)
    }
}

/// Cursors over different vectors are never equal.
impl<T, D: Direction> PartialEq for Cursor<'_, T, D> {
    fn eq(&self, other: &Self) -> bool {
        self.same_elements(other.elements) && self.pos == other.pos
    }
}

impl<T, D: Direction> Eq for Cursor<'_, T, D> {}

/// Cursors over different vectors are unordered.
impl<T, D: Direction> PartialOrd for Cursor<'_, T, D> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.same_elements(other.elements)
            .then(|| self.pos.cmp(&other.pos))
    }
}

/// A cursor that can modify the element under it.
///
/// Holding one excludes every other access to the vector, so it has no
/// comparisons against other cursors; use [`CursorMut::as_cursor`] to read.
pub struct CursorMut<'a, T, D: Direction = Forward> {
    elements: &'a mut [T],
    pos: usize,
    _direction: PhantomData<D>,
}

impl<'a, T, D: Direction> CursorMut<'a, T, D> {
    pub(crate) fn new(elements: &'a mut [T], pos: usize) -> Self {
        debug_assert!(pos <= elements.len());
        CursorMut {
            elements,
            pos,
            _direction: PhantomData,
        }
    }

    pub fn get(&self) -> Option<&T> {
        element_index::<D>(self.pos, self.elements.len()).map(|i| &self.elements[i])
    }

    pub fn get_mut(&mut self) -> Option<&mut T> {
        element_index::<D>(self.pos, self.elements.len()).map(|i| &mut self.elements[i])
    }

    /// Consumes the cursor, keeping the borrow of the element under it.
    pub fn into_mut(self) -> Option<&'a mut T> {
        let index = element_index::<D>(self.pos, self.elements.len())?;
        let elements = self.elements;
        Some(&mut elements[index])
    }

    /// Replaces the element under the cursor, returning the old one.
    pub fn replace(&mut self, value: T) -> Option<T> {
        self.get_mut().map(|slot| std::mem::replace(slot, value))
    }

    /// Read-only view at the same position.
    pub fn as_cursor(&self) -> Cursor<'_, T, D> {
        Cursor::new(self.elements, self.pos)
    }

    #[inline]
    pub fn offset(&self) -> usize {
        self.pos
    }

    #[inline]
    pub fn is_end(&self) -> bool {
        self.pos == self.elements.len()
    }

    pub fn position(&self) -> Position {
        Position(base_index::<D>(self.pos, self.elements.len()))
    }

    pub fn element_position(&self) -> Option<Position> {
        element_index::<D>(self.pos, self.elements.len()).map(Position)
    }

    pub fn move_next(&mut self) -> bool {
        if self.is_end() {
            return false;
        }
        self.pos += 1;
        true
    }

    pub fn move_prev(&mut self) -> bool {
        if self.pos == 0 {
            return false;
        }
        self.pos -= 1;
        true
    }

    pub fn checked_offset(self, delta: isize) -> Option<Self> {
        let pos = offset_within(self.pos, self.elements.len(), delta)?;
        Some(CursorMut::new(self.elements, pos))
    }
}

impl<T: fmt::Debug, D: Direction> fmt::Debug for CursorMut<'_, T, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CursorMut")
            .field("reversed", &D::REVERSED)
            .field("offset", &self.pos)
            .field("len", &self.elements.len())
            .field("element", &self.get())
            .finish()
    }
}

impl<'a, T, D: Direction> Add<isize> for CursorMut<'a, T, D> {
    type Output = CursorMut<'a, T, D>;

    #[track_caller]
    fn add(self, delta: isize) -> Self::Output {
        let pos = moved_or_panic(self.pos, self.elements.len(), delta);
        CursorMut::new(self.elements, pos)
    }
}

impl<'a, T, D: Direction> Sub<isize> for CursorMut<'a, T, D> {
    type Output = CursorMut<'a, T, D>;

    #[track_caller]
    fn sub(self, delta: isize) -> Self::Output {
        self + delta.wrapping_neg()
    }
}

impl<T, D: Direction> AddAssign<isize> for CursorMut<'_, T, D> {
    #[track_caller]
    fn add_assign(&mut self, delta: isize) {
        self.pos = moved_or_panic(self.pos, self.elements.len(), delta);
    }
}

impl<T, D: Direction> SubAssign<isize> for CursorMut<'_, T, D> {
    #[track_caller]
    fn sub_assign(&mut self, delta: isize) {
        *self += delta.wrapping_neg();
    }
}
