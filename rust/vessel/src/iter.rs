use std::fmt;
use std::iter::FusedIterator;

use vessel_alloc::{Allocator, Global};

use crate::raw::RawStorage;

/// Owning iterator over the elements of a [`Vector`](crate::Vector).
///
/// The buffer stays with the iterator until it is dropped; elements that were
/// not yielded are destroyed through the allocator at that point.
pub struct IntoIter<T, A: Allocator = Global> {
    /// Its length is kept at zero: `[head, tail)` is what is still live.
    storage: RawStorage<T, A>,
    head: usize,
    tail: usize,
}

impl<T, A: Allocator> IntoIter<T, A> {
    pub(crate) fn new(mut storage: RawStorage<T, A>) -> Self {
        let tail = storage.len();
        unsafe { storage.set_len(0) };
        IntoIter {
            storage,
            head: 0,
            tail,
        }
    }

    /// The elements not yet yielded.
    pub fn as_slice(&self) -> &[T] {
        unsafe {
            std::slice::from_raw_parts(self.storage.as_ptr().add(self.head), self.tail - self.head)
        }
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        let len = self.tail - self.head;
        unsafe { std::slice::from_raw_parts_mut(self.storage.as_mut_ptr().add(self.head), len) }
    }

    pub fn allocator(&self) -> &A {
        self.storage.allocator()
    }
}

impl<T, A: Allocator> Iterator for IntoIter<T, A> {
    type Item = T;

    #[inline]
    fn next(&mut self) -> Option<T> {
        if self.head == self.tail {
            return None;
        }
        self.head += 1;
        Some(unsafe { self.storage.read_out(self.head - 1) })
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.tail - self.head;
        (remaining, Some(remaining))
    }
}

impl<T, A: Allocator> DoubleEndedIterator for IntoIter<T, A> {
    #[inline]
    fn next_back(&mut self) -> Option<T> {
        if self.head == self.tail {
            return None;
        }
        self.tail -= 1;
        Some(unsafe { self.storage.read_out(self.tail) })
    }
}

impl<T, A: Allocator> ExactSizeIterator for IntoIter<T, A> {}

impl<T, A: Allocator> FusedIterator for IntoIter<T, A> {}

impl<T, A: Allocator> Drop for IntoIter<T, A> {
    fn drop(&mut self) {
        let remaining: *mut [T] = self.as_mut_slice();
        self.head = self.tail;
        // The storage frees the buffer afterwards, even if a destructor panics.
        unsafe { self.storage.allocator().destroy(remaining) };
    }
}

impl<T: fmt::Debug, A: Allocator> fmt::Debug for IntoIter<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("IntoIter").field(&self.as_slice()).finish()
    }
}

#[cfg(test)]
mod tests {
    use vessel_testkit::{DropTally, TrackingAllocator};

    use crate::Vector;

    #[test]
    fn test_into_iter_both_ends() {
        let v: Vector<i32> = (1..=5).collect();
        let mut it = v.into_iter();
        assert_eq!(it.len(), 5);
        assert_eq!(it.next(), Some(1));
        assert_eq!(it.next_back(), Some(5));
        assert_eq!(it.as_slice(), &[2, 3, 4]);
        assert_eq!(it.collect::<Vec<_>>(), [2, 3, 4]);
    }

    #[test]
    fn test_partially_consumed_iterator_drops_the_rest() {
        let tally = DropTally::new();
        let alloc = TrackingAllocator::new();
        let mut v = Vector::new_in(alloc.clone());
        for i in 0..6 {
            v.push_back(tally.make(i)).unwrap();
        }
        let mut it = v.into_iter();
        let first = it.next().unwrap();
        assert_eq!(first.value(), 0);
        drop(it);
        assert_eq!(tally.drops(), 5);
        assert_eq!(alloc.stats().live_allocations, 0);
        drop(first);
        assert_eq!(tally.drops(), 6);
    }
}
