//! Element types that make destructor and clone behavior observable.

use std::sync::Arc;
use std::sync::atomic::{AtomicIsize, AtomicUsize, Ordering};

/// Counts drops of the [`Droppable`] values it creates.
#[derive(Clone, Default)]
pub struct DropTally(Arc<AtomicUsize>);

impl DropTally {
    pub fn new() -> DropTally {
        DropTally::default()
    }

    pub fn make(&self, value: i32) -> Droppable {
        Droppable {
            value,
            tally: self.0.clone(),
        }
    }

    /// Number of values (including clones) dropped so far.
    pub fn drops(&self) -> usize {
        self.0.load(Ordering::Relaxed)
    }
}

/// A value that reports its own drop to a [`DropTally`].
pub struct Droppable {
    value: i32,
    tally: Arc<AtomicUsize>,
}

impl Droppable {
    pub fn value(&self) -> i32 {
        self.value
    }
}

impl Clone for Droppable {
    fn clone(&self) -> Self {
        Droppable {
            value: self.value,
            tally: self.tally.clone(),
        }
    }
}

impl Drop for Droppable {
    fn drop(&mut self) {
        self.tally.fetch_add(1, Ordering::Relaxed);
    }
}

impl PartialEq for Droppable {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl std::fmt::Debug for Droppable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Droppable({})", self.value)
    }
}

/// Creates [`Fragile`] values whose clones start panicking once a shared
/// fuse of successful clones burns down. Also tracks how many are alive.
#[derive(Clone)]
pub struct CloneBomb {
    fuse: Arc<AtomicUsize>,
    live: Arc<AtomicIsize>,
}

impl CloneBomb {
    /// Allows `clones` successful clones across all values from this bomb.
    pub fn new(clones: usize) -> CloneBomb {
        CloneBomb {
            fuse: Arc::new(AtomicUsize::new(clones)),
            live: Arc::new(AtomicIsize::new(0)),
        }
    }

    pub fn make(&self, value: i32) -> Fragile {
        self.live.fetch_add(1, Ordering::Relaxed);
        Fragile {
            value,
            bomb: self.clone(),
        }
    }

    /// Resets the number of clones allowed before the next panic.
    pub fn rearm(&self, clones: usize) {
        self.fuse.store(clones, Ordering::Relaxed);
    }

    /// Number of `Fragile` values currently alive.
    pub fn live(&self) -> isize {
        self.live.load(Ordering::Relaxed)
    }
}

/// A value whose `Clone` panics once its [`CloneBomb`] fuse is spent.
pub struct Fragile {
    value: i32,
    bomb: CloneBomb,
}

impl Fragile {
    pub fn value(&self) -> i32 {
        self.value
    }
}

impl Clone for Fragile {
    fn clone(&self) -> Self {
        let left = self.bomb.fuse.load(Ordering::Relaxed);
        if left == 0 {
            panic!("clone of fragile value {}", self.value);
        }
        self.bomb.fuse.store(left - 1, Ordering::Relaxed);
        self.bomb.make(self.value)
    }
}

impl Drop for Fragile {
    fn drop(&mut self) {
        self.bomb.live.fetch_sub(1, Ordering::Relaxed);
    }
}

impl PartialEq for Fragile {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl std::fmt::Debug for Fragile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Fragile({})", self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drop_tally_counts_clones() {
        let tally = DropTally::new();
        let a = tally.make(1);
        let b = a.clone();
        drop(a);
        assert_eq!(tally.drops(), 1);
        assert_eq!(b.value(), 1);
        drop(b);
        assert_eq!(tally.drops(), 2);
    }

    #[test]
    fn test_clone_bomb_fuse() {
        let bomb = CloneBomb::new(1);
        let a = bomb.make(5);
        let b = a.clone();
        assert_eq!(bomb.live(), 2);
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| b.clone()));
        assert!(result.is_err());
        assert_eq!(bomb.live(), 2);
        bomb.rearm(1);
        let c = b.clone();
        assert_eq!(c.value(), 5);
    }
}
