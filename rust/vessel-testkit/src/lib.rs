//! Test utilities for the `vessel` containers: an instrumented allocator
//! and element types that count drops or panic on demand.

pub mod elements;
pub mod tracking;

pub use elements::{CloneBomb, DropTally, Droppable, Fragile};
pub use tracking::{PropagatingTracker, TrackerStats, TrackingAllocator};
