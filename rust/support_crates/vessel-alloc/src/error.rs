use thiserror::Error;

/// An error returned by an [`Allocator`](crate::Allocator) that could not
/// satisfy a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum AllocError {
    #[error("out of memory: failed to allocate {size} bytes (align {align})")]
    OutOfMemory { size: usize, align: usize },

    #[error("allocation budget exhausted: requested {requested} bytes, {remaining} remaining")]
    BudgetExhausted { requested: u64, remaining: u64 },

    #[error("operation is not supported by this allocator")]
    Unsupported,
}

impl AllocError {
    pub(crate) fn out_of_memory(layout: std::alloc::Layout) -> AllocError {
        AllocError::OutOfMemory {
            size: layout.size(),
            align: layout.align(),
        }
    }
}
