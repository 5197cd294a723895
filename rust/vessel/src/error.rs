use thiserror::Error;
use vessel_alloc::AllocError;

#[derive(Debug, Error)]
#[error(transparent)]
pub struct Error(Box<ErrorKind>);

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    pub fn kind(&self) -> &ErrorKind {
        self.0.as_ref()
    }

    pub fn into_kind(self) -> ErrorKind {
        *self.0
    }

    pub fn out_of_range(index: usize, len: usize) -> Error {
        ErrorKind::OutOfRange { index, len }.into()
    }

    pub fn invalid_range(first: usize, last: usize, len: usize) -> Error {
        ErrorKind::InvalidRange { first, last, len }.into()
    }

    pub fn underflow(operation: &'static str) -> Error {
        ErrorKind::Underflow { operation }.into()
    }

    pub fn length(requested: usize, max: usize) -> Error {
        ErrorKind::LengthError { requested, max }.into()
    }

    pub fn allocation(source: AllocError) -> Error {
        ErrorKind::AllocationFailure { source }.into()
    }

    pub fn allocator_mismatch(operation: &'static str) -> Error {
        ErrorKind::AllocatorMismatch { operation }.into()
    }

    /// `true` for an index or a range outside the valid window of the operation.
    pub fn is_out_of_range(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::OutOfRange { .. } | ErrorKind::InvalidRange { .. }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ErrorKind {
    #[error("index {index} is out of range for length {len}")]
    OutOfRange { index: usize, len: usize },

    #[error("range {first}..{last} is out of range or reversed for length {len}")]
    InvalidRange {
        first: usize,
        last: usize,
        len: usize,
    },

    #[error("{operation} requires a non-empty vector")]
    Underflow { operation: &'static str },

    #[error("requested capacity {requested} exceeds the allocator maximum of {max}")]
    LengthError { requested: usize, max: usize },

    #[error("allocation failed: {source}")]
    AllocationFailure { source: AllocError },

    #[error("{operation}: allocators differ and do not propagate")]
    AllocatorMismatch { operation: &'static str },
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error(kind.into())
    }
}

impl From<AllocError> for Error {
    fn from(e: AllocError) -> Self {
        Error::allocation(e)
    }
}
