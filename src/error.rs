use alloc::alloc::handle_alloc_error;
use core::alloc::Layout;

use thiserror::Error;

/// The error returned when a table cannot obtain the slot array it needs.
///
/// Returned by the fallible constructors and by every operation that may
/// rebuild the table (`try_reserve`, `try_entry`, `try_insert`). The table is
/// left exactly as it was before the call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TryReserveError {
    /// The requested capacity does not fit in `usize` or in a valid
    /// [`Layout`].
    #[error("hash table capacity overflow")]
    CapacityOverflow,
    /// The allocator refused the request.
    #[error("memory allocation of {} bytes failed", .layout.size())]
    AllocError {
        /// The layout of the slot array that could not be allocated.
        layout: Layout,
    },
}

/// The error returned by [`LoadPolicy::new`](crate::LoadPolicy::new) for
/// thresholds that would let the table fill up or oscillate.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum PolicyError {
    /// The minimum capacity is zero or not representable as a power of two.
    #[error("minimum capacity {0} cannot be rounded to a power of two")]
    MinCapacity(usize),
    /// The max load is outside `(0, 1)`.
    #[error("max load {0} must lie strictly between 0 and 1")]
    MaxLoad(f64),
    /// The max load is so small that a table at the minimum capacity could
    /// not hold a single entry.
    #[error("max load {max_load} leaves a {min_capacity}-slot table unable to hold one entry")]
    Unfillable {
        /// The rejected max load.
        max_load: f64,
        /// The minimum capacity it was checked against.
        min_capacity: usize,
    },
    /// The min load is negative or more than half the max load.
    #[error("min load {min} must lie in [0, {max} / 2]")]
    MinLoad {
        /// The rejected min load.
        min: f64,
        /// The max load it was checked against.
        max: f64,
    },
}

/// Whether a failed allocation is reported or treated as fatal.
#[derive(Clone, Copy, PartialEq, Eq)]
pub(crate) enum Fallibility {
    Fallible,
    Infallible,
}

impl Fallibility {
    #[cold]
    #[inline(never)]
    pub(crate) fn capacity_overflow(self) -> TryReserveError {
        match self {
            Fallibility::Fallible => TryReserveError::CapacityOverflow,
            Fallibility::Infallible => panic!("hash table capacity overflow"),
        }
    }

    #[cold]
    #[inline(never)]
    pub(crate) fn alloc_err(self, layout: Layout) -> TryReserveError {
        match self {
            Fallibility::Fallible => TryReserveError::AllocError { layout },
            Fallibility::Infallible => handle_alloc_error(layout),
        }
    }
}
