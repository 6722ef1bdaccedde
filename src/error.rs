//! Error types for resource managers.
//!
//! Ordinary operational failures (capacity, backend acquisition, ownership
//! mismatch) are reported as values, never as panics.

use std::path::PathBuf;

use thiserror::Error;

/// Errors returned by managers and resource handles.
#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("Zero-sized allocation requested")]
    ZeroSize,

    #[error("Range out of bounds: offset {offset} + size {size} exceeds capacity {capacity}")]
    OutOfRange {
        offset: usize,
        size: usize,
        capacity: usize,
    },

    #[error("View too large: {size} bytes, limit {limit} bytes")]
    ViewTooLarge { size: usize, limit: usize },

    #[error("Manager is closed")]
    Closed,

    #[error("Allocator returned no memory for {size} bytes (align {align})")]
    AllocationFailed { size: usize, align: usize },

    #[error("Resource is not owned by this manager")]
    NotOwned,

    #[error("Resource is already bound to a manager")]
    AlreadyBound,

    #[error("Resource is not bound to a manager")]
    Unbound,

    #[error("Resource holds no memory")]
    Empty,

    #[error("Capacity exceeded: requested {requested} bytes, available {available} bytes")]
    CapacityExceeded { requested: usize, available: usize },

    #[error("Backing store is empty: {0}")]
    EmptyBacking(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ResourceError {
    /// Returns true if the request named a handle this manager does not own.
    pub fn is_ownership_violation(&self) -> bool {
        matches!(self, Self::NotOwned | Self::AlreadyBound | Self::Unbound)
    }

    /// Returns true if the request failed on size or range limits.
    pub fn is_capacity(&self) -> bool {
        matches!(
            self,
            Self::ZeroSize
                | Self::OutOfRange { .. }
                | Self::ViewTooLarge { .. }
                | Self::CapacityExceeded { .. }
        )
    }
}
