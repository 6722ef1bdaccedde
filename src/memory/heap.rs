//! Process-heap backend.

use std::alloc::{self, Layout};
use std::ptr::NonNull;

use super::manager::ResourceManager;
use super::resource::{Block, Resource};
use super::tracker::Tracker;
use crate::error::ResourceError;

/// Default block alignment, matching the platform's `max_align_t`.
pub const DEFAULT_HEAP_ALIGN: usize = 16;

/// Configuration for heap allocation.
#[derive(Debug, Clone)]
pub struct HeapConfig {
    /// Alignment of every block. Must be a power of two.
    pub alignment: usize,
}

impl Default for HeapConfig {
    fn default() -> Self {
        Self {
            alignment: DEFAULT_HEAP_ALIGN,
        }
    }
}

/// Zero-initialised heap bytes, freed with the layout they were allocated with.
pub struct HeapBlock {
    ptr: NonNull<u8>,
    layout: Layout,
}

impl HeapBlock {
    fn allocate(size: usize, alignment: usize) -> Result<Self, ResourceError> {
        let failed = ResourceError::AllocationFailed {
            size,
            align: alignment,
        };
        let layout = match Layout::from_size_align(size, alignment) {
            Ok(layout) if layout.size() > 0 => layout,
            _ => return Err(failed),
        };
        // SAFETY: layout has non-zero size.
        let ptr = unsafe { alloc::alloc_zeroed(layout) };
        let ptr = NonNull::new(ptr).ok_or(failed)?;
        Ok(Self { ptr, layout })
    }
}

impl Block for HeapBlock {
    fn as_slice(&self) -> &[u8] {
        // SAFETY: ptr is valid for layout.size() initialised bytes until drop.
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.layout.size()) }
    }

    fn as_mut_slice(&mut self) -> &mut [u8] {
        // SAFETY: as above, and &mut self gives exclusive access.
        unsafe { std::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.layout.size()) }
    }
}

impl Drop for HeapBlock {
    fn drop(&mut self) {
        // SAFETY: ptr came from alloc_zeroed with this exact layout.
        unsafe { alloc::dealloc(self.ptr.as_ptr(), self.layout) }
    }
}

pub type HeapResource = Resource<HeapBlock>;

/// Manager over the unbounded process heap.
#[derive(Debug, Default)]
pub struct HeapManager {
    tracker: Tracker,
    config: HeapConfig,
}

impl HeapManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: HeapConfig) -> Self {
        Self {
            tracker: Tracker::new(),
            config,
        }
    }

    pub fn config(&self) -> &HeapConfig {
        &self.config
    }
}

impl ResourceManager for HeapManager {
    type Block = HeapBlock;

    fn tracker(&self) -> &Tracker {
        &self.tracker
    }

    fn capacity(&self) -> usize {
        usize::MAX
    }

    /// The heap has no positional addressing, so `offset` is ignored.
    fn acquire(&mut self, size: usize, _offset: usize) -> Result<HeapBlock, ResourceError> {
        HeapBlock::allocate(size, self.config.alignment)
    }
}

impl Drop for HeapManager {
    fn drop(&mut self) {
        let outstanding = self.deallocate_all();
        if outstanding > 0 {
            tracing::warn!(manager = %self.id(), outstanding, "heap manager dropped with live resources");
        }
    }
}
