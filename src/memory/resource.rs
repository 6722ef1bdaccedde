//! Move-only resource handles.
//!
//! A [`Resource`] owns the backing bytes produced by a manager and a
//! back-link to the tracker that accounts for them. Dropping a bound handle
//! releases it. Rust moves transfer the handle without touching the tracker,
//! since entries are keyed by slot rather than by handle address.

use std::fmt;

use bytemuck::Pod;

use super::tracker::{Binding, ManagerId};
use super::view::{MemView, MemViewMut};
use crate::error::ResourceError;

/// Backend-owned byte range.
///
/// Dropping a block returns its bytes to the backend (heap free, unmap).
pub trait Block {
    fn as_slice(&self) -> &[u8];

    fn as_mut_slice(&mut self) -> &mut [u8];

    fn len(&self) -> usize {
        self.as_slice().len()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Position within the backing store.
    fn offset(&self) -> usize {
        0
    }

    /// Push pending writes to durable storage, where the backend has any.
    fn flush(&self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Owning handle over a range issued by a [`ResourceManager`](super::ResourceManager).
///
/// Unbound handles (the default) hold nothing and expose empty views.
pub struct Resource<B: Block> {
    block: Option<B>,
    binding: Option<Binding>,
}

impl<B: Block> Default for Resource<B> {
    fn default() -> Self {
        Self::unbound()
    }
}

impl<B: Block> Resource<B> {
    /// An invalid handle.
    pub fn unbound() -> Self {
        Self {
            block: None,
            binding: None,
        }
    }

    pub(crate) fn bind(block: B, binding: Binding) -> Self {
        Self {
            block: Some(block),
            binding: Some(binding),
        }
    }

    /// True while the handle is tracked by a live manager.
    pub fn valid(&self) -> bool {
        self.binding.as_ref().is_some_and(Binding::is_live)
    }

    /// Id of the owning manager, if bound.
    pub fn manager(&self) -> Option<ManagerId> {
        self.binding.as_ref().and_then(Binding::manager)
    }

    pub fn size(&self) -> usize {
        self.view().len()
    }

    /// Offset of the range within its backing store; 0 when unbound.
    pub fn offset(&self) -> usize {
        match self.live_block() {
            Some(block) => block.offset(),
            None => 0,
        }
    }

    pub fn view(&self) -> MemView<'_> {
        match self.live_block() {
            Some(block) => MemView::new(block.as_slice()),
            None => MemView::empty(),
        }
    }

    pub fn view_mut(&mut self) -> MemViewMut<'_> {
        if !self.valid() {
            return MemViewMut::empty();
        }
        match self.block.as_mut() {
            Some(block) => MemViewMut::new(block.as_mut_slice()),
            None => MemViewMut::empty(),
        }
    }

    pub fn read(&self, dst: &mut [u8], offset: usize) -> bool {
        self.view().read(dst, offset)
    }

    pub fn write(&mut self, src: &[u8], offset: usize) -> bool {
        self.view_mut().write(src, offset)
    }

    pub fn read_slice<T: Pod>(&self, dst: &mut [T], offset: usize) -> bool {
        self.view().read_slice(dst, offset)
    }

    pub fn write_slice<T: Pod>(&mut self, src: &[T], offset: usize) -> bool {
        self.view_mut().write_slice(src, offset)
    }

    /// Flush written bytes to the backing store.
    pub fn flush(&self) -> Result<(), ResourceError> {
        let block = self.live_block().ok_or(ResourceError::Unbound)?;
        block.flush()?;
        Ok(())
    }

    /// Untrack the handle and free its bytes. Safe to call repeatedly.
    pub fn release(&mut self) {
        if let Some(binding) = self.binding.take() {
            if let Some((manager, entry)) = binding.untrack() {
                tracing::debug!(%manager, size = entry.size, offset = entry.offset, "resource released");
            }
        }
        // Backend free happens in the block's Drop.
        self.block = None;
    }

    fn live_block(&self) -> Option<&B> {
        if self.valid() {
            self.block.as_ref()
        } else {
            None
        }
    }

    pub(crate) fn binding(&self) -> Option<&Binding> {
        self.binding.as_ref()
    }

    pub(crate) fn set_binding(&mut self, binding: Binding) {
        self.binding = Some(binding);
    }

    pub(crate) fn clear_binding(&mut self) {
        self.binding = None;
    }

    pub(crate) fn block(&self) -> Option<&B> {
        self.block.as_ref()
    }

    pub(crate) fn take_block(&mut self) -> Option<B> {
        self.block.take()
    }

    pub(crate) fn swap_blocks(a: &mut Self, b: &mut Self) {
        std::mem::swap(&mut a.block, &mut b.block);
    }
}

impl<B: Block> Drop for Resource<B> {
    fn drop(&mut self) {
        self.release();
    }
}

impl<B: Block> fmt::Debug for Resource<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resource")
            .field("manager", &self.manager())
            .field("key", &self.binding.as_ref().map(Binding::key))
            .field("size", &self.size())
            .finish()
    }
}
