//! Resource manager trait.
//!
//! Backends implement three things: where the tracker lives, how large the
//! store is, and how to acquire a block. Allocation bookkeeping, ownership
//! checks and transfer primitives are shared.

use super::resource::{Block, Resource};
use super::tracker::{ManagerId, TrackedResource, Tracker};
use crate::error::ResourceError;

/// A backend that issues [`Resource`] handles over its store.
pub trait ResourceManager {
    type Block: Block;

    fn tracker(&self) -> &Tracker;

    /// Upper bound on bytes this manager can back at once.
    fn capacity(&self) -> usize;

    /// Acquire `size` bytes at `offset` from the backend, untracked.
    ///
    /// Backends with positional addressing reject ranges outside the store
    /// with `OutOfRange`; others may ignore `offset`.
    fn acquire(&mut self, size: usize, offset: usize) -> Result<Self::Block, ResourceError>;

    /// Backend-level readiness. Closed stores report `Closed` here.
    fn ensure_ready(&self) -> Result<(), ResourceError> {
        Ok(())
    }

    fn id(&self) -> ManagerId {
        self.tracker().id()
    }

    /// Sum of the sizes of all tracked resources.
    fn used_size(&self) -> usize {
        self.tracker().used_size()
    }

    /// Number of tracked resources.
    fn len(&self) -> usize {
        self.tracker().len()
    }

    fn is_empty(&self) -> bool {
        self.tracker().is_empty()
    }

    /// Snapshot of the tracking set.
    fn resources(&self) -> Vec<TrackedResource> {
        self.tracker().entries()
    }

    /// True if `resource` is currently tracked by this manager.
    fn owns(&self, resource: &Resource<Self::Block>) -> bool {
        resource
            .binding()
            .is_some_and(|binding| self.tracker().owns(binding))
    }

    /// Allocate a tracked range, reporting why it failed.
    ///
    /// Only size and remaining capacity are checked here; positional checks
    /// belong to the backend. Nothing is tracked unless `acquire` succeeds.
    fn try_allocate(
        &mut self,
        size: usize,
        offset: usize,
    ) -> Result<Resource<Self::Block>, ResourceError> {
        self.ensure_ready()?;
        if size == 0 {
            return Err(ResourceError::ZeroSize);
        }
        let available = self.capacity().saturating_sub(self.used_size());
        if size > available {
            return Err(ResourceError::CapacityExceeded {
                requested: size,
                available,
            });
        }

        let block = self.acquire(size, offset)?;
        let addr = block.as_slice().as_ptr() as usize;
        let binding = self.tracker().register(block.len(), block.offset(), addr);
        tracing::debug!(manager = %self.id(), size, offset, "resource allocated");
        Ok(Resource::bind(block, binding))
    }

    /// Allocate a tracked range; failure yields an unbound handle.
    fn allocate(&mut self, size: usize, offset: usize) -> Resource<Self::Block> {
        match self.try_allocate(size, offset) {
            Ok(resource) => resource,
            Err(err) => {
                tracing::warn!(manager = %self.id(), size, offset, error = %err, "allocation failed");
                Resource::unbound()
            }
        }
    }

    /// Untrack `resource` and free its bytes.
    ///
    /// Handles owned by another manager are rejected without touching either
    /// manager.
    fn deallocate(&mut self, resource: &mut Resource<Self::Block>) -> Result<(), ResourceError> {
        self.detach_resource(resource)?;
        drop(resource.take_block());
        Ok(())
    }

    /// Revoke every tracked resource and return how many there were.
    ///
    /// Revoked handles turn unbound at once; the bytes they still hold are
    /// freed when each handle is dropped or released.
    fn deallocate_all(&mut self) -> usize {
        let revoked = self.tracker().revoke_all();
        if revoked > 0 {
            tracing::debug!(manager = %self.id(), revoked, "all resources revoked");
        }
        revoked
    }

    /// Untrack `resource` without freeing its bytes.
    fn detach_resource(&mut self, resource: &mut Resource<Self::Block>) -> Result<(), ResourceError> {
        let key = match resource.binding() {
            Some(binding) if self.tracker().owns(binding) => binding.key(),
            _ => return Err(ResourceError::NotOwned),
        };
        self.tracker().untrack(key);
        resource.clear_binding();
        Ok(())
    }

    /// Start tracking a handle that holds bytes but has no manager.
    fn add_resource(&mut self, resource: &mut Resource<Self::Block>) -> Result<(), ResourceError> {
        if resource.valid() {
            return Err(ResourceError::AlreadyBound);
        }
        let block = resource.block().ok_or(ResourceError::Empty)?;
        let (size, offset) = (block.len(), block.offset());
        let addr = block.as_slice().as_ptr() as usize;

        let available = self.capacity().saturating_sub(self.used_size());
        if size > available {
            return Err(ResourceError::CapacityExceeded {
                requested: size,
                available,
            });
        }

        let binding = self.tracker().register(size, offset, addr);
        resource.set_binding(binding);
        Ok(())
    }

    /// Exchange the bytes held by two handles of this manager.
    ///
    /// Tracking-set membership and `used_size` are unchanged. Both handles
    /// must be tracked here; the borrow rules already rule out a self-swap.
    fn swap_resource(
        &mut self,
        a: &mut Resource<Self::Block>,
        b: &mut Resource<Self::Block>,
    ) -> Result<(), ResourceError> {
        let (ka, kb) = match (a.binding(), b.binding()) {
            (Some(ba), Some(bb)) if self.tracker().owns(ba) && self.tracker().owns(bb) => {
                (ba.key(), bb.key())
            }
            _ => return Err(ResourceError::NotOwned),
        };
        if !self.tracker().exchange(ka, kb) {
            return Err(ResourceError::NotOwned);
        }
        Resource::swap_blocks(a, b);
        Ok(())
    }
}

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;
