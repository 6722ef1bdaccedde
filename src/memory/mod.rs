//! Memory resource management.
//!
//! Managers hand out move-only [`Resource`] handles over heap blocks or
//! mapped file windows, and track every live handle with generational slot
//! keys rather than pointers.

mod file_view;
mod heap;
mod manager;
mod resource;
mod slots;
mod tracker;
mod view;

pub use file_view::{FileView, FileViewBlock, FileViewConfig, FileViewManager, MAX_VIEW_LEN};
pub use heap::{HeapBlock, HeapConfig, HeapManager, HeapResource, DEFAULT_HEAP_ALIGN};
pub use manager::ResourceManager;
pub use resource::{Block, Resource};
pub use slots::{SlotKey, SlotTable};
pub use tracker::{ManagerId, TrackedResource, Tracker};
pub use view::{MemView, MemViewMut};
