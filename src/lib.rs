//! memres: move-only ownership over heterogeneous memory stores.
//!
//! A caller asks a manager for a byte range; the manager returns a
//! [`Resource`](memory::Resource) that releases itself exactly once, whichever
//! backend produced it.
//!
//! # Backends
//!
//! - [`HeapManager`](memory::HeapManager): process heap, unbounded capacity.
//! - [`FileViewManager`](memory::FileViewManager): mapped windows of a file
//!   or of an anonymous store, bounded by the store size.
//!
//! # Ownership Model
//!
//! - Handles are move-only; dropping a bound handle releases it.
//! - Managers track live handles by generational slot key, never by address.
//! - A handle whose manager was closed or dropped reads as unbound.
//! - Single-threaded: nothing here is `Send` or internally synchronized.

pub mod config;
pub mod error;
pub mod memory;
pub mod telemetry;

pub use error::ResourceError;
