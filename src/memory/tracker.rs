//! Tracking set shared between a manager and the handles it issued.
//!
//! The manager holds the only strong reference to its ledger. Handles keep a
//! `Weak` plus a slot key, so a handle outliving its manager (or surviving a
//! `close`) resolves to "unbound" instead of a dangling back-pointer.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

use super::slots::{SlotKey, SlotTable};

static NEXT_MANAGER_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ManagerId(u64);

impl ManagerId {
    fn next() -> Self {
        Self(NEXT_MANAGER_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ManagerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "mgr-{}", self.0)
    }
}

/// Snapshot of one tracked resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackedResource {
    pub key: SlotKey,
    pub size: usize,
    /// Position within the backing store (always 0 for heap blocks).
    pub offset: usize,
    /// Address of the first byte, for diagnostics only.
    pub addr: usize,
}

#[derive(Debug)]
struct Ledger {
    id: ManagerId,
    entries: SlotTable<TrackedResource>,
    used_size: usize,
}

impl Ledger {
    fn track(&mut self, size: usize, offset: usize, addr: usize) -> SlotKey {
        self.used_size += size;
        self.entries.insert_with(|key| TrackedResource {
            key,
            size,
            offset,
            addr,
        })
    }

    fn untrack(&mut self, key: SlotKey) -> Option<TrackedResource> {
        let entry = self.entries.remove(key)?;
        self.used_size -= entry.size;
        Some(entry)
    }
}

/// A manager's tracking set and used-size counter.
///
/// Every mutation updates the entry table and the counter together, so the
/// sum of tracked sizes always equals `used_size()`.
#[derive(Debug)]
pub struct Tracker {
    ledger: Rc<RefCell<Ledger>>,
}

impl Default for Tracker {
    fn default() -> Self {
        Self::new()
    }
}

impl Tracker {
    pub fn new() -> Self {
        Self {
            ledger: Rc::new(RefCell::new(Ledger {
                id: ManagerId::next(),
                entries: SlotTable::new(),
                used_size: 0,
            })),
        }
    }

    pub fn id(&self) -> ManagerId {
        self.ledger.borrow().id
    }

    pub fn used_size(&self) -> usize {
        self.ledger.borrow().used_size
    }

    pub fn len(&self) -> usize {
        self.ledger.borrow().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of all tracked entries, in slot order.
    pub fn entries(&self) -> Vec<TrackedResource> {
        self.ledger
            .borrow()
            .entries
            .iter()
            .map(|(_, entry)| *entry)
            .collect()
    }

    pub fn get(&self, key: SlotKey) -> Option<TrackedResource> {
        self.ledger.borrow().entries.get(key).copied()
    }

    /// Track a new range and return the back-link for its handle.
    pub(crate) fn register(&self, size: usize, offset: usize, addr: usize) -> Binding {
        let key = self.ledger.borrow_mut().track(size, offset, addr);
        Binding {
            ledger: Rc::downgrade(&self.ledger),
            key,
        }
    }

    /// True if `binding` points at a live entry of this tracker.
    pub(crate) fn owns(&self, binding: &Binding) -> bool {
        std::ptr::eq(binding.ledger.as_ptr(), Rc::as_ptr(&self.ledger))
            && self.ledger.borrow().entries.contains(binding.key)
    }

    pub(crate) fn untrack(&self, key: SlotKey) -> Option<TrackedResource> {
        self.ledger.borrow_mut().untrack(key)
    }

    /// Exchange the size, offset and address recorded for two entries.
    pub(crate) fn exchange(&self, a: SlotKey, b: SlotKey) -> bool {
        let mut ledger = self.ledger.borrow_mut();
        let (Some(ea), Some(eb)) = (ledger.entries.get(a).copied(), ledger.entries.get(b).copied())
        else {
            return false;
        };
        for (key, from) in [(a, eb), (b, ea)] {
            if let Some(entry) = ledger.entries.get_mut(key) {
                entry.size = from.size;
                entry.offset = from.offset;
                entry.addr = from.addr;
            }
        }
        true
    }

    /// Drop every entry. Handles still pointing here turn unbound.
    pub(crate) fn revoke_all(&self) -> usize {
        let mut ledger = self.ledger.borrow_mut();
        let revoked = ledger.entries.drain().len();
        ledger.used_size = 0;
        revoked
    }
}

/// Back-link from a handle to the tracker holding its entry.
#[derive(Debug)]
pub(crate) struct Binding {
    ledger: Weak<RefCell<Ledger>>,
    key: SlotKey,
}

impl Binding {
    pub(crate) fn key(&self) -> SlotKey {
        self.key
    }

    /// Manager id, if the entry is still tracked.
    pub(crate) fn manager(&self) -> Option<ManagerId> {
        let ledger = self.ledger.upgrade()?;
        let ledger = ledger.borrow();
        ledger.entries.contains(self.key).then_some(ledger.id)
    }

    pub(crate) fn is_live(&self) -> bool {
        self.manager().is_some()
    }

    /// Remove this entry from its tracker, if both still exist.
    pub(crate) fn untrack(&self) -> Option<(ManagerId, TrackedResource)> {
        let ledger = self.ledger.upgrade()?;
        let mut ledger = ledger.borrow_mut();
        let entry = ledger.untrack(self.key)?;
        Some((ledger.id, entry))
    }
}
