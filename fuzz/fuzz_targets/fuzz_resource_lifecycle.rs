//! Fuzz target for allocate/deallocate/swap/transfer sequences.
//!
//! After every step the tracked sizes must add up to `used_size()` and every
//! handle's validity must match the tracking set.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use memres::memory::{HeapManager, HeapResource, ResourceManager};

#[derive(Debug, Arbitrary)]
enum Op {
    Allocate { manager: bool, size: u16 },
    Deallocate { manager: bool, slot: u8 },
    Release { slot: u8 },
    Swap { a: u8, b: u8 },
    Transfer { slot: u8 },
    RevokeAll { manager: bool },
}

fn check(mgr: &HeapManager, handles: &[HeapResource]) {
    let tracked: usize = mgr.resources().iter().map(|r| r.size).sum();
    assert_eq!(tracked, mgr.used_size());
    let owned = handles.iter().filter(|h| mgr.owns(h)).count();
    assert_eq!(owned, mgr.len());
}

fuzz_target!(|ops: Vec<Op>| {
    let mut managers = [HeapManager::new(), HeapManager::new()];
    let mut handles: Vec<HeapResource> = Vec::new();

    for op in ops.into_iter().take(256) {
        match op {
            Op::Allocate { manager, size } => {
                let res = managers[manager as usize].allocate(size as usize, 0);
                assert_eq!(res.valid(), size > 0);
                handles.push(res);
            }
            Op::Deallocate { manager, slot } => {
                if let Some(h) = handles.get_mut(slot as usize) {
                    let mgr = &mut managers[manager as usize];
                    let owned = mgr.owns(h);
                    assert_eq!(mgr.deallocate(h).is_ok(), owned);
                    assert!(!h.valid() || !owned);
                }
            }
            Op::Release { slot } => {
                if let Some(h) = handles.get_mut(slot as usize) {
                    h.release();
                    assert!(!h.valid());
                }
            }
            Op::Swap { a, b } => {
                let (a, b) = (a as usize, b as usize);
                if a < b && b < handles.len() {
                    let (left, right) = handles.split_at_mut(b);
                    let before = managers[0].used_size();
                    let _ = managers[0].swap_resource(&mut left[a], &mut right[0]);
                    assert_eq!(managers[0].used_size(), before);
                }
            }
            Op::Transfer { slot } => {
                if let Some(h) = handles.get_mut(slot as usize) {
                    let [first, second] = &mut managers;
                    if first.detach_resource(h).is_ok() {
                        assert!(second.add_resource(h).is_ok());
                    }
                }
            }
            Op::RevokeAll { manager } => {
                managers[manager as usize].deallocate_all();
            }
        }
        for mgr in &managers {
            check(mgr, &handles);
        }
    }
});
