//! File-view manager tests.

use memres::memory::{FileView, FileViewConfig, FileViewManager, ResourceManager};
use memres::ResourceError;
use tempfile::tempdir;

#[test]
fn open_file_creates_and_sizes_backing_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("t.dat");
    assert!(!path.exists());

    let mut mgr = FileViewManager::new();
    mgr.open_file(&path, 120).unwrap();

    assert!(mgr.is_open());
    assert_eq!(mgr.capacity(), 120);
    assert_eq!(mgr.path(), Some(path.as_path()));
    assert_eq!(std::fs::metadata(&path).unwrap().len(), 120);
}

#[test]
fn integers_round_trip_through_mapped_view() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("t.dat");
    let mut mgr = FileViewManager::new();
    mgr.open_file(&path, 120).unwrap();

    let mut view = mgr.allocate(40, 0);
    assert!(view.valid());
    assert_eq!(view.size(), 40);
    assert_eq!(view.offset(), 0);
    assert_eq!(mgr.used_size(), 40);

    let values: [i32; 10] = [1, 2, 3, 4, 5, 6, 7, 8, 9, 10];
    assert!(view.write_slice(&values, 0));
    let mut out = [0i32; 10];
    assert!(view.read_slice(&mut out, 0));
    assert_eq!(out, values);
}

#[test]
fn close_makes_further_allocation_fail() {
    let dir = tempdir().unwrap();
    let mut mgr = FileViewManager::new();
    mgr.open_file(dir.path().join("t.dat"), 120).unwrap();

    mgr.close();

    assert!(!mgr.is_open());
    assert_eq!(mgr.capacity(), 0);
    assert!(!mgr.allocate(40, 0).valid());
    assert!(matches!(mgr.try_allocate(40, 0), Err(ResourceError::Closed)));
}

#[test]
fn allocation_on_fresh_manager_fails() {
    let mut mgr = FileViewManager::new();
    assert!(matches!(mgr.try_allocate(1, 0), Err(ResourceError::Closed)));
    assert!(mgr.is_empty());
}

#[test]
fn writes_persist_across_reopen() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("persist.dat");
    {
        let mut mgr = FileViewManager::new();
        mgr.open_file(&path, 64).unwrap();
        let mut view = mgr.allocate(16, 32);
        assert!(view.write(b"persisted bytes!", 0));
        view.flush().unwrap();
    }

    let mut mgr = FileViewManager::new();
    mgr.open_file(&path, 0).unwrap();
    assert_eq!(mgr.capacity(), 64);
    assert!(mgr.is_empty(), "tracking is not persisted");

    let view = mgr.allocate(64, 0);
    assert_eq!(view.view().sub(32, 16).as_slice(), b"persisted bytes!");
}

#[test]
fn open_file_never_shrinks_existing_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("big.dat");
    std::fs::write(&path, vec![7u8; 200]).unwrap();

    let mut mgr = FileViewManager::new();
    mgr.open_file(&path, 50).unwrap();

    assert_eq!(mgr.capacity(), 200);
    assert_eq!(std::fs::metadata(&path).unwrap().len(), 200);
    let view = mgr.allocate(200, 0);
    assert!(view.view().as_slice().iter().all(|&b| b == 7));
}

#[test]
fn empty_file_cannot_be_opened() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("empty.dat");

    let mut mgr = FileViewManager::new();
    let err = mgr.open_file(&path, 0).unwrap_err();

    assert!(matches!(err, ResourceError::EmptyBacking(_)));
    assert!(!mgr.is_open());
}

#[test]
fn open_file_in_missing_directory_fails_closed() {
    let dir = tempdir().unwrap();
    let mut mgr = FileViewManager::new();

    let err = mgr
        .open_file(dir.path().join("missing").join("t.dat"), 10)
        .unwrap_err();

    assert!(matches!(err, ResourceError::Io(_)));
    assert!(!mgr.is_open());
    assert_eq!(mgr.capacity(), 0);
}

#[test]
fn range_beyond_capacity_is_rejected() {
    let dir = tempdir().unwrap();
    let mut mgr = FileViewManager::new();
    mgr.open_file(dir.path().join("t.dat"), 100).unwrap();

    assert!(matches!(
        mgr.try_allocate(50, 60),
        Err(ResourceError::OutOfRange { offset: 60, size: 50, capacity: 100 })
    ));
    assert!(mgr.allocate(40, 60).valid());
    assert!(mgr.is_empty(), "dropped handle is released");
}

#[test]
fn unaligned_offsets_map_the_right_bytes() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("pattern.dat");
    let pattern: Vec<u8> = (0..10_000u32).map(|i| (i % 251) as u8).collect();
    std::fs::write(&path, &pattern).unwrap();

    let mut mgr = FileViewManager::new();
    mgr.open_file(&path, 0).unwrap();

    for offset in [1usize, 17, 4095, 4097, 9000] {
        let view = mgr.allocate(100, offset);
        assert_eq!(view.offset(), offset);
        assert_eq!(view.view().as_slice(), &pattern[offset..offset + 100]);
    }
}

#[test]
fn overlapping_windows_share_file_bytes() {
    let dir = tempdir().unwrap();
    let mut mgr = FileViewManager::new();
    mgr.open_file(dir.path().join("shared.dat"), 64).unwrap();

    let mut a = mgr.allocate(16, 8);
    let b = mgr.allocate(32, 0);
    assert!(a.write(&[0xCD; 4], 2));

    assert_eq!(b.view().sub(10, 4).as_slice(), &[0xCD; 4]);
}

#[test]
fn used_size_never_exceeds_capacity() {
    let dir = tempdir().unwrap();
    let mut mgr = FileViewManager::new();
    mgr.open_file(dir.path().join("t.dat"), 100).unwrap();

    let _a = mgr.allocate(80, 0);
    let err = mgr.try_allocate(30, 50).unwrap_err();

    assert!(matches!(err, ResourceError::CapacityExceeded { requested: 30, available: 20 }));
    assert_eq!(mgr.used_size(), 80);
}

#[test]
fn view_length_limit_is_enforced() {
    let mut mgr = FileViewManager::with_config(FileViewConfig { max_view_len: 32 });
    mgr.open("limited", 128).unwrap();
    assert_eq!(mgr.config().max_view_len, 32);

    assert!(matches!(
        mgr.try_allocate(64, 0),
        Err(ResourceError::ViewTooLarge { size: 64, limit: 32 })
    ));
    assert!(mgr.allocate(32, 96).valid());
}

#[test]
fn anonymous_store_round_trip() {
    let mut mgr = FileViewManager::new();
    mgr.open("scratch", 4096).unwrap();

    assert!(mgr.is_open());
    assert_eq!(mgr.capacity(), 4096);
    assert_eq!(mgr.label(), Some("scratch"));
    assert_eq!(mgr.path(), None);

    let mut a = mgr.allocate(128, 1024);
    assert!(a.write_slice(&[42u64; 16], 0));
    let b = mgr.allocate(8, 1024 + 8);
    let mut out = [0u64; 1];
    assert!(b.read_slice(&mut out, 0));
    assert_eq!(out[0], 42);
}

#[test]
fn anonymous_store_of_zero_bytes_is_rejected() {
    let mut mgr = FileViewManager::new();
    assert!(matches!(mgr.open("nothing", 0), Err(ResourceError::EmptyBacking(_))));
    assert!(!mgr.is_open());
}

#[test]
fn close_revokes_outstanding_views() {
    let dir = tempdir().unwrap();
    let mut mgr = FileViewManager::new();
    mgr.open_file(dir.path().join("t.dat"), 64).unwrap();
    let mut view = mgr.allocate(16, 0);
    assert!(view.write(&[1; 16], 0));

    mgr.close();

    assert!(!view.valid());
    assert_eq!(view.manager(), None);
    assert!(view.view().is_empty());
    assert!(!view.write(&[2; 16], 0));
    assert!(matches!(mgr.deallocate(&mut view), Err(ResourceError::NotOwned)));
    assert_eq!(mgr.used_size(), 0);
}

#[test]
fn reopen_replaces_previous_store() {
    let dir = tempdir().unwrap();
    let mut mgr = FileViewManager::new();
    mgr.open_file(dir.path().join("a.dat"), 32).unwrap();
    let first = mgr.allocate(8, 0);

    mgr.open_file(dir.path().join("b.dat"), 48).unwrap();

    assert!(!first.valid());
    assert_eq!(mgr.capacity(), 48);
    assert_eq!(mgr.path(), Some(dir.path().join("b.dat").as_path()));
}

#[test]
fn views_move_between_file_managers() {
    let dir = tempdir().unwrap();
    let mut src = FileViewManager::new();
    let mut dst = FileViewManager::new();
    src.open_file(dir.path().join("src.dat"), 64).unwrap();
    dst.open("dst", 64).unwrap();

    let mut view: FileView = src.allocate(16, 16);
    assert!(view.write(b"moved", 0));
    src.detach_resource(&mut view).unwrap();
    dst.add_resource(&mut view).unwrap();

    assert_eq!(view.manager(), Some(dst.id()));
    assert_eq!(dst.used_size(), 16);
    assert!(src.is_empty());
    assert_eq!(view.view().sub(0, 5).as_slice(), b"moved");

    dst.deallocate(&mut view).unwrap();
    assert!(dst.is_empty());
}

#[test]
fn swap_between_windows_of_same_store() {
    let mut mgr = FileViewManager::new();
    mgr.open("swap", 64).unwrap();
    let mut a = mgr.allocate(8, 0);
    let mut b = mgr.allocate(16, 32);

    mgr.swap_resource(&mut a, &mut b).unwrap();

    assert_eq!(a.offset(), 32);
    assert_eq!(a.size(), 16);
    assert_eq!(b.offset(), 0);
    assert_eq!(mgr.used_size(), 24);
    let offsets: Vec<usize> = mgr.resources().iter().map(|r| r.offset).collect();
    assert!(offsets.contains(&0) && offsets.contains(&32));
}
