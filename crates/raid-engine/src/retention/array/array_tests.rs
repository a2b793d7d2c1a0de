use super::*;
use tempfile::TempDir;

const DISK_LEN: u64 = 8192;

fn disk(dir: &TempDir, i: usize, len: u64) -> Disk {
    Disk::create(dir.path().join(format!("disk-{i}.img")), len).expect("create disk")
}

fn three_present(dir: &TempDir) -> Array {
    Array::new((0..3).map(|i| Member::Present(disk(dir, i, DISK_LEN))).collect())
        .expect("array")
}

#[test]
fn fresh_array_is_optimal() {
    let dir = TempDir::new().unwrap();
    let array = three_present(&dir);

    assert_eq!(array.len(), 3);
    assert_eq!(array.state(), ArrayState::Optimal);
    assert!((0..3).all(|i| array.is_healthy(i)));
    assert_eq!(array.status(3), None);
    assert_eq!(array.min_healthy_len(), Some(DISK_LEN));
}

#[test]
fn new_rejects_two_unavailable_members() {
    let dir = TempDir::new().unwrap();

    let err = Array::new(vec![
        Member::Missing,
        Member::Missing,
        Member::Present(disk(&dir, 2, DISK_LEN)),
    ])
    .unwrap_err();
    assert!(matches!(err, RaidError::Configuration(_)));

    let err = Array::new(vec![
        Member::Missing,
        Member::Replacement(disk(&dir, 1, DISK_LEN)),
        Member::Present(disk(&dir, 2, DISK_LEN)),
    ])
    .unwrap_err();
    assert!(err.to_string().contains("cannot rebuild"));
}

#[test]
fn new_rejects_all_missing() {
    let err = Array::new(vec![Member::Missing]).unwrap_err();
    assert!(err.to_string().contains("no functioning devices"));
}

#[test]
fn min_healthy_len_ignores_missing_and_rebuild_targets() {
    let dir = TempDir::new().unwrap();
    let array = Array::new(vec![
        Member::Present(disk(&dir, 0, 10_000)),
        Member::Replacement(disk(&dir, 1, 512)),
        Member::Present(disk(&dir, 2, 10_050)),
    ])
    .unwrap();

    assert_eq!(array.state(), ArrayState::Rebuilding { target: 1 });
    assert_eq!(array.min_healthy_len(), Some(10_000));
}

#[test]
fn open_honours_device_markers() {
    let dir = TempDir::new().unwrap();
    let p0 = disk(&dir, 0, DISK_LEN).path().to_path_buf();
    let p2 = disk(&dir, 2, DISK_LEN).path().to_path_buf();

    let array = Array::open(&[
        DeviceSpec::Present(p0),
        DeviceSpec::Missing,
        DeviceSpec::Present(p2),
    ])
    .unwrap();

    assert_eq!(array.state(), ArrayState::Degraded { missing: 1 });
    assert!(array.disk(1).is_none());
    assert!(array.disk(0).is_some());
}

#[test]
fn open_reports_unopenable_path() {
    let dir = TempDir::new().unwrap();
    let err = Array::open(&[
        DeviceSpec::Present(dir.path().join("absent.img")),
        DeviceSpec::Missing,
    ])
    .unwrap_err();
    assert!(matches!(err, RaidError::DeviceOpen { .. }));
}

#[test]
fn read_and_write_roundtrip_on_member() {
    let dir = TempDir::new().unwrap();
    let mut array = three_present(&dir);

    array
        .write_all(1, 100, b"payload", SegmentRole::DataWrite)
        .unwrap();
    let mut back = [0u8; 7];
    array
        .read_exact(1, 100, &mut back, SegmentRole::DataRead)
        .unwrap();
    assert_eq!(&back, b"payload");
    array.flush().unwrap();
}

#[test]
fn transfer_past_member_end_is_short() {
    let dir = TempDir::new().unwrap();
    let mut array = three_present(&dir);

    let err = array
        .write_all(0, DISK_LEN - 4, &[1u8; 16], SegmentRole::DataWrite)
        .unwrap_err();
    match err {
        IoError::ShortTransfer {
            device,
            op,
            expected,
            actual,
            ..
        } => {
            assert_eq!(device, 0);
            assert_eq!(op, IoOpType::Write);
            assert_eq!(expected, 16);
            assert_eq!(actual, 4);
        }
        other => panic!("unexpected error {other:?}"),
    }

    let mut buf = [0u8; 16];
    let err = array
        .read_exact(2, DISK_LEN, &mut buf, SegmentRole::ParityRead)
        .unwrap_err();
    assert!(matches!(err, IoError::ShortTransfer { actual: 0, .. }));
}

#[test]
fn missing_member_io_reports_device_missing() {
    let dir = TempDir::new().unwrap();
    let mut array = three_present(&dir);
    array.fail_disk(2).unwrap();

    let mut buf = [0u8; 4];
    let err = array
        .read_exact(2, 0, &mut buf, SegmentRole::DataRead)
        .unwrap_err();
    assert!(matches!(err, IoError::DeviceMissing { device: 2 }));
    // Flush skips the missing member.
    array.flush().unwrap();
}

#[test]
fn second_failure_is_rejected() {
    let dir = TempDir::new().unwrap();
    let mut array = three_present(&dir);

    array.fail_disk(0).unwrap();
    array.fail_disk(0).unwrap();
    let err = array.fail_disk(1).unwrap_err();
    assert!(matches!(err, RaidError::Configuration(_)));
    assert!(array.is_healthy(1));
    assert!(array.fail_disk(9).is_err());
}

#[test]
fn replace_requires_missing_slot_and_marks_rebuild_target() {
    let dir = TempDir::new().unwrap();
    let mut array = three_present(&dir);

    let err = array.replace_disk(1, disk(&dir, 7, DISK_LEN)).unwrap_err();
    assert!(err.to_string().contains("only a MISSING device"));

    array.fail_disk(1).unwrap();
    array.replace_disk(1, disk(&dir, 8, DISK_LEN)).unwrap();
    assert_eq!(array.status(1), Some(DiskStatus::RebuildTarget));
    assert_eq!(array.rebuild_target(), Some(1));
    let err = array.fail_disk(0).unwrap_err();
    assert_eq!(
        err.to_string(),
        "configuration error: cannot fail device 0 while device 1 is NEEDS_REBUILD"
    );

    array.mark_healthy(1);
    assert_eq!(array.state(), ArrayState::Optimal);
}

#[test]
fn failing_rebuild_target_returns_slot_to_missing() {
    let dir = TempDir::new().unwrap();
    let mut array = three_present(&dir);

    array.fail_disk(2).unwrap();
    array.replace_disk(2, disk(&dir, 9, DISK_LEN)).unwrap();
    array.fail_disk(2).unwrap();

    assert_eq!(array.status(2), Some(DiskStatus::Missing));
    assert!(array.disk(2).is_none());
    assert_eq!(array.state(), ArrayState::Degraded { missing: 2 });
    array.replace_disk(2, disk(&dir, 10, DISK_LEN)).unwrap();
    assert_eq!(array.rebuild_target(), Some(2));
}

#[test]
fn status_string_lists_every_slot() {
    let dir = TempDir::new().unwrap();
    let mut array = three_present(&dir);
    array.fail_disk(1).unwrap();

    let s = array.status_string();
    let lines: Vec<&str> = s.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("disk 0: OK (path="));
    assert_eq!(lines[1], "disk 1: MISSING (path=-)");
}
