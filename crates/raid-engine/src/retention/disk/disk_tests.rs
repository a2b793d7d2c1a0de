use crate::error::RaidError;
use crate::retention::disk::Disk;
use rand::RngCore;
use tempfile::{NamedTempFile, TempDir};

const DISK_LEN: u64 = 1 << 20;

#[test]
fn create_makes_zero_filled_image() {
    let dir = TempDir::new().expect("tmp dir");
    let path = dir.path().join("disk-0.img");

    let d = Disk::create(&path, DISK_LEN).expect("create");
    assert_eq!(d.len(), DISK_LEN, "disk length must match requested");
    assert_eq!(std::fs::metadata(&path).expect("metadata").len(), DISK_LEN);

    let mut buf = vec![0xAAu8; 4096];
    let n = d.read_at(555_000, &mut buf).expect("read");
    assert_eq!(n, 4096);
    assert!(
        buf.iter().all(|&b| b == 0),
        "newly allocated space should read as zeros"
    );
}

#[test]
fn open_detects_size_by_seeking_to_end() {
    let tf = NamedTempFile::new().expect("tmp file");
    tf.as_file().set_len(10_050).expect("set_len");

    let d = Disk::open(tf.path()).expect("open");
    assert_eq!(d.len(), 10_050);
    assert_eq!(d.path(), tf.path());
    assert!(!d.is_empty());
}

#[test]
fn open_of_missing_path_is_a_device_open_error() {
    let dir = TempDir::new().expect("tmp dir");
    let path = dir.path().join("nope.img");

    let err = Disk::open(&path).expect_err("must fail");
    match err {
        RaidError::DeviceOpen { path: p, .. } => assert_eq!(p, path),
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn write_then_read_roundtrip() {
    let tf = NamedTempFile::new().expect("tmp file");
    let mut d = Disk::create(tf.path(), DISK_LEN).expect("create");

    let off = 64 * 1024 + 123;
    let mut data = vec![0u8; 8192];
    rand::rng().fill_bytes(&mut data);

    let wn = d.write_at(off, &data).expect("write");
    assert_eq!(wn, data.len(), "must write full buffer");

    let mut back = vec![0u8; data.len()];
    let rn = d.read_at(off, &mut back).expect("read");
    assert_eq!(rn, data.len(), "must read full buffer");
    assert_eq!(back, data, "roundtrip must match");
}

#[test]
fn durability_reopen_and_read_back() {
    let tf = NamedTempFile::new().expect("tmp file");
    let off = DISK_LEN / 2 - 200;

    {
        let mut d = Disk::create(tf.path(), DISK_LEN).expect("create");
        let payload = b"hello-from-pwrite";
        assert_eq!(d.write_at(off, payload).expect("write"), payload.len());
        d.sync().expect("sync");
    }

    let d2 = Disk::open(tf.path()).expect("reopen");
    let mut buf = vec![0u8; 17];
    assert_eq!(d2.read_at(off, &mut buf).expect("read"), 17);
    assert_eq!(&buf, b"hello-from-pwrite");
}

#[test]
fn read_past_end_is_truncated() {
    let tf = NamedTempFile::new().expect("tmp file");
    let d = Disk::create(tf.path(), DISK_LEN).expect("create");

    let mut buf = vec![0xCCu8; 4096];
    let n = d.read_at(DISK_LEN - 512, &mut buf).expect("read");
    assert_eq!(n, 512, "read must truncate at end of device");
    assert!(buf[..512].iter().all(|&b| b == 0));
    assert!(
        buf[512..].iter().all(|&b| b == 0xCC),
        "untouched tail must remain"
    );

    assert_eq!(d.read_at(DISK_LEN, &mut buf).expect("read"), 0);
}

#[test]
fn write_past_end_is_truncated_not_extended() {
    let tf = NamedTempFile::new().expect("tmp file");
    let mut d = Disk::create(tf.path(), DISK_LEN).expect("create");

    let data = vec![0x5Au8; 500];
    let n = d.write_at(DISK_LEN - 100, &data).expect("write");
    assert_eq!(n, 100, "only the in-range prefix should be written");
    assert_eq!(
        std::fs::metadata(tf.path()).expect("metadata").len(),
        DISK_LEN,
        "image must not grow"
    );

    let mut back = vec![0u8; 128];
    d.read_at(DISK_LEN - 128, &mut back).expect("read");
    assert!(back[28..].iter().all(|&b| b == 0x5A));
    assert!(back[..28].iter().all(|&b| b == 0));
}

#[test]
fn shrunk_backing_file_reads_short() {
    let tf = NamedTempFile::new().expect("tmp file");
    let d = Disk::create(tf.path(), 8192).expect("create");
    tf.as_file().set_len(4096).expect("shrink");

    let mut buf = vec![0u8; 4096];
    assert_eq!(d.read_at(2048, &mut buf).expect("read"), 2048);
}
