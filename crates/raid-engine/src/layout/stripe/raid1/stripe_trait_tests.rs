use crate::layout::stripe::raid1::RAID1;
use crate::layout::stripe::traits::stripe::{Placement, Stripe};

#[test]
fn data_disks_is_one() {
    let r = RAID1::new(2);
    assert_eq!(r.data_disks(), 1);
    assert_eq!(r.disks(), 2);
}

#[test]
fn blocks_map_to_same_offset_without_striping() {
    let r = RAID1::new(2);
    for b in [0u64, 1, 2, 1000] {
        assert_eq!(r.place(b), Placement { device: 0, device_block: b });
    }
}

#[test]
fn every_member_is_a_mirror() {
    let r = RAID1::new(2);
    assert_eq!(r.mirrors(0), vec![0, 1]);
    assert_eq!(r.mirrors(1), vec![0, 1]);
}

#[test]
fn as_restore_returns_some() {
    let r = RAID1::new(2);
    assert!(r.as_restore().is_some());
    assert!(r.parity_disk().is_none());
}
