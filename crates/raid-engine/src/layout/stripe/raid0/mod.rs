//! RAID0 stripe layout implementation.

mod stripe_impl;

/// RAID0 stripes blocks round-robin across every member without redundancy.
#[derive(Clone, Debug)]
pub struct RAID0 {
    disks: usize,
}

impl RAID0 {
    /// # Panics
    /// Panics if `disks` is zero.
    #[must_use]
    pub fn new(disks: usize) -> Self {
        assert!(disks > 0, "RAID0 needs at least one disk.");
        Self { disks }
    }
}
