//! RAID1 mirror layout implementation.

mod restore_impl;
mod stripe_impl;
#[cfg(test)]
mod stripe_trait_tests;

/// RAID1 stores an identical copy of every block on each member.
#[derive(Clone, Debug)]
pub struct RAID1 {
    disks: usize,
}

impl RAID1 {
    /// # Panics
    /// Panics if `disks` is zero.
    #[must_use]
    pub fn new(disks: usize) -> Self {
        assert!(disks > 0, "RAID1 needs at least one disk.");
        Self { disks }
    }
}
