//! RAID4 layout: striped data members plus one dedicated XOR parity member.

mod restore_impl;
mod stripe_impl;

/// RAID4 stripes data across `disks - 1` members; `parity` holds their XOR.
#[derive(Clone, Debug)]
pub struct RAID4 {
    disks: usize,
    parity: usize,
}

impl RAID4 {
    /// # Panics
    /// Panics if there are fewer than two disks or `parity` is out of range.
    #[must_use]
    pub fn new(disks: usize, parity: usize) -> Self {
        assert!(disks >= 2, "RAID4 needs at least two disks.");
        assert!(
            parity < disks,
            "RAID4 have {disks} disks, parity index {parity} is not valid."
        );
        Self { disks, parity }
    }

    /// `with_last_parity` places parity on the highest-numbered member.
    #[must_use]
    pub fn with_last_parity(disks: usize) -> Self {
        Self::new(disks, disks.saturating_sub(1))
    }

    /// Data slot `slot` (0-based among data members) to physical member index.
    const fn member_for_slot(&self, slot: usize) -> usize {
        if slot < self.parity { slot } else { slot + 1 }
    }
}
