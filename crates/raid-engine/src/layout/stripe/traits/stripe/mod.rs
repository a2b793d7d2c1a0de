//! Stripe trait definitions for placing logical blocks on member devices.

use crate::layout::stripe::traits::restore::Restore;

/// Placement names the member device and member-relative block holding a logical block.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Placement {
    pub device: usize,
    pub device_block: u64,
}

/// Stripe describes how a RAID layout spreads logical blocks over its members.
pub trait Stripe {
    /// data_disks is the number of members carrying distinct logical data in one row.
    fn data_disks(&self) -> usize;

    /// disks is the total number of members, parity included.
    fn disks(&self) -> usize;

    /// place maps a logical block index to its home member.
    ///
    /// # Arguments
    /// * `block` - Logical block index.
    fn place(&self, block: u64) -> Placement;

    /// mirrors lists every member holding a copy of `device`'s blocks, itself included.
    fn mirrors(&self, device: usize) -> Vec<usize> {
        vec![device]
    }

    /// parity_disk names the member dedicated to parity, if the layout has one.
    fn parity_disk(&self) -> Option<usize> {
        None
    }

    /// as_restore returns the reconstruction rules if the layout is redundant.
    fn as_restore(&self) -> Option<&dyn Restore> {
        None
    }
}
