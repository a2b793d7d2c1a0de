use crate::layout::stripe::raid0::RAID0;
use crate::layout::stripe::traits::stripe::{Placement, Stripe};

impl Stripe for RAID0 {
    fn data_disks(&self) -> usize {
        self.disks
    }

    fn disks(&self) -> usize {
        self.disks
    }

    fn place(&self, block: u64) -> Placement {
        let disks = self.disks as u64;
        Placement {
            device: usize::try_from(block % disks).unwrap_or_default(),
            device_block: block / disks,
        }
    }
}
