use crate::layout::stripe::raid1::RAID1;
use crate::layout::stripe::traits::restore::Restore;
use crate::layout::stripe::traits::stripe::{Placement, Stripe};

impl Stripe for RAID1 {
    fn data_disks(&self) -> usize {
        1
    }

    fn disks(&self) -> usize {
        self.disks
    }

    // Mirror 0 stands for the whole mirror set; the executor fans out over `mirrors`.
    fn place(&self, block: u64) -> Placement {
        Placement {
            device: 0,
            device_block: block,
        }
    }

    fn mirrors(&self, _device: usize) -> Vec<usize> {
        (0..self.disks).collect()
    }

    fn as_restore(&self) -> Option<&dyn Restore> {
        Some(self)
    }
}
