use crate::layout::stripe::raid4::RAID4;
use crate::layout::stripe::traits::restore::Restore;
use crate::layout::stripe::traits::stripe::{Placement, Stripe};

impl Stripe for RAID4 {
    fn data_disks(&self) -> usize {
        self.disks - 1
    }

    fn disks(&self) -> usize {
        self.disks
    }

    fn place(&self, block: u64) -> Placement {
        let data = self.data_disks() as u64;
        let slot = usize::try_from(block % data).unwrap_or_default();
        Placement {
            device: self.member_for_slot(slot),
            device_block: block / data,
        }
    }

    fn parity_disk(&self) -> Option<usize> {
        Some(self.parity)
    }

    fn as_restore(&self) -> Option<&dyn Restore> {
        Some(self)
    }
}
