use crate::layout::stripe::raid4::RAID4;
use crate::layout::stripe::traits::restore::Restore;

impl Restore for RAID4 {
    // Data or parity alike: the XOR of every other member.
    fn sources(&self, missing: usize) -> Vec<usize> {
        assert!(
            missing < self.disks,
            "RAID4 have {} disks, {missing} is not valid index.",
            self.disks
        );
        (0..self.disks).filter(|&j| j != missing).collect()
    }

    fn scrub_member(&self) -> usize {
        self.parity
    }
}
