use crate::layout::stripe::raid1::RAID1;
use crate::layout::stripe::traits::restore::Restore;

impl Restore for RAID1 {
    fn sources(&self, missing: usize) -> Vec<usize> {
        assert!(
            missing < self.disks,
            "RAID1 have {} disks, {missing} is not valid index.",
            self.disks
        );
        // Any one surviving mirror is a full copy.
        let source = (0..self.disks).find(|&j| j != missing);
        match source {
            Some(src) => vec![src],
            None => panic!("RAID1 requires at least two drives to restore"),
        }
    }

    fn scrub_member(&self) -> usize {
        0
    }
}
