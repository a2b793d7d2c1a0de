//! `RaidLevel` ties the per-level layouts into one tagged value so the device set and
//! executor stay level-agnostic.

use crate::config::RaidMode;
use crate::layout::stripe::raid0::RAID0;
use crate::layout::stripe::raid1::RAID1;
use crate::layout::stripe::raid4::RAID4;
use crate::layout::stripe::traits::restore::Restore;
use crate::layout::stripe::traits::stripe::{Placement, Stripe};

#[derive(Clone, Debug)]
pub enum RaidLevel {
    Striped(RAID0),
    Mirrored(RAID1),
    ParityProtected(RAID4),
}

impl RaidLevel {
    /// Builds the layout for `disks` members. `parity` only applies to RAID4 and
    /// defaults to the last member.
    ///
    /// # Panics
    /// Panics on member counts the layouts cannot represent; `RaidConfig::validate`
    /// rejects those first.
    #[must_use]
    pub fn new(mode: RaidMode, disks: usize, parity: Option<usize>) -> Self {
        match mode {
            RaidMode::Raid0 => Self::Striped(RAID0::new(disks)),
            RaidMode::Raid1 => Self::Mirrored(RAID1::new(disks)),
            RaidMode::Raid4 => Self::ParityProtected(match parity {
                Some(p) => RAID4::new(disks, p),
                None => RAID4::with_last_parity(disks),
            }),
        }
    }

    #[must_use]
    pub const fn mode(&self) -> RaidMode {
        match self {
            Self::Striped(_) => RaidMode::Raid0,
            Self::Mirrored(_) => RaidMode::Raid1,
            Self::ParityProtected(_) => RaidMode::Raid4,
        }
    }

    fn inner(&self) -> &dyn Stripe {
        match self {
            Self::Striped(r) => r,
            Self::Mirrored(r) => r,
            Self::ParityProtected(r) => r,
        }
    }
}

impl Stripe for RaidLevel {
    fn data_disks(&self) -> usize {
        self.inner().data_disks()
    }

    fn disks(&self) -> usize {
        self.inner().disks()
    }

    fn place(&self, block: u64) -> Placement {
        self.inner().place(block)
    }

    fn mirrors(&self, device: usize) -> Vec<usize> {
        self.inner().mirrors(device)
    }

    fn parity_disk(&self) -> Option<usize> {
        self.inner().parity_disk()
    }

    fn as_restore(&self) -> Option<&dyn Restore> {
        self.inner().as_restore()
    }
}
