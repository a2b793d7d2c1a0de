//! Block placement for the supported RAID levels.

pub mod level;
pub mod raid0;
pub mod raid1;
pub mod raid4;
pub mod traits;
