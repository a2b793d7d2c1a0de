//! RAID0/1/4 engine behind a user-space block device.
//!
//! The layout modules describe where logical blocks live; the retention modules own
//! the backing devices and execute logical requests against them.
#![allow(clippy::cargo_common_metadata)]

pub mod block;
pub mod config;
pub mod error;
pub mod layout;
pub mod metrics;
pub mod retention;

pub use block::BlockDevice;
pub use config::{DeviceSpec, RaidConfig, RaidMode};
pub use error::{IoError, RaidError, Result};
pub use retention::volume::Volume;
