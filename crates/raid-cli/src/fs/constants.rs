//! Inode numbers and names of the exported directory.

use std::time::Duration;

/// ROOT_ID is the inode ID for the filesystem root.
pub const ROOT_ID: u64 = 1;
/// DEVICE_INO is the inode of the file carrying the logical device.
pub const DEVICE_INO: u64 = 2;
/// STATUS_INO is the inode of the read-only status report.
pub const STATUS_INO: u64 = 3;
pub const DEVICE_NAME: &str = "raid";
pub const STATUS_NAME: &str = "status";
/// TTL controls kernel cache TTL for attribute entries.
pub const TTL: Duration = Duration::from_secs(1);
/// OPEN_DIRECT_IO bypasses the page cache so every request reaches the array.
pub const OPEN_DIRECT_IO: u32 = 1;
/// STATFS_BLOCK_SIZE is the block size reported by statfs and getattr.
pub const STATFS_BLOCK_SIZE: u32 = 512;
pub const NAME_LEN: u32 = 255;
