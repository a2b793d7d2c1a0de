use std::ffi::OsStr;
use std::time::SystemTime;

use fuser::{FileAttr, FileType};
use raid_engine::{BlockDevice, RaidError};
use tracing::warn;

use crate::fs::constants::{
    DEVICE_INO, DEVICE_NAME, ROOT_ID, STATFS_BLOCK_SIZE, STATUS_INO, STATUS_NAME,
};

use super::types::{BlockFs, Exported};

pub(crate) enum InodeTarget {
    Root,
    Device,
    Status,
}

impl<B: Exported> BlockFs<B> {
    fn attr(ino: u64, kind: FileType, size: u64, perm: u16) -> FileAttr {
        let epoch = SystemTime::UNIX_EPOCH;
        // SAFETY: getuid/getgid cannot fail and touch no memory.
        let (uid, gid) = unsafe { (libc::getuid(), libc::getgid()) };
        FileAttr {
            ino,
            size,
            blocks: size.div_ceil(u64::from(STATFS_BLOCK_SIZE)),
            atime: epoch,
            mtime: epoch,
            ctime: epoch,
            crtime: epoch,
            kind,
            perm,
            nlink: if kind == FileType::Directory { 2 } else { 1 },
            uid,
            gid,
            rdev: 0,
            blksize: STATFS_BLOCK_SIZE,
            flags: 0,
        }
    }

    #[must_use]
    pub fn root_attr(&self) -> FileAttr {
        Self::attr(ROOT_ID, FileType::Directory, 0, 0o755)
    }

    #[must_use]
    pub fn device_attr(&self) -> FileAttr {
        Self::attr(DEVICE_INO, FileType::RegularFile, self.capacity, 0o600)
    }

    #[must_use]
    pub fn status_attr(&self) -> FileAttr {
        let len = self.status_bytes().map_or(0, |b| b.len() as u64);
        Self::attr(STATUS_INO, FileType::RegularFile, len, 0o444)
    }

    pub(crate) fn resolve_inode(ino: u64) -> Result<InodeTarget, i32> {
        match ino {
            ROOT_ID => Ok(InodeTarget::Root),
            DEVICE_INO => Ok(InodeTarget::Device),
            STATUS_INO => Ok(InodeTarget::Status),
            _ => Err(libc::ENOENT),
        }
    }

    pub(crate) fn lookup_name(parent: u64, name: &OsStr) -> Result<InodeTarget, i32> {
        if parent != ROOT_ID {
            return Err(libc::ENOENT);
        }
        if name == OsStr::new(DEVICE_NAME) {
            Ok(InodeTarget::Device)
        } else if name == OsStr::new(STATUS_NAME) {
            Ok(InodeTarget::Status)
        } else {
            Err(libc::ENOENT)
        }
    }

    pub(crate) fn dir_entries() -> [(u64, FileType, &'static str); 4] {
        [
            (ROOT_ID, FileType::Directory, "."),
            (ROOT_ID, FileType::Directory, ".."),
            (DEVICE_INO, FileType::RegularFile, DEVICE_NAME),
            (STATUS_INO, FileType::RegularFile, STATUS_NAME),
        ]
    }

    /// Device state followed by I/O counters, as served from `status`.
    pub(crate) fn status_bytes(&self) -> Result<Vec<u8>, i32> {
        let Ok(device) = self.state.lock() else {
            return Err(libc::EIO);
        };
        let mut txt = device.status_text();
        if let Some(counters) = &self.counters {
            txt.push_str("io: ");
            txt.push_str(&counters.snapshot().to_string());
            txt.push('\n');
        }
        Ok(txt.into_bytes())
    }

    pub(crate) fn read_status(&self, offset: i64, size: u32) -> Result<Vec<u8>, i32> {
        let offset = usize::try_from(offset).map_err(|_| libc::EINVAL)?;
        let text = self.status_bytes()?;
        let start = offset.min(text.len());
        let end = start.saturating_add(size as usize).min(text.len());
        Ok(text[start..end].to_vec())
    }

    /// Reads up to `size` bytes at `offset`, stopping at the end of the device.
    pub(crate) fn read_device(&self, offset: i64, size: u32) -> Result<Vec<u8>, i32> {
        let offset = u64::try_from(offset).map_err(|_| libc::EINVAL)?;
        if offset >= self.capacity {
            return Ok(Vec::new());
        }
        let len = u64::from(size).min(self.capacity - offset);
        let mut buf = vec![0u8; usize::try_from(len).map_err(|_| libc::EINVAL)?];

        let Ok(mut device) = self.state.lock() else {
            return Err(libc::EIO);
        };
        device.read(&mut buf, offset).map_err(errno_for)?;
        Ok(buf)
    }

    /// Writes all of `data` at `offset`; nothing is written if it would not fit.
    pub(crate) fn write_device(&self, offset: i64, data: &[u8]) -> Result<u32, i32> {
        let offset = u64::try_from(offset).map_err(|_| libc::EINVAL)?;
        let end = offset
            .checked_add(data.len() as u64)
            .ok_or(libc::ENOSPC)?;
        if end > self.capacity {
            return Err(libc::ENOSPC);
        }
        let written = u32::try_from(data.len()).map_err(|_| libc::EINVAL)?;

        let Ok(mut device) = self.state.lock() else {
            return Err(libc::EIO);
        };
        device.write(data, offset).map_err(errno_for)?;
        Ok(written)
    }

    pub(crate) fn sync_device(&self) -> Result<(), i32> {
        let Ok(mut device) = self.state.lock() else {
            return Err(libc::EIO);
        };
        device.flush().map_err(errno_for)
    }

    pub(crate) fn disconnect_device(&self) {
        if let Ok(mut device) = self.state.lock() {
            device.disconnect();
        }
    }
}

/// Every engine failure surfaces to the kernel as `EIO`.
pub(crate) fn errno_for(err: RaidError) -> i32 {
    warn!("request failed: {err}");
    libc::EIO
}
