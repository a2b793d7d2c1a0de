//! `fuser::Filesystem` over a [`BlockFs`]: one directory, the device file and the
//! status file. Request logic lives in `core`; this layer only unpacks replies.

use std::ffi::OsStr;
use std::time::SystemTime;

use fuser::{
    FileAttr, Filesystem, ReplyAttr, ReplyData, ReplyDirectory, ReplyEmpty, ReplyEntry,
    ReplyOpen, ReplyStatfs, ReplyWrite, Request, TimeOrNow,
};
use tracing::debug;

use crate::fs::constants::{
    DEVICE_INO, NAME_LEN, OPEN_DIRECT_IO, ROOT_ID, STATFS_BLOCK_SIZE, STATUS_INO, TTL,
};

use super::core::InodeTarget;
use super::types::{BlockFs, Exported};

impl<B: Exported> BlockFs<B> {
    fn attr_for(&self, target: &InodeTarget) -> FileAttr {
        match target {
            InodeTarget::Root => self.root_attr(),
            InodeTarget::Device => self.device_attr(),
            InodeTarget::Status => self.status_attr(),
        }
    }
}

impl<B: Exported> Filesystem for BlockFs<B> {
    fn destroy(&mut self) {
        self.disconnect_device();
    }

    fn lookup(&mut self, _req: &Request<'_>, parent: u64, name: &OsStr, reply: ReplyEntry) {
        match Self::lookup_name(parent, name) {
            Ok(target) => reply.entry(&TTL, &self.attr_for(&target), 0),
            Err(code) => reply.error(code),
        }
    }

    fn getattr(&mut self, _req: &Request<'_>, ino: u64, _fh: Option<u64>, reply: ReplyAttr) {
        match Self::resolve_inode(ino) {
            Ok(target) => reply.attr(&TTL, &self.attr_for(&target)),
            Err(code) => reply.error(code),
        }
    }

    fn access(&mut self, _req: &Request<'_>, ino: u64, _mask: i32, reply: ReplyEmpty) {
        match Self::resolve_inode(ino) {
            Ok(_) => reply.ok(),
            Err(code) => reply.error(code),
        }
    }

    /// The device has a fixed size, so resizes are ignored the way a block device
    /// ignores `O_TRUNC`.
    fn setattr(
        &mut self,
        _req: &Request<'_>,
        ino: u64,
        _mode: Option<u32>,
        _uid: Option<u32>,
        _gid: Option<u32>,
        size: Option<u64>,
        _atime: Option<TimeOrNow>,
        _mtime: Option<TimeOrNow>,
        _ctime: Option<SystemTime>,
        _fh: Option<u64>,
        _crtime: Option<SystemTime>,
        _chgtime: Option<SystemTime>,
        _bkuptime: Option<SystemTime>,
        _flags: Option<u32>,
        reply: ReplyAttr,
    ) {
        let target = match Self::resolve_inode(ino) {
            Ok(target) => target,
            Err(code) => return reply.error(code),
        };
        if let Some(size) = size {
            debug!("ignoring resize of inode {ino} to {size} bytes");
        }
        reply.attr(&TTL, &self.attr_for(&target));
    }

    fn open(&mut self, _req: &Request<'_>, ino: u64, flags: i32, reply: ReplyOpen) {
        let read_only = flags & libc::O_ACCMODE == libc::O_RDONLY;
        match ino {
            DEVICE_INO => reply.opened(DEVICE_INO, OPEN_DIRECT_IO),
            STATUS_INO if read_only => reply.opened(STATUS_INO, OPEN_DIRECT_IO),
            STATUS_INO => reply.error(libc::EACCES),
            _ => reply.error(libc::ENOENT),
        }
    }

    fn read(
        &mut self,
        _req: &Request<'_>,
        ino: u64,
        _fh: u64,
        offset: i64,
        size: u32,
        _flags: i32,
        _lock_owner: Option<u64>,
        reply: ReplyData,
    ) {
        let result = match ino {
            DEVICE_INO => self.read_device(offset, size),
            STATUS_INO => self.read_status(offset, size),
            _ => Err(libc::ENOENT),
        };
        match result {
            Ok(data) => reply.data(&data),
            Err(code) => reply.error(code),
        }
    }

    fn write(
        &mut self,
        _req: &Request<'_>,
        ino: u64,
        _fh: u64,
        offset: i64,
        data: &[u8],
        _write_flags: u32,
        _flags: i32,
        _lock_owner: Option<u64>,
        reply: ReplyWrite,
    ) {
        let result = match ino {
            DEVICE_INO => self.write_device(offset, data),
            STATUS_INO => Err(libc::EACCES),
            _ => Err(libc::ENOENT),
        };
        match result {
            Ok(written) => reply.written(written),
            Err(code) => reply.error(code),
        }
    }

    fn flush(&mut self, _req: &Request<'_>, ino: u64, _fh: u64, _lock: u64, reply: ReplyEmpty) {
        // close() must succeed on both files; durability is fsync's job.
        match ino {
            DEVICE_INO | STATUS_INO => reply.ok(),
            _ => reply.error(libc::ENOENT),
        }
    }

    fn fsync(&mut self, _req: &Request<'_>, ino: u64, _fh: u64, _datasync: bool, reply: ReplyEmpty) {
        let result = match ino {
            DEVICE_INO => self.sync_device(),
            STATUS_INO => Ok(()),
            _ => Err(libc::ENOENT),
        };
        match result {
            Ok(()) => reply.ok(),
            Err(code) => reply.error(code),
        }
    }

    fn readdir(
        &mut self,
        _req: &Request<'_>,
        ino: u64,
        _fh: u64,
        offset: i64,
        mut reply: ReplyDirectory,
    ) {
        if ino != ROOT_ID {
            return reply.error(libc::ENOTDIR);
        }
        let skip = usize::try_from(offset).unwrap_or(0);
        for (i, (inode, kind, name)) in Self::dir_entries().into_iter().enumerate().skip(skip) {
            let next = i64::try_from(i + 1).unwrap_or(i64::MAX);
            if reply.add(inode, next, kind, name) {
                break;
            }
        }
        reply.ok();
    }

    fn statfs(&mut self, _req: &Request<'_>, _ino: u64, reply: ReplyStatfs) {
        let blocks = self.capacity / u64::from(STATFS_BLOCK_SIZE);
        reply.statfs(blocks, 0, 0, 2, 0, STATFS_BLOCK_SIZE, NAME_LEN, STATFS_BLOCK_SIZE);
    }
}
