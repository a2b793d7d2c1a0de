#[cfg(test)]
mod disk_tests;

use std::fs::{File, OpenOptions};
use std::io::{self, Seek, SeekFrom};
use std::os::unix::fs::FileExt;
use std::path::{Path, PathBuf};

use crate::error::{RaidError, Result};

/// Disk is one backing store (block device or plain file) accessed with blocking
/// positioned I/O. Transfers never extend past the length detected at open time.
#[derive(Debug)]
pub struct Disk {
    path: PathBuf,
    file: File,
    len: u64,
}

impl Disk {
    /// Attaches an existing device read-write.
    ///
    /// # Errors
    /// Returns `RaidError::DeviceOpen` if the path cannot be opened or sized.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let open_err = |source| RaidError::DeviceOpen {
            path: path.clone(),
            source,
        };

        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&path)
            .map_err(open_err)?;
        // Block devices report zero in metadata; the end offset is their real size.
        let len = file.seek(SeekFrom::End(0)).map_err(open_err)?;

        Ok(Self { path, file, len })
    }

    /// Creates (or truncates) a zero-filled image file of `len` bytes.
    ///
    /// # Errors
    /// Returns `RaidError::DeviceOpen` if the image cannot be created or sized.
    pub fn create(path: impl AsRef<Path>, len: u64) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let open_err = |source| RaidError::DeviceOpen {
            path: path.clone(),
            source,
        };

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)
            .map_err(open_err)?;
        file.set_len(len).map_err(open_err)?;

        Ok(Self { path, file, len })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub const fn len(&self) -> u64 {
        self.len
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Reads into `buf` from `off`, returning how many bytes arrived. Fewer than
    /// `buf.len()` only at the end of the device.
    ///
    /// # Errors
    /// Propagates the underlying read error.
    pub fn read_at(&self, off: u64, buf: &mut [u8]) -> io::Result<usize> {
        let want = self.clip(off, buf.len());
        let mut done = 0;
        while done < want {
            match self.file.read_at(&mut buf[done..want], off + done as u64) {
                Ok(0) => break,
                Ok(n) => done += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
        Ok(done)
    }

    /// Writes `data` at `off`, returning how many bytes landed. Only the prefix that
    /// fits inside the device is written.
    ///
    /// # Errors
    /// Propagates the underlying write error.
    pub fn write_at(&mut self, off: u64, data: &[u8]) -> io::Result<usize> {
        let want = self.clip(off, data.len());
        let mut done = 0;
        while done < want {
            match self.file.write_at(&data[done..want], off + done as u64) {
                Ok(0) => break,
                Ok(n) => done += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
        Ok(done)
    }

    /// Flushes OS buffers for this device (`fsync`).
    ///
    /// # Errors
    /// Propagates the underlying sync error.
    pub fn sync(&self) -> io::Result<()> {
        self.file.sync_all()
    }

    fn clip(&self, off: u64, len: usize) -> usize {
        if off >= self.len {
            return 0;
        }
        usize::try_from(self.len - off).map_or(len, |room| room.min(len))
    }
}
