//! FUSE export of a logical block device as a single fixed-size file.

pub mod constants;
pub mod export;

pub use constants::*;
pub use export::{BlockFs, Exported};

#[cfg(test)]
pub(crate) mod test_utils {
    use std::path::PathBuf;

    use raid_engine::config::{DeviceSpec, RaidConfig, RaidMode};
    use raid_engine::retention::disk::Disk;
    use raid_engine::{BlockDevice, RaidError, Result, Volume};
    use tempfile::TempDir;

    use super::export::{BlockFs, Exported};

    /// `MemDevice` is an in-memory block device for exercising the export.
    #[derive(Debug, Default)]
    pub struct MemDevice {
        pub data: Vec<u8>,
        pub flushes: usize,
        pub disconnected: bool,
        pub fail_io: bool,
    }

    impl MemDevice {
        pub fn with_len(len: usize) -> Self {
            Self {
                data: vec![0; len],
                ..Self::default()
            }
        }

        fn range(&self, offset: u64, len: usize) -> Result<std::ops::Range<usize>> {
            let range = usize::try_from(offset)
                .ok()
                .and_then(|start| start.checked_add(len).map(|end| start..end));
            match range {
                Some(r) if r.end <= self.data.len() => Ok(r),
                _ => Err(RaidError::InvalidRange {
                    offset,
                    len: len as u64,
                    capacity: self.size_bytes(),
                }),
            }
        }
    }

    impl BlockDevice for MemDevice {
        fn size_bytes(&self) -> u64 {
            self.data.len() as u64
        }

        fn read(&mut self, buf: &mut [u8], offset: u64) -> Result<()> {
            if self.fail_io {
                return Err(raid_engine::IoError::DeviceMissing { device: 0 }.into());
            }
            let r = self.range(offset, buf.len())?;
            buf.copy_from_slice(&self.data[r]);
            Ok(())
        }

        fn write(&mut self, buf: &[u8], offset: u64) -> Result<()> {
            if self.fail_io {
                return Err(raid_engine::IoError::DeviceMissing { device: 0 }.into());
            }
            let r = self.range(offset, buf.len())?;
            self.data[r].copy_from_slice(buf);
            Ok(())
        }

        fn flush(&mut self) -> Result<()> {
            self.flushes += 1;
            Ok(())
        }

        fn disconnect(&mut self) {
            self.disconnected = true;
        }
    }

    impl Exported for MemDevice {
        fn status_text(&self) -> String {
            format!("memory device, {} bytes\n", self.data.len())
        }
    }

    pub fn create_mem_fs(len: usize) -> BlockFs<MemDevice> {
        BlockFs::new(MemDevice::with_len(len), None)
    }

    /// `create_volume` assembles a two-way mirror over fresh images in `dir`.
    pub fn create_volume(dir: &TempDir, disk_len: u64) -> Volume {
        let devices = (0..2)
            .map(|i| {
                let path: PathBuf = dir.path().join(format!("disk-{i}.img"));
                Disk::create(&path, disk_len).expect("create image");
                DeviceSpec::Present(path)
            })
            .collect();
        Volume::assemble(&RaidConfig::new(RaidMode::Raid1, 512, devices)).expect("assemble")
    }
}
