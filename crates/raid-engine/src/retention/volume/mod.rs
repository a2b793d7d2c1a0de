pub mod mapper;
pub(crate) mod recovery;

use std::time::Instant;

use tracing::{debug, info};

use crate::block::BlockDevice;
use crate::config::RaidConfig;
use crate::error::{IoError, RaidError, Result};
use crate::layout::stripe::level::RaidLevel;
use crate::layout::stripe::traits::stripe::Stripe;
use crate::metrics::{self, IoOpType, RaidOp};
use crate::retention::array::{Array, ArrayState};
use crate::retention::disk::Disk;
use crate::retention::rebuild::{self, RebuildReport};
use mapper::{Geometry, Segment, SegmentRole, translate};

/// Volume is the logical device: a layout, the device set it governs and the derived
/// geometry. Requests take `&mut self`, so only one is ever in flight.
#[derive(Debug)]
pub struct Volume {
    array: Array,
    level: RaidLevel,
    geom: Geometry,
    read_turn: usize,
}

impl Volume {
    /// Validates `config`, opens its devices and runs the requested rebuild, if any,
    /// before returning.
    ///
    /// # Errors
    /// Any configuration, open or rebuild failure. The array must not be served then.
    pub fn assemble(config: &RaidConfig) -> Result<Self> {
        config.validate()?;
        let level = RaidLevel::new(config.mode, config.devices.len(), config.parity_index);
        let array = Array::open(&config.devices)?;

        let mut volume = Self::new(array, level, config.block_size)?;
        if volume.array.rebuild_target().is_some() {
            volume.rebuild()?;
        }
        Ok(volume)
    }

    /// Wraps an already opened device set. Capacity comes from the smallest Healthy
    /// member truncated to whole blocks.
    ///
    /// # Errors
    /// `RaidError::Configuration` on a zero block size, a member count the layout does
    /// not expect, or members smaller than one block.
    pub fn new(array: Array, level: RaidLevel, block_size: u64) -> Result<Self> {
        if block_size == 0 {
            return Err(RaidError::config("block size must be positive"));
        }
        if array.len() != level.disks() {
            return Err(RaidError::config(format!(
                "{} layout expects {} devices, got {}",
                level.mode(),
                level.disks(),
                array.len()
            )));
        }

        let min_len = array
            .min_healthy_len()
            .ok_or_else(|| RaidError::config("no functioning devices found"))?;
        let geom = Geometry::for_members(block_size, min_len, level.data_disks());
        if geom.capacity == 0 {
            return Err(RaidError::config(format!(
                "devices are smaller than one {block_size}-byte block"
            )));
        }

        if let Some(parity) = level.parity_disk() {
            info!("{} parity on device {parity}", level.mode());
        }
        info!(
            "{} array of {} devices, block size {block_size}, capacity {} bytes",
            level.mode(),
            level.disks(),
            geom.capacity
        );

        Ok(Self {
            array,
            level,
            geom,
            read_turn: 0,
        })
    }

    #[must_use]
    pub const fn capacity(&self) -> u64 {
        self.geom.capacity
    }

    #[must_use]
    pub const fn block_size(&self) -> u64 {
        self.geom.block_size
    }

    #[must_use]
    pub const fn level(&self) -> &RaidLevel {
        &self.level
    }

    #[must_use]
    pub const fn array(&self) -> &Array {
        &self.array
    }

    #[must_use]
    pub fn state(&self) -> ArrayState {
        self.array.state()
    }

    pub fn disk_status_string(&self) -> String {
        self.array.status_string()
    }

    /// Reads `out.len()` logical bytes starting at `byte_offset`.
    ///
    /// # Errors
    /// `InvalidRange` outside capacity, `Io` for any failed segment. On error the
    /// contents of `out` are unspecified.
    pub fn read_bytes(&mut self, byte_offset: u64, out: &mut [u8]) -> Result<()> {
        debug!("R - {byte_offset}, {}", out.len());
        let started = Instant::now();
        let result = self.read_segments(byte_offset, out);
        Self::record(IoOpType::Read, out.len(), started, &result);
        result
    }

    /// Writes `payload` at logical `byte_offset`, maintaining redundancy for every
    /// available member.
    ///
    /// # Errors
    /// Same as [`Volume::read_bytes`]. A failure midway may leave earlier segments
    /// written.
    pub fn write_bytes(&mut self, byte_offset: u64, payload: &[u8]) -> Result<()> {
        debug!("W - {byte_offset}, {}", payload.len());
        let started = Instant::now();
        let result = self.write_segments(byte_offset, payload);
        Self::record(IoOpType::Write, payload.len(), started, &result);
        result
    }

    /// Syncs every present member.
    ///
    /// # Errors
    /// The first member sync failure.
    pub fn sync(&mut self) -> Result<()> {
        debug!("Received a flush request.");
        let started = Instant::now();
        let result = self.array.flush().map_err(RaidError::from);
        Self::record(IoOpType::Flush, 0, started, &result);
        result
    }

    /// Marks member `i` as failed.
    ///
    /// # Errors
    /// See [`Array::fail_disk`].
    pub fn fail_disk(&mut self, i: usize) -> Result<()> {
        self.array.fail_disk(i)
    }

    /// Attaches `disk` in the Missing slot `i`. Traffic is refused until
    /// [`Volume::rebuild`] succeeds.
    ///
    /// # Errors
    /// See [`Array::replace_disk`]; also rejects layouts without redundancy and a
    /// replacement smaller than the per-member length in use.
    pub fn replace_disk(&mut self, i: usize, disk: Disk) -> Result<()> {
        if self.level.as_restore().is_none() {
            return Err(RaidError::config(format!(
                "{} has no redundancy, a replaced device cannot be rebuilt",
                self.level.mode()
            )));
        }
        let needed = self.geom.member_len(self.level.data_disks());
        if disk.len() < needed {
            return Err(RaidError::config(format!(
                "replacement '{}' has {} bytes, device {i} needs at least {needed}",
                disk.path().display(),
                disk.len()
            )));
        }
        self.array.replace_disk(i, disk)
    }

    /// Resilvers the rebuild target.
    ///
    /// # Errors
    /// See [`rebuild::rebuild`].
    pub fn rebuild(&mut self) -> Result<RebuildReport> {
        rebuild::rebuild(&mut self.array, &self.level, &self.geom)
    }

    /// Lists member blocks whose redundancy does not match the data.
    ///
    /// # Errors
    /// See [`rebuild::verify`].
    pub fn verify(&self) -> Result<Vec<u64>> {
        rebuild::verify(&self.array, &self.level, &self.geom)
    }

    fn ensure_serving(&self) -> Result<()> {
        match self.array.state() {
            ArrayState::Rebuilding { target } => {
                Err(IoError::Rebuilding { device: target }.into())
            }
            _ => Ok(()),
        }
    }

    fn read_segments(&mut self, byte_offset: u64, out: &mut [u8]) -> Result<()> {
        let segments = translate(
            &self.level,
            &self.geom,
            byte_offset,
            out.len(),
            SegmentRole::DataRead,
        )?;
        self.ensure_serving()?;

        self.read_turn = self.read_turn.wrapping_add(1);
        for seg in &segments {
            self.read_segment(seg, &mut out[seg.buf_range()])?;
        }
        Ok(())
    }

    fn read_segment(&self, seg: &Segment, dst: &mut [u8]) -> Result<()> {
        let healthy: Vec<usize> = self
            .level
            .mirrors(seg.device)
            .into_iter()
            .filter(|&d| self.array.is_healthy(d))
            .collect();

        if healthy.is_empty() {
            recovery::reconstruct(&self.array, &self.level, seg.device, seg.device_offset, dst)?;
        } else {
            let device = healthy[self.read_turn % healthy.len()];
            self.array
                .read_exact(device, seg.device_offset, dst, seg.role)?;
        }
        Ok(())
    }

    fn write_segments(&mut self, byte_offset: u64, payload: &[u8]) -> Result<()> {
        let segments = translate(
            &self.level,
            &self.geom,
            byte_offset,
            payload.len(),
            SegmentRole::DataWrite,
        )?;
        self.ensure_serving()?;

        for seg in &segments {
            let src = &payload[seg.buf_range()];
            if let Some(parity) = self.level.parity_disk() {
                recovery::write_with_parity(&mut self.array, &self.level, parity, seg, src)?;
                continue;
            }

            let targets: Vec<usize> = self
                .level
                .mirrors(seg.device)
                .into_iter()
                .filter(|&d| self.array.is_healthy(d))
                .collect();
            if targets.is_empty() {
                return Err(IoError::DeviceMissing { device: seg.device }.into());
            }
            for device in targets {
                self.array
                    .write_all(device, seg.device_offset, src, seg.role)?;
            }
        }
        Ok(())
    }

    fn record(op: IoOpType, bytes: usize, started: Instant, result: &Result<()>) {
        metrics::record_raid_op(RaidOp {
            op,
            bytes: bytes as u64,
            latency_seconds: started.elapsed().as_secs_f64(),
            error: result.is_err(),
        });
    }
}

impl BlockDevice for Volume {
    fn size_bytes(&self) -> u64 {
        self.capacity()
    }

    fn read(&mut self, buf: &mut [u8], offset: u64) -> Result<()> {
        self.read_bytes(offset, buf)
    }

    fn write(&mut self, buf: &[u8], offset: u64) -> Result<()> {
        self.write_bytes(offset, buf)
    }

    fn flush(&mut self) -> Result<()> {
        self.sync()
    }

    fn disconnect(&mut self) {
        debug!("Received a disconnect request.");
    }
}
