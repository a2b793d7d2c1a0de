//! Startup configuration: RAID level, block size and the ordered device list.
//!
//! A device argument is a path, the token `MISSING` for an absent member (degraded
//! start), or a path prefixed with `+` for a fresh member that must be rebuilt before
//! the array serves traffic.


use std::fmt;
use std::ops::RangeInclusive;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::{RaidError, Result};

pub const MISSING_TOKEN: &str = "MISSING";
pub const REBUILD_PREFIX: char = '+';
pub const MAX_DEVICES: usize = 16;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum RaidMode {
    Raid0,
    Raid1,
    Raid4,
}

impl RaidMode {
    /// Number of members the level accepts.
    #[must_use]
    pub const fn device_range(self) -> RangeInclusive<usize> {
        match self {
            Self::Raid0 => 2..=MAX_DEVICES,
            Self::Raid1 => 2..=2,
            Self::Raid4 => 3..=MAX_DEVICES,
        }
    }

    #[must_use]
    pub const fn is_redundant(self) -> bool {
        !matches!(self, Self::Raid0)
    }
}

impl fmt::Display for RaidMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Raid0 => "RAID0",
            Self::Raid1 => "RAID1",
            Self::Raid4 => "RAID4",
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DeviceSpec {
    Present(PathBuf),
    Missing,
    Rebuild(PathBuf),
}

impl FromStr for DeviceSpec {
    type Err = RaidError;

    fn from_str(s: &str) -> Result<Self> {
        if s == MISSING_TOKEN {
            return Ok(Self::Missing);
        }
        if let Some(rest) = s.strip_prefix(REBUILD_PREFIX) {
            if rest.is_empty() {
                return Err(RaidError::config("'+' must be followed by a device path"));
            }
            return Ok(Self::Rebuild(PathBuf::from(rest)));
        }
        if s.is_empty() {
            return Err(RaidError::config("empty device path"));
        }
        Ok(Self::Present(PathBuf::from(s)))
    }
}

impl fmt::Display for DeviceSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Present(p) => write!(f, "{}", p.display()),
            Self::Missing => f.write_str(MISSING_TOKEN),
            Self::Rebuild(p) => write!(f, "{REBUILD_PREFIX}{}", p.display()),
        }
    }
}

/// `parse_block_size` accepts a positive decimal byte count.
///
/// # Errors
/// Returns a configuration error for non-numeric input or zero.
pub fn parse_block_size(s: &str) -> Result<u64> {
    let size: u64 = s
        .trim()
        .parse()
        .map_err(|_| RaidError::config(format!("block size '{s}' must be an integer")))?;
    if size == 0 {
        return Err(RaidError::config("block size must be greater than zero"));
    }
    Ok(size)
}

#[derive(Clone, Debug)]
pub struct RaidConfig {
    pub mode: RaidMode,
    pub block_size: u64,
    pub devices: Vec<DeviceSpec>,
    /// RAID4 only; `None` puts parity on the last member.
    pub parity_index: Option<usize>,
}

impl RaidConfig {
    #[must_use]
    pub const fn new(mode: RaidMode, block_size: u64, devices: Vec<DeviceSpec>) -> Self {
        Self {
            mode,
            block_size,
            devices,
            parity_index: None,
        }
    }

    #[must_use]
    pub fn with_parity_index(mut self, index: usize) -> Self {
        self.parity_index = Some(index);
        self
    }

    #[must_use]
    pub fn missing_index(&self) -> Option<usize> {
        self.devices
            .iter()
            .position(|d| matches!(d, DeviceSpec::Missing))
    }

    #[must_use]
    pub fn rebuild_index(&self) -> Option<usize> {
        self.devices
            .iter()
            .position(|d| matches!(d, DeviceSpec::Rebuild(_)))
    }

    /// Checks every startup rule before any device is opened.
    ///
    /// # Errors
    /// Returns `RaidError::Configuration` naming the first violated rule.
    pub fn validate(&self) -> Result<()> {
        if self.block_size == 0 {
            return Err(RaidError::config("block size must be greater than zero"));
        }

        let count = self.devices.len();
        let range = self.mode.device_range();
        if !range.contains(&count) {
            return Err(RaidError::config(format!(
                "{} requires {} to {} devices, got {count}",
                self.mode,
                range.start(),
                range.end()
            )));
        }

        let missing = self
            .devices
            .iter()
            .filter(|d| matches!(d, DeviceSpec::Missing))
            .count();
        let rebuild = self
            .devices
            .iter()
            .filter(|d| matches!(d, DeviceSpec::Rebuild(_)))
            .count();

        if missing > 1 {
            return Err(RaidError::config(
                "multiple MISSING devices specified; only one degraded device is supported",
            ));
        }
        if rebuild > 1 {
            return Err(RaidError::config(
                "multiple '+' devices specified; only one device can be rebuilt at a time",
            ));
        }
        if missing > 0 && rebuild > 0 {
            return Err(RaidError::config(
                "cannot rebuild while another device is MISSING",
            ));
        }
        if !self.mode.is_redundant() && (missing > 0 || rebuild > 0) {
            return Err(RaidError::config(format!(
                "{} has no redundancy; MISSING and '+' devices are not supported",
                self.mode
            )));
        }
        if missing == count {
            return Err(RaidError::config("no functioning devices found"));
        }

        match (self.mode, self.parity_index) {
            (RaidMode::Raid4, Some(p)) if p >= count => Err(RaidError::config(format!(
                "parity index {p} is out of range for {count} devices"
            ))),
            (RaidMode::Raid4, _) | (_, None) => Ok(()),
            (mode, Some(_)) => Err(RaidError::config(format!(
                "{mode} has no parity device"
            ))),
        }
    }
}
