#[cfg(test)]
mod array_tests;

use std::fmt::{self, Write};
use std::time::Instant;

use tracing::{info, trace, warn};

use crate::config::DeviceSpec;
use crate::error::{IoError, RaidError, Result};
use crate::metrics::{self, DiskOp, IoOpType};
use crate::retention::disk::Disk;
use crate::retention::volume::mapper::SegmentRole;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DiskStatus {
    Healthy,
    Missing,
    /// Present but not trusted until a rebuild completes.
    RebuildTarget,
}

impl fmt::Display for DiskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Healthy => "OK",
            Self::Missing => "MISSING",
            Self::RebuildTarget => "NEEDS_REBUILD",
        })
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ArrayState {
    Optimal,
    Degraded { missing: usize },
    Rebuilding { target: usize },
}

/// Member is one slot of the device set as handed to [`Array::new`].
#[derive(Debug)]
pub enum Member {
    Present(Disk),
    Missing,
    Replacement(Disk),
}

#[derive(Debug)]
struct Slot {
    disk: Option<Disk>,
    status: DiskStatus,
}

/// Array is the ordered device set. At most one slot is ever Missing or a
/// RebuildTarget, and never both at once.
#[derive(Debug)]
pub struct Array {
    slots: Vec<Slot>,
}

impl Array {
    /// Builds the device set from already opened members.
    ///
    /// # Errors
    /// Returns `RaidError::Configuration` when the members break the one-unavailable
    /// rule or none of them is present.
    pub fn new(members: Vec<Member>) -> Result<Self> {
        let slots: Vec<Slot> = members
            .into_iter()
            .map(|m| match m {
                Member::Present(d) => Slot {
                    disk: Some(d),
                    status: DiskStatus::Healthy,
                },
                Member::Missing => Slot {
                    disk: None,
                    status: DiskStatus::Missing,
                },
                Member::Replacement(d) => Slot {
                    disk: Some(d),
                    status: DiskStatus::RebuildTarget,
                },
            })
            .collect();

        let count = |s: DiskStatus| slots.iter().filter(|slot| slot.status == s).count();
        let missing = count(DiskStatus::Missing);
        let targets = count(DiskStatus::RebuildTarget);

        if missing > 1 {
            return Err(RaidError::config("at most one device can be MISSING"));
        }
        if targets > 1 {
            return Err(RaidError::config("at most one device can be rebuilt"));
        }
        if missing == 1 && targets == 1 {
            return Err(RaidError::config(
                "cannot rebuild while another device is MISSING",
            ));
        }
        if slots.iter().all(|s| s.disk.is_none()) {
            return Err(RaidError::config("no functioning devices found"));
        }

        Ok(Self { slots })
    }

    /// Opens every device named in `specs`, in order.
    ///
    /// # Errors
    /// Returns `RaidError::DeviceOpen` for the first path that cannot be opened and
    /// any error from [`Array::new`].
    pub fn open(specs: &[DeviceSpec]) -> Result<Self> {
        let mut members = Vec::with_capacity(specs.len());
        for (i, spec) in specs.iter().enumerate() {
            let member = match spec {
                DeviceSpec::Missing => {
                    warn!("device {i} is MISSING, starting degraded");
                    Member::Missing
                }
                DeviceSpec::Present(path) => {
                    let d = Disk::open(path)?;
                    info!("Got device '{}', size {} bytes.", path.display(), d.len());
                    Member::Present(d)
                }
                DeviceSpec::Rebuild(path) => {
                    let d = Disk::open(path)?;
                    info!(
                        "Got device '{}', size {} bytes, marked for rebuild.",
                        path.display(),
                        d.len()
                    );
                    Member::Replacement(d)
                }
            };
            members.push(member);
        }
        Self::new(members)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    #[must_use]
    pub fn status(&self, i: usize) -> Option<DiskStatus> {
        self.slots.get(i).map(|s| s.status)
    }

    #[must_use]
    pub fn is_healthy(&self, i: usize) -> bool {
        self.status(i) == Some(DiskStatus::Healthy)
    }

    #[must_use]
    pub fn disk(&self, i: usize) -> Option<&Disk> {
        self.slots.get(i).and_then(|s| s.disk.as_ref())
    }

    #[must_use]
    pub fn missing(&self) -> Option<usize> {
        self.find(DiskStatus::Missing)
    }

    #[must_use]
    pub fn rebuild_target(&self) -> Option<usize> {
        self.find(DiskStatus::RebuildTarget)
    }

    #[must_use]
    pub fn state(&self) -> ArrayState {
        if let Some(target) = self.rebuild_target() {
            ArrayState::Rebuilding { target }
        } else if let Some(missing) = self.missing() {
            ArrayState::Degraded { missing }
        } else {
            ArrayState::Optimal
        }
    }

    /// Smallest length among Healthy members; capacity is derived from it.
    #[must_use]
    pub fn min_healthy_len(&self) -> Option<u64> {
        self.slots
            .iter()
            .filter(|s| s.status == DiskStatus::Healthy)
            .filter_map(|s| s.disk.as_ref().map(Disk::len))
            .min()
    }

    /// Reads exactly `buf.len()` bytes from member `device` at `off`.
    ///
    /// # Errors
    /// `DeviceMissing` if the slot has no handle, `DeviceFailure` on an I/O error and
    /// `ShortTransfer` when fewer bytes arrive.
    pub fn read_exact(
        &self,
        device: usize,
        off: u64,
        buf: &mut [u8],
        role: SegmentRole,
    ) -> std::result::Result<(), IoError> {
        let disk = self.handle(device)?;
        trace!("{role:?} dev={device} off={off} len={}", buf.len());

        let started = Instant::now();
        let outcome = disk.read_at(off, buf);
        Self::settle(device, IoOpType::Read, off, buf.len(), started, outcome)
    }

    /// Writes all of `data` to member `device` at `off`.
    ///
    /// # Errors
    /// Same as [`Array::read_exact`].
    pub fn write_all(
        &mut self,
        device: usize,
        off: u64,
        data: &[u8],
        role: SegmentRole,
    ) -> std::result::Result<(), IoError> {
        let disk = self
            .slots
            .get_mut(device)
            .and_then(|s| s.disk.as_mut())
            .ok_or(IoError::DeviceMissing { device })?;
        trace!("{role:?} dev={device} off={off} len={}", data.len());

        let started = Instant::now();
        let outcome = disk.write_at(off, data);
        Self::settle(device, IoOpType::Write, off, data.len(), started, outcome)
    }

    /// Syncs every member that has a handle, rebuild targets included.
    ///
    /// # Errors
    /// Returns the first sync failure; later members are still attempted.
    pub fn flush(&self) -> std::result::Result<(), IoError> {
        let mut first_err = None;
        for (device, slot) in self.slots.iter().enumerate() {
            let Some(disk) = slot.disk.as_ref() else {
                continue;
            };
            let started = Instant::now();
            let outcome = disk.sync();
            let error = outcome.is_err();
            metrics::record_disk_op(DiskOp {
                device,
                op: IoOpType::Flush,
                bytes: 0,
                latency_seconds: started.elapsed().as_secs_f64(),
                error,
            });
            if let Err(source) = outcome {
                warn!("flush failed on device {device}: {source}");
                if first_err.is_none() {
                    first_err = Some(IoError::DeviceFailure {
                        device,
                        op: IoOpType::Flush,
                        offset: 0,
                        source,
                    });
                }
            }
        }
        first_err.map_or(Ok(()), Err)
    }

    /// Marks member `i` as failed and drops its handle.
    ///
    /// # Errors
    /// Rejects an out-of-range index and any failure that would leave two members
    /// unavailable. Failing the rebuild target detaches the replacement and returns
    /// the slot to Missing.
    pub fn fail_disk(&mut self, i: usize) -> Result<()> {
        let d = self.slots.len();
        if i >= d {
            return Err(RaidError::config(format!(
                "disk index out of range: {i} (D={d})"
            )));
        }
        if self.slots[i].status == DiskStatus::Missing {
            return Ok(());
        }
        let other = self
            .slots
            .iter()
            .enumerate()
            .find(|&(j, slot)| j != i && slot.status != DiskStatus::Healthy)
            .map(|(j, _)| j);
        if let Some(other) = other {
            return Err(RaidError::config(format!(
                "cannot fail device {i} while device {other} is {}",
                self.slots[other].status
            )));
        }

        if self.slots[i].status == DiskStatus::RebuildTarget {
            warn!("rebuild target {i} detached, back to MISSING");
        } else {
            warn!("device {i} marked MISSING");
        }
        self.slots[i] = Slot {
            disk: None,
            status: DiskStatus::Missing,
        };
        Ok(())
    }

    /// Puts `disk` into the Missing slot `i` as a rebuild target.
    ///
    /// # Errors
    /// Slot `i` must be Missing and every other member Healthy.
    pub fn replace_disk(&mut self, i: usize, disk: Disk) -> Result<()> {
        match self.status(i) {
            Some(DiskStatus::Missing) => {}
            Some(status) => {
                return Err(RaidError::config(format!(
                    "device {i} is {status}; only a MISSING device can be replaced"
                )));
            }
            None => {
                let d = self.slots.len();
                return Err(RaidError::config(format!(
                    "disk index out of range: {i} (D={d})"
                )));
            }
        }

        info!(
            "device {i} replaced by '{}', needs rebuild",
            disk.path().display()
        );
        self.slots[i] = Slot {
            disk: Some(disk),
            status: DiskStatus::RebuildTarget,
        };
        Ok(())
    }

    pub(crate) fn mark_healthy(&mut self, i: usize) {
        if let Some(slot) = self.slots.get_mut(i) {
            if slot.disk.is_some() {
                slot.status = DiskStatus::Healthy;
            }
        }
    }

    #[must_use]
    pub fn status_string(&self) -> String {
        let mut out = String::new();
        for (i, slot) in self.slots.iter().enumerate() {
            let path = slot
                .disk
                .as_ref()
                .map_or_else(|| "-".to_string(), |d| d.path().display().to_string());
            let _ = writeln!(out, "disk {i}: {} (path={path})", slot.status);
        }
        out
    }

    fn find(&self, status: DiskStatus) -> Option<usize> {
        self.slots.iter().position(|s| s.status == status)
    }

    fn handle(&self, device: usize) -> std::result::Result<&Disk, IoError> {
        self.disk(device).ok_or(IoError::DeviceMissing { device })
    }

    fn settle(
        device: usize,
        op: IoOpType,
        offset: u64,
        expected: usize,
        started: Instant,
        outcome: std::io::Result<usize>,
    ) -> std::result::Result<(), IoError> {
        let result = match outcome {
            Ok(actual) if actual == expected => Ok(()),
            Ok(actual) => Err(IoError::ShortTransfer {
                device,
                op,
                offset,
                expected,
                actual,
            }),
            Err(source) => Err(IoError::DeviceFailure {
                device,
                op,
                offset,
                source,
            }),
        };

        metrics::record_disk_op(DiskOp {
            device,
            op,
            bytes: expected as u64,
            latency_seconds: started.elapsed().as_secs_f64(),
            error: result.is_err(),
        });
        if let Err(e) = &result {
            warn!("{e}");
        }
        result
    }
}
