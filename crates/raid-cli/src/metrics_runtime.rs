use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use raid_engine::config::MAX_DEVICES;
use raid_engine::metrics::{self, DiskOp, IoOpType, MetricsSink, RaidOp};
use tracing::warn;

/// `IoCounters` is the process-wide sink: plain atomic tallies, rendered into the
/// exported status file and logged on exit.
#[derive(Debug, Default)]
pub struct IoCounters {
    reads: AtomicU64,
    writes: AtomicU64,
    flushes: AtomicU64,
    errors: AtomicU64,
    bytes_read: AtomicU64,
    bytes_written: AtomicU64,
    disk_ops: [AtomicU64; MAX_DEVICES],
    disk_errors: [AtomicU64; MAX_DEVICES],
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CounterSnapshot {
    pub reads: u64,
    pub writes: u64,
    pub flushes: u64,
    pub errors: u64,
    pub bytes_read: u64,
    pub bytes_written: u64,
    /// `(device, ops, errors)` for every device that saw traffic.
    pub disks: Vec<(usize, u64, u64)>,
}

impl IoCounters {
    #[must_use]
    pub fn snapshot(&self) -> CounterSnapshot {
        let load = |c: &AtomicU64| c.load(Ordering::Relaxed);
        let disks = self
            .disk_ops
            .iter()
            .zip(&self.disk_errors)
            .enumerate()
            .filter(|(_, (ops, _))| load(ops) > 0)
            .map(|(i, (ops, errs))| (i, load(ops), load(errs)))
            .collect();

        CounterSnapshot {
            reads: load(&self.reads),
            writes: load(&self.writes),
            flushes: load(&self.flushes),
            errors: load(&self.errors),
            bytes_read: load(&self.bytes_read),
            bytes_written: load(&self.bytes_written),
            disks,
        }
    }
}

impl MetricsSink for IoCounters {
    fn record_disk_op(&self, op: DiskOp) {
        if let Some(c) = self.disk_ops.get(op.device) {
            c.fetch_add(1, Ordering::Relaxed);
        }
        if op.error {
            if let Some(c) = self.disk_errors.get(op.device) {
                c.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    fn record_raid_op(&self, op: RaidOp) {
        let (count, bytes) = match op.op {
            IoOpType::Read => (&self.reads, Some(&self.bytes_read)),
            IoOpType::Write => (&self.writes, Some(&self.bytes_written)),
            IoOpType::Flush => (&self.flushes, None),
        };
        count.fetch_add(1, Ordering::Relaxed);
        if op.error {
            self.errors.fetch_add(1, Ordering::Relaxed);
        } else if let Some(bytes) = bytes {
            bytes.fetch_add(op.bytes, Ordering::Relaxed);
        }
    }
}

impl fmt::Display for CounterSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "reads={}, writes={}, flushes={}, errors={}, bytes_read={}, bytes_written={}",
            self.reads, self.writes, self.flushes, self.errors, self.bytes_read, self.bytes_written
        )?;
        for (device, ops, errors) in &self.disks {
            write!(f, ", disk{device}={ops}/{errors}")?;
        }
        Ok(())
    }
}

/// Installs a fresh counter sink. If another sink got there first, the returned
/// counters stay at zero.
pub fn install() -> Arc<IoCounters> {
    let counters = Arc::new(IoCounters::default());
    if !metrics::install_metrics_sink(counters.clone()) {
        warn!("metrics sink already installed; I/O counters disabled");
    }
    counters
}
