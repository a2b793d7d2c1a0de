//! Error kinds surfaced by the engine.

use std::path::PathBuf;

use thiserror::Error;

use crate::metrics::IoOpType;

pub type Result<T> = std::result::Result<T, RaidError>;

#[derive(Debug, Error)]
pub enum RaidError {
    /// Bad arguments, device-count mismatches, conflicting markers or an illegal
    /// device state transition.
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("cannot open device {}: {source}", path.display())]
    DeviceOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid range: offset {offset}, length {len} (capacity {capacity})")]
    InvalidRange { offset: u64, len: u64, capacity: u64 },

    #[error(transparent)]
    Io(#[from] IoError),

    /// The resilver of `device` was aborted; the array must not be started.
    #[error("rebuild of device {device} failed: {source}")]
    Rebuild {
        device: usize,
        #[source]
        source: IoError,
    },
}

impl RaidError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }
}

#[derive(Debug, Error)]
pub enum IoError {
    #[error("short {op} on device {device} at offset {offset}: {actual} of {expected} bytes")]
    ShortTransfer {
        device: usize,
        op: IoOpType,
        offset: u64,
        expected: usize,
        actual: usize,
    },

    #[error("{op} failed on device {device} at offset {offset}: {source}")]
    DeviceFailure {
        device: usize,
        op: IoOpType,
        offset: u64,
        #[source]
        source: std::io::Error,
    },

    #[error("device {device} is missing and its data cannot be reconstructed")]
    DeviceMissing { device: usize },

    #[error("device {device} is being rebuilt; the array is not serving requests")]
    Rebuilding { device: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_transfer_message_names_device_and_counts() {
        let err = RaidError::from(IoError::ShortTransfer {
            device: 2,
            op: IoOpType::Read,
            offset: 4096,
            expected: 512,
            actual: 100,
        });
        assert_eq!(
            err.to_string(),
            "short read on device 2 at offset 4096: 100 of 512 bytes"
        );
    }

    #[test]
    fn rebuild_error_keeps_io_source() {
        let err = RaidError::Rebuild {
            device: 1,
            source: IoError::DeviceMissing { device: 3 },
        };
        let source = std::error::Error::source(&err).expect("source");
        assert_eq!(
            source.to_string(),
            "device 3 is missing and its data cannot be reconstructed"
        );
    }
}
