//! Callback contract between the engine and whatever transport exposes the logical
//! device to the operating system.

use crate::error::Result;

/// BlockDevice is what a transport drives: one request at a time, each either fully
/// completed or failed.
pub trait BlockDevice {
    /// Logical capacity in bytes, advertised once at startup.
    fn size_bytes(&self) -> u64;

    /// Fills `buf` from logical byte `offset`.
    ///
    /// # Errors
    /// Fails on an out-of-range request or any physical I/O error; no partial data is
    /// reported as success.
    fn read(&mut self, buf: &mut [u8], offset: u64) -> Result<()>;

    /// Stores `buf` at logical byte `offset`.
    ///
    /// # Errors
    /// Same rules as [`BlockDevice::read`].
    fn write(&mut self, buf: &[u8], offset: u64) -> Result<()>;

    /// Pushes written data to durable storage on every present member.
    ///
    /// # Errors
    /// Returns the first member sync failure.
    fn flush(&mut self) -> Result<()>;

    /// Transport is going away. Releases nothing eagerly.
    fn disconnect(&mut self) {}
}
