//! Geometry helpers and the translation of logical byte ranges into per-member
//! segments.

use std::ops::Range;

use crate::error::{RaidError, Result};
use crate::layout::stripe::traits::stripe::Stripe;
use crate::metrics::IoOpType;

/// Geometry describes block sizing and the logical capacity of an assembled array.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Geometry {
    pub block_size: u64,
    pub capacity: u64,
}

impl Geometry {
    /// `for_members` truncates the smallest member to whole blocks and scales it by
    /// the number of data members.
    ///
    /// # Arguments
    /// * `block_size` - Bytes per block, non-zero.
    /// * `min_member_len` - Length of the smallest Healthy member.
    /// * `data_disks` - Members carrying distinct data in one row.
    #[must_use]
    pub const fn for_members(block_size: u64, min_member_len: u64, data_disks: usize) -> Self {
        let member = min_member_len / block_size * block_size;
        Self {
            block_size,
            capacity: member * data_disks as u64,
        }
    }

    /// Usable bytes per member.
    #[must_use]
    pub const fn member_len(&self, data_disks: usize) -> u64 {
        self.capacity / data_disks as u64
    }

    /// Blocks per member, i.e. the number of rows.
    #[must_use]
    pub const fn member_blocks(&self, data_disks: usize) -> u64 {
        self.member_len(data_disks) / self.block_size
    }
}

/// What a segment transfer does to its member.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SegmentRole {
    DataRead,
    DataWrite,
    ParityRead,
    ParityWrite,
}

impl SegmentRole {
    #[must_use]
    pub fn reading(device: usize, parity: Option<usize>) -> Self {
        if parity == Some(device) {
            Self::ParityRead
        } else {
            Self::DataRead
        }
    }

    #[must_use]
    pub fn writing(device: usize, parity: Option<usize>) -> Self {
        if parity == Some(device) {
            Self::ParityWrite
        } else {
            Self::DataWrite
        }
    }

    #[must_use]
    pub const fn op(self) -> IoOpType {
        match self {
            Self::DataRead | Self::ParityRead => IoOpType::Read,
            Self::DataWrite | Self::ParityWrite => IoOpType::Write,
        }
    }
}

/// Segment is the piece of a logical request that falls inside one block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Segment {
    pub device: usize,
    pub device_offset: u64,
    pub len: usize,
    /// Position of this piece inside the caller's buffer.
    pub buf_offset: usize,
    pub role: SegmentRole,
}

impl Segment {
    #[must_use]
    pub const fn buf_range(&self) -> Range<usize> {
        self.buf_offset..self.buf_offset + self.len
    }
}

/// `translate` splits the logical range `[offset, offset + len)` at block boundaries
/// and maps each piece to its home member.
///
/// Segments come back in ascending logical order, cover the range exactly once and
/// never straddle a block. Only data members are named; redundancy is the executor's
/// concern.
///
/// # Arguments
/// * `stripe` - Layout placing logical blocks.
/// * `geom` - Block size and capacity.
/// * `offset` - First logical byte.
/// * `len` - Number of bytes.
/// * `role` - `DataRead` or `DataWrite`, copied into every segment.
///
/// # Errors
/// Returns `RaidError::InvalidRange` if the range overflows or ends past capacity.
pub fn translate<S: Stripe + ?Sized>(
    stripe: &S,
    geom: &Geometry,
    offset: u64,
    len: usize,
    role: SegmentRole,
) -> Result<Vec<Segment>> {
    let invalid = || RaidError::InvalidRange {
        offset,
        len: len as u64,
        capacity: geom.capacity,
    };
    let end = offset.checked_add(len as u64).ok_or_else(invalid)?;
    if end > geom.capacity || geom.block_size == 0 {
        return Err(invalid());
    }

    let bs = geom.block_size;
    let mut segments = Vec::with_capacity(usize::try_from(len as u64 / bs + 2).unwrap_or(0));
    let mut pos = offset;
    let mut buf_offset = 0usize;

    while pos < end {
        let block = pos / bs;
        let within = pos % bs;
        let take = (bs - within).min(end - pos);
        let placement = stripe.place(block);
        // `take` is bounded by the remaining request length, which came from a usize.
        let take = usize::try_from(take).map_err(|_| invalid())?;

        segments.push(Segment {
            device: placement.device,
            device_offset: placement.device_block * bs + within,
            len: take,
            buf_offset,
            role,
        });

        pos += take as u64;
        buf_offset += take;
    }

    Ok(segments)
}
