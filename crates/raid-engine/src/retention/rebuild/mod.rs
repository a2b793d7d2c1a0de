//! Synchronous resilver of a fresh member and the read-only redundancy check.


use tracing::{debug, info, warn};

use crate::error::{RaidError, Result};
use crate::layout::stripe::traits::stripe::Stripe;
use crate::retention::array::{Array, ArrayState};
use crate::retention::volume::mapper::{Geometry, SegmentRole};
use crate::retention::volume::recovery::reconstruct;

/// Outcome of a completed rebuild.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RebuildReport {
    pub device: usize,
    pub blocks: u64,
    pub bytes: u64,
}

/// `rebuild` regenerates every block of the array's rebuild target from the other
/// members and marks it Healthy.
///
/// Iterates member blocks `0..geom.member_blocks(data_disks)`, so only the usable
/// prefix of an oversized replacement is written.
///
/// # Errors
/// `RaidError::Configuration` if there is no rebuild target or the layout has no
/// redundancy; `RaidError::Rebuild` on the first read or write failure, leaving the
/// target unhealthy.
pub fn rebuild<S: Stripe + ?Sized>(
    array: &mut Array,
    stripe: &S,
    geom: &Geometry,
) -> Result<RebuildReport> {
    let ArrayState::Rebuilding { target } = array.state() else {
        return Err(RaidError::config("no device is marked for rebuild"));
    };
    if stripe.as_restore().is_none() {
        return Err(RaidError::config(
            "layout has no redundancy, cannot rebuild",
        ));
    }

    let bs = usize::try_from(geom.block_size)
        .map_err(|_| RaidError::config("block size does not fit in memory"))?;
    let blocks = geom.member_blocks(stripe.data_disks());
    let role = SegmentRole::writing(target, stripe.parity_disk());
    let progress_every = (blocks / 10).max(1);
    let mut buf = vec![0u8; bs];

    info!("Doing RAID rebuild of device {target}: {blocks} blocks of {bs} bytes");

    for block in 0..blocks {
        let off = block * geom.block_size;
        let step = reconstruct(array, stripe, target, off, &mut buf)
            .and_then(|()| array.write_all(target, off, &buf, role));
        if let Err(source) = step {
            warn!("rebuild of device {target} aborted at block {block}");
            return Err(RaidError::Rebuild {
                device: target,
                source,
            });
        }

        if (block + 1) % progress_every == 0 {
            debug!("rebuild: device {target} {}/{blocks} blocks", block + 1);
        }
    }

    array.mark_healthy(target);
    info!("rebuild of device {target} complete");

    Ok(RebuildReport {
        device: target,
        blocks,
        bytes: blocks * geom.block_size,
    })
}

/// `verify` recomputes the layout's redundant member block by block and returns the
/// member blocks whose stored bytes disagree. Nothing is written.
///
/// # Errors
/// `RaidError::Configuration` unless every member is Healthy and the layout is
/// redundant; `RaidError::Io` on any read failure.
pub fn verify<S: Stripe + ?Sized>(array: &Array, stripe: &S, geom: &Geometry) -> Result<Vec<u64>> {
    if array.state() != ArrayState::Optimal {
        return Err(RaidError::config("verify requires every device to be healthy"));
    }
    let Some(restore) = stripe.as_restore() else {
        return Err(RaidError::config("layout has no redundancy to verify"));
    };

    let bs = usize::try_from(geom.block_size)
        .map_err(|_| RaidError::config("block size does not fit in memory"))?;
    let member = restore.scrub_member();
    let role = SegmentRole::reading(member, stripe.parity_disk());
    let mut expected = vec![0u8; bs];
    let mut stored = vec![0u8; bs];
    let mut mismatches = Vec::new();

    for block in 0..geom.member_blocks(stripe.data_disks()) {
        let off = block * geom.block_size;
        reconstruct(array, stripe, member, off, &mut expected)?;
        array.read_exact(member, off, &mut stored, role)?;
        if expected != stored {
            mismatches.push(block);
        }
    }

    if mismatches.is_empty() {
        info!("verify: device {member} consistent");
    } else {
        warn!(
            "verify: device {member} differs in {} blocks",
            mismatches.len()
        );
    }
    Ok(mismatches)
}
