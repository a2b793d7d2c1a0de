//! Degraded-mode reconstruction and parity-maintaining writes.

use tracing::debug;

use crate::error::IoError;
use crate::layout::parity::{updated_parity, xor_in_place};
use crate::layout::stripe::traits::stripe::Stripe;
use crate::retention::array::Array;
use crate::retention::volume::mapper::{Segment, SegmentRole};

type IoResult<T> = std::result::Result<T, IoError>;

/// `reconstruct` regenerates what member `missing` holds at `device_offset` from the
/// surviving members, filling `out`.
///
/// # Errors
/// `DeviceMissing` if the layout has no redundancy or a needed source is not Healthy;
/// otherwise any physical read error.
pub(crate) fn reconstruct<S: Stripe + ?Sized>(
    array: &Array,
    stripe: &S,
    missing: usize,
    device_offset: u64,
    out: &mut [u8],
) -> IoResult<()> {
    let Some(restore) = stripe.as_restore() else {
        return Err(IoError::DeviceMissing { device: missing });
    };
    let parity = stripe.parity_disk();
    let sources = restore.sources(missing);

    if let Some(unavailable) = sources.iter().copied().find(|&s| !array.is_healthy(s)) {
        return Err(IoError::DeviceMissing {
            device: unavailable,
        });
    }

    if let [only] = sources.as_slice() {
        return array.read_exact(*only, device_offset, out, SegmentRole::reading(*only, parity));
    }

    out.fill(0);
    let mut scratch = vec![0u8; out.len()];
    for src in sources {
        array.read_exact(src, device_offset, &mut scratch, SegmentRole::reading(src, parity))?;
        xor_in_place(out, &scratch);
    }
    Ok(())
}

/// `write_with_parity` stores one data segment on a parity-protected layout and keeps
/// the row's parity consistent for whichever members are available.
///
/// # Errors
/// `DeviceMissing` when neither the data member nor parity can take the write, or when
/// a data member needed to recompute parity is unavailable.
pub(crate) fn write_with_parity<S: Stripe + ?Sized>(
    array: &mut Array,
    stripe: &S,
    parity: usize,
    seg: &Segment,
    new_data: &[u8],
) -> IoResult<()> {
    let off = seg.device_offset;

    match (array.is_healthy(seg.device), array.is_healthy(parity)) {
        (true, true) => {
            let mut old_data = vec![0u8; new_data.len()];
            let mut old_parity = vec![0u8; new_data.len()];
            array.read_exact(seg.device, off, &mut old_data, SegmentRole::DataRead)?;
            array.read_exact(parity, off, &mut old_parity, SegmentRole::ParityRead)?;

            let new_parity = updated_parity(&old_data, &old_parity, new_data);
            array.write_all(seg.device, off, new_data, SegmentRole::DataWrite)?;
            array.write_all(parity, off, &new_parity, SegmentRole::ParityWrite)
        }
        (true, false) => {
            debug!("parity device {parity} unavailable, writing data only");
            array.write_all(seg.device, off, new_data, SegmentRole::DataWrite)
        }
        (false, true) => {
            // The data member is gone: fold the new data into parity so a later read
            // of this range reconstructs it.
            let mut acc = new_data.to_vec();
            let mut scratch = vec![0u8; new_data.len()];
            for other in (0..stripe.disks()).filter(|&d| d != seg.device && d != parity) {
                if !array.is_healthy(other) {
                    return Err(IoError::DeviceMissing { device: other });
                }
                array.read_exact(other, off, &mut scratch, SegmentRole::DataRead)?;
                xor_in_place(&mut acc, &scratch);
            }
            array.write_all(parity, off, &acc, SegmentRole::ParityWrite)
        }
        (false, false) => Err(IoError::DeviceMissing { device: seg.device }),
    }
}
