//! XOR parity over equal-length byte ranges.
//!
//! Every helper takes an immutable source view and a mutable destination view of the
//! same length; mismatched lengths are a caller bug and panic.


/// `xor_in_place` folds `src` into `dst` byte by byte.
///
/// # Panics
/// Panics if the slices differ in length.
#[inline]
pub fn xor_in_place(dst: &mut [u8], src: &[u8]) {
    assert_eq!(
        dst.len(),
        src.len(),
        "XOR operands must have equal length"
    );
    for (a, b) in dst.iter_mut().zip(src) {
        *a ^= *b;
    }
}

/// `xor_all` returns the XOR of every block, each exactly `len` bytes long.
///
/// An empty iterator yields `len` zero bytes.
pub fn xor_all<'a, I>(len: usize, blocks: I) -> Vec<u8>
where
    I: IntoIterator<Item = &'a [u8]>,
{
    let mut acc = vec![0u8; len];
    for block in blocks {
        xor_in_place(&mut acc, block);
    }
    acc
}

/// `updated_parity` applies the read-modify-write rule to one byte range:
/// `old_data ^ old_parity ^ new_data`.
///
/// Only the range passed in is recomputed, so a partial-block write leaves the rest of
/// the parity block alone.
#[must_use]
pub fn updated_parity(old_data: &[u8], old_parity: &[u8], new_data: &[u8]) -> Vec<u8> {
    let mut parity = old_parity.to_vec();
    xor_in_place(&mut parity, old_data);
    xor_in_place(&mut parity, new_data);
    parity
}
