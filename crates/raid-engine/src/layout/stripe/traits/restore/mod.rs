//! Reconstruction rules for rebuilding failed or fresh members.

/// Restore defines which surviving members regenerate a missing one.
pub trait Restore {
    /// sources lists the members whose blocks XOR together into the block that
    /// `missing` holds at the same member offset. With a single source this is a copy.
    ///
    /// # Arguments
    /// * `missing` - The member index to regenerate.
    fn sources(&self, missing: usize) -> Vec<usize>;

    /// scrub_member is the member recomputed from the others when verifying redundancy.
    fn scrub_member(&self) -> usize;
}
