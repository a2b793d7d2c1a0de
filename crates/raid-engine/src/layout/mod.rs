//! RAID layout primitives: block placement per level and XOR parity.

pub mod parity;
pub mod stripe;
