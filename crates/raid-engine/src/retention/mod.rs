//! Retention layer: backing devices, the device set, request execution and rebuild.

pub mod array;
pub mod disk;
pub mod rebuild;
pub mod volume;
