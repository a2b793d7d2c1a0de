mod core;
mod filesystem;
mod types;

pub use types::{BlockFs, Exported};
