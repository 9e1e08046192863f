//! Shared utility helpers.

pub mod error;
pub mod stats;

pub use error::{WarpError, WarpResult};
pub use stats::ResidualStats;
