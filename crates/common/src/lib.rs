//! Shared error envelope used across all gantry crates.

pub mod error;

pub use error::{BoxError, Error, Kind, Result};
