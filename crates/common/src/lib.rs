//! Shared error definitions and context helpers used across all banter crates.

pub mod error;

pub use error::{BanterError, Error, FromMessage, Result};
