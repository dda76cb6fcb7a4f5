//! Shared building blocks for rule evaluation: configuration, error types,
//! and the text scanners used to read rule attribute values (timestamps,
//! integers, floats, ranges, versions and intervals).

pub mod config;
pub mod error;
pub mod interval;
pub mod iso8601;
pub mod numeric;
pub mod range;
pub mod version;

pub use config::Config;
pub use error::*;
