//! Shared error plumbing and filesystem locations used across all scriptony crates.

pub mod error;
pub mod paths;

pub use error::FromMessage;
