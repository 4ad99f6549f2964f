//! Core types and constants for the GPS mapper

pub mod constants;
pub mod types;

pub use constants::*;
pub use types::*;
