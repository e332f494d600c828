//! Utilities shared by the bucketer.

pub mod fs;
