//! Pre-dexed file bucketing for Android multidex builds.
//!
//! This library packs pre-dexed inputs into:
//! - a primary dex holding every class pinned by the primary dex patterns
//! - a sequence of secondary dexes, each under the linear alloc ceiling and
//!   each seeded with a canary class for load verification
//!
//! It can be used both as a CLI tool and as a library dependency.

pub mod bucketer;
pub mod cli;
pub mod error;
pub mod manifest;

// Re-export commonly used types
pub use error::{BucketerError, CliError, Result};
