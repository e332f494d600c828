//! Configuration structures for bucketing.
//!
//! [`BucketSettings`] holds the validated ceiling, patterns, and directories
//! for one run; [`BucketSettingsBuilder`] constructs it.

mod builder;
mod core;
mod dex_store;

pub use builder::BucketSettingsBuilder;
pub use self::core::BucketSettings;
pub use dex_store::DexStore;
