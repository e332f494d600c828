//! Command execution functions for bucketing operations.

mod bucket;
mod report;

pub use bucket::bucket_from_manifest;
pub use report::{BucketReport, write_metadata, write_report};
