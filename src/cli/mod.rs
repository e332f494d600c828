//! Command line interface for the pre-dex bucketer.
//!
//! Parses arguments, runs one bucketing pass and publishes the report.

mod args;
pub mod commands;

pub use args::Args;

use crate::error::{CliError, Result};

/// Main CLI entry point
pub async fn run() -> Result<i32> {
    let args = Args::parse_args();
    execute(&args).await
}

/// Validates `args` and runs the bucketing command.
pub async fn execute(args: &Args) -> Result<i32> {
    args.validate()
        .map_err(|reason| CliError::InvalidArguments { reason })?;

    let (settings, result) = commands::bucket_from_manifest(args).await?;

    let report = commands::BucketReport::new(&settings, &result);
    commands::write_report(&report, args.report.as_deref()).await?;
    if let Some(metadata) = &args.metadata {
        commands::write_metadata(&result, metadata).await?;
    }

    Ok(0)
}
