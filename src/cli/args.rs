//! Command line argument parsing and validation.
//!
//! This module provides CLI argument parsing using clap, with validation of
//! the flags that override the manifest.

use crate::bucketer::DexStore;
use clap::Parser;
use std::path::PathBuf;

/// Bucket pre-dexed files into primary and secondary dexes
#[derive(Parser, Debug)]
#[command(
    name = "predex_bucket",
    version,
    about = "Bucket pre-dexed files into primary and secondary dexes",
    long_about = "Reads a bucketing manifest listing pre-dexed inputs, packs them into a primary dex
and canary-tagged secondary dexes under the linear alloc ceiling, and reports which
input goes into which dex.

Usage:
  predex_bucket --manifest out/bucket.toml
  predex_bucket --manifest out/bucket.toml --report out/buckets.json --metadata out/metadata.txt
  predex_bucket --manifest out/bucket.toml --dex-store raw --clean-scratch

Exit code 0 = every input was placed; any ceiling violation exits 1."
)]
pub struct Args {
    /// Bucketing manifest (TOML)
    #[arg(short = 'm', long, value_name = "PATH")]
    pub manifest: PathBuf,

    /// Override the manifest's linear alloc ceiling
    #[arg(long, value_name = "COST", env = "PREDEX_LINEAR_ALLOC_HARD_LIMIT")]
    pub linear_alloc_hard_limit: Option<u64>,

    /// Override the secondary dex store: jar, raw, xz
    #[arg(long, value_name = "STORE")]
    pub dex_store: Option<DexStore>,

    /// Empty the scratch directory before writing canaries
    ///
    /// Without this flag a non-empty scratch directory is an error.
    #[arg(long)]
    pub clean_scratch: bool,

    /// Write the JSON bucketing report here instead of stdout
    #[arg(short = 'r', long, value_name = "PATH")]
    pub report: Option<PathBuf>,

    /// Write secondary dex metadata lines (`<file> <canary class>`) here
    #[arg(long, value_name = "PATH")]
    pub metadata: Option<PathBuf>,
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate arguments for consistency
    pub fn validate(&self) -> Result<(), String> {
        if self.manifest.as_os_str().is_empty() {
            return Err("Manifest path cannot be empty".to_string());
        }

        if self.linear_alloc_hard_limit == Some(0) {
            return Err("--linear-alloc-hard-limit must be greater than zero".to_string());
        }

        if let (Some(report), Some(metadata)) = (&self.report, &self.metadata) {
            if report == metadata {
                return Err(format!(
                    "--report and --metadata both point at {}",
                    report.display()
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_overrides() {
        let args = Args::try_parse_from([
            "predex_bucket",
            "--manifest",
            "m.toml",
            "--dex-store",
            "raw",
            "--linear-alloc-hard-limit",
            "42",
            "--clean-scratch",
        ])
        .unwrap();
        assert_eq!(args.dex_store, Some(DexStore::Raw));
        assert_eq!(args.linear_alloc_hard_limit, Some(42));
        assert!(args.clean_scratch);
        assert!(args.validate().is_ok());
    }

    #[test]
    fn zero_limit_is_invalid() {
        let args =
            Args::try_parse_from(["predex_bucket", "-m", "m.toml", "--linear-alloc-hard-limit", "0"])
                .unwrap();
        assert!(args.validate().is_err());
    }

    #[test]
    fn report_and_metadata_must_differ() {
        let args = Args::try_parse_from([
            "predex_bucket",
            "-m",
            "m.toml",
            "-r",
            "out.txt",
            "--metadata",
            "out.txt",
        ])
        .unwrap();
        assert!(args.validate().is_err());
    }

    #[test]
    fn unknown_store_is_rejected_by_parser() {
        assert!(Args::try_parse_from(["predex_bucket", "-m", "m.toml", "--dex-store", "zip"]).is_err());
    }
}
