//! Publishing bucketing results.

use crate::{
    bucketer::{BucketSettings, BucketingResult, DexStore},
    error::Result,
};
use anyhow::Context as _;
use serde::Serialize;
use std::path::Path;

/// JSON shape of the bucketing report.
#[derive(Debug, Serialize)]
pub struct BucketReport<'a> {
    /// Ceiling the run was checked against.
    pub linear_alloc_hard_limit: u64,

    /// Store that picked the secondary dex extension.
    pub dex_store: DexStore,

    /// The bucketing outcome.
    #[serde(flatten)]
    pub result: &'a BucketingResult,
}

impl<'a> BucketReport<'a> {
    /// Pairs a result with the settings that produced it.
    pub fn new(settings: &BucketSettings, result: &'a BucketingResult) -> Self {
        Self {
            linear_alloc_hard_limit: settings.linear_alloc_hard_limit(),
            dex_store: settings.dex_store(),
            result,
        }
    }

    /// Pretty JSON rendering.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Writes the report to `path`, or prints it when no path is given.
pub async fn write_report(report: &BucketReport<'_>, path: Option<&Path>) -> Result<()> {
    let json = report.to_json()?;
    match path {
        Some(path) => {
            write_creating_parents(path, json.as_bytes()).await?;
            log::info!("Wrote bucketing report to {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

/// Writes one metadata line per secondary dex.
pub async fn write_metadata(result: &BucketingResult, path: &Path) -> Result<()> {
    let mut text = result.metadata_lines().join("\n");
    if !text.is_empty() {
        text.push('\n');
    }
    write_creating_parents(path, text.as_bytes()).await?;
    log::info!("Wrote secondary dex metadata to {}", path.display());
    Ok(())
}

async fn write_creating_parents(path: &Path, contents: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    tokio::fs::write(path, contents)
        .await
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}
