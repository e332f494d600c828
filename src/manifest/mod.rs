//! Bucketing manifest loading.
//!
//! A manifest is a TOML file listing the pre-dexed inputs and the bucketing
//! configuration for one build step:
//!
//! ```toml
//! [bucket]
//! linear_alloc_hard_limit = 4194304
//! dex_store = "jar"
//! primary_dex_patterns = ["^com\\.example\\.App$"]
//! scratch_directory = "out/scratch"
//! secondary_dex_dir = "out/secondary"
//!
//! [resource_dex]
//! path = "out/r.dex.jar"
//! size_estimate = 120
//! classes = ["com.example.R"]
//!
//! [[dex]]
//! path = "out/lib.dex.jar"
//! size_estimate = 4000
//! classes = ["com.example.lib.Foo"]
//! ```
//!
//! Relative paths are resolved against the manifest's directory.

use crate::bucketer::{BucketSettingsBuilder, DexArtifact, DexStore};
use crate::error::{BucketerError, CliError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// `[bucket]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BucketSection {
    /// Per-dex linear alloc ceiling.
    pub linear_alloc_hard_limit: u64,

    /// Secondary dex storage format.
    #[serde(default)]
    pub dex_store: DexStore,

    /// Class name patterns forced into the primary dex.
    #[serde(default)]
    pub primary_dex_patterns: Vec<String>,

    /// Where canary class files are written.
    pub scratch_directory: PathBuf,

    /// Directory secondary dex names resolve against.
    pub secondary_dex_dir: PathBuf,
}

/// Parsed bucketing manifest.
#[derive(Debug, Clone, Deserialize)]
pub struct BucketManifest {
    /// Bucketing configuration.
    pub bucket: BucketSection,

    /// Dex holding the generated R classes, if any.
    #[serde(default)]
    pub resource_dex: Option<DexArtifact>,

    /// Candidate pre-dexed inputs.
    #[serde(default, rename = "dex")]
    pub dexes: Vec<DexArtifact>,
}

impl BucketManifest {
    /// Settings builder pre-filled from the `[bucket]` section.
    pub fn settings_builder(&self) -> BucketSettingsBuilder {
        BucketSettingsBuilder::new()
            .linear_alloc_hard_limit(self.bucket.linear_alloc_hard_limit)
            .primary_dex_patterns(self.bucket.primary_dex_patterns.iter().cloned())
            .scratch_directory(&self.bucket.scratch_directory)
            .secondary_dex_dir(&self.bucket.secondary_dex_dir)
            .dex_store(self.bucket.dex_store)
    }

    fn resolved_against(mut self, base: &Path) -> Self {
        let resolve = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        resolve(&mut self.bucket.scratch_directory);
        resolve(&mut self.bucket.secondary_dex_dir);
        self.resource_dex = self.resource_dex.map(|d| d.resolved_against(base));
        self.dexes = self
            .dexes
            .into_iter()
            .map(|d| d.resolved_against(base))
            .collect();
        self
    }
}

/// Parses manifest text, resolving relative paths against `base_dir`.
pub fn parse_manifest(text: &str, base_dir: &Path) -> Result<BucketManifest> {
    let manifest: BucketManifest = toml::from_str(text)?;

    if let Some(empty) = manifest
        .resource_dex
        .iter()
        .chain(&manifest.dexes)
        .find(|d| d.class_names().is_empty())
    {
        return Err(BucketerError::Cli(CliError::InvalidArguments {
            reason: format!("Dex {} declares no classes", empty.path().display()),
        }));
    }

    Ok(manifest.resolved_against(base_dir))
}

/// Reads and parses the manifest at `path`.
pub async fn load_manifest(path: &Path) -> Result<BucketManifest> {
    let text = tokio::fs::read_to_string(path).await.map_err(|e| {
        BucketerError::Cli(CliError::ExecutionFailed {
            command: "read_manifest".to_string(),
            reason: format!("Failed to read {}: {}", path.display(), e),
        })
    })?;

    let base_dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    parse_manifest(&text, base_dir)
}
