//! Builder for constructing BucketSettings.

use super::{BucketSettings, DexStore};
use crate::bucketer::{Error, PrimaryDexFilter, Result, error::Context};
use std::path::{Path, PathBuf};

/// Builder for [`BucketSettings`].
///
/// `linear_alloc_hard_limit`, `scratch_directory` and `secondary_dex_dir`
/// are required. Patterns default to none and the store defaults to
/// [`DexStore::Jar`].
#[derive(Default)]
pub struct BucketSettingsBuilder {
    linear_alloc_hard_limit: Option<u64>,
    primary_dex_patterns: Vec<String>,
    scratch_directory: Option<PathBuf>,
    secondary_dex_dir: Option<PathBuf>,
    dex_store: DexStore,
}

impl BucketSettingsBuilder {
    /// Creates a new settings builder.
    pub fn new() -> Self {
        Default::default()
    }

    /// Sets the per-dex linear alloc ceiling. Must be positive.
    pub fn linear_alloc_hard_limit(mut self, limit: u64) -> Self {
        self.linear_alloc_hard_limit = Some(limit);
        self
    }

    /// Sets the primary dex class name patterns.
    pub fn primary_dex_patterns<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.primary_dex_patterns = patterns.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the scratch directory for canary class files.
    pub fn scratch_directory<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.scratch_directory = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the directory secondary dex paths are resolved against.
    pub fn secondary_dex_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.secondary_dex_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the dex store.
    ///
    /// Default: [`DexStore::Jar`]
    pub fn dex_store(mut self, store: DexStore) -> Self {
        self.dex_store = store;
        self
    }

    /// Builds the settings.
    ///
    /// # Errors
    ///
    /// Fails if a required field is missing, the ceiling is zero, or a
    /// pattern does not compile.
    pub fn build(self) -> Result<BucketSettings> {
        let limit = self
            .linear_alloc_hard_limit
            .context("linear_alloc_hard_limit is required")?;
        if limit == 0 {
            return Err(Error::InvalidCeiling(limit));
        }

        // Compile once here so a bad pattern fails before any packing work.
        PrimaryDexFilter::new(&self.primary_dex_patterns)?;

        Ok(BucketSettings::new(
            limit,
            self.primary_dex_patterns,
            self.scratch_directory
                .context("scratch_directory is required")?,
            self.secondary_dex_dir
                .context("secondary_dex_dir is required")?,
            self.dex_store,
        ))
    }
}
