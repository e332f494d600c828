//! Core BucketSettings struct.

use super::DexStore;
use std::path::{Path, PathBuf};

/// Validated configuration for one bucketing run.
///
/// Constructed via [`BucketSettingsBuilder`](super::BucketSettingsBuilder),
/// which rejects a zero ceiling and malformed patterns up front.
///
/// # Examples
///
/// ```no_run
/// use predex_bucket::bucketer::{BucketSettingsBuilder, DexStore};
///
/// # fn example() -> predex_bucket::bucketer::Result<()> {
/// let settings = BucketSettingsBuilder::new()
///     .linear_alloc_hard_limit(4 * 1024 * 1024)
///     .primary_dex_patterns(["^com/example/Application$"])
///     .scratch_directory("buck-out/scratch")
///     .secondary_dex_dir("buck-out/secondary")
///     .dex_store(DexStore::Raw)
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct BucketSettings {
    /// Hard limit on the linear alloc estimate of any single dex.
    linear_alloc_hard_limit: u64,

    /// Class name patterns forcing an artifact into the primary dex.
    primary_dex_patterns: Vec<String>,

    /// Directory canary class files are written to.
    ///
    /// Must exist and be empty before bucketing starts.
    scratch_directory: PathBuf,

    /// Directory the secondary dex file names are resolved against.
    secondary_dex_dir: PathBuf,

    /// Storage format, which picks the secondary dex extension.
    dex_store: DexStore,
}

impl BucketSettings {
    /// Returns the linear alloc ceiling.
    pub fn linear_alloc_hard_limit(&self) -> u64 {
        self.linear_alloc_hard_limit
    }

    /// Returns the configured primary dex patterns.
    pub fn primary_dex_patterns(&self) -> &[String] {
        &self.primary_dex_patterns
    }

    /// Returns the scratch directory.
    pub fn scratch_directory(&self) -> &Path {
        &self.scratch_directory
    }

    /// Returns the secondary dex output directory.
    pub fn secondary_dex_dir(&self) -> &Path {
        &self.secondary_dex_dir
    }

    /// Returns the dex store.
    pub fn dex_store(&self) -> DexStore {
        self.dex_store
    }

    /// Full output path of secondary dex `index` (1-based).
    pub fn secondary_dex_path(&self, index: usize) -> PathBuf {
        self.secondary_dex_dir
            .join(self.dex_store.secondary_file_name(index))
    }

    /// Creates a new instance (used by the builder).
    pub(super) fn new(
        linear_alloc_hard_limit: u64,
        primary_dex_patterns: Vec<String>,
        scratch_directory: PathBuf,
        secondary_dex_dir: PathBuf,
        dex_store: DexStore,
    ) -> Self {
        Self {
            linear_alloc_hard_limit,
            primary_dex_patterns,
            scratch_directory,
            secondary_dex_dir,
            dex_store,
        }
    }
}
