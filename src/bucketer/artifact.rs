//! Pre-dexed artifact model and its canonical ordering.

use serde::{Deserialize, Serialize};
use std::{
    cmp::Ordering,
    collections::BTreeSet,
    path::{Path, PathBuf},
};

/// One pre-dexed input: a dex file plus the classes it defines.
///
/// `size_estimate` is a linear alloc estimate, not a byte count. Values are
/// immutable once built; the bucketer only reads them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DexArtifact {
    /// Location of the dex content. Used as an identity and passed through.
    path: PathBuf,

    /// Linear alloc cost in the ceiling's unit.
    size_estimate: u64,

    /// Fully-qualified class names contained in the dex.
    #[serde(rename = "classes")]
    class_names: BTreeSet<String>,
}

impl DexArtifact {
    /// Creates an artifact from its path, cost and classes.
    pub fn new<P, I, S>(path: P, size_estimate: u64, class_names: I) -> Self
    where
        P: Into<PathBuf>,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            path: path.into(),
            size_estimate,
            class_names: class_names.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns the path to the dex content.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the linear alloc estimate.
    pub fn size_estimate(&self) -> u64 {
        self.size_estimate
    }

    /// Returns the declared class names in sorted order.
    pub fn class_names(&self) -> &BTreeSet<String> {
        &self.class_names
    }

    /// Resolves a relative artifact path against `base`.
    pub(crate) fn resolved_against(mut self, base: &Path) -> Self {
        if self.path.is_relative() {
            self.path = base.join(&self.path);
        }
        self
    }
}

/// Canonical ordering used before bucketing.
///
/// Artifacts sort by path first; the remaining fields only break ties so the
/// order is total. Equal artifacts keep their input order since the sort is
/// stable.
pub fn canonical_order(a: &DexArtifact, b: &DexArtifact) -> Ordering {
    a.path
        .cmp(&b.path)
        .then_with(|| a.size_estimate.cmp(&b.size_estimate))
        .then_with(|| a.class_names.cmp(&b.class_names))
}

impl Ord for DexArtifact {
    fn cmp(&self, other: &Self) -> Ordering {
        canonical_order(self, other)
    }
}

impl PartialOrd for DexArtifact {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
