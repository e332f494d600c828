//! Bucketing output and its projections.
//!
//! The engine hands over finished bundle lists; everything here is a pure
//! reshaping of them for downstream dex merging and metadata.txt writing.

use crate::bucketer::{DexArtifact, settings::BucketSettings};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::{
    collections::{BTreeMap, BTreeSet},
    path::{Path, PathBuf},
};

/// A finished secondary dex: its output path, canary and members.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SecondaryDex {
    /// 1-based position in the secondary dex sequence.
    pub index: usize,

    /// Output file, `secondary-<index><ext>` under the secondary dex dir.
    pub output_path: PathBuf,

    /// Canary seeded as the first member.
    pub canary: DexArtifact,

    /// Input dex paths in bucket order, canary first.
    pub inputs: Vec<PathBuf>,

    /// Accumulated linear alloc estimate (canaries count as zero).
    pub size_estimate: u64,

    /// Hex SHA-256 over member paths and costs; stable across rebuilds with
    /// identical inputs.
    ///
    /// Paths are hashed through `to_string_lossy`, so two non-UTF-8 paths that
    /// differ only in invalid bytes hash the same.
    pub inputs_fingerprint: String,
}

impl SecondaryDex {
    /// Output file name without the directory.
    pub fn file_name(&self) -> String {
        self.output_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Canary class in dotted (Java source) form, as listed in metadata.txt.
    pub fn canary_class(&self) -> String {
        self.canary
            .class_names()
            .iter()
            .next()
            .map(|name| name.replace('/', "."))
            .unwrap_or_default()
    }
}

/// Terminal output of a successful bucketing run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BucketingResult {
    primary_dex_inputs: Vec<PathBuf>,
    primary_size_estimate: u64,
    secondary_dexes: Vec<SecondaryDex>,
}

impl BucketingResult {
    /// Projects the engine's bundle lists into the published shape.
    ///
    /// Each secondary list must start with its canary.
    pub(crate) fn project(
        settings: &BucketSettings,
        primary: Vec<DexArtifact>,
        primary_size_estimate: u64,
        secondaries: Vec<(Vec<DexArtifact>, u64)>,
    ) -> Self {
        // Insertion order is kept: the R.class dex first, then canonical order.
        let mut seen = BTreeSet::new();
        let primary_dex_inputs = primary
            .iter()
            .map(DexArtifact::path)
            .filter(|path| seen.insert(*path))
            .map(Path::to_path_buf)
            .collect();

        let secondary_dexes = secondaries
            .into_iter()
            .enumerate()
            .filter_map(|(i, (members, size_estimate))| {
                let index = i + 1;
                let canary = members.first()?.clone();
                Some(SecondaryDex {
                    index,
                    output_path: settings.secondary_dex_path(index),
                    inputs_fingerprint: fingerprint(&members),
                    inputs: members.iter().map(|d| d.path().to_path_buf()).collect(),
                    canary,
                    size_estimate,
                })
            })
            .collect();

        Self {
            primary_dex_inputs,
            primary_size_estimate,
            secondary_dexes,
        }
    }

    /// Paths of every input placed in the primary dex, without duplicates,
    /// in the order they were added.
    pub fn primary_dex_inputs(&self) -> &[PathBuf] {
        &self.primary_dex_inputs
    }

    /// Accumulated linear alloc estimate of the primary dex.
    pub fn primary_size_estimate(&self) -> u64 {
        self.primary_size_estimate
    }

    /// Secondary dexes in sequence order.
    pub fn secondary_dexes(&self) -> &[SecondaryDex] {
        &self.secondary_dexes
    }

    /// Secondary dex output path to its own canary.
    pub fn metadata_txt_entries(&self) -> BTreeMap<&Path, &DexArtifact> {
        self.secondary_dexes
            .iter()
            .map(|dex| (dex.output_path.as_path(), &dex.canary))
            .collect()
    }

    /// Secondary dex output path to all member input paths, canary included,
    /// in sequence order.
    pub fn secondary_output_to_inputs(&self) -> impl Iterator<Item = (&Path, &[PathBuf])> {
        self.secondary_dexes
            .iter()
            .map(|dex| (dex.output_path.as_path(), dex.inputs.as_slice()))
    }

    /// One `<file name> <canary class>` line per secondary dex.
    pub fn metadata_lines(&self) -> Vec<String> {
        self.secondary_dexes
            .iter()
            .map(|dex| format!("{} {}", dex.file_name(), dex.canary_class()))
            .collect()
    }
}

fn fingerprint(members: &[DexArtifact]) -> String {
    let mut hasher = Sha256::new();
    for member in members {
        hasher.update(member.path().to_string_lossy().as_bytes());
        hasher.update([0u8]);
        hasher.update(member.size_estimate().to_be_bytes());
    }
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bucketer::{BucketSettingsBuilder, DexStore};

    fn settings() -> BucketSettings {
        BucketSettingsBuilder::new()
            .linear_alloc_hard_limit(100)
            .scratch_directory("scratch")
            .secondary_dex_dir("out")
            .dex_store(DexStore::Raw)
            .build()
            .unwrap()
    }

    fn canary(n: usize) -> DexArtifact {
        DexArtifact::new(
            format!("scratch/canary_{n}"),
            0,
            [format!("secondary/dex{n:02}/Canary")],
        )
    }

    #[test]
    fn each_output_maps_to_its_own_canary() {
        let result = BucketingResult::project(
            &settings(),
            vec![],
            0,
            vec![
                (vec![canary(1), DexArtifact::new("a.dex", 40, ["A"])], 40),
                (vec![canary(2), DexArtifact::new("b.dex", 70, ["B"])], 70),
            ],
        );

        let entries = result.metadata_txt_entries();
        assert_eq!(entries[Path::new("out/secondary-1.dex")], &canary(1));
        assert_eq!(entries[Path::new("out/secondary-2.dex")], &canary(2));
        assert_eq!(
            result.metadata_lines(),
            vec![
                "secondary-1.dex secondary.dex01.Canary",
                "secondary-2.dex secondary.dex02.Canary",
            ]
        );
    }

    #[test]
    fn multimap_lists_canary_first() {
        let result = BucketingResult::project(
            &settings(),
            vec![DexArtifact::new("r.dex", 5, ["R"])],
            5,
            vec![(vec![canary(1), DexArtifact::new("a.dex", 40, ["A"])], 40)],
        );

        let map: Vec<_> = result.secondary_output_to_inputs().collect();
        assert_eq!(map.len(), 1);
        assert_eq!(map[0].0, Path::new("out/secondary-1.dex"));
        assert_eq!(
            map[0].1,
            &[PathBuf::from("scratch/canary_1"), PathBuf::from("a.dex")]
        );
        assert_eq!(result.primary_dex_inputs(), &[PathBuf::from("r.dex")]);
        assert_eq!(result.primary_size_estimate(), 5);
    }

    #[test]
    fn primary_inputs_keep_insertion_order_and_drop_duplicates() {
        let result = BucketingResult::project(
            &settings(),
            vec![
                DexArtifact::new("z_r.dex", 5, ["R"]),
                DexArtifact::new("a.dex", 1, ["A"]),
                DexArtifact::new("z_r.dex", 5, ["R"]),
                DexArtifact::new("b.dex", 1, ["B"]),
            ],
            7,
            vec![],
        );

        assert_eq!(
            result.primary_dex_inputs(),
            &[
                PathBuf::from("z_r.dex"),
                PathBuf::from("a.dex"),
                PathBuf::from("b.dex"),
            ]
        );
    }

    #[test]
    fn fingerprint_tracks_membership() {
        let a = fingerprint(&[canary(1), DexArtifact::new("a.dex", 40, ["A"])]);
        let same = fingerprint(&[canary(1), DexArtifact::new("a.dex", 40, ["A"])]);
        let other = fingerprint(&[canary(1), DexArtifact::new("a.dex", 41, ["A"])]);
        assert_eq!(a, same);
        assert_ne!(a, other);
        assert_eq!(a.len(), 64);
    }
}
