//! The bucketing pass.
//!
//! Pre-dexed files are sorted into one canonical order and walked once.
//! Anything declaring a primary-dex class goes to the primary dex; the rest
//! fill secondary dexes first-fit, opening a new canary-seeded dex whenever
//! the current one would go past the linear alloc ceiling.

use crate::bucketer::{
    BucketSettings, BucketingResult, DexArtifact, Error, PrimaryDexFilter, Result,
    artifact::canonical_order,
    canary::{CanaryGenerator, ScratchCanaryGenerator},
    filter::ClassNamePredicate,
    utils::fs::ProjectFilesystem,
};

/// Open secondary dex being filled during the pass.
#[derive(Debug)]
struct SecondaryDexBuilder {
    members: Vec<DexArtifact>,
    size_estimate: u64,
}

impl SecondaryDexBuilder {
    fn seeded_with(canary: DexArtifact) -> Self {
        Self {
            size_estimate: canary.size_estimate(),
            members: vec![canary],
        }
    }

    fn fits(&self, cost: u64, ceiling: u64) -> bool {
        self.size_estimate
            .checked_add(cost)
            .is_some_and(|total| total <= ceiling)
    }

    fn push(&mut self, dex: DexArtifact) {
        self.size_estimate += dex.size_estimate();
        self.members.push(dex);
    }

    fn finish(self) -> (Vec<DexArtifact>, u64) {
        (self.members, self.size_estimate)
    }
}

/// Buckets `dexes` (plus an optional R.class dex) into primary and secondary
/// dexes.
///
/// `resource_dex` always goes first in the primary dex and is never checked
/// against the predicate; its cost still counts toward the primary total.
/// Nothing is returned unless the whole pass succeeds.
///
/// # Errors
///
/// - [`Error::PrimaryCeilingExceeded`] when forced-primary dexes overflow
/// - [`Error::ArtifactExceedsCeiling`] when one secondary-bound dex is too big
/// - whatever `canaries` reports, typically [`Error::CanaryWriteFailure`]
pub fn bucket_pre_dexed_files(
    settings: &BucketSettings,
    resource_dex: Option<DexArtifact>,
    dexes: &[DexArtifact],
    primary_dex_filter: &dyn ClassNamePredicate,
    canaries: &mut dyn CanaryGenerator,
) -> Result<BucketingResult> {
    let ceiling = settings.linear_alloc_hard_limit();
    if ceiling == 0 {
        return Err(Error::InvalidCeiling(ceiling));
    }

    let mut primary = Vec::new();
    let mut primary_size: u64 = 0;

    // R.class files should always be in the primary dex.
    if let Some(resource_dex) = resource_dex {
        primary_size = primary_size.saturating_add(resource_dex.size_estimate());
        primary.push(resource_dex);
    }

    // Same inputs, same order, same secondary dex contents across builds.
    let mut sorted = dexes.to_vec();
    sorted.sort_by(canonical_order);

    let mut secondaries: Vec<SecondaryDexBuilder> = Vec::new();
    for dex in sorted {
        let cost = dex.size_estimate();

        if must_be_in_primary_dex(&dex, primary_dex_filter) {
            primary_size = primary_size.saturating_add(cost);
            if primary_size > ceiling {
                let err = Error::PrimaryCeilingExceeded {
                    path: dex.path().to_path_buf(),
                    cost,
                    total: primary_size,
                    ceiling,
                };
                log::error!("{err}");
                return Err(err);
            }
            primary.push(dex);
            continue;
        }

        if cost > ceiling {
            let err = Error::ArtifactExceedsCeiling {
                path: dex.path().to_path_buf(),
                cost,
                ceiling,
            };
            log::error!("{err}");
            return Err(err);
        }

        let needs_new_dex = secondaries
            .last()
            .is_none_or(|current| !current.fits(cost, ceiling));
        if needs_new_dex {
            let index = secondaries.len() + 1;
            let canary = canaries.create(index)?;
            log::debug!(
                "Opening secondary dex {} for {} (cost {})",
                index,
                dex.path().display(),
                cost
            );
            secondaries.push(SecondaryDexBuilder::seeded_with(canary));
        }

        if let Some(current) = secondaries.last_mut() {
            current.push(dex);
        }
    }

    log::info!(
        "Bucketed {} dex files: {} in primary dex (estimate {} of {}), {} secondary dexes",
        dexes.len(),
        primary.len(),
        primary_size,
        ceiling,
        secondaries.len()
    );

    Ok(BucketingResult::project(
        settings,
        primary,
        primary_size,
        secondaries
            .into_iter()
            .map(SecondaryDexBuilder::finish)
            .collect(),
    ))
}

fn must_be_in_primary_dex(dex: &DexArtifact, filter: &dyn ClassNamePredicate) -> bool {
    dex.class_names().iter().any(|name| filter.matches(name))
}

/// Bucketer wired to its settings, pattern filter and a filesystem.
///
/// # Examples
///
/// ```no_run
/// use predex_bucket::bucketer::{
///     BucketSettingsBuilder, DexArtifact, DexBucketer, utils::fs::DiskFilesystem,
/// };
///
/// # fn example() -> predex_bucket::bucketer::Result<()> {
/// let settings = BucketSettingsBuilder::new()
///     .linear_alloc_hard_limit(100)
///     .scratch_directory("scratch")
///     .secondary_dex_dir("out")
///     .build()?;
/// let fs = DiskFilesystem::new(".");
/// let bucketer = DexBucketer::new(settings, &fs)?;
///
/// let result = bucketer.bucket(None, &[DexArtifact::new("a.dex", 40, ["com.x.A"])])?;
/// for line in result.metadata_lines() {
///     println!("{line}");
/// }
/// # Ok(())
/// # }
/// ```
pub struct DexBucketer<'a> {
    settings: BucketSettings,
    filter: PrimaryDexFilter,
    filesystem: &'a dyn ProjectFilesystem,
}

impl std::fmt::Debug for DexBucketer<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DexBucketer")
            .field("settings", &self.settings)
            .field("filter", &self.filter)
            .field("filesystem", &"<ProjectFilesystem>")
            .finish()
    }
}

impl<'a> DexBucketer<'a> {
    /// Compiles the primary dex patterns and binds the filesystem.
    pub fn new(settings: BucketSettings, filesystem: &'a dyn ProjectFilesystem) -> Result<Self> {
        let filter = PrimaryDexFilter::new(settings.primary_dex_patterns())?;
        Ok(Self {
            settings,
            filter,
            filesystem,
        })
    }

    /// Returns the settings.
    pub fn settings(&self) -> &BucketSettings {
        &self.settings
    }

    /// Runs one bucketing pass, writing canaries into the scratch directory.
    pub fn bucket(
        &self,
        resource_dex: Option<DexArtifact>,
        dexes: &[DexArtifact],
    ) -> Result<BucketingResult> {
        let mut canaries =
            ScratchCanaryGenerator::new(self.filesystem, self.settings.scratch_directory());
        bucket_pre_dexed_files(
            &self.settings,
            resource_dex,
            dexes,
            &self.filter,
            &mut canaries,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bucketer::{BucketSettingsBuilder, canary::canary_class_name};
    use std::{
        collections::BTreeSet,
        path::{Path, PathBuf},
    };

    /// Canary generator that records indices instead of touching disk.
    #[derive(Default)]
    struct InMemoryCanaries {
        created: Vec<usize>,
    }

    impl CanaryGenerator for InMemoryCanaries {
        fn create(&mut self, index: usize) -> Result<DexArtifact> {
            self.created.push(index);
            Ok(DexArtifact::new(
                format!("scratch/canary_{index}"),
                0,
                [canary_class_name(index)],
            ))
        }
    }

    struct FailingCanaries;

    impl CanaryGenerator for FailingCanaries {
        fn create(&mut self, index: usize) -> Result<DexArtifact> {
            Err(Error::CanaryWriteFailure {
                index,
                path: PathBuf::from("scratch"),
                source: std::io::Error::other("disk full"),
            })
        }
    }

    fn settings(ceiling: u64) -> BucketSettings {
        BucketSettingsBuilder::new()
            .linear_alloc_hard_limit(ceiling)
            .scratch_directory("scratch")
            .secondary_dex_dir("out")
            .build()
            .unwrap()
    }

    fn no_primary(_: &str) -> bool {
        false
    }

    fn dex(path: &str, size: u64, class: &str) -> DexArtifact {
        DexArtifact::new(path, size, [class])
    }

    fn run(
        ceiling: u64,
        resource: Option<DexArtifact>,
        dexes: &[DexArtifact],
        filter: &dyn ClassNamePredicate,
    ) -> Result<BucketingResult> {
        let mut canaries = InMemoryCanaries::default();
        bucket_pre_dexed_files(&settings(ceiling), resource, dexes, filter, &mut canaries)
    }

    #[test]
    fn overflow_opens_second_secondary_dex() {
        let dexes = [dex("a.dex", 40, "com.x.A"), dex("b.dex", 70, "com.x.B")];
        let result = run(100, None, &dexes, &no_primary).unwrap();

        assert!(result.primary_dex_inputs().is_empty());
        let secondaries = result.secondary_dexes();
        assert_eq!(secondaries.len(), 2);
        assert_eq!(
            secondaries[0].inputs,
            vec![PathBuf::from("scratch/canary_1"), PathBuf::from("a.dex")]
        );
        assert_eq!(secondaries[0].size_estimate, 40);
        assert_eq!(
            secondaries[1].inputs,
            vec![PathBuf::from("scratch/canary_2"), PathBuf::from("b.dex")]
        );
        assert_eq!(secondaries[1].size_estimate, 70);
        assert_eq!(
            secondaries[1].output_path,
            Path::new("out/secondary-2.dex.jar")
        );
    }

    #[test]
    fn exact_fit_stays_in_current_dex() {
        let dexes = [dex("a.dex", 60, "A"), dex("b.dex", 40, "B")];
        let result = run(100, None, &dexes, &no_primary).unwrap();
        assert_eq!(result.secondary_dexes().len(), 1);
        assert_eq!(result.secondary_dexes()[0].size_estimate, 100);
    }

    #[test]
    fn oversized_secondary_artifact_fails() {
        let err = run(50, None, &[dex("c.dex", 60, "c.C")], &no_primary).unwrap_err();
        match err {
            Error::ArtifactExceedsCeiling {
                path,
                cost,
                ceiling,
            } => {
                assert_eq!(path, Path::new("c.dex"));
                assert_eq!(cost, 60);
                assert_eq!(ceiling, 50);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn pattern_pins_artifact_to_primary() {
        let filter = PrimaryDexFilter::new([r"com\.x\..*"]).unwrap();
        let dexes = [dex("d.dex", 30, "com.x.D"), dex("e.dex", 10, "org.E")];
        let result = run(100, None, &dexes, &filter).unwrap();

        assert_eq!(
            result.primary_dex_inputs().iter().collect::<Vec<_>>(),
            vec![Path::new("d.dex")]
        );
        assert_eq!(result.secondary_dexes().len(), 1);
        assert_eq!(result.secondary_dexes()[0].inputs[1], Path::new("e.dex"));
    }

    #[test]
    fn any_matching_class_pins_artifact() {
        let filter = |name: &str| name == "com.app.Main";
        let mixed = DexArtifact::new("m.dex", 5, ["com.app.Helper", "com.app.Main"]);
        let result = run(100, None, &[mixed], &filter).unwrap();
        assert_eq!(result.primary_dex_inputs(), &[PathBuf::from("m.dex")]);
        assert!(result.secondary_dexes().is_empty());
    }

    #[test]
    fn primary_overflow_reports_running_total() {
        let everything = |_: &str| true;
        let resource = dex("r.dex", 60, "com.app.R");
        let err = run(100, Some(resource), &[dex("p.dex", 50, "P")], &everything).unwrap_err();
        match err {
            Error::PrimaryCeilingExceeded {
                path,
                cost,
                total,
                ceiling,
            } => {
                assert_eq!(path, Path::new("p.dex"));
                assert_eq!(cost, 50);
                assert_eq!(total, 110);
                assert_eq!(ceiling, 100);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn resource_dex_goes_first_without_predicate_check() {
        let resource = dex("z_r.dex", 500, "com.app.R");
        let result = run(100, Some(resource), &[dex("a.dex", 10, "A")], &no_primary).unwrap();
        assert_eq!(result.primary_dex_inputs(), &[PathBuf::from("z_r.dex")]);
        assert_eq!(result.primary_size_estimate(), 500);
        assert_eq!(result.secondary_dexes().len(), 1);
    }

    #[test]
    fn resource_dex_precedes_forced_primary_dexes() {
        let filter = |name: &str| name.starts_with("com.app.");
        let resource = dex("z_r.dex", 5, "com.app.R");
        let dexes = [dex("b.dex", 10, "com.app.B"), dex("a.dex", 10, "com.app.A")];
        let result = run(100, Some(resource), &dexes, &filter).unwrap();

        assert_eq!(
            result.primary_dex_inputs(),
            &[
                PathBuf::from("z_r.dex"),
                PathBuf::from("a.dex"),
                PathBuf::from("b.dex"),
            ]
        );
        assert_eq!(result.primary_size_estimate(), 25);
    }

    #[test]
    fn input_order_does_not_change_membership() {
        let forward = [
            dex("c.dex", 30, "C"),
            dex("a.dex", 50, "A"),
            dex("b.dex", 40, "B"),
            dex("d.dex", 45, "D"),
        ];
        let mut backward = forward.clone();
        backward.reverse();

        let one = run(100, None, &forward, &no_primary).unwrap();
        let two = run(100, None, &backward, &no_primary).unwrap();
        assert_eq!(one, two);
        // a+b fit, c overflows, c+d fit
        assert_eq!(one.secondary_dexes().len(), 2);
        assert_eq!(one.secondary_dexes()[1].inputs[1], Path::new("c.dex"));
    }

    #[test]
    fn every_input_lands_in_exactly_one_dex() {
        let filter = |name: &str| name.starts_with("keep.");
        let dexes: Vec<_> = (0..40u64)
            .map(|i| {
                let class = if i % 7 == 0 {
                    format!("keep.K{i}")
                } else {
                    format!("lib.L{i}")
                };
                DexArtifact::new(format!("dex_{i:02}.dex"), (i * 13) % 90 + 1, [class])
            })
            .collect();

        let result = run(1000, None, &dexes, &filter).unwrap();

        let mut seen = BTreeSet::new();
        for path in result.primary_dex_inputs() {
            assert!(seen.insert(path.clone()));
        }
        let mut canary_names = BTreeSet::new();
        for secondary in result.secondary_dexes() {
            assert!(secondary.size_estimate <= 1000);
            assert_eq!(secondary.inputs[0], secondary.canary.path());
            assert!(canary_names.insert(secondary.canary_class()));
            for path in &secondary.inputs[1..] {
                assert!(seen.insert(path.clone()));
            }
        }
        assert_eq!(seen.len(), dexes.len());
    }

    #[test]
    fn canaries_are_requested_in_sequence() {
        let dexes = [
            dex("a.dex", 80, "A"),
            dex("b.dex", 80, "B"),
            dex("c.dex", 80, "C"),
        ];
        let mut canaries = InMemoryCanaries::default();
        bucket_pre_dexed_files(&settings(100), None, &dexes, &no_primary, &mut canaries).unwrap();
        assert_eq!(canaries.created, vec![1, 2, 3]);
    }

    #[test]
    fn canary_failure_aborts_the_pass() {
        let err = bucket_pre_dexed_files(
            &settings(100),
            None,
            &[dex("a.dex", 1, "A")],
            &no_primary,
            &mut FailingCanaries,
        )
        .unwrap_err();
        assert!(matches!(err, Error::CanaryWriteFailure { index: 1, .. }));
    }

    #[test]
    fn no_secondary_dexes_without_secondary_inputs() {
        let result = run(100, None, &[], &no_primary).unwrap();
        assert!(result.primary_dex_inputs().is_empty());
        assert!(result.secondary_dexes().is_empty());
        assert!(result.metadata_lines().is_empty());
    }
}
