//! The bucketing command: manifest in, report out.

use crate::{
    bucketer::{
        BucketSettings, BucketingResult, DexBucketer,
        utils::fs::{DiskFilesystem, is_empty_dir, prepare_scratch_dir},
    },
    cli::Args,
    error::{CliError, Result},
    manifest::{BucketManifest, load_manifest},
};

/// Loads the manifest, applies CLI overrides, prepares the scratch directory
/// and runs the bucketing pass.
pub async fn bucket_from_manifest(args: &Args) -> Result<(BucketSettings, BucketingResult)> {
    let manifest = load_manifest(&args.manifest).await?;
    log::debug!(
        "Loaded {} dex files from {}",
        manifest.dexes.len(),
        args.manifest.display()
    );

    let mut builder = manifest.settings_builder();
    if let Some(limit) = args.linear_alloc_hard_limit {
        builder = builder.linear_alloc_hard_limit(limit);
    }
    if let Some(store) = args.dex_store {
        builder = builder.dex_store(store);
    }
    let settings = builder.build()?;

    let scratch = settings.scratch_directory();
    if !args.clean_scratch && !is_empty_dir(scratch)? {
        return Err(CliError::InvalidArguments {
            reason: format!(
                "Scratch directory {} is not empty (pass --clean-scratch to erase it)",
                scratch.display()
            ),
        }
        .into());
    }
    prepare_scratch_dir(scratch, args.clean_scratch)?;

    let BucketManifest {
        resource_dex,
        dexes,
        ..
    } = manifest;
    let task_settings = settings.clone();

    // The pass is synchronous and writes canaries with blocking I/O.
    let result = tokio::task::spawn_blocking(
        move || -> crate::bucketer::Result<BucketingResult> {
            let fs = DiskFilesystem::new(".");
            let bucketer = DexBucketer::new(task_settings, &fs)?;
            bucketer.bucket(resource_dex, &dexes)
        },
    )
    .await
    .map_err(|e| CliError::ExecutionFailed {
        command: "bucket".to_string(),
        reason: format!("Bucketing task panicked: {}", e),
    })??;

    Ok((settings, result))
}
