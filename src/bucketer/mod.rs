//! Pre-dexed file bucketing for multidex builds.
//!
//! Packs pre-dexed inputs into one primary dex and a sequence of secondary
//! dexes so that no dex goes past the linear alloc ceiling:
//!
//! - classes matching the primary dex patterns (and the optional R.class dex)
//!   always land in the primary dex; overflowing it is fatal
//! - everything else fills secondary dexes first-fit in canonical order
//! - every secondary dex starts with a zero-cost canary class that the runtime
//!   loader uses to check the dex was loaded
//!
//! # Example
//!
//! ```no_run
//! use predex_bucket::bucketer::{
//!     BucketSettingsBuilder, DexArtifact, DexBucketer, DexStore, utils::fs::DiskFilesystem,
//! };
//!
//! # fn example() -> predex_bucket::bucketer::Result<()> {
//! let settings = BucketSettingsBuilder::new()
//!     .linear_alloc_hard_limit(100)
//!     .primary_dex_patterns([r"^com\.example\.App$"])
//!     .scratch_directory("out/scratch")
//!     .secondary_dex_dir("out/secondary")
//!     .dex_store(DexStore::Jar)
//!     .build()?;
//!
//! let fs = DiskFilesystem::new(".");
//! let result = DexBucketer::new(settings, &fs)?.bucket(
//!     None,
//!     &[
//!         DexArtifact::new("out/app.dex", 30, ["com.example.App"]),
//!         DexArtifact::new("out/lib.dex", 80, ["com.example.lib.Util"]),
//!     ],
//! )?;
//!
//! for (output, inputs) in result.secondary_output_to_inputs() {
//!     println!("{} <- {:?}", output.display(), inputs);
//! }
//! # Ok(())
//! # }
//! ```

mod artifact;
pub mod canary;
mod engine;
pub mod error;
pub mod filter;
mod result;
mod settings;
pub mod utils;

pub use artifact::{DexArtifact, canonical_order};
pub use engine::{DexBucketer, bucket_pre_dexed_files};
pub use error::{Error, Result};
pub use filter::{ClassNamePredicate, PrimaryDexFilter};
pub use result::{BucketingResult, SecondaryDex};
pub use settings::{BucketSettings, BucketSettingsBuilder, DexStore};
