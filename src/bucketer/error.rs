//! Error types for dex bucketing.
//!
//! Packing failures carry the offending artifact, its cost and the ceiling so
//! the message can be surfaced verbatim to the build-failure channel.

use std::{
    fmt::Display,
    io,
    path::{Path, PathBuf},
};
use thiserror::Error as DeriveError;

/// Result type alias for bucketing operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced while bucketing pre-dexed files.
#[derive(Debug, DeriveError)]
#[non_exhaustive]
pub enum Error {
    /// Forced-primary accumulation went past the linear alloc ceiling.
    #[error(
        "DexWithClasses {} with cost {cost} puts the linear alloc estimate for the primary dex at {total}, exceeding the maximum of {ceiling}.",
        .path.display()
    )]
    PrimaryCeilingExceeded {
        /// Artifact whose addition broke the ceiling.
        path: PathBuf,
        /// Size estimate of that artifact.
        cost: u64,
        /// Primary dex total after adding it.
        total: u64,
        /// Configured ceiling.
        ceiling: u64,
    },

    /// A single secondary-bound artifact can never fit any secondary dex.
    #[error(
        "DexWithClasses {} with cost {cost} exceeds the max cost {ceiling} for a secondary dex file.",
        .path.display()
    )]
    ArtifactExceedsCeiling {
        /// The oversized artifact.
        path: PathBuf,
        /// Its size estimate.
        cost: u64,
        /// Configured ceiling.
        ceiling: u64,
    },

    /// Writing the canary class file for a secondary dex failed.
    #[error("Failed to create canary for secondary dex {index} at {}: {source}", .path.display())]
    CanaryWriteFailure {
        /// 1-based secondary dex index.
        index: usize,
        /// Class file that could not be written.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },

    /// The linear alloc hard limit must be positive.
    #[error("linear alloc hard limit must be greater than zero, got {0}")]
    InvalidCeiling(u64),

    /// A primary dex pattern failed to compile.
    #[error("invalid primary dex pattern `{pattern}`: {source}")]
    InvalidPattern {
        /// The offending pattern text.
        pattern: String,
        /// Compilation failure.
        #[source]
        source: regex::Error,
    },

    /// I/O failure annotated with the action and path involved.
    #[error("{context} {}: {error}", .path.display())]
    Fs {
        /// What was being attempted.
        context: &'static str,
        /// Path involved.
        path: PathBuf,
        /// Underlying failure.
        #[source]
        error: io::Error,
    },

    /// Directory traversal failure.
    #[error(transparent)]
    WalkDir(#[from] walkdir::Error),

    /// Anything else, with a human readable message.
    #[error("{0}")]
    GenericError(String),
}

impl Error {
    /// Whether this error came out of the packing pass itself (as opposed
    /// to configuration or I/O).
    pub fn is_ceiling_violation(&self) -> bool {
        matches!(
            self,
            Self::PrimaryCeilingExceeded { .. } | Self::ArtifactExceedsCeiling { .. }
        )
    }
}

/// Attaches a message to a missing value.
pub trait Context<T> {
    /// Replaces the missing value with a [`Error::GenericError`] carrying `context`.
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static;
}

impl<T> Context<T> for Option<T> {
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
    {
        self.ok_or_else(|| Error::GenericError(context.to_string()))
    }
}

/// Annotates I/O results with the action and path involved.
pub trait ErrorExt<T> {
    /// Wraps an I/O error into [`Error::Fs`].
    fn fs_context(self, context: &'static str, path: impl AsRef<Path>) -> Result<T>;
}

impl<T> ErrorExt<T> for std::result::Result<T, io::Error> {
    fn fs_context(self, context: &'static str, path: impl AsRef<Path>) -> Result<T> {
        self.map_err(|error| Error::Fs {
            context,
            path: path.as_ref().to_path_buf(),
            error,
        })
    }
}
