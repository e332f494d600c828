//! File system access for bucketing.
//!
//! Canary class files are the only thing the bucketer writes. They go through
//! [`ProjectFilesystem`] so callers can redirect or observe the writes.

use crate::bucketer::error::{ErrorExt, Result};
use std::{
    fs::{self, File},
    io::{self, BufWriter, Read, Write},
    path::{Path, PathBuf},
};

/// Minimal file system surface needed to materialize canaries.
pub trait ProjectFilesystem {
    /// Creates every missing parent directory of `path`.
    fn create_parent_dirs(&self, path: &Path) -> io::Result<()>;

    /// Streams `input` into a new file at `path`, replacing any existing file.
    fn copy_to_path(&self, input: &mut dyn Read, path: &Path) -> io::Result<()>;
}

/// [`ProjectFilesystem`] backed by the real disk.
///
/// Relative paths are resolved against `root`.
#[derive(Debug, Clone)]
pub struct DiskFilesystem {
    root: PathBuf,
}

impl DiskFilesystem {
    /// Creates a filesystem rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the project root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

impl ProjectFilesystem for DiskFilesystem {
    fn create_parent_dirs(&self, path: &Path) -> io::Result<()> {
        match self.resolve(path).parent() {
            Some(parent) => fs::create_dir_all(parent),
            None => Ok(()),
        }
    }

    fn copy_to_path(&self, input: &mut dyn Read, path: &Path) -> io::Result<()> {
        let mut out = BufWriter::new(File::create(self.resolve(path))?);
        io::copy(input, &mut out)?;
        out.flush()
    }
}

/// Creates the given directory, erasing it first if specified.
pub fn prepare_scratch_dir(path: &Path, erase: bool) -> Result<()> {
    if erase {
        match fs::remove_dir_all(path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e).fs_context("erasing scratch directory", path),
        }
    }

    fs::create_dir_all(path).fs_context("creating scratch directory", path)
}

/// Returns `true` if `path` is a directory with no entries, or does not exist.
pub fn is_empty_dir(path: &Path) -> Result<bool> {
    if !path.exists() {
        return Ok(true);
    }
    let first = walkdir::WalkDir::new(path)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .next();
    match first {
        None => Ok(true),
        Some(entry) => {
            entry?;
            Ok(false)
        }
    }
}
