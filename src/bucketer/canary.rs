//! Canary classes for secondary dexes.
//!
//! Every secondary dex starts with a tiny synthetic interface whose name
//! encodes the dex index. The runtime loader looks the class up after loading
//! a secondary dex to verify the right file made it onto the class path.

use crate::bucketer::{
    DexArtifact, Error, Result,
    utils::fs::ProjectFilesystem,
};
use std::path::{Path, PathBuf};

/// Major version 46 (JDK 1.2); old enough for every dexer.
const CLASS_FILE_MAJOR_VERSION: u16 = 46;
const CLASS_FILE_MAGIC: u32 = 0xCAFE_BABE;
const CONSTANT_UTF8: u8 = 1;
const CONSTANT_CLASS: u8 = 7;
const ACC_PUBLIC_INTERFACE_ABSTRACT: u16 = 0x0001 | 0x0200 | 0x0400;
const SUPER_CLASS: &str = "java/lang/Object";

/// Produces the canary artifact seeded into a new secondary dex.
pub trait CanaryGenerator {
    /// Creates the canary for the 1-based secondary dex `index`.
    ///
    /// Distinct indices must yield distinct class names.
    fn create(&mut self, index: usize) -> Result<DexArtifact>;
}

/// Internal (slash separated) class name of the canary for `index`.
pub fn canary_class_name(index: usize) -> String {
    format!("secondary/dex{index:02}/Canary")
}

/// Class file bytes for an empty public interface named `class_name`.
pub fn canary_class_bytes(class_name: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(32 + class_name.len() + SUPER_CLASS.len());
    out.extend_from_slice(&CLASS_FILE_MAGIC.to_be_bytes());
    out.extend_from_slice(&0u16.to_be_bytes());
    out.extend_from_slice(&CLASS_FILE_MAJOR_VERSION.to_be_bytes());

    // Constant pool: #1 Class(#2), #2 this name, #3 Class(#4), #4 super name.
    out.extend_from_slice(&5u16.to_be_bytes());
    push_class_ref(&mut out, 2);
    push_utf8(&mut out, class_name);
    push_class_ref(&mut out, 4);
    push_utf8(&mut out, SUPER_CLASS);

    out.extend_from_slice(&ACC_PUBLIC_INTERFACE_ABSTRACT.to_be_bytes());
    out.extend_from_slice(&1u16.to_be_bytes()); // this_class
    out.extend_from_slice(&3u16.to_be_bytes()); // super_class
    // interfaces, fields, methods, attributes
    out.extend_from_slice(&[0; 8]);
    out
}

fn push_class_ref(out: &mut Vec<u8>, name_index: u16) {
    out.push(CONSTANT_CLASS);
    out.extend_from_slice(&name_index.to_be_bytes());
}

fn push_utf8(out: &mut Vec<u8>, value: &str) {
    out.push(CONSTANT_UTF8);
    // Canary names are short ASCII; modified UTF-8 equals plain UTF-8 here.
    out.extend_from_slice(&(value.len() as u16).to_be_bytes());
    out.extend_from_slice(value.as_bytes());
}

/// Writes canary class files under a scratch directory.
///
/// The canary for index `n` lives in `<scratch>/canary_<n>/`, which is also
/// the path of the returned artifact.
pub struct ScratchCanaryGenerator<'a, F: ProjectFilesystem + ?Sized> {
    filesystem: &'a F,
    scratch_directory: PathBuf,
}

impl<'a, F: ProjectFilesystem + ?Sized> ScratchCanaryGenerator<'a, F> {
    /// Creates a generator writing through `filesystem` into `scratch_directory`.
    pub fn new(filesystem: &'a F, scratch_directory: impl Into<PathBuf>) -> Self {
        Self {
            filesystem,
            scratch_directory: scratch_directory.into(),
        }
    }

    /// Returns the scratch directory canaries are written to.
    pub fn scratch_directory(&self) -> &Path {
        &self.scratch_directory
    }
}

impl<F: ProjectFilesystem + ?Sized> CanaryGenerator for ScratchCanaryGenerator<'_, F> {
    fn create(&mut self, index: usize) -> Result<DexArtifact> {
        let class_name = canary_class_name(index);
        let canary_dir = self.scratch_directory.join(format!("canary_{index}"));
        let class_file = canary_dir.join(format!("{class_name}.class"));

        let bytes = canary_class_bytes(&class_name);
        self.filesystem
            .create_parent_dirs(&class_file)
            .and_then(|()| self.filesystem.copy_to_path(&mut bytes.as_slice(), &class_file))
            .map_err(|source| {
                log::error!("Failed to create canary for secondary dex: {source}");
                Error::CanaryWriteFailure {
                    index,
                    path: class_file.clone(),
                    source,
                }
            })?;

        log::debug!("Wrote canary {} to {}", class_name, class_file.display());

        // Canaries are tiny and the cost unit is unknown here, so they count as zero.
        Ok(DexArtifact::new(canary_dir, 0, [class_name]))
    }
}
