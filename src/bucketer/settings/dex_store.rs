//! Secondary dex storage formats.

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// How secondary dexes are stored in the APK.
///
/// Only the file extension matters to the bucketer; compression happens in a
/// later stage.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DexStore {
    /// Dex wrapped in a jar (`.dex.jar`).
    #[default]
    Jar,
    /// Bare dex file (`.dex`).
    Raw,
    /// Xz-compressed dex jar (`.dex.jar.xz`).
    Xz,
}

impl DexStore {
    /// File extension including the leading dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Jar => ".dex.jar",
            Self::Raw => ".dex",
            Self::Xz => ".dex.jar.xz",
        }
    }

    /// Name of secondary dex `index` (1-based), e.g. `secondary-1.dex.jar`.
    pub fn secondary_file_name(self, index: usize) -> String {
        format!("secondary-{index}{}", self.extension())
    }
}

impl fmt::Display for DexStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Jar => "jar",
            Self::Raw => "raw",
            Self::Xz => "xz",
        })
    }
}

impl FromStr for DexStore {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "jar" => Ok(Self::Jar),
            "raw" => Ok(Self::Raw),
            "xz" => Ok(Self::Xz),
            other => Err(format!(
                "Invalid dex store: {other}. Valid stores: jar, raw, xz"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_names_follow_store() {
        assert_eq!(DexStore::Jar.secondary_file_name(1), "secondary-1.dex.jar");
        assert_eq!(DexStore::Raw.secondary_file_name(12), "secondary-12.dex");
        assert_eq!(DexStore::Xz.secondary_file_name(3), "secondary-3.dex.jar.xz");
    }

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("RAW".parse::<DexStore>().unwrap(), DexStore::Raw);
        assert!("zip".parse::<DexStore>().is_err());
    }
}
