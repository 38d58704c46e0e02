//! Where the WebDriver extension comes from.
//!
//! | Format | Description |
//! |--------|-------------|
//! | Unpacked | Directory containing `manifest.json` |
//! | Packed | `.xpi` or `.zip` archive |

// ============================================================================
// Imports
// ============================================================================

use std::path::{Path, PathBuf};

// ============================================================================
// ExtensionSource
// ============================================================================

/// Extension location on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtensionSource {
    /// Directory with `manifest.json`.
    Unpacked(PathBuf),
    /// `.xpi` archive.
    Packed(PathBuf),
}

impl ExtensionSource {
    /// Returns the filesystem path.
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Unpacked(path) | Self::Packed(path) => path,
        }
    }
}

impl From<PathBuf> for ExtensionSource {
    /// Directories are unpacked extensions, anything else is an archive.
    fn from(path: PathBuf) -> Self {
        if path.is_dir() {
            Self::Unpacked(path)
        } else {
            Self::Packed(path)
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directory_is_unpacked() {
        let dir = tempfile::tempdir().expect("tempdir");
        let source = ExtensionSource::from(dir.path().to_path_buf());
        assert!(matches!(source, ExtensionSource::Unpacked(_)));
        assert_eq!(source.path(), dir.path());
    }

    #[test]
    fn test_missing_path_is_packed() {
        let source = ExtensionSource::from(PathBuf::from("./does-not-exist.xpi"));
        assert!(matches!(source, ExtensionSource::Packed(_)));
    }
}
