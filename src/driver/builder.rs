//! Builder for [`Driver`].

// ============================================================================
// Imports
// ============================================================================

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{Error, Result};

use super::core::Driver;
use super::profile::ExtensionSource;

// ============================================================================
// Constants
// ============================================================================

/// How long to wait for the extension to dial back after launch.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

// ============================================================================
// DriverBuilder
// ============================================================================

/// Collects and validates launch inputs.
#[derive(Debug, Clone)]
pub struct DriverBuilder {
    binary: Option<PathBuf>,
    extension: Option<PathBuf>,
    connect_timeout: Duration,
}

impl Default for DriverBuilder {
    fn default() -> Self {
        Self {
            binary: None,
            extension: None,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }
}

impl DriverBuilder {
    /// Creates an empty builder.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the Firefox binary.
    #[inline]
    #[must_use]
    pub fn binary(mut self, path: impl Into<PathBuf>) -> Self {
        self.binary = Some(path.into());
        self
    }

    /// Sets the extension directory or `.xpi`.
    #[inline]
    #[must_use]
    pub fn extension(mut self, path: impl Into<PathBuf>) -> Self {
        self.extension = Some(path.into());
        self
    }

    /// Sets the extension connect timeout.
    #[inline]
    #[must_use]
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Validates paths and builds the driver.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if a path is unset or the extension is missing
    /// - [`Error::FirefoxNotFound`] if the binary does not exist
    pub fn build(self) -> Result<Driver> {
        let binary = self
            .binary
            .ok_or_else(|| Error::config("Firefox binary path is required"))?;
        if !binary.exists() {
            return Err(Error::firefox_not_found(binary));
        }

        let extension = self
            .extension
            .ok_or_else(|| Error::config("Extension path is required"))?;
        if !extension.exists() {
            return Err(Error::config(format!(
                "Extension not found at: {}",
                extension.display()
            )));
        }

        Ok(Driver::new(
            binary,
            ExtensionSource::from(extension),
            self.connect_timeout,
        ))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_fails_without_binary() {
        let err = DriverBuilder::new().extension(".").build().expect_err("no binary");
        assert!(err.to_string().contains("binary"));
    }

    #[test]
    fn test_build_reports_missing_firefox() {
        let err = DriverBuilder::new()
            .binary("/nonexistent/firefox")
            .extension(".")
            .build()
            .expect_err("missing binary");
        assert!(matches!(err, Error::FirefoxNotFound { .. }));
        assert!(err.is_session_error());
    }

    #[test]
    fn test_build_fails_without_extension() {
        let binary = tempfile::NamedTempFile::new().expect("fake binary");
        let err = DriverBuilder::new()
            .binary(binary.path())
            .build()
            .expect_err("no extension");
        assert!(err.to_string().contains("Extension"));
    }

    #[test]
    fn test_build_with_existing_paths() {
        let binary = tempfile::NamedTempFile::new().expect("fake binary");
        let ext = tempfile::tempdir().expect("ext dir");
        let driver = DriverBuilder::new()
            .binary(binary.path())
            .extension(ext.path())
            .connect_timeout(Duration::from_secs(5))
            .build()
            .expect("build");
        assert_eq!(driver.binary(), binary.path());
    }
}
