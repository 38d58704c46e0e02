//! Firefox profile preparation.
//!
//! Every launch gets a fresh temporary profile with automation-friendly
//! preferences and the WebDriver extension preinstalled. The directory is
//! removed when the [`Profile`] drops.

// ============================================================================
// Imports
// ============================================================================

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Value, from_str};
use tempfile::TempDir;
use tracing::debug;
use zip::ZipArchive;

use crate::error::{Error, Result};

// ============================================================================
// Submodules
// ============================================================================

/// Extension source.
pub mod extensions;

/// Preference serialization.
pub mod preferences;

// ============================================================================
// Re-exports
// ============================================================================

pub use extensions::ExtensionSource;
pub use preferences::{FirefoxPreference, PreferenceValue};

// ============================================================================
// Constants
// ============================================================================

const USER_JS_HEADER: &str = "// Generated by openplay-signup\n\n";

// ============================================================================
// Profile
// ============================================================================

/// A temporary Firefox profile directory.
pub struct Profile {
    _temp_dir: TempDir,
    path: PathBuf,
}

impl Profile {
    /// Creates an empty temporary profile.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Profile`] if the directory cannot be created.
    pub fn new_temp() -> Result<Self> {
        let temp_dir = TempDir::with_prefix("openplay-profile-")
            .map_err(|e| Error::profile(format!("Failed to create temp profile: {e}")))?;

        let path = temp_dir.path().to_path_buf();
        debug!(path = %path.display(), "Created temporary profile");

        Ok(Self {
            _temp_dir: temp_dir,
            path,
        })
    }

    /// Returns the profile directory.
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes `user.js`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Profile`] if the file cannot be written.
    pub fn write_prefs(&self, prefs: &[FirefoxPreference]) -> Result<()> {
        let file_path = self.path.join("user.js");

        let mut content = String::from(USER_JS_HEADER);
        for pref in prefs {
            content.push_str(&pref.to_user_pref_line());
            content.push('\n');
        }

        fs::write(&file_path, content).map_err(|e| {
            Error::profile(format!("Failed to write {}: {e}", file_path.display()))
        })?;

        debug!(pref_count = prefs.len(), "Wrote preferences to user.js");
        Ok(())
    }

    /// Preferences for an unattended automation profile.
    #[must_use]
    pub fn default_prefs() -> Vec<FirefoxPreference> {
        use preferences::FirefoxPreference as Pref;

        vec![
            // Extension loading
            Pref::new("xpinstall.signatures.required", false),
            Pref::new("extensions.autoDisableScopes", 0),
            Pref::new("extensions.webextensions.restrictedDomains", ""),
            Pref::new("security.data_uri.block_toplevel_data_uri_navigations", false),
            // Quiet startup and shutdown
            Pref::new("browser.startup.page", 0),
            Pref::new("browser.shell.checkDefaultBrowser", false),
            Pref::new("browser.startup.homepage_override.mstone", "ignore"),
            Pref::new("browser.sessionstore.resume_from_crash", false),
            Pref::new("browser.tabs.warnOnClose", false),
            Pref::new("browser.warnOnQuit", false),
            Pref::new("browser.aboutConfig.showWarning", false),
            Pref::new("browser.uitour.enabled", false),
            Pref::new("startup.homepage_welcome_url", ""),
            // Password manager would pop a save dialog after sign-in
            Pref::new("signon.rememberSignons", false),
            // Telemetry and updates
            Pref::new("toolkit.telemetry.enabled", false),
            Pref::new("datareporting.policy.dataSubmissionEnabled", false),
            Pref::new("datareporting.healthreport.uploadEnabled", false),
            Pref::new("app.update.service.enabled", false),
            Pref::new("extensions.update.enabled", false),
            Pref::new("app.normandy.enabled", false),
        ]
    }

    /// Installs the WebDriver extension into `extensions/<gecko id>`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Profile`] if the archive or manifest is invalid.
    pub fn install_extension(&self, source: &ExtensionSource) -> Result<()> {
        match source {
            ExtensionSource::Unpacked(path) => self.install_unpacked(path),
            ExtensionSource::Packed(path) => {
                let file = fs::File::open(path)?;
                let mut archive = ZipArchive::new(file)
                    .map_err(|e| Error::profile(format!("Invalid extension archive: {e}")))?;

                let extracted = TempDir::new()?;
                archive
                    .extract(extracted.path())
                    .map_err(|e| Error::profile(format!("Failed to extract extension: {e}")))?;

                self.install_unpacked(extracted.path())
            }
        }
    }

    fn install_unpacked(&self, src: &Path) -> Result<()> {
        let extension_id = read_manifest_id(src)?;
        let dest = self.path.join("extensions").join(&extension_id);

        copy_dir_recursive(src, &dest)?;

        debug!(%extension_id, dest = %dest.display(), "Installed extension");
        Ok(())
    }
}

// ============================================================================
// Private Helpers
// ============================================================================

fn read_manifest_id(dir: &Path) -> Result<String> {
    let manifest_path = dir.join("manifest.json");
    let content = fs::read_to_string(&manifest_path).map_err(|e| {
        Error::profile(format!(
            "Extension manifest not found at {}: {e}",
            manifest_path.display()
        ))
    })?;

    let json: Value =
        from_str(&content).map_err(|e| Error::profile(format!("Invalid manifest.json: {e}")))?;

    ["/browser_specific_settings/gecko/id", "/applications/gecko/id"]
        .iter()
        .find_map(|pointer| json.pointer(pointer).and_then(Value::as_str))
        .map(str::to_string)
        .ok_or_else(|| Error::profile("Extension manifest missing 'gecko.id' field"))
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> Result<()> {
    fs::create_dir_all(dst)?;

    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let dst_path = dst.join(entry.file_name());

        if entry.file_type()?.is_dir() {
            copy_dir_recursive(&entry.path(), &dst_path)?;
        } else {
            fs::copy(entry.path(), &dst_path)?;
        }
    }

    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Write;

    const MANIFEST: &str = concat!(
        r#"{"manifest_version": 2, "#,
        r#""browser_specific_settings": {"gecko": {"id": "driver@openplay"}}}"#
    );

    #[test]
    fn test_temp_profile_removed_on_drop() {
        let path = {
            let profile = Profile::new_temp().expect("create temp profile");
            assert!(profile.path().is_dir());
            profile.path().to_path_buf()
        };
        assert!(!path.exists());
    }

    #[test]
    fn test_write_prefs_creates_user_js() {
        let profile = Profile::new_temp().expect("profile");
        profile
            .write_prefs(&Profile::default_prefs())
            .expect("write prefs");

        let user_js = fs::read_to_string(profile.path().join("user.js")).expect("read");
        assert!(user_js.contains("user_pref(\"xpinstall.signatures.required\", false);"));
        assert!(user_js.contains("user_pref(\"signon.rememberSignons\", false);"));
    }

    #[test]
    fn test_install_unpacked_extension() {
        let ext = tempfile::tempdir().expect("ext dir");
        fs::write(ext.path().join("manifest.json"), MANIFEST).expect("manifest");
        fs::create_dir(ext.path().join("content")).expect("subdir");
        fs::write(ext.path().join("content/main.js"), "// js").expect("script");

        let profile = Profile::new_temp().expect("profile");
        profile
            .install_extension(&ExtensionSource::Unpacked(ext.path().to_path_buf()))
            .expect("install");

        let installed = profile.path().join("extensions/driver@openplay");
        assert!(installed.join("manifest.json").is_file());
        assert!(installed.join("content/main.js").is_file());
    }

    #[test]
    fn test_install_packed_extension() {
        let dir = tempfile::tempdir().expect("dir");
        let xpi = dir.path().join("driver.xpi");
        {
            let file = fs::File::create(&xpi).expect("create xpi");
            let mut writer = zip::ZipWriter::new(file);
            let options = zip::write::SimpleFileOptions::default()
                .compression_method(zip::CompressionMethod::Stored);
            writer.start_file("manifest.json", options).expect("entry");
            writer.write_all(MANIFEST.as_bytes()).expect("write");
            writer.finish().expect("finish");
        }

        let profile = Profile::new_temp().expect("profile");
        profile
            .install_extension(&ExtensionSource::Packed(xpi))
            .expect("install");

        assert!(profile.path().join("extensions/driver@openplay/manifest.json").is_file());
    }

    #[test]
    fn test_manifest_without_gecko_id_is_rejected() {
        let ext = tempfile::tempdir().expect("ext dir");
        fs::write(ext.path().join("manifest.json"), r#"{"manifest_version": 2}"#)
            .expect("manifest");

        let profile = Profile::new_temp().expect("profile");
        let err = profile
            .install_extension(&ExtensionSource::Unpacked(ext.path().to_path_buf()))
            .expect_err("missing id");
        assert!(err.to_string().contains("gecko.id"));
    }
}
