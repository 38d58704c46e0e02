//! `.env` key-value store.
//!
//! Reads go through dotenvy's file iterator and never touch the process
//! environment. Writes are an upsert: lines for the given keys are rewritten
//! in place, new keys are appended, everything else (comments, unrelated
//! keys) is kept as is.

// ============================================================================
// Imports
// ============================================================================

use std::env;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;
use tracing::debug;

use crate::error::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

/// Environment variable overriding the data directory.
pub const HOME_ENV: &str = "OPENPLAY_HOME";

const APP_DIR: &str = "openplay-signup";
const STORE_FILE: &str = ".env";

// ============================================================================
// Data Directory
// ============================================================================

/// Directory holding the store, logs and diagnostic screenshots.
///
/// `$OPENPLAY_HOME` when set, otherwise `<local data dir>/openplay-signup`.
pub fn data_dir() -> Result<PathBuf> {
    if let Some(home) = env::var_os(HOME_ENV).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(home));
    }

    dirs::data_local_dir()
        .map(|dir| dir.join(APP_DIR))
        .ok_or_else(|| Error::config(format!("No local data directory; set {HOME_ENV}")))
}

// ============================================================================
// ConfigStore
// ============================================================================

/// A `.env` file on disk. A missing file reads as empty.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    /// Store at an explicit file path.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `<dir>/.env`.
    #[must_use]
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(STORE_FILE))
    }

    /// Returns the file path.
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads every entry. Later duplicates win.
    pub fn load(&self) -> Result<FxHashMap<String, String>> {
        let mut values = FxHashMap::default();
        if !self.path.exists() {
            return Ok(values);
        }

        for item in dotenvy::from_path_iter(&self.path)? {
            let (key, value) = item?;
            values.insert(key, value);
        }
        Ok(values)
    }

    /// Reads one key; empty values read as `None`.
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.load()?.remove(key).filter(|v| !v.is_empty()))
    }

    /// Writes one key.
    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        self.upsert([(key, value)])
    }

    /// Writes several keys at once.
    pub fn upsert<'a>(&self, entries: impl IntoIterator<Item = (&'a str, &'a str)>) -> Result<()> {
        let mut pending: Vec<(&str, &str)> = Vec::new();
        for (key, value) in entries {
            pending.retain(|(k, _)| *k != key);
            pending.push((key, value));
        }

        let existing = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => String::new(),
            Err(e) => return Err(e.into()),
        };

        let mut written: Vec<&str> = Vec::new();
        let mut out = String::with_capacity(existing.len() + 64);

        for line in existing.lines() {
            let key = line_key(line);

            if let Some(key) = key
                && written.contains(&key)
            {
                continue;
            }

            match key.and_then(|k| pending.iter().position(|(p, _)| *p == k)) {
                Some(index) => {
                    let (key, value) = pending.remove(index);
                    out.push_str(&format_entry(key, value));
                    written.push(key);
                }
                None => out.push_str(line),
            }
            out.push('\n');
        }

        for (key, value) in pending {
            out.push_str(&format_entry(key, value));
            out.push('\n');
        }

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, out)?;

        debug!(path = %self.path.display(), "Config store written");
        Ok(())
    }
}

// ============================================================================
// Line Format
// ============================================================================

/// Key of a `KEY=value` line, `None` for comments and blanks.
fn line_key(line: &str) -> Option<&str> {
    let line = line.trim_start();
    if line.starts_with('#') {
        return None;
    }
    let line = line.strip_prefix("export ").unwrap_or(line);
    let (key, _) = line.split_once('=')?;
    let key = key.trim();
    (!key.is_empty()).then_some(key)
}

/// Single quotes keep the value literal; values that contain a single
/// quote, a backslash or a newline fall back to escaped double quotes.
fn format_entry(key: &str, value: &str) -> String {
    if !value.contains(['\'', '\\', '\n']) {
        return format!("{key}='{value}'");
    }

    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        match c {
            '\\' => quoted.push_str("\\\\"),
            '"' => quoted.push_str("\\\""),
            '$' => quoted.push_str("\\$"),
            '\n' => quoted.push_str("\\n"),
            c => quoted.push(c),
        }
    }
    quoted.push('"');
    format!("{key}={quoted}")
}

// ============================================================================
// Tests
// ============================================================================
