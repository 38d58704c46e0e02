//! Optional runtime settings kept in the same store as the registration
//! fields.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{NaiveTime, Weekday};
use rustc_hash::FxHashMap;

use crate::error::{Error, Result};
use crate::schedule::{RearmPolicy, WeeklyTrigger};

use super::ConfigStore;

// ============================================================================
// Keys and Defaults
// ============================================================================

/// Store keys for [`Settings`].
pub mod keys {
    /// Path to the Firefox binary.
    pub const FIREFOX_BINARY: &str = "FIREFOX_BINARY";
    /// Path to the WebDriver extension (directory or `.xpi`).
    pub const EXTENSION_PATH: &str = "EXTENSION_PATH";
    /// `true` to run without a visible window.
    pub const HEADLESS: &str = "HEADLESS";
    /// Weekday of the trigger.
    pub const RUN_DAY: &str = "RUN_DAY";
    /// Local time of the trigger, `HH:MM`.
    pub const RUN_TIME: &str = "RUN_TIME";
    /// `once` or `weekly`.
    pub const REARM: &str = "REARM";
    /// Seconds to wait for the embedded frame.
    pub const FRAME_TIMEOUT_SECS: &str = "FRAME_TIMEOUT_SECS";
    /// Seconds to wait for each form control.
    pub const ELEMENT_TIMEOUT_SECS: &str = "ELEMENT_TIMEOUT_SECS";
}

const DEFAULT_FIREFOX_BINARY: &str = "/usr/bin/firefox";
const DEFAULT_EXTENSION_FILE: &str = "extension.xpi";
const DEFAULT_RUN_TIME: &str = "12:00";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

// ============================================================================
// Settings
// ============================================================================

/// Browser, trigger and timeout settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Firefox binary.
    pub firefox_binary: PathBuf,
    /// WebDriver extension.
    pub extension_path: PathBuf,
    /// Hide the browser window.
    pub headless: bool,
    /// When the registration job fires.
    pub trigger: WeeklyTrigger,
    /// What happens after the job has run.
    pub rearm: RearmPolicy,
    /// Bound on the embedded frame wait.
    pub frame_timeout: Duration,
    /// Bound on each form control wait.
    pub element_timeout: Duration,
}

impl Settings {
    /// Reads settings from the store, with defaults for absent keys.
    pub fn load(store: &ConfigStore, data_dir: &Path) -> Result<Self> {
        Self::from_values(&store.load()?, data_dir)
    }

    /// Builds settings from raw store values.
    pub fn from_values(values: &FxHashMap<String, String>, data_dir: &Path) -> Result<Self> {
        let get = |key: &str| values.get(key).map(|v| v.trim()).filter(|v| !v.is_empty());

        let firefox_binary = get(keys::FIREFOX_BINARY)
            .map_or_else(|| PathBuf::from(DEFAULT_FIREFOX_BINARY), PathBuf::from);
        let extension_path = get(keys::EXTENSION_PATH)
            .map_or_else(|| data_dir.join(DEFAULT_EXTENSION_FILE), PathBuf::from);

        let headless = match get(keys::HEADLESS) {
            None => false,
            Some(raw) => parse_bool(keys::HEADLESS, raw)?,
        };

        let weekday = match get(keys::RUN_DAY) {
            None => Weekday::Fri,
            Some(raw) => raw
                .parse::<Weekday>()
                .map_err(|_| Error::config(format!("{}: not a weekday: {raw}", keys::RUN_DAY)))?,
        };

        let raw_time = get(keys::RUN_TIME).unwrap_or(DEFAULT_RUN_TIME);
        let time = NaiveTime::parse_from_str(raw_time, "%H:%M").map_err(|_| {
            Error::config(format!("{}: expected HH:MM, got {raw_time}", keys::RUN_TIME))
        })?;

        let rearm = match get(keys::REARM) {
            None => RearmPolicy::default(),
            Some(raw) => raw.parse()?,
        };

        Ok(Self {
            firefox_binary,
            extension_path,
            headless,
            trigger: WeeklyTrigger::new(weekday, time),
            rearm,
            frame_timeout: parse_secs(get(keys::FRAME_TIMEOUT_SECS), keys::FRAME_TIMEOUT_SECS)?,
            element_timeout: parse_secs(
                get(keys::ELEMENT_TIMEOUT_SECS),
                keys::ELEMENT_TIMEOUT_SECS,
            )?,
        })
    }
}

fn parse_bool(key: &str, raw: &str) -> Result<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(Error::config(format!("{key}: expected true or false, got {raw}"))),
    }
}

fn parse_secs(raw: Option<&str>, key: &str) -> Result<Duration> {
    let secs = match raw {
        None => DEFAULT_TIMEOUT_SECS,
        Some(raw) => raw
            .parse::<u64>()
            .ok()
            .filter(|s| *s > 0)
            .ok_or_else(|| Error::config(format!("{key}: expected positive seconds, got {raw}")))?,
    };
    Ok(Duration::from_secs(secs))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn values(pairs: &[(&str, &str)]) -> FxHashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::from_values(&values(&[]), Path::new("/data")).unwrap();

        assert_eq!(settings.firefox_binary, PathBuf::from("/usr/bin/firefox"));
        assert_eq!(settings.extension_path, PathBuf::from("/data/extension.xpi"));
        assert!(!settings.headless);
        assert_eq!(settings.trigger.weekday(), Weekday::Fri);
        assert_eq!(settings.trigger.time(), NaiveTime::from_hms_opt(12, 0, 0).unwrap());
        assert_eq!(settings.rearm, RearmPolicy::Once);
        assert_eq!(settings.frame_timeout, Duration::from_secs(30));
        assert_eq!(settings.element_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_overrides() {
        let settings = Settings::from_values(
            &values(&[
                ("HEADLESS", "yes"),
                ("RUN_DAY", "monday"),
                ("RUN_TIME", "07:30"),
                ("REARM", "weekly"),
                ("ELEMENT_TIMEOUT_SECS", "5"),
            ]),
            Path::new("/data"),
        )
        .unwrap();

        assert!(settings.headless);
        assert_eq!(settings.trigger.weekday(), Weekday::Mon);
        assert_eq!(settings.trigger.time(), NaiveTime::from_hms_opt(7, 30, 0).unwrap());
        assert_eq!(settings.rearm, RearmPolicy::Weekly);
        assert_eq!(settings.element_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_invalid_values_are_config_errors() {
        for (key, raw) in [
            ("HEADLESS", "maybe"),
            ("RUN_DAY", "someday"),
            ("RUN_TIME", "noon"),
            ("REARM", "daily"),
            ("FRAME_TIMEOUT_SECS", "0"),
        ] {
            let err =
                Settings::from_values(&values(&[(key, raw)]), Path::new("/data")).unwrap_err();
            assert!(matches!(err, Error::Config { .. }), "{key}={raw}");
        }
    }
}
