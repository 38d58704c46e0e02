//! Registration fields: load, prompt for what is missing, save.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use tracing::{debug, info, warn};
use url::Url;

use crate::error::{Error, Result};

use super::position::{Position, join_positions, parse_positions};
use super::{ConfigStore, Prompter};

// ============================================================================
// Keys
// ============================================================================

/// Store keys for [`RegistrationConfig`].
pub mod keys {
    /// Account email.
    pub const EMAIL: &str = "EMAIL";
    /// Account password.
    pub const PASSWORD: &str = "PASSWORD";
    /// Electronic signature.
    pub const SIGNATURE: &str = "SIGNATURE";
    /// Event page URL.
    pub const URL: &str = "URL";
    /// Comma-joined positions.
    pub const POSITIONS: &str = "POSITIONS";
}

/// Attempts per field before an unusable answer becomes an error.
const PROMPT_ATTEMPTS: usize = 3;

// ============================================================================
// Secret
// ============================================================================

/// A string that never shows up in `Debug` output.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    /// Wraps a value.
    #[inline]
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the plain value.
    #[inline]
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// `true` when empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("***")
    }
}

// ============================================================================
// Field
// ============================================================================

/// One registration field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// Account email.
    Email,
    /// Account password.
    Password,
    /// Electronic signature.
    Signature,
    /// Event page URL.
    EventUrl,
    /// Positions to tick.
    Positions,
}

impl Field {
    /// Every field, in prompt order.
    pub const ALL: [Self; 5] = [
        Self::Email,
        Self::Password,
        Self::Signature,
        Self::EventUrl,
        Self::Positions,
    ];

    /// The account fields `set-credentials` asks for.
    pub const CREDENTIALS: [Self; 3] = [Self::Email, Self::Password, Self::Signature];

    /// Store key.
    #[must_use]
    pub fn key(&self) -> &'static str {
        match self {
            Self::Email => keys::EMAIL,
            Self::Password => keys::PASSWORD,
            Self::Signature => keys::SIGNATURE,
            Self::EventUrl => keys::URL,
            Self::Positions => keys::POSITIONS,
        }
    }

    fn question(&self) -> &'static str {
        match self {
            Self::Email => "Enter your email",
            Self::Password => "Enter your password",
            Self::Signature => "Enter your signature",
            Self::EventUrl => "Enter the url of the event you want to register for",
            Self::Positions => "Select your positions",
        }
    }
}

// ============================================================================
// RegistrationConfig
// ============================================================================

/// Everything one registration attempt needs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrationConfig {
    /// Account email.
    pub email: String,
    /// Account password.
    pub password: Secret,
    /// Electronic signature.
    pub signature: String,
    /// Event page; empty between attempts.
    pub event_url: String,
    /// Positions to tick, no duplicates.
    pub positions: Vec<Position>,
}

impl RegistrationConfig {
    /// Reads the stored fields. Absent keys read as empty; an unparseable
    /// position list reads as empty and is asked for again.
    pub fn load(store: &ConfigStore) -> Result<Self> {
        let mut values = store.load()?;
        let mut take = |key: &str| values.remove(key).unwrap_or_default().trim().to_string();

        let email = take(keys::EMAIL);
        let password = Secret::new(take(keys::PASSWORD));
        let signature = take(keys::SIGNATURE);
        let event_url = take(keys::URL);
        let raw_positions = take(keys::POSITIONS);

        let positions = parse_positions(&raw_positions).unwrap_or_else(|e| {
            warn!(error = %e, "Ignoring stored positions");
            Vec::new()
        });

        Ok(Self {
            email,
            password,
            signature,
            event_url,
            positions,
        })
    }

    /// Upserts all five fields.
    pub fn save(&self, store: &ConfigStore) -> Result<()> {
        let positions = join_positions(&self.positions);
        store.upsert([
            (keys::EMAIL, self.email.as_str()),
            (keys::PASSWORD, self.password.expose()),
            (keys::SIGNATURE, self.signature.as_str()),
            (keys::URL, self.event_url.as_str()),
            (keys::POSITIONS, positions.as_str()),
        ])?;
        debug!(path = %store.path().display(), "Registration config saved");
        Ok(())
    }

    /// `true` when `field` holds a usable value.
    #[must_use]
    pub fn has(&self, field: Field) -> bool {
        match field {
            Field::Email => !self.email.is_empty(),
            Field::Password => !self.password.is_empty(),
            Field::Signature => !self.signature.is_empty(),
            Field::EventUrl => parse_event_url(&self.event_url).is_ok(),
            Field::Positions => !self.positions.is_empty(),
        }
    }

    /// Fields still missing, in prompt order.
    #[must_use]
    pub fn missing(&self) -> Vec<Field> {
        Field::ALL.into_iter().filter(|f| !self.has(*f)).collect()
    }

    /// Fails with [`Error::ConfigIncomplete`] naming the first missing field.
    pub fn ensure_complete(&self) -> Result<()> {
        match self.missing().first() {
            Some(field) => Err(Error::config_incomplete(field.key())),
            None => Ok(()),
        }
    }

    /// Asks for every missing field.
    pub fn prompt_missing(&mut self, prompter: &mut dyn Prompter) -> Result<()> {
        for field in self.missing() {
            self.prompt_field(field, prompter)?;
        }
        Ok(())
    }

    /// Asks for `field`, replacing whatever it held.
    pub fn prompt_field(&mut self, field: Field, prompter: &mut dyn Prompter) -> Result<()> {
        for attempt in 1..=PROMPT_ATTEMPTS {
            let accepted = match field {
                Field::Email => accept_text(prompter.text(field.question())?, &mut self.email),
                Field::Signature => {
                    accept_text(prompter.text(field.question())?, &mut self.signature)
                }
                Field::Password => {
                    let answer = prompter.secret(field.question())?.trim().to_string();
                    let ok = !answer.is_empty();
                    if ok {
                        self.password = Secret::new(answer);
                    }
                    ok
                }
                Field::EventUrl => {
                    let answer = prompter.text(field.question())?.trim().to_string();
                    match parse_event_url(&answer) {
                        Ok(_) => {
                            self.event_url = answer;
                            true
                        }
                        Err(e) => {
                            warn!(error = %e, "Rejected event URL");
                            false
                        }
                    }
                }
                Field::Positions => {
                    let names = Position::ALL.map(|p| p.as_str());
                    let chosen = prompter.multi_select(field.question(), &names)?;
                    let positions = parse_positions(&chosen.join(","))?;
                    let ok = !positions.is_empty();
                    if ok {
                        self.positions = positions;
                    }
                    ok
                }
            };

            if accepted {
                return Ok(());
            }
            debug!(field = field.key(), attempt, "Answer not usable");
        }

        Err(Error::config_incomplete(field.key()))
    }
}

fn accept_text(answer: String, slot: &mut String) -> bool {
    let answer = answer.trim();
    if answer.is_empty() {
        return false;
    }
    *slot = answer.to_string();
    true
}

/// Parses an event page URL; only `http` and `https` are accepted.
pub fn parse_event_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim())?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(Error::config(format!("Unsupported URL scheme: {other}"))),
    }
}

// ============================================================================
// Store Operations
// ============================================================================

/// Loads, prompts for whatever is missing, and always saves.
pub fn merge_and_save(
    store: &ConfigStore,
    prompter: &mut dyn Prompter,
) -> Result<RegistrationConfig> {
    let mut config = RegistrationConfig::load(store)?;
    let missing = config.missing();
    if !missing.is_empty() {
        info!(?missing, "Prompting for missing registration fields");
    }

    config.prompt_missing(prompter)?;
    config.save(store)?;
    Ok(config)
}

/// Asks for the three account fields again, regardless of stored values.
pub fn reset_credentials(
    store: &ConfigStore,
    prompter: &mut dyn Prompter,
) -> Result<RegistrationConfig> {
    let mut config = RegistrationConfig::load(store)?;
    for field in Field::CREDENTIALS {
        config.prompt_field(field, prompter)?;
    }
    config.save(store)?;
    info!("Credentials saved");
    Ok(config)
}

/// Asks for the event URL and positions, regardless of stored values.
pub fn set_event(store: &ConfigStore, prompter: &mut dyn Prompter) -> Result<RegistrationConfig> {
    let mut config = RegistrationConfig::load(store)?;
    config.prompt_field(Field::EventUrl, prompter)?;
    config.prompt_field(Field::Positions, prompter)?;
    config.save(store)?;
    info!(url = %config.event_url, positions = %join_positions(&config.positions), "Event saved");
    Ok(config)
}

/// Empties the stored event URL.
pub fn clear_event_url(store: &ConfigStore) -> Result<()> {
    store.set(keys::URL, "")?;
    info!("URL cleared from store");
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::fs;

    use tempfile::TempDir;

    use crate::testing::ScriptedPrompter;

    fn store() -> (TempDir, ConfigStore) {
        let dir = TempDir::new().expect("temp dir");
        let store = ConfigStore::in_dir(dir.path());
        (dir, store)
    }

    fn complete() -> RegistrationConfig {
        RegistrationConfig {
            email: "player@example.com".to_string(),
            password: Secret::new("hunter2"),
            signature: "Pat Player".to_string(),
            event_url: "https://example.com/events/42".to_string(),
            positions: vec![Position::Setter, Position::Outside],
        }
    }

    #[test]
    fn test_secret_debug_is_masked() {
        let rendered = format!("{:?}", complete());
        assert!(rendered.contains("***"));
        assert!(!rendered.contains("hunter2"));
    }

    #[test]
    fn test_save_then_load() {
        let (_dir, store) = store();
        complete().save(&store).unwrap();
        assert_eq!(RegistrationConfig::load(&store).unwrap(), complete());
    }

    #[test]
    fn test_missing_fields() {
        let mut config = complete();
        assert!(config.missing().is_empty());
        assert!(config.ensure_complete().is_ok());

        config.event_url = "ftp://example.com".to_string();
        config.positions.clear();
        assert_eq!(config.missing(), vec![Field::EventUrl, Field::Positions]);

        let err = config.ensure_complete().unwrap_err();
        assert!(matches!(err, Error::ConfigIncomplete { field: "URL" }));
    }

    #[test]
    fn test_load_tolerates_bad_positions() {
        let (_dir, store) = store();
        store.set(keys::POSITIONS, "Setter,Libero").unwrap();

        let config = RegistrationConfig::load(&store).unwrap();
        assert!(config.positions.is_empty());
        assert!(config.missing().contains(&Field::Positions));
    }

    #[test]
    fn test_merge_prompts_only_missing() {
        let (_dir, store) = store();
        let mut partial = complete();
        partial.signature.clear();
        partial.save(&store).unwrap();

        let mut prompter = ScriptedPrompter::new().then_text("Pat Player");
        let merged = merge_and_save(&store, &mut prompter).unwrap();

        assert_eq!(merged, complete());
        assert_eq!(prompter.asked(), vec!["Enter your signature"]);
        assert_eq!(RegistrationConfig::load(&store).unwrap(), complete());
    }

    #[test]
    fn test_merge_saves_even_when_nothing_missing() {
        let (_dir, store) = store();
        store
            .upsert([
                ("EMAIL", "player@example.com"),
                ("PASSWORD", "hunter2"),
                ("SIGNATURE", "Pat Player"),
                ("URL", "https://example.com/events/42"),
                ("POSITIONS", "setter,outside"),
            ])
            .unwrap();

        let mut prompter = ScriptedPrompter::new();
        merge_and_save(&store, &mut prompter).unwrap();

        assert!(prompter.asked().is_empty());
        let text = fs::read_to_string(store.path()).unwrap();
        assert!(text.contains("POSITIONS='Setter,Outside'"));
    }

    #[test]
    fn test_merge_twice_is_stable() {
        let (_dir, store) = store();
        let mut prompter = ScriptedPrompter::new()
            .then_text("player@example.com")
            .then_secret("hunter2")
            .then_text("Pat Player")
            .then_text("https://example.com/events/42")
            .then_select(&["Setter", "Outside"]);

        merge_and_save(&store, &mut prompter).unwrap();
        let first = fs::read_to_string(store.path()).unwrap();

        merge_and_save(&store, &mut ScriptedPrompter::new()).unwrap();
        let second = fs::read_to_string(store.path()).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_invalid_url_is_asked_again() {
        let mut config = complete();
        config.event_url.clear();

        let mut prompter = ScriptedPrompter::new()
            .then_text("not a url")
            .then_text("https://example.com/events/43");
        config.prompt_missing(&mut prompter).unwrap();

        assert_eq!(config.event_url, "https://example.com/events/43");
        assert_eq!(prompter.asked().len(), 2);
    }

    #[test]
    fn test_unusable_answers_give_up() {
        let mut config = complete();
        config.email.clear();

        let mut prompter = ScriptedPrompter::new().then_text("").then_text(" ").then_text("");
        let err = config.prompt_missing(&mut prompter).unwrap_err();
        assert!(matches!(err, Error::ConfigIncomplete { field: "EMAIL" }));
    }

    #[test]
    fn test_reset_credentials_asks_all_three() {
        let (_dir, store) = store();
        complete().save(&store).unwrap();

        let mut prompter = ScriptedPrompter::new()
            .then_text("new@example.com")
            .then_secret("s3cret")
            .then_text("New Name");
        let config = reset_credentials(&store, &mut prompter).unwrap();

        assert_eq!(config.email, "new@example.com");
        assert_eq!(config.password.expose(), "s3cret");
        assert_eq!(config.event_url, complete().event_url);
        assert_eq!(prompter.asked().len(), 3);
    }

    #[test]
    fn test_set_event_and_clear() {
        let (_dir, store) = store();
        complete().save(&store).unwrap();

        let mut prompter = ScriptedPrompter::new()
            .then_text("https://example.com/events/99")
            .then_select(&["Middle"]);
        let config = set_event(&store, &mut prompter).unwrap();
        assert_eq!(config.positions, vec![Position::Middle]);

        clear_event_url(&store).unwrap();
        let reloaded = RegistrationConfig::load(&store).unwrap();
        assert!(reloaded.event_url.is_empty());
        assert_eq!(reloaded.email, complete().email);
    }

    #[test]
    fn test_parse_event_url() {
        assert!(parse_event_url("https://example.com/e").is_ok());
        assert!(parse_event_url("mailto:a@b.c").is_err());
        assert!(parse_event_url("").is_err());
    }
}
