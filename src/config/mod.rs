//! Persisted configuration and interactive input.
//!
//! | Item | Description |
//! |------|-------------|
//! | [`ConfigStore`] | `.env` file with upsert-by-key writes |
//! | [`RegistrationConfig`] | Account, event and position fields |
//! | [`Settings`] | Browser, trigger and timeout settings |
//! | [`Prompter`] | Interactive fallback for missing fields |

pub mod position;
pub mod prompt;
pub mod registration;
pub mod settings;
pub mod store;

pub use position::Position;
pub use prompt::{Prompter, TerminalPrompter};
pub use registration::{
    Field, RegistrationConfig, Secret, clear_event_url, merge_and_save, parse_event_url,
    reset_credentials, set_event,
};
pub use settings::Settings;
pub use store::{ConfigStore, data_dir};
