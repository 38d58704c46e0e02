//! Interactive input.

use std::io::{self, BufRead, Write};

use crate::error::{Error, Result};

// ============================================================================
// Prompter
// ============================================================================

/// Source of interactive answers.
pub trait Prompter: Send {
    /// Free-text answer.
    fn text(&mut self, message: &str) -> Result<String>;

    /// Masked answer.
    fn secret(&mut self, message: &str) -> Result<String>;

    /// Any subset of `choices`, returned as the chosen entries.
    fn multi_select(&mut self, message: &str, choices: &[&str]) -> Result<Vec<String>>;
}

// ============================================================================
// TerminalPrompter
// ============================================================================

/// Prompts on stdout and reads answers from stdin.
#[derive(Debug, Default)]
pub struct TerminalPrompter;

impl TerminalPrompter {
    fn read_line(message: &str) -> Result<String> {
        let mut stdout = io::stdout();
        write!(stdout, "? {message}: ")?;
        stdout.flush()?;

        let mut answer = String::new();
        let read = io::stdin().lock().read_line(&mut answer)?;
        if read == 0 {
            return Err(Error::prompt("stdin closed"));
        }
        Ok(answer.trim().to_string())
    }
}

impl Prompter for TerminalPrompter {
    fn text(&mut self, message: &str) -> Result<String> {
        Self::read_line(message)
    }

    fn secret(&mut self, message: &str) -> Result<String> {
        rpassword::prompt_password(format!("? {message}: "))
            .map_err(|e| Error::prompt(format!("masked input unavailable: {e}")))
    }

    fn multi_select(&mut self, message: &str, choices: &[&str]) -> Result<Vec<String>> {
        println!("? {message}");
        for (index, choice) in choices.iter().enumerate() {
            println!("  {}) {choice}", index + 1);
        }
        let answer = Self::read_line("Numbers or names, comma-separated")?;
        Ok(select_choices(&answer, choices))
    }
}

/// Resolves `1,3` or `setter, middle` against `choices`. Unknown tokens
/// are dropped.
fn select_choices(answer: &str, choices: &[&str]) -> Vec<String> {
    let mut selected: Vec<String> = Vec::new();

    for token in answer.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        let choice = token
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| choices.get(i))
            .or_else(|| choices.iter().find(|c| c.eq_ignore_ascii_case(token)));

        if let Some(choice) = choice
            && !selected.iter().any(|s| s == choice)
        {
            selected.push((*choice).to_string());
        }
    }
    selected
}

// ============================================================================
// Tests
// ============================================================================
