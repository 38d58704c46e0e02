//! Court positions offered by the registration form.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

// ============================================================================
// Position
// ============================================================================

/// A position checkbox on the registration form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Position {
    /// Setter.
    Setter,
    /// Outside hitter.
    Outside,
    /// Middle blocker.
    Middle,
    /// Opposite hitter.
    Opposite,
}

impl Position {
    /// Every position, in form order.
    pub const ALL: [Self; 4] = [Self::Setter, Self::Outside, Self::Middle, Self::Opposite];

    /// Canonical name, also the checkbox value on the form.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Setter => "Setter",
            Self::Outside => "Outside",
            Self::Middle => "Middle",
            Self::Opposite => "Opposite",
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Position {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let name = s.trim();
        Self::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(name))
            .ok_or_else(|| Error::config(format!("Unknown position: {name}")))
    }
}

// ============================================================================
// Lists
// ============================================================================

/// Parses a comma-joined list. Empty entries are skipped and duplicates
/// collapse onto their first occurrence.
pub fn parse_positions(raw: &str) -> Result<Vec<Position>> {
    let mut positions = Vec::new();
    for entry in raw.split(',').filter(|e| !e.trim().is_empty()) {
        let position: Position = entry.parse()?;
        if !positions.contains(&position) {
            positions.push(position);
        }
    }
    Ok(positions)
}

/// Joins positions with commas, the stored form.
#[must_use]
pub fn join_positions(positions: &[Position]) -> String {
    positions
        .iter()
        .map(Position::as_str)
        .collect::<Vec<_>>()
        .join(",")
}

// ============================================================================
// Tests
// ============================================================================
