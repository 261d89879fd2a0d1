// Common types for the analog board
// Status markers, columns and priorities shared by the codec, store and commands

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::AnalogError;

/// Task status - a 4-state cycle, encoded as the checkbox marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    NotStarted,
    InProgress,
    Completed,
    Delegated,
}

impl TaskStatus {
    pub const CYCLE: [TaskStatus; 4] = [
        Self::NotStarted,
        Self::InProgress,
        Self::Completed,
        Self::Delegated,
    ];

    /// The character inside the checkbox `[ ]`
    pub fn marker(self) -> char {
        match self {
            Self::NotStarted => ' ',
            Self::InProgress => '/',
            Self::Completed => 'x',
            Self::Delegated => '>',
        }
    }

    pub fn from_marker(c: char) -> Option<Self> {
        Self::CYCLE.into_iter().find(|s| s.marker() == c)
    }

    /// Next status in the cycle, wrapping from Delegated back to NotStarted
    pub fn next(self) -> Self {
        let idx = Self::CYCLE.iter().position(|s| *s == self).unwrap_or(0);
        Self::CYCLE[(idx + 1) % Self::CYCLE.len()]
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::NotStarted => "not started",
            Self::InProgress => "in progress",
            Self::Completed => "completed",
            Self::Delegated => "delegated",
        }
    }
}

/// Subtask status - same markers minus delegation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SubtaskStatus {
    #[default]
    NotStarted,
    InProgress,
    Completed,
}

impl SubtaskStatus {
    pub const CYCLE: [SubtaskStatus; 3] = [Self::NotStarted, Self::InProgress, Self::Completed];

    pub fn marker(self) -> char {
        match self {
            Self::NotStarted => ' ',
            Self::InProgress => '/',
            Self::Completed => 'x',
        }
    }

    pub fn from_marker(c: char) -> Option<Self> {
        Self::CYCLE.into_iter().find(|s| s.marker() == c)
    }

    pub fn next(self) -> Self {
        let idx = Self::CYCLE.iter().position(|s| *s == self).unwrap_or(0);
        Self::CYCLE[(idx + 1) % Self::CYCLE.len()]
    }
}

/// Board column - the task's triage bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Column {
    #[default]
    Today,
    Next,
    Someday,
}

impl Column {
    /// Fixed scan and serialization order
    pub const ALL: [Column; 3] = [Self::Today, Self::Next, Self::Someday];

    pub fn label(self) -> &'static str {
        match self {
            Self::Today => "Today",
            Self::Next => "Next",
            Self::Someday => "Someday",
        }
    }

    /// Section heading line in the board document
    pub fn heading(self) -> &'static str {
        match self {
            Self::Today => "## Today",
            Self::Next => "## Next",
            Self::Someday => "## Someday",
        }
    }

    pub fn from_heading(line: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.heading() == line)
    }

    pub fn key(self) -> &'static str {
        match self {
            Self::Today => "today",
            Self::Next => "next",
            Self::Someday => "someday",
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Column {
    type Err = AnalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "today" => Ok(Self::Today),
            "next" => Ok(Self::Next),
            "someday" => Ok(Self::Someday),
            other => Err(AnalogError::invalid_input(format!("unknown column '{other}'"))),
        }
    }
}

/// Priority 0 (Critical) through 3 (Low)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Priority {
    P0,
    P1,
    P2,
    P3,
}

impl Priority {
    pub const ALL: [Priority; 4] = [Self::P0, Self::P1, Self::P2, Self::P3];

    pub fn level(self) -> u8 {
        match self {
            Self::P0 => 0,
            Self::P1 => 1,
            Self::P2 => 2,
            Self::P3 => 3,
        }
    }

    pub fn from_level(level: u8) -> Option<Self> {
        Self::ALL.get(usize::from(level)).copied()
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::P0 => "P0",
            Self::P1 => "P1",
            Self::P2 => "P2",
            Self::P3 => "P3",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::P0 => "Critical",
            Self::P1 => "High",
            Self::P2 => "Medium",
            Self::P3 => "Low",
        }
    }
}

impl From<Priority> for u8 {
    fn from(p: Priority) -> Self {
        p.level()
    }
}

impl TryFrom<u8> for Priority {
    type Error = AnalogError;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        Self::from_level(level)
            .ok_or_else(|| AnalogError::invalid_input(format!("priority must be 0-3, got {level}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_status_cycles_through_four_states() {
        let mut status = TaskStatus::NotStarted;
        let mut seen = Vec::new();
        for _ in 0..4 {
            status = status.next();
            seen.push(status);
        }
        assert_eq!(
            seen,
            vec![
                TaskStatus::InProgress,
                TaskStatus::Completed,
                TaskStatus::Delegated,
                TaskStatus::NotStarted,
            ]
        );
    }

    #[test]
    fn subtask_status_skips_delegation() {
        assert_eq!(SubtaskStatus::Completed.next(), SubtaskStatus::NotStarted);
        assert_eq!(SubtaskStatus::from_marker('>'), None);
    }

    #[test]
    fn markers_map_both_ways() {
        for status in TaskStatus::CYCLE {
            assert_eq!(TaskStatus::from_marker(status.marker()), Some(status));
        }
        assert_eq!(TaskStatus::from_marker('?'), None);
    }

    #[test]
    fn column_parses_case_insensitively() {
        assert_eq!("Someday".parse::<Column>().unwrap(), Column::Someday);
        assert!("later".parse::<Column>().is_err());
        assert_eq!(Column::from_heading("## Next"), Some(Column::Next));
        assert_eq!(Column::from_heading("## next"), None);
    }
}
