// Configuration model for the analog board
// Stored as YAML frontmatter in the global config.md

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const DEFAULT_BOARD_PATH: &str = "Analog/board.md";
pub const PROGRESS_INCREMENTS: [u8; 5] = [10, 20, 25, 33, 50];

/// All settings (stored in config.md)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalogSettings {
    /// Board file, relative to the vault directory
    pub file_path: String,
    pub daily_reset: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_reset_date: Option<NaiveDate>,
    pub progress_increment: u8,
    pub show_completed: bool,
    pub custom_tags: Vec<String>,
}

impl Default for AnalogSettings {
    fn default() -> Self {
        Self {
            file_path: DEFAULT_BOARD_PATH.to_string(),
            daily_reset: false,
            last_reset_date: None,
            progress_increment: 25,
            show_completed: true,
            custom_tags: Vec::new(),
        }
    }
}

impl AnalogSettings {
    /// Add a tag to the vocabulary; returns false if it was already present
    pub fn add_custom_tag(&mut self, tag: String) -> bool {
        if tag.is_empty() || self.custom_tags.contains(&tag) {
            return false;
        }
        self.custom_tags.push(tag);
        true
    }

    pub fn remove_custom_tag(&mut self, tag: &str) -> bool {
        let before = self.custom_tags.len();
        self.custom_tags.retain(|t| t != tag);
        self.custom_tags.len() != before
    }
}
