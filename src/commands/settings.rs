// Settings commands - validated edits to AnalogSettings

use std::collections::BTreeSet;
use tracing::debug;

use crate::error::{AnalogError, Result};
use crate::format::normalize_tag;
use crate::models::{AnalogSettings, BoardState, DEFAULT_BOARD_PATH, PROGRESS_INCREMENTS};

/// Keys accepted by `set_value`, in config file spelling
pub const SETTING_KEYS: [&str; 4] = ["filePath", "dailyReset", "progressIncrement", "showCompleted"];

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "on" | "yes" | "1" => Ok(true),
        "false" | "off" | "no" | "0" => Ok(false),
        other => Err(AnalogError::invalid_input(format!("{key} expects true or false, got '{other}'"))),
    }
}

/// Set one setting from its textual form
pub fn set_value(settings: &mut AnalogSettings, key: &str, value: &str) -> Result<()> {
    debug!("[set_value] {} = {}", key, value);
    match key {
        "filePath" | "file-path" => {
            let value = value.trim();
            settings.file_path = if value.is_empty() {
                DEFAULT_BOARD_PATH.to_string()
            } else {
                value.to_string()
            };
        }
        "dailyReset" | "daily-reset" => settings.daily_reset = parse_bool(key, value)?,
        "showCompleted" | "show-completed" => settings.show_completed = parse_bool(key, value)?,
        "progressIncrement" | "progress-increment" => {
            let increment = value
                .trim()
                .trim_end_matches('%')
                .parse::<u8>()
                .ok()
                .filter(|v| PROGRESS_INCREMENTS.contains(v))
                .ok_or_else(|| {
                    AnalogError::invalid_input(format!(
                        "progressIncrement must be one of {PROGRESS_INCREMENTS:?}, got '{value}'"
                    ))
                })?;
            settings.progress_increment = increment;
        }
        other => {
            return Err(AnalogError::invalid_input(format!(
                "unknown setting '{other}', expected one of {}",
                SETTING_KEYS.join(", ")
            )));
        }
    }
    Ok(())
}

/// Add to the custom vocabulary; returns the normalized tag, or `None` if
/// it was already known
pub fn add_tag(settings: &mut AnalogSettings, raw: &str) -> Result<Option<String>> {
    let tag = normalize_tag(raw);
    if tag.is_empty() {
        return Err(AnalogError::invalid_input(format!("'{raw}' is not a usable tag")));
    }
    Ok(settings.add_custom_tag(tag.clone()).then_some(tag))
}

pub fn remove_tag(settings: &mut AnalogSettings, raw: &str) -> Result<String> {
    let tag = normalize_tag(raw);
    if settings.remove_custom_tag(&tag) {
        Ok(tag)
    } else {
        Err(AnalogError::not_found(format!("tag '{tag}' is not in the vocabulary")))
    }
}

/// Sorted union of the custom vocabulary and every tag in use
pub fn all_tags(settings: &AnalogSettings, board: &BoardState) -> Vec<String> {
    let mut tags: BTreeSet<String> = settings.custom_tags.iter().cloned().collect();
    for task in board.iter() {
        tags.extend(task.tags.iter().cloned());
    }
    tags.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Column, Task};

    #[test]
    fn set_value_validates_each_key() {
        let mut settings = AnalogSettings::default();
        set_value(&mut settings, "dailyReset", "on").unwrap();
        set_value(&mut settings, "show-completed", "false").unwrap();
        set_value(&mut settings, "progressIncrement", "33%").unwrap();
        set_value(&mut settings, "filePath", " ").unwrap();
        assert!(settings.daily_reset);
        assert!(!settings.show_completed);
        assert_eq!(settings.progress_increment, 33);
        assert_eq!(settings.file_path, DEFAULT_BOARD_PATH);

        assert!(set_value(&mut settings, "progressIncrement", "30").is_err());
        assert!(set_value(&mut settings, "dailyReset", "maybe").is_err());
        assert_eq!(set_value(&mut settings, "theme", "dark").unwrap_err().code(), "invalid_input");
    }

    #[test]
    fn custom_tags_are_normalized_and_unique() {
        let mut settings = AnalogSettings::default();
        assert_eq!(add_tag(&mut settings, "Deep Work").unwrap().as_deref(), Some("deep-work"));
        assert_eq!(add_tag(&mut settings, "#deep-work").unwrap(), None);
        assert!(add_tag(&mut settings, "  ").is_err());

        assert_eq!(remove_tag(&mut settings, "Deep Work").unwrap(), "deep-work");
        assert!(remove_tag(&mut settings, "deep-work").is_err());
    }

    #[test]
    fn all_tags_merges_vocabulary_and_board() {
        let mut settings = AnalogSettings::default();
        settings.custom_tags = vec!["zeta".to_string(), "alpha".to_string()];
        let mut board = BoardState::new();
        let mut task = Task::new("t", Column::Someday);
        task.tags = vec!["mid".to_string(), "alpha".to_string()];
        board.someday.push(task);

        assert_eq!(all_tags(&settings, &board), vec!["alpha", "mid", "zeta"]);
    }
}
