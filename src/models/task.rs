// Task model for the markdown board
// UUID for in-memory identity; ids are not written to the board file

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

use super::common::{Column, Priority, SubtaskStatus, TaskStatus};

static EFFORT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+(?:\.\d+)?(?:h\d+m|h|m)$").expect("effort grammar"));

/// Generate new UUID
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Estimated duration: `45m`, `2h`, `1.5h` or `1h30m`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Effort(String);

impl Effort {
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        EFFORT_RE.is_match(raw).then(|| Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Effort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Effort {
    type Error = String;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::parse(&raw).ok_or_else(|| format!("invalid effort '{raw}'"))
    }
}

impl From<Effort> for String {
    fn from(e: Effort) -> Self {
        e.0
    }
}

/// Lightweight nested unit of work
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subtask {
    pub id: String,
    pub text: String,
    pub status: SubtaskStatus,
    pub priority: Option<Priority>,
    pub effort: Option<Effort>,
    #[serde(default)]
    pub delegated_to: String,
}

impl Subtask {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            text: text.into(),
            status: SubtaskStatus::NotStarted,
            priority: None,
            effort: None,
            delegated_to: String::new(),
        }
    }

    pub fn eq_ignoring_id(&self, other: &Subtask) -> bool {
        self.text == other.text
            && self.status == other.status
            && self.priority == other.priority
            && self.effort == other.effort
            && self.delegated_to == other.delegated_to
    }
}

/// A unit of work on the board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub description: String,
    pub status: TaskStatus,
    pub column: Column,
    /// 0-100, only meaningful while in progress
    #[serde(default)]
    pub progress: u8,
    pub priority: Option<Priority>,
    pub due_date: Option<NaiveDate>,
    pub effort: Option<Effort>,
    #[serde(default)]
    pub subtasks: Vec<Subtask>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub delegated_to: String,
    #[serde(default)]
    pub notes: String,
}

impl Task {
    pub fn new(text: impl Into<String>, column: Column) -> Self {
        Self {
            id: new_id(),
            text: text.into(),
            description: String::new(),
            status: TaskStatus::NotStarted,
            column,
            progress: 0,
            priority: None,
            due_date: None,
            effort: None,
            subtasks: Vec::new(),
            tags: Vec::new(),
            delegated_to: String::new(),
            notes: String::new(),
        }
    }

    /// Field-for-field equality, ignoring generated ids (parse assigns fresh ones)
    pub fn eq_ignoring_id(&self, other: &Task) -> bool {
        self.text == other.text
            && self.description == other.description
            && self.status == other.status
            && self.column == other.column
            && self.progress == other.progress
            && self.priority == other.priority
            && self.due_date == other.due_date
            && self.effort == other.effort
            && self.tags == other.tags
            && self.delegated_to == other.delegated_to
            && self.notes == other.notes
            && self.subtasks.len() == other.subtasks.len()
            && self
                .subtasks
                .iter()
                .zip(&other.subtasks)
                .all(|(a, b)| a.eq_ignoring_id(b))
    }

    pub fn completed_subtasks(&self) -> usize {
        self.subtasks
            .iter()
            .filter(|s| s.status == SubtaskStatus::Completed)
            .count()
    }
}

/// Partial update merged into a task; only the provided fields are overwritten.
/// Column changes go through `BoardStore::move_task`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskPatch {
    pub text: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub progress: Option<u8>,
    pub priority: Option<Option<Priority>>,
    pub due_date: Option<Option<NaiveDate>>,
    pub effort: Option<Option<Effort>>,
    pub subtasks: Option<Vec<Subtask>>,
    pub tags: Option<Vec<String>>,
    pub delegated_to: Option<String>,
    pub notes: Option<String>,
}

impl TaskPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn progress(mut self, progress: u8) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn priority(mut self, priority: Option<Priority>) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn due_date(mut self, due_date: Option<NaiveDate>) -> Self {
        self.due_date = Some(due_date);
        self
    }

    pub fn effort(mut self, effort: Option<Effort>) -> Self {
        self.effort = Some(effort);
        self
    }

    pub fn subtasks(mut self, subtasks: Vec<Subtask>) -> Self {
        self.subtasks = Some(subtasks);
        self
    }

    pub fn tags(mut self, tags: Vec<String>) -> Self {
        self.tags = Some(tags);
        self
    }

    pub fn delegated_to(mut self, delegated_to: impl Into<String>) -> Self {
        self.delegated_to = Some(delegated_to.into());
        self
    }

    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Shallow-merge into `task`
    pub fn apply(self, task: &mut Task) {
        if let Some(text) = self.text {
            task.text = text;
        }
        if let Some(description) = self.description {
            task.description = description;
        }
        if let Some(status) = self.status {
            task.status = status;
        }
        if let Some(progress) = self.progress {
            task.progress = progress.min(100);
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(due_date) = self.due_date {
            task.due_date = due_date;
        }
        if let Some(effort) = self.effort {
            task.effort = effort;
        }
        if let Some(subtasks) = self.subtasks {
            task.subtasks = subtasks;
        }
        if let Some(tags) = self.tags {
            let mut unique: Vec<String> = Vec::with_capacity(tags.len());
            for tag in tags {
                if !unique.contains(&tag) {
                    unique.push(tag);
                }
            }
            task.tags = unique;
        }
        if let Some(delegated_to) = self.delegated_to {
            task.delegated_to = delegated_to;
        }
        if let Some(notes) = self.notes {
            task.notes = notes;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factory_assigns_unique_ids_and_defaults() {
        let a = Task::new("Write report", Column::Today);
        let b = Task::new("Write report", Column::Today);
        assert_ne!(a.id, b.id);
        assert_eq!(a.status, TaskStatus::NotStarted);
        assert_eq!(a.progress, 0);
        assert!(a.priority.is_none());
        assert!(a.tags.is_empty());
        assert!(a.eq_ignoring_id(&b));
    }

    #[test]
    fn effort_accepts_only_the_duration_grammar() {
        for ok in ["15m", "2h", "1.5h", "1h30m"] {
            assert_eq!(Effort::parse(ok).unwrap().as_str(), ok);
        }
        for bad in ["", "h", "2d", "1h30", "~2h", "two hours"] {
            assert!(Effort::parse(bad).is_none(), "{bad} should be rejected");
        }
    }

    #[test]
    fn patch_only_touches_provided_fields() {
        let mut task = Task::new("Old", Column::Next);
        task.notes = "keep me".to_string();

        TaskPatch::new()
            .text("New")
            .priority(Some(Priority::P2))
            .progress(140)
            .apply(&mut task);

        assert_eq!(task.text, "New");
        assert_eq!(task.priority, Some(Priority::P2));
        assert_eq!(task.progress, 100);
        assert_eq!(task.notes, "keep me");
        assert_eq!(task.column, Column::Next);
    }

    #[test]
    fn patch_collapses_duplicate_tags() {
        let mut task = Task::new("Tagged", Column::Today);
        TaskPatch::new()
            .tags(vec!["work".into(), "home".into(), "work".into()])
            .apply(&mut task);
        assert_eq!(task.tags, vec!["work", "home"]);
    }

    #[test]
    fn empty_patch_is_detected() {
        assert!(TaskPatch::new().is_empty());
        assert!(!TaskPatch::new().notes("").is_empty());
    }
}
