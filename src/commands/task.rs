// Task commands - edit policies layered over the board store
//
// Builders are pure: they look at the current task and return the patch to
// merge. `apply` resolves the task and hands the patch to the store.

use chrono::NaiveDate;
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

use crate::error::{AnalogError, Result};
use crate::format::normalize_tag;
use crate::markdown::{self, inline};
use crate::markdown::inline::{BEFORE_NOTES, TASK_TAGS};
use crate::models::{Column, Effort, Priority, Task, TaskPatch, TaskStatus};
use crate::store::BoardStore;

use super::common::single_line;

static PERSON_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^@?\w+$").expect("person"));

/// Read user text the way the board file would: inline tags become fields.
/// The title left over must carry no further tag syntax so it reads back
/// unchanged.
fn parse_title(text: &str, column: Column) -> Result<Task> {
    let text = single_line(text.trim(), "task text")?;
    if text.is_empty() {
        return Err(AnalogError::invalid_input("task text is empty"));
    }
    let task = markdown::parse_task_line(&format!("- [ ] {text}"), column)
        .ok_or_else(|| AnalogError::invalid_input("task text has nothing but tags"))?;
    if inline::has_inline_tags(&task.text, &TASK_TAGS) || task.text.contains(inline::NOTES_OPEN) {
        return Err(AnalogError::invalid_input(format!("'{}' repeats an inline tag", task.text)));
    }
    if !task.notes.is_empty() {
        check_notes(&task.notes)?;
    }
    Ok(task)
}

/// Notes sit last on the task line, after tags the parser reads first
fn check_notes(notes: &str) -> Result<()> {
    if inline::has_inline_tags(notes, &BEFORE_NOTES) {
        return Err(AnalogError::invalid_input(format!(
            "notes '{notes}' hold priority, due or effort tags"
        )));
    }
    Ok(())
}

/// Build a task from user input; inline tags in `text` are honoured. A
/// delegation tag makes the task delegated; progress needs an in-progress
/// task and is dropped.
pub fn new_task(text: &str, column: Column) -> Result<Task> {
    let mut task = parse_title(text, column)?;
    task.progress = 0;
    if !task.delegated_to.is_empty() {
        task.status = TaskStatus::Delegated;
    }
    Ok(task)
}

/// Advance the status; entering InProgress restarts progress and leaving
/// Delegated drops the assignee
pub fn cycle_status(task: &Task) -> TaskPatch {
    let next = task.status.next();
    let mut patch = TaskPatch::new().status(next);
    if next == TaskStatus::InProgress {
        patch = patch.progress(0);
    }
    if next != TaskStatus::Delegated {
        patch = patch.delegated_to("");
    }
    patch
}

pub fn bump_progress(task: &Task, increment: u8) -> TaskPatch {
    TaskPatch::new().progress(task.progress.saturating_add(increment).min(100))
}

/// `@name` form of a person; `name` and `@name` are both accepted
pub fn normalize_person(raw: &str) -> Result<String> {
    let person = raw.trim();
    if !PERSON_RE.is_match(person) {
        return Err(AnalogError::invalid_input(format!("'{person}' is not a valid @person")));
    }
    Ok(if person.starts_with('@') {
        person.to_string()
    } else {
        format!("@{person}")
    })
}

pub fn delegate(person: &str) -> Result<TaskPatch> {
    Ok(TaskPatch::new()
        .status(TaskStatus::Delegated)
        .delegated_to(normalize_person(person)?))
}

pub fn undelegate() -> TaskPatch {
    TaskPatch::new().delegated_to("").status(TaskStatus::NotStarted)
}

pub fn set_priority(priority: Option<Priority>) -> TaskPatch {
    TaskPatch::new().priority(priority)
}

pub fn parse_priority(raw: &str) -> Result<Priority> {
    raw.trim_start_matches(['p', 'P'])
        .parse::<u8>()
        .ok()
        .and_then(Priority::from_level)
        .ok_or_else(|| AnalogError::invalid_input(format!("priority must be 0-3, got '{raw}'")))
}

pub fn set_due(due: Option<NaiveDate>) -> TaskPatch {
    TaskPatch::new().due_date(due)
}

pub fn parse_due(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| AnalogError::invalid_input(format!("due date must be YYYY-MM-DD, got '{raw}'")))
}

pub fn set_effort(effort: Option<Effort>) -> TaskPatch {
    TaskPatch::new().effort(effort)
}

pub fn parse_effort(raw: &str) -> Result<Effort> {
    Effort::parse(raw)
        .ok_or_else(|| AnalogError::invalid_input(format!("effort must look like 30m, 2h, 1.5h or 1h30m, got '{raw}'")))
}

/// Add or remove a tag. Returns the patch and the normalized tag.
pub fn toggle_tag(task: &Task, raw: &str) -> Result<(TaskPatch, String)> {
    let tag = normalize_tag(raw);
    if tag.is_empty() {
        return Err(AnalogError::invalid_input(format!("'{raw}' is not a usable tag")));
    }

    let tags = if task.tags.contains(&tag) {
        task.tags.iter().filter(|t| **t != tag).cloned().collect()
    } else {
        let mut tags = task.tags.clone();
        tags.push(tag.clone());
        tags
    };
    Ok((TaskPatch::new().tags(tags), tag))
}

/// Blank or unchanged titles produce an empty patch. Inline tags in the
/// new title are merged into the task's fields; progress only counts while
/// the task is in progress.
pub fn rename(task: &Task, text: &str) -> Result<TaskPatch> {
    let text = text.trim();
    if text.is_empty() || text == task.text {
        return Ok(TaskPatch::new());
    }

    let parsed = parse_title(text, task.column)?;
    let mut patch = TaskPatch::new().text(parsed.text);
    if parsed.priority.is_some() {
        patch = patch.priority(parsed.priority);
    }
    if parsed.due_date.is_some() {
        patch = patch.due_date(parsed.due_date);
    }
    if parsed.effort.is_some() {
        patch = patch.effort(parsed.effort);
    }
    if parsed.progress > 0 && parsed.delegated_to.is_empty() && task.status == TaskStatus::InProgress {
        patch = patch.progress(parsed.progress);
    }
    if !parsed.delegated_to.is_empty() {
        patch = patch.status(TaskStatus::Delegated).delegated_to(parsed.delegated_to);
    }
    if !parsed.notes.is_empty() {
        patch = patch.notes(parsed.notes);
    }
    let added: Vec<String> = parsed
        .tags
        .into_iter()
        .filter(|tag| !task.tags.contains(tag))
        .collect();
    if !added.is_empty() {
        patch = patch.tags(task.tags.iter().cloned().chain(added).collect());
    }
    Ok(patch)
}

/// Lines are trimmed; a line shaped like a subtask is refused
pub fn describe(text: &str) -> Result<TaskPatch> {
    let lines: Vec<&str> = text.trim().lines().map(str::trim).collect();
    if let Some(line) = lines.iter().find(|line| markdown::is_subtask_line(line)) {
        return Err(AnalogError::invalid_input(format!(
            "description line '{line}' would read back as a subtask"
        )));
    }
    Ok(TaskPatch::new().description(lines.join("\n")))
}

/// Notes are kept on one line; empty text clears them
pub fn edit_notes(text: &str) -> Result<TaskPatch> {
    let flat = text.replace(['\r', '\n'], " ");
    let notes = flat.trim();
    check_notes(notes)?;
    Ok(TaskPatch::new().notes(notes))
}

/// Merge the patch built from the current task; returns the updated task
pub fn apply(store: &BoardStore, id: &str, build: impl FnOnce(&Task) -> Result<TaskPatch>) -> Result<Task> {
    let task = store
        .find_task(id)
        .ok_or_else(|| AnalogError::not_found(format!("task {id} not found")))?;
    let patch = build(&task)?;
    if patch.is_empty() {
        debug!("[task::apply] Nothing to change for {}", id);
        return Ok(task);
    }

    store.update_task(id, patch);
    store
        .find_task(id)
        .ok_or_else(|| AnalogError::not_found(format!("task {id} not found")))
}
