// Subtask commands - every edit replaces the parent's whole subtask list

use crate::error::{AnalogError, Result};
use crate::markdown::{self, inline};
use crate::models::{Effort, Priority, Subtask, Task, TaskPatch};

use super::common::single_line;
use super::task::normalize_person;

/// Read subtask text as its board line would; priority, effort and
/// delegation tags become fields
fn parse_text(text: &str) -> Result<Subtask> {
    let text = single_line(text.trim(), "subtask text")?;
    if text.is_empty() {
        return Err(AnalogError::invalid_input("subtask text is empty"));
    }
    let sub = markdown::parse_subtask_line(&format!("- [ ] {text}"))
        .ok_or_else(|| AnalogError::invalid_input("subtask text has nothing but tags"))?;
    if inline::has_inline_tags(&sub.text, &inline::SUBTASK_TAGS) {
        return Err(AnalogError::invalid_input(format!("'{}' repeats an inline tag", sub.text)));
    }
    Ok(sub)
}

/// 0-based index of a 1-based subtask position
fn index_of(task: &Task, position: usize) -> Result<usize> {
    position
        .checked_sub(1)
        .filter(|idx| *idx < task.subtasks.len())
        .ok_or_else(|| AnalogError::not_found(format!("'{}' has no subtask {}", task.text, position)))
}

fn edit_at(task: &Task, position: usize, edit: impl FnOnce(&mut Subtask)) -> Result<TaskPatch> {
    let idx = index_of(task, position)?;
    let mut subtasks = task.subtasks.clone();
    edit(&mut subtasks[idx]);
    Ok(TaskPatch::new().subtasks(subtasks))
}

pub fn add(task: &Task, text: &str) -> Result<TaskPatch> {
    let sub = parse_text(text)?;
    let mut subtasks = task.subtasks.clone();
    subtasks.push(sub);
    Ok(TaskPatch::new().subtasks(subtasks))
}

pub fn cycle(task: &Task, position: usize) -> Result<TaskPatch> {
    edit_at(task, position, |sub| sub.status = sub.status.next())
}

/// Blank text leaves the subtask as it was
pub fn rename(task: &Task, position: usize, text: &str) -> Result<TaskPatch> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(TaskPatch::new());
    }
    let parsed = parse_text(text)?;
    edit_at(task, position, |sub| {
        sub.text = parsed.text;
        if parsed.priority.is_some() {
            sub.priority = parsed.priority;
        }
        if parsed.effort.is_some() {
            sub.effort = parsed.effort;
        }
        if !parsed.delegated_to.is_empty() {
            sub.delegated_to = parsed.delegated_to;
        }
    })
}

pub fn remove(task: &Task, position: usize) -> Result<TaskPatch> {
    let idx = index_of(task, position)?;
    let mut subtasks = task.subtasks.clone();
    subtasks.remove(idx);
    Ok(TaskPatch::new().subtasks(subtasks))
}

pub fn set_priority(task: &Task, position: usize, priority: Option<Priority>) -> Result<TaskPatch> {
    edit_at(task, position, |sub| sub.priority = priority)
}

pub fn set_effort(task: &Task, position: usize, effort: Option<Effort>) -> Result<TaskPatch> {
    edit_at(task, position, |sub| sub.effort = effort)
}

/// `None` removes the delegation
pub fn delegate(task: &Task, position: usize, person: Option<&str>) -> Result<TaskPatch> {
    let person = person.map(normalize_person).transpose()?.unwrap_or_default();
    edit_at(task, position, |sub| sub.delegated_to = person)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Column, SubtaskStatus};

    fn parent() -> Task {
        let mut task = Task::new("Trip", Column::Today);
        task.subtasks = vec![Subtask::new("Flights"), Subtask::new("Hotel")];
        task
    }

    #[test]
    fn add_appends_and_rejects_blank() {
        let mut task = parent();
        add(&task, " Visa ").unwrap().apply(&mut task);
        assert_eq!(task.subtasks.len(), 3);
        assert_eq!(task.subtasks[2].text, "Visa");
        assert!(add(&task, "  ").is_err());
    }

    #[test]
    fn cycle_wraps_through_three_states() {
        let mut task = parent();
        for expected in [SubtaskStatus::InProgress, SubtaskStatus::Completed, SubtaskStatus::NotStarted] {
            cycle(&task, 1).unwrap().apply(&mut task);
            assert_eq!(task.subtasks[0].status, expected);
        }
        assert_eq!(task.subtasks[1].status, SubtaskStatus::NotStarted);
    }

    #[test]
    fn rename_and_remove_by_position() {
        let mut task = parent();
        assert!(rename(&task, 1, " ").unwrap().is_empty());
        rename(&task, 2, "Hostel").unwrap().apply(&mut task);
        assert_eq!(task.subtasks[1].text, "Hostel");

        remove(&task, 1).unwrap().apply(&mut task);
        assert_eq!(task.subtasks.len(), 1);
        assert_eq!(task.subtasks[0].text, "Hostel");
        assert_eq!(remove(&task, 5).unwrap_err().code(), "not_found");
        assert!(cycle(&task, 0).is_err());
    }

    #[test]
    fn inline_tags_in_subtask_text_become_fields() {
        let mut task = parent();
        add(&task, "Book {p1} room ~30m").unwrap().apply(&mut task);
        let sub = &task.subtasks[2];
        assert_eq!(sub.text, "Book  room");
        assert_eq!(sub.priority, Some(Priority::P1));
        assert_eq!(sub.effort.as_ref().unwrap().as_str(), "30m");

        rename(&task, 1, "Flights (delegated to @kim)").unwrap().apply(&mut task);
        assert_eq!(task.subtasks[0].text, "Flights");
        assert_eq!(task.subtasks[0].delegated_to, "@kim");
    }

    #[test]
    fn subtask_text_that_would_not_read_back_is_refused() {
        let task = parent();
        assert!(add(&task, "{p2}").is_err());
        assert!(add(&task, "one\ntwo").is_err());
        assert!(add(&task, "{p0} and {p1}").is_err());
        assert!(rename(&task, 1, "~1h").is_err());
    }

    #[test]
    fn badges_on_subtasks() {
        let mut task = parent();
        set_priority(&task, 1, Some(Priority::P0)).unwrap().apply(&mut task);
        set_effort(&task, 1, Effort::parse("15m")).unwrap().apply(&mut task);
        delegate(&task, 1, Some("ana")).unwrap().apply(&mut task);
        let sub = &task.subtasks[0];
        assert_eq!(sub.priority, Some(Priority::P0));
        assert_eq!(sub.effort.as_ref().unwrap().as_str(), "15m");
        assert_eq!(sub.delegated_to, "@ana");

        delegate(&task, 1, None).unwrap().apply(&mut task);
        assert_eq!(task.subtasks[0].delegated_to, "");
    }
}
