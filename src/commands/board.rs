// Board commands - listing views for the front end

use chrono::NaiveDate;
use serde::Serialize;
use std::fmt::Write as _;

use crate::format::{format_due_display, format_effort_display, is_due_today, is_overdue, tag_color};
use crate::models::{AnalogSettings, BoardState, Column, Subtask, SubtaskStatus, Task, TaskStatus};

use super::common::TaskRef;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubtaskInfo {
    pub position: usize,
    pub text: String,
    pub status: SubtaskStatus,
    pub priority: Option<u8>,
    pub effort: Option<String>,
    pub delegated_to: String,
}

impl SubtaskInfo {
    fn new(position: usize, s: &Subtask) -> Self {
        Self {
            position,
            text: s.text.clone(),
            status: s.status,
            priority: s.priority.map(|p| p.level()),
            effort: s.effort.as_ref().map(|e| e.to_string()),
            delegated_to: s.delegated_to.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskInfo {
    pub reference: String,
    pub text: String,
    pub status: TaskStatus,
    pub progress: u8,
    pub priority: Option<u8>,
    pub due_date: Option<NaiveDate>,
    pub due_label: Option<String>,
    pub overdue: bool,
    pub due_today: bool,
    pub effort: Option<String>,
    pub effort_label: Option<String>,
    pub tags: Vec<String>,
    /// Palette colour per tag, same order as `tags`
    pub tag_colors: Vec<&'static str>,
    pub delegated_to: String,
    pub description: String,
    pub notes: String,
    pub subtasks_done: usize,
    pub subtasks: Vec<SubtaskInfo>,
}

impl TaskInfo {
    pub fn new(reference: TaskRef, t: &Task, today: NaiveDate) -> Self {
        Self {
            reference: reference.to_string(),
            text: t.text.clone(),
            status: t.status,
            progress: t.progress,
            priority: t.priority.map(|p| p.level()),
            due_date: t.due_date,
            due_label: t.due_date.map(|d| format_due_display(d, today)),
            overdue: is_overdue(t.due_date, today),
            due_today: is_due_today(t.due_date, today),
            effort: t.effort.as_ref().map(|e| e.to_string()),
            effort_label: t.effort.as_ref().map(|e| format_effort_display(e.as_str())),
            tags: t.tags.clone(),
            tag_colors: t.tags.iter().map(|tag| tag_color(tag)).collect(),
            delegated_to: t.delegated_to.clone(),
            description: t.description.clone(),
            notes: t.notes.clone(),
            subtasks_done: t.completed_subtasks(),
            subtasks: t
                .subtasks
                .iter()
                .enumerate()
                .map(|(i, s)| SubtaskInfo::new(i + 1, s))
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnInfo {
    pub column: Column,
    pub label: &'static str,
    /// All tasks in the column, shown or not
    pub count: usize,
    pub tasks: Vec<TaskInfo>,
}

/// Columns in board order; completed tasks are hidden unless `show_completed`.
/// References keep each task's position in the full column.
pub fn board_view(board: &BoardState, settings: &AnalogSettings, today: NaiveDate) -> Vec<ColumnInfo> {
    Column::ALL
        .into_iter()
        .map(|column| {
            let tasks = board.column(column);
            ColumnInfo {
                column,
                label: column.label(),
                count: tasks.len(),
                tasks: tasks
                    .iter()
                    .enumerate()
                    .filter(|(_, t)| settings.show_completed || t.status != TaskStatus::Completed)
                    .map(|(i, t)| TaskInfo::new(TaskRef { column, position: i + 1 }, t, today))
                    .collect(),
            }
        })
        .collect()
}

fn task_summary(info: &TaskInfo) -> String {
    let mut line = info.text.clone();
    if let Some(p) = info.priority {
        let _ = write!(line, "  P{p}");
    }
    if let Some(label) = &info.due_label {
        let _ = write!(line, "  due {label}");
    }
    if let Some(label) = &info.effort_label {
        let _ = write!(line, "  ~{label}");
    }
    if info.status == TaskStatus::InProgress && info.progress > 0 {
        let _ = write!(line, "  {}%", info.progress);
    }
    if !info.delegated_to.is_empty() {
        let _ = write!(line, "  -> {}", info.delegated_to);
    }
    for tag in &info.tags {
        let _ = write!(line, "  #{tag}");
    }
    if !info.subtasks.is_empty() {
        let _ = write!(line, "  [{}/{}]", info.subtasks_done, info.subtasks.len());
    }
    line
}

/// Plain-text rendering of `board_view`
pub fn render_text(columns: &[ColumnInfo]) -> String {
    let mut out = String::new();
    for col in columns {
        let _ = writeln!(out, "{} ({})", col.label, col.count);
        for task in &col.tasks {
            let _ = writeln!(
                out,
                "  {:<10} [{}] {}",
                task.reference,
                task.status.marker(),
                task_summary(task)
            );
            for line in task.description.lines() {
                let _ = writeln!(out, "             {line}");
            }
            for sub in &task.subtasks {
                let _ = writeln!(out, "             {}. [{}] {}", sub.position, sub.status.marker(), sub.text);
            }
            if !task.notes.is_empty() {
                let _ = writeln!(out, "             notes: {}", task.notes);
            }
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Priority;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    fn board() -> BoardState {
        let mut board = BoardState::new();
        let mut done = Task::new("Done thing", Column::Today);
        done.status = TaskStatus::Completed;
        let mut open = Task::new("Open thing", Column::Today);
        open.priority = Some(Priority::P1);
        open.due_date = Some(day(9));
        board.today = vec![done, open];
        board
    }

    #[test]
    fn hidden_completed_tasks_keep_positions() {
        let mut settings = AnalogSettings::default();
        settings.show_completed = false;
        let view = board_view(&board(), &settings, day(10));

        let today = &view[0];
        assert_eq!(today.count, 2);
        assert_eq!(today.tasks.len(), 1);
        assert_eq!(today.tasks[0].reference, "today:2");
        assert!(today.tasks[0].overdue);
        assert_eq!(today.tasks[0].due_label.as_deref(), Some("Yesterday"));
    }

    #[test]
    fn text_rendering_lists_every_column() {
        let view = board_view(&board(), &AnalogSettings::default(), day(10));
        let text = render_text(&view);
        assert!(text.starts_with("Today (2)\n"));
        assert!(text.contains("today:1    [x] Done thing"));
        assert!(text.contains("Open thing  P1  due Yesterday"));
        assert!(text.contains("Next (0)\n"));
        assert!(text.contains("Someday (0)\n"));
    }
}
