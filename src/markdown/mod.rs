// Markdown codec for board documents
//
// Pure text <-> BoardState mapping. Parsing never fails: lines outside the
// task-list grammar are dropped.

pub mod frontmatter;
pub mod inline;

use chrono::NaiveDate;
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

use crate::models::{BoardState, Column, Subtask, SubtaskStatus, Task, TaskStatus};
use inline::{SUBTASK_TAGS, TASK_TAGS};

pub use frontmatter::{BOARD_TYPE, BoardFrontmatter, is_board_document, parse_frontmatter, to_markdown};

static TASK_LINE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^- \[(.)\] (.+)$").expect("task line"));
static SUBTASK_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^- \[([ /x])\] (.+)$").expect("subtask line"));
static HEADING_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^#{1,6}(?:\s|$)").expect("heading"));

const INDENT: &str = "  ";

// ============================================
// LINE PARSING
// ============================================

/// Parse a top-level task line (already trimmed). Unknown markers and
/// titles that are empty once tags are removed yield `None`.
pub fn parse_task_line(line: &str, column: Column) -> Option<Task> {
    let caps = TASK_LINE_RE.captures(line)?;
    let marker = caps[1].chars().next()?;
    let status = TaskStatus::from_marker(marker)?;

    let (fields, text) = inline::extract(&caps[2], &TASK_TAGS);
    if text.is_empty() {
        return None;
    }

    let mut task = Task::new(text, column);
    task.status = status;
    task.priority = fields.priority;
    task.due_date = fields.due_date;
    task.effort = fields.effort;
    task.notes = fields.notes;
    task.progress = fields.progress;
    task.delegated_to = fields.delegated_to;
    task.tags = fields.tags;
    Some(task)
}

/// Parse a subtask line (indentation already stripped)
pub fn parse_subtask_line(line: &str) -> Option<Subtask> {
    let caps = SUBTASK_LINE_RE.captures(line)?;
    let status = SubtaskStatus::from_marker(caps[1].chars().next()?)?;

    let (fields, text) = inline::extract(&caps[2], &SUBTASK_TAGS);
    if text.is_empty() {
        return None;
    }

    let mut sub = Subtask::new(text);
    sub.status = status;
    sub.priority = fields.priority;
    sub.effort = fields.effort;
    sub.delegated_to = fields.delegated_to;
    Some(sub)
}

/// True for text an indented line would read back as a subtask
pub fn is_subtask_line(line: &str) -> bool {
    SUBTASK_LINE_RE.is_match(line.trim())
}

/// Attach an indented line to the task it follows
fn absorb_indented(task: &mut Task, content: &str) {
    if SUBTASK_LINE_RE.is_match(content) {
        if let Some(sub) = parse_subtask_line(content) {
            task.subtasks.push(sub);
        }
        return;
    }

    if task.description.is_empty() {
        task.description = content.to_string();
    } else {
        task.description.push('\n');
        task.description.push_str(content);
    }
}

// ============================================
// DOCUMENT PARSING
// ============================================

/// Decode a whole board document
pub fn parse_board(content: &str) -> BoardState {
    let mut board = BoardState::new();
    let mut column: Option<Column> = None;
    // Column and index of the task that indented lines attach to
    let mut open: Option<(Column, usize)> = None;

    for line in content.lines() {
        let trimmed = line.trim();

        if line.starts_with(INDENT) {
            if let Some((col, idx)) = open {
                if let Some(task) = board.column_mut(col).get_mut(idx) {
                    absorb_indented(task, trimmed);
                }
            }
            continue;
        }

        open = None;

        if let Some(col) = Column::from_heading(trimmed) {
            column = Some(col);
            continue;
        }
        if HEADING_RE.is_match(trimmed) {
            column = None;
            continue;
        }

        let Some(col) = column else { continue };
        if let Some(task) = parse_task_line(trimmed, col) {
            let tasks = board.column_mut(col);
            tasks.push(task);
            open = Some((col, tasks.len() - 1));
        }
    }

    debug!(
        "[parse_board] today={} next={} someday={}",
        board.today.len(),
        board.next.len(),
        board.someday.len()
    );
    board
}

// ============================================
// SERIALIZATION
// ============================================

pub fn serialize_subtask(sub: &Subtask) -> String {
    format!(
        "{INDENT}- [{}] {}{}",
        sub.status.marker(),
        sub.text,
        inline::render_subtask_tags(sub)
    )
}

pub fn serialize_task(task: &Task) -> String {
    format!(
        "- [{}] {}{}",
        task.status.marker(),
        task.text,
        inline::render_task_tags(task)
    )
}

/// Task line, then description lines, then subtask lines
pub fn serialize_task_block(task: &Task) -> Vec<String> {
    let mut lines = vec![serialize_task(task)];
    if !task.description.is_empty() {
        lines.extend(task.description.split('\n').map(|dl| format!("{INDENT}{dl}")));
    }
    lines.extend(task.subtasks.iter().map(serialize_subtask));
    lines
}

/// Encode the board; `date` is stamped into the frontmatter
pub fn serialize_board(board: &BoardState, date: NaiveDate) -> String {
    let mut lines = vec![
        "---".to_string(),
        format!("type: {BOARD_TYPE}"),
        format!("date: {}", date.format("%Y-%m-%d")),
        "---".to_string(),
        String::new(),
    ];

    for col in Column::ALL {
        lines.push(col.heading().to_string());
        for task in board.column(col) {
            lines.extend(serialize_task_block(task));
        }
        lines.push(String::new());
    }

    lines.join("\n")
}

/// Template for a brand-new, empty board file
pub fn new_board_document(date: NaiveDate) -> String {
    serialize_board(&BoardState::new(), date)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Priority;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    #[test]
    fn parses_reference_line() {
        let task = parse_task_line(
            "- [/] Write report {p1} @due(2024-06-01) ~2h (45%) #work",
            Column::Today,
        )
        .unwrap();
        assert_eq!(task.status, TaskStatus::InProgress);
        assert_eq!(task.priority, Some(Priority::P1));
        assert_eq!(task.due_date, Some(date()));
        assert_eq!(task.effort.as_ref().unwrap().as_str(), "2h");
        assert_eq!(task.progress, 45);
        assert_eq!(task.tags, vec!["work"]);
        assert_eq!(task.text, "Write report");
    }

    #[test]
    fn unknown_marker_is_not_a_task() {
        assert!(parse_task_line("- [?] Mystery", Column::Today).is_none());
        assert!(parse_task_line("- [] Missing", Column::Today).is_none());
        assert!(parse_task_line("* [ ] Star bullet", Column::Today).is_none());
    }

    #[test]
    fn tag_only_title_is_dropped() {
        assert!(parse_task_line("- [ ] #work {p1}", Column::Today).is_none());
        assert!(parse_subtask_line("- [ ] ~15m").is_none());
    }

    #[test]
    fn subtasks_reject_delegated_marker() {
        assert!(parse_subtask_line("- [>] Hand off").is_none());
        let sub = parse_subtask_line("- [x] Outline {p0} ~30m (delegated to @kim)").unwrap();
        assert_eq!(sub.status, SubtaskStatus::Completed);
        assert_eq!(sub.priority, Some(Priority::P0));
        assert_eq!(sub.delegated_to, "@kim");
        assert_eq!(sub.text, "Outline");
    }

    #[test]
    fn indented_lines_become_description_and_subtasks() {
        let doc = "## Today\n- [ ] Plan trip\n  Book flights early\n  - [x] Pick dates\n  Compare hotels\n  - [/] Budget ~1h\n";
        let board = parse_board(doc);
        let task = &board.today[0];
        assert_eq!(task.description, "Book flights early\nCompare hotels");
        assert_eq!(task.subtasks.len(), 2);
        assert_eq!(task.subtasks[0].text, "Pick dates");
        assert_eq!(task.subtasks[1].status, SubtaskStatus::InProgress);
    }

    #[test]
    fn indented_delegated_marker_is_kept_as_description() {
        let board = parse_board("## Next\n- [ ] Parent\n  - [>] not a subtask\n");
        assert_eq!(board.next[0].description, "- [>] not a subtask");
        assert!(board.next[0].subtasks.is_empty());
    }

    #[test]
    fn indented_lines_without_open_task_are_ignored() {
        let board = parse_board("## Today\n  - [ ] orphan\n  stray text\n- [ ] Real\n");
        assert_eq!(board.today.len(), 1);
        assert_eq!(board.today[0].text, "Real");
        assert!(board.today[0].description.is_empty());
    }

    #[test]
    fn unindented_line_closes_the_open_task() {
        let board = parse_board("## Today\n- [ ] First\n\n  orphan detail\n- [?] broken\n  also orphan\n");
        assert_eq!(board.today.len(), 1);
        assert!(board.today[0].description.is_empty());
    }

    #[test]
    fn other_headings_stop_column_tracking() {
        let doc = "## Today\n- [ ] Kept\n### Archive\n- [ ] Ignored\n## Someday\n- [ ] Later\n";
        let board = parse_board(doc);
        assert_eq!(board.today.len(), 1);
        assert_eq!(board.someday.len(), 1);
        assert_eq!(board.len(), 2);
    }

    #[test]
    fn lines_before_any_heading_are_ignored() {
        let board = parse_board("---\ntype: analog-board\n---\n- [ ] Too early\n## Today\n");
        assert!(board.is_empty());
    }

    #[test]
    fn parse_survives_garbage() {
        let inputs = ["", "\n\n", "## Today\n- [", "## Today\n- [x]", "\u{0}\u{feff}## Next\r\n- [ ] é\r\n"];
        for input in inputs {
            let board = parse_board(input);
            assert!(board.is_consistent());
        }
        let board = parse_board("## Next\r\n- [ ] crlf task\r\n  crlf detail\r\n");
        assert_eq!(board.next[0].text, "crlf task");
        assert_eq!(board.next[0].description, "crlf detail");
    }

    #[test]
    fn serializes_document_shape() {
        let mut board = BoardState::new();
        let mut task = Task::new("Ship it", Column::Next);
        task.status = TaskStatus::Delegated;
        task.delegated_to = "@lee".to_string();
        task.tags = vec!["ops".to_string()];
        task.notes = "line one\nline two".to_string();
        task.description = "why\nhow".to_string();
        task.subtasks.push(Subtask::new("check"));
        board.next.push(task);

        let text = serialize_board(&board, date());
        let expected = "---\ntype: analog-board\ndate: 2024-06-01\n---\n\n## Today\n\n## Next\n\
- [>] Ship it (delegated to @lee) #ops {notes: line one line two}\n  why\n  how\n  - [ ] check\n\n## Someday\n";
        assert_eq!(text, expected);
    }

    #[test]
    fn empty_board_template_lists_all_sections() {
        let doc = new_board_document(date());
        assert!(is_board_document(&doc));
        assert!(doc.contains("## Today\n\n## Next\n\n## Someday\n"));
        assert!(parse_board(&doc).is_empty());
    }
}
