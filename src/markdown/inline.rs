// Inline metadata tags embedded in task-list lines
//
// Each tag kind is an independent (pattern, setter) pair. Extraction walks a
// fixed ordered table, honours the first match of each kind only, and cuts
// the matched span out of the remaining text.

use chrono::NaiveDate;
use regex::{Captures, Regex};
use std::sync::LazyLock;

use crate::models::{Effort, Priority, Subtask, Task, TaskStatus};

static PRIORITY_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{p([0-3])\}").expect("priority tag"));
static DUE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@due\((\d{4}-\d{2}-\d{2})\)").expect("due tag"));
// `h\d+m` must come before `h` so `~1h30m` is captured whole
static EFFORT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"~(\d+(?:\.\d+)?(?:h\d+m|h|m))").expect("effort tag"));
static NOTES_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{notes: (.+)\}$").expect("notes tag"));
static PROGRESS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\((\d+)%\)").expect("progress tag"));
static DELEGATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(delegated to (@\w+)\)").expect("delegation tag"));
static HASHTAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"#([A-Za-z0-9_-]+)").expect("hashtag"));

/// Values pulled out of a line by the tag table
#[derive(Debug, Default, Clone, PartialEq)]
pub struct InlineFields {
    pub priority: Option<Priority>,
    pub due_date: Option<NaiveDate>,
    pub effort: Option<Effort>,
    pub notes: String,
    pub progress: u8,
    pub delegated_to: String,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKind {
    Priority,
    DueDate,
    Effort,
    Notes,
    Progress,
    Delegation,
    Hashtags,
}

/// Extraction order for top-level task lines
pub const TASK_TAGS: [TagKind; 7] = [
    TagKind::Priority,
    TagKind::DueDate,
    TagKind::Effort,
    TagKind::Notes,
    TagKind::Progress,
    TagKind::Delegation,
    TagKind::Hashtags,
];

/// Kinds a task line gives up before its trailing notes are read
pub const BEFORE_NOTES: [TagKind; 3] = [TagKind::Priority, TagKind::DueDate, TagKind::Effort];

/// Opening of the notes tag
pub const NOTES_OPEN: &str = "{notes: ";

/// Subtasks carry no due date, notes, progress or hashtags
pub const SUBTASK_TAGS: [TagKind; 3] = [TagKind::Priority, TagKind::Effort, TagKind::Delegation];

impl TagKind {
    fn pattern(self) -> &'static Regex {
        match self {
            Self::Priority => &PRIORITY_RE,
            Self::DueDate => &DUE_RE,
            Self::Effort => &EFFORT_RE,
            Self::Notes => &NOTES_RE,
            Self::Progress => &PROGRESS_RE,
            Self::Delegation => &DELEGATION_RE,
            Self::Hashtags => &HASHTAG_RE,
        }
    }

    /// Store the captured value; false leaves the match in the text
    fn accept(self, caps: &Captures<'_>, fields: &mut InlineFields) -> bool {
        let value = &caps[1];
        match self {
            Self::Priority => match value.parse::<u8>().ok().and_then(Priority::from_level) {
                Some(p) => {
                    fields.priority = Some(p);
                    true
                }
                None => false,
            },
            Self::DueDate => match NaiveDate::parse_from_str(value, "%Y-%m-%d") {
                Ok(date) => {
                    fields.due_date = Some(date);
                    true
                }
                Err(_) => false,
            },
            Self::Effort => match Effort::parse(value) {
                Some(effort) => {
                    fields.effort = Some(effort);
                    true
                }
                None => false,
            },
            Self::Notes => {
                fields.notes = value.to_string();
                true
            }
            Self::Progress => match value.parse::<u32>() {
                Ok(pct) => {
                    fields.progress = pct.min(100) as u8;
                    true
                }
                Err(_) => false,
            },
            Self::Delegation => {
                fields.delegated_to = value.to_string();
                true
            }
            Self::Hashtags => {
                if !fields.tags.iter().any(|t| t == value) {
                    fields.tags.push(value.to_string());
                }
                true
            }
        }
    }

    /// Apply this kind to `raw`, returning the text with the tag cut out
    fn extract(self, raw: &str, fields: &mut InlineFields) -> String {
        let re = self.pattern();
        if self == Self::Hashtags {
            for caps in re.captures_iter(raw) {
                self.accept(&caps, fields);
            }
            return re.replace_all(raw, "").trim().to_string();
        }

        let Some(caps) = re.captures(raw) else {
            return raw.to_string();
        };
        if !self.accept(&caps, fields) {
            return raw.to_string();
        }
        let span = caps.get(0).map(|m| m.range()).unwrap_or(0..0);
        format!("{}{}", &raw[..span.start], &raw[span.end..])
            .trim()
            .to_string()
    }
}

/// Run `kinds` over `raw` in order; returns the fields and the leftover title
pub fn extract(raw: &str, kinds: &[TagKind]) -> (InlineFields, String) {
    let mut fields = InlineFields::default();
    let mut rest = raw.to_string();
    for kind in kinds {
        rest = kind.extract(&rest, &mut fields);
    }
    (fields, rest.trim().to_string())
}

/// True when running `kinds` over `text` would pull anything out of it
pub fn has_inline_tags(text: &str, kinds: &[TagKind]) -> bool {
    extract(text, kinds).0 != InlineFields::default()
}

/// Inline tags for a task line, in extraction order with notes last
pub fn render_task_tags(task: &Task) -> String {
    let mut out = String::new();
    if let Some(p) = task.priority {
        out.push_str(&format!(" {{p{}}}", p.level()));
    }
    if let Some(due) = task.due_date {
        out.push_str(&format!(" @due({})", due.format("%Y-%m-%d")));
    }
    if let Some(effort) = &task.effort {
        out.push_str(&format!(" ~{effort}"));
    }
    if task.status == TaskStatus::InProgress && task.progress > 0 {
        out.push_str(&format!(" ({}%)", task.progress));
    }
    if task.status == TaskStatus::Delegated && !task.delegated_to.is_empty() {
        out.push_str(&format!(" (delegated to {})", task.delegated_to));
    }
    for tag in &task.tags {
        out.push_str(&format!(" #{tag}"));
    }
    if !task.notes.is_empty() {
        let flat = task.notes.replace(['\r', '\n'], " ");
        out.push_str(&format!(" {{notes: {flat}}}"));
    }
    out
}

pub fn render_subtask_tags(sub: &Subtask) -> String {
    let mut out = String::new();
    if let Some(p) = sub.priority {
        out.push_str(&format!(" {{p{}}}", p.level()));
    }
    if let Some(effort) = &sub.effort {
        out.push_str(&format!(" ~{effort}"));
    }
    if !sub.delegated_to.is_empty() {
        out.push_str(&format!(" (delegated to {})", sub.delegated_to));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_every_task_tag() {
        let (fields, text) = extract(
            "Write report {p1} @due(2024-06-01) ~2h (45%) #work #q3 {notes: call Bob}",
            &TASK_TAGS,
        );
        assert_eq!(text, "Write report");
        assert_eq!(fields.priority, Some(Priority::P1));
        assert_eq!(fields.due_date, NaiveDate::from_ymd_opt(2024, 6, 1));
        assert_eq!(fields.effort.unwrap().as_str(), "2h");
        assert_eq!(fields.progress, 45);
        assert_eq!(fields.tags, vec!["work", "q3"]);
        assert_eq!(fields.notes, "call Bob");
    }

    #[test]
    fn only_first_priority_is_honoured() {
        let (fields, text) = extract("Fix {p0} then {p3}", &TASK_TAGS);
        assert_eq!(fields.priority, Some(Priority::P0));
        assert_eq!(text, "Fix  then {p3}");
    }

    #[test]
    fn hour_and_minute_effort_is_captured_whole() {
        let (fields, text) = extract("Review ~1h30m", &TASK_TAGS);
        assert_eq!(fields.effort.unwrap().as_str(), "1h30m");
        assert_eq!(text, "Review");
    }

    #[test]
    fn invalid_due_date_stays_in_text() {
        let (fields, text) = extract("Ship @due(2024-13-45)", &TASK_TAGS);
        assert!(fields.due_date.is_none());
        assert_eq!(text, "Ship @due(2024-13-45)");
    }

    #[test]
    fn notes_must_be_at_end_of_line() {
        let (fields, text) = extract("Call {notes: later} #home", &TASK_TAGS);
        assert_eq!(fields.notes, "");
        assert_eq!(fields.tags, vec!["home"]);
        assert_eq!(text, "Call {notes: later}");
    }

    #[test]
    fn progress_is_clamped() {
        let (fields, _) = extract("Overdone (250%)", &TASK_TAGS);
        assert_eq!(fields.progress, 100);
    }

    #[test]
    fn duplicate_hashtags_collapse() {
        let (fields, text) = extract("#a mid #b #a", &TASK_TAGS);
        assert_eq!(fields.tags, vec!["a", "b"]);
        assert_eq!(text, "mid");
    }

    #[test]
    fn subtask_table_ignores_task_only_tags() {
        let (fields, text) = extract("Draft #x (50%) {p2} ~30m (delegated to @sam)", &SUBTASK_TAGS);
        assert_eq!(fields.priority, Some(Priority::P2));
        assert_eq!(fields.delegated_to, "@sam");
        assert_eq!(text, "Draft #x (50%)");
    }

    #[test]
    fn progress_and_delegation_are_gated_by_status() {
        let mut task = Task::new("Gate", crate::models::Column::Today);
        task.progress = 40;
        task.delegated_to = "@ana".to_string();
        assert_eq!(render_task_tags(&task), "");

        task.status = TaskStatus::InProgress;
        assert_eq!(render_task_tags(&task), " (40%)");

        task.status = TaskStatus::Delegated;
        assert_eq!(render_task_tags(&task), " (delegated to @ana)");
    }
}
