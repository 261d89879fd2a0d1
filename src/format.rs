// Display helpers for the board front end

use chrono::{Datelike, NaiveDate};
use regex::Regex;
use std::sync::LazyLock;

static HOURS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+(?:\.\d+)?)h(?:(\d+)m)?$").expect("hours display"));
static MINUTES_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\d+)m$").expect("minutes display"));

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Deterministic colors for tags based on hash
pub const TAG_COLORS: [&str; 10] = [
    "#7c3aed", // violet
    "#0891b2", // cyan
    "#059669", // emerald
    "#d97706", // amber
    "#dc2626", // red
    "#2563eb", // blue
    "#c026d3", // fuchsia
    "#65a30d", // lime
    "#ea580c", // orange
    "#0d9488", // teal
];

/// Human-readable effort: `1h` -> `1 hr`, `1.5h` -> `1.5 hrs`, `1h30m` -> `1h 30m`,
/// `90m` -> `90 min`. Anything else is returned unchanged.
pub fn format_effort_display(effort: &str) -> String {
    if effort.is_empty() {
        return String::new();
    }

    if let Some(caps) = HOURS_RE.captures(effort) {
        let hours: f64 = caps[1].parse().unwrap_or(0.0);
        let mins: u32 = caps
            .get(2)
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or(0);
        if hours == 1.0 && mins == 0 {
            return "1 hr".to_string();
        }
        if mins > 0 {
            return format!("{}h {}m", hours.floor(), mins);
        }
        return format!("{hours} hrs");
    }

    if let Some(caps) = MINUTES_RE.captures(effort) {
        return format!("{} min", &caps[1]);
    }

    effort.to_string()
}

/// Relative due-date label as seen from `today`
pub fn format_due_display(due: NaiveDate, today: NaiveDate) -> String {
    let days = (due - today).num_days();
    match days {
        0 => "Today".to_string(),
        1 => "Tomorrow".to_string(),
        -1 => "Yesterday".to_string(),
        d if d < 0 => format!("{}d overdue", -d),
        d if d <= 7 => format!("In {d}d"),
        _ => format!("{} {}", MONTHS[due.month0() as usize], due.day()),
    }
}

pub fn is_overdue(due: Option<NaiveDate>, today: NaiveDate) -> bool {
    due.is_some_and(|d| d < today)
}

pub fn is_due_today(due: Option<NaiveDate>, today: NaiveDate) -> bool {
    due == Some(today)
}

/// Stable palette pick: 31-multiplier hash over UTF-16 units, like a JS string hash
pub fn tag_color(tag: &str) -> &'static str {
    let hash = tag.encode_utf16().fold(0i32, |hash, unit| {
        hash.wrapping_shl(5).wrapping_sub(hash).wrapping_add(i32::from(unit))
    });
    let idx = (i64::from(hash).abs() % TAG_COLORS.len() as i64) as usize;
    TAG_COLORS[idx]
}

/// Normalize free text into a tag slug (`Deep Work` -> `deep-work`)
pub fn normalize_tag(raw: &str) -> String {
    slug::slugify(raw.trim().trim_start_matches('#'))
}
