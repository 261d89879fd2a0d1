// Common helpers for commands

use chrono::{Local, NaiveDate};
use std::fmt;
use std::str::FromStr;

use crate::error::{AnalogError, Result};
use crate::models::{BoardState, Column, Task};
use crate::store::BoardStore;

/// Current local calendar date
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// `column:n` reference to a task by 1-based position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskRef {
    pub column: Column,
    pub position: usize,
}

impl FromStr for TaskRef {
    type Err = AnalogError;

    fn from_str(s: &str) -> Result<Self> {
        let (column, position) = s
            .split_once(':')
            .ok_or_else(|| AnalogError::invalid_input(format!("task reference '{s}' must look like today:1")))?;
        let column: Column = column.parse()?;
        let position: usize = position
            .trim()
            .parse()
            .ok()
            .filter(|p| *p > 0)
            .ok_or_else(|| AnalogError::invalid_input(format!("bad position in '{s}'")))?;
        Ok(Self { column, position })
    }
}

impl fmt::Display for TaskRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.column, self.position)
    }
}

impl TaskRef {
    pub fn resolve<'a>(&self, board: &'a BoardState) -> Result<&'a Task> {
        board
            .column(self.column)
            .get(self.position - 1)
            .ok_or_else(|| AnalogError::not_found(format!("no task at {self}")))
    }

    /// Id of the referenced task in the store's current board
    pub fn resolve_id(&self, store: &BoardStore) -> Result<String> {
        store.read(|board| self.resolve(board).map(|t| t.id.clone()))
    }
}

/// Text that must stay on one line of the board file
pub fn single_line<'a>(text: &'a str, what: &str) -> Result<&'a str> {
    if text.contains(['\r', '\n']) {
        return Err(AnalogError::invalid_input(format!("{what} must be a single line")));
    }
    Ok(text)
}

/// Parse an optional value where `none` clears it
pub fn parse_clearable<T>(raw: &str, parse: impl FnOnce(&str) -> Result<T>) -> Result<Option<T>> {
    match raw.trim() {
        "" | "none" | "-" => Ok(None),
        value => parse(value).map(Some),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_task_refs() {
        let r: TaskRef = "Next:2".parse().unwrap();
        assert_eq!(r, TaskRef { column: Column::Next, position: 2 });
        assert_eq!(r.to_string(), "next:2");

        assert_eq!("today".parse::<TaskRef>().unwrap_err().code(), "invalid_input");
        assert!("today:0".parse::<TaskRef>().is_err());
        assert!("later:1".parse::<TaskRef>().is_err());
    }

    #[test]
    fn resolves_against_board() {
        let mut board = BoardState::new();
        board.today.push(Task::new("A", Column::Today));
        let r: TaskRef = "today:1".parse().unwrap();
        assert_eq!(r.resolve(&board).unwrap().text, "A");

        let missing: TaskRef = "today:2".parse().unwrap();
        assert_eq!(missing.resolve(&board).unwrap_err().code(), "not_found");
    }

    #[test]
    fn line_breaks_are_refused() {
        assert_eq!(single_line("one line", "title").unwrap(), "one line");
        assert!(single_line("first\nsecond", "title").is_err());
        assert!(single_line("carriage\rreturn", "title").is_err());
    }

    #[test]
    fn none_clears() {
        let parse = |v: &str| v.parse::<u8>().map_err(|_| AnalogError::invalid_input("nan"));
        assert_eq!(parse_clearable("none", parse).unwrap(), None);
        assert_eq!(parse_clearable("3", parse).unwrap(), Some(3));
        assert!(parse_clearable("x", parse).is_err());
    }
}
