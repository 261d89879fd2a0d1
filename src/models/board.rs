// Board model - three ordered columns of tasks

use serde::{Deserialize, Serialize};

use super::common::Column;
use super::task::Task;

/// Full board state. A task lives in exactly one column sequence and its
/// `column` field always names that sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardState {
    pub today: Vec<Task>,
    pub next: Vec<Task>,
    pub someday: Vec<Task>,
}

impl BoardState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn column(&self, column: Column) -> &[Task] {
        match column {
            Column::Today => &self.today,
            Column::Next => &self.next,
            Column::Someday => &self.someday,
        }
    }

    pub fn column_mut(&mut self, column: Column) -> &mut Vec<Task> {
        match column {
            Column::Today => &mut self.today,
            Column::Next => &mut self.next,
            Column::Someday => &mut self.someday,
        }
    }

    /// Locate a task, scanning today -> next -> someday
    pub fn position(&self, id: &str) -> Option<(Column, usize)> {
        Column::ALL.into_iter().find_map(|col| {
            self.column(col)
                .iter()
                .position(|t| t.id == id)
                .map(|idx| (col, idx))
        })
    }

    pub fn find(&self, id: &str) -> Option<&Task> {
        let (col, idx) = self.position(id)?;
        self.column(col).get(idx)
    }

    pub fn find_mut(&mut self, id: &str) -> Option<&mut Task> {
        let (col, idx) = self.position(id)?;
        self.column_mut(col).get_mut(idx)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        self.today.iter().chain(&self.next).chain(&self.someday)
    }

    pub fn len(&self) -> usize {
        self.today.len() + self.next.len() + self.someday.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every task sits in the sequence its `column` names
    pub fn is_consistent(&self) -> bool {
        Column::ALL
            .into_iter()
            .all(|col| self.column(col).iter().all(|t| t.column == col))
    }

    /// Structural equality ignoring generated ids
    pub fn eq_ignoring_ids(&self, other: &BoardState) -> bool {
        Column::ALL.into_iter().all(|col| {
            let (a, b) = (self.column(col), other.column(col));
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.eq_ignoring_id(y))
        })
    }
}
