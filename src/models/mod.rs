// Models module for the analog board

pub mod board;
pub mod common;
pub mod config;
pub mod task;

pub use board::BoardState;
pub use common::{Column, Priority, SubtaskStatus, TaskStatus};
pub use config::{AnalogSettings, DEFAULT_BOARD_PATH, PROGRESS_INCREMENTS};
pub use task::{Effort, Subtask, Task, TaskPatch, new_id};
