// Commands module - edit policies and views used by the front end

pub mod board;
pub mod common;
pub mod settings;
pub mod subtask;
pub mod task;
