use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::commands::common::TaskRef;
use crate::models::Column;

#[derive(Parser, Debug)]
#[command(name = "analog", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Vault directory the board path is resolved against (default: current directory)
    #[arg(long, global = true, value_name = "DIR")]
    pub vault: Option<PathBuf>,

    /// Open this board file instead of the configured one
    #[arg(long, global = true, value_name = "PATH")]
    pub board: Option<PathBuf>,

    /// Settings file (default: $ANALOG_CONFIG_PATH or ~/.analog/config.md)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Output JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Debug logging on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the board
    Show,
    /// List the tag vocabulary and every tag in use
    Tags,
    /// Add a task; inline tags such as {p1} or #work are understood
    ///
    /// Example: analog add today "Write report {p1} ~2h #work"
    Add {
        column: Column,
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    /// Cycle status: not started -> in progress -> completed -> delegated
    ///
    /// Example: analog status today:1
    Status { task: TaskRef },
    /// Raise progress by the configured increment
    Progress { task: TaskRef },
    /// Hand a task to someone
    ///
    /// Example: analog delegate next:2 @kim
    Delegate { task: TaskRef, person: String },
    /// Take a delegated task back
    Undelegate { task: TaskRef },
    /// Set priority 0-3, or `none`
    Priority { task: TaskRef, value: String },
    /// Set the due date (YYYY-MM-DD), or `none`
    Due { task: TaskRef, value: String },
    /// Set effort (30m, 2h, 1.5h, 1h30m), or `none`
    Effort { task: TaskRef, value: String },
    /// Toggle a tag
    Tag { task: TaskRef, tag: String },
    /// Replace the notes; no text clears them
    Notes {
        task: TaskRef,
        #[arg(num_args = 0..)]
        text: Vec<String>,
    },
    /// Replace the description; no text clears it
    Describe {
        task: TaskRef,
        #[arg(num_args = 0..)]
        text: Vec<String>,
    },
    /// Change the title
    Rename {
        task: TaskRef,
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    /// Move a task to another column
    ///
    /// Example: analog move today:3 next --index 0
    Move {
        task: TaskRef,
        column: Column,
        /// 0-based insert position (default: end of column)
        #[arg(long)]
        index: Option<usize>,
    },
    /// Delete a task
    Delete { task: TaskRef },
    /// Edit subtasks
    #[command(subcommand)]
    Subtask(SubtaskCommand),
    /// Carry unfinished Today tasks into Next (once per day)
    Reset,
    /// Create an empty board file; never overwrites
    NewBoard { path: PathBuf },
    /// Follow the board file and report external edits until Ctrl-C
    Watch,
    /// Show or change settings
    #[command(subcommand)]
    Config(ConfigCommand),
}

/// Subtasks are addressed by 1-based position under their task
#[derive(Subcommand, Debug)]
pub enum SubtaskCommand {
    Add {
        task: TaskRef,
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    Cycle { task: TaskRef, position: usize },
    Rename {
        task: TaskRef,
        position: usize,
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    Remove { task: TaskRef, position: usize },
    /// Priority 0-3, or `none`
    Priority { task: TaskRef, position: usize, value: String },
    /// Effort, or `none`
    Effort { task: TaskRef, position: usize, value: String },
    /// @person, or `none`
    Delegate { task: TaskRef, position: usize, person: String },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    Show,
    /// Keys: filePath, dailyReset, progressIncrement, showCompleted
    Set { key: String, value: String },
    TagAdd { tag: String },
    TagRemove { tag: String },
}

impl Command {
    /// Commands that never touch the board skip the daily reset
    pub fn uses_board(&self) -> bool {
        !matches!(self, Command::NewBoard { .. } | Command::Config(_))
    }
}
