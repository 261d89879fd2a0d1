// Front-end session: settings, the open board, and command dispatch

use parking_lot::RwLock;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::cli::{Cli, Command, ConfigCommand, SubtaskCommand};
use crate::commands::common::{TaskRef, parse_clearable};
use crate::commands::{board, settings as settings_cmd, subtask, task as task_cmd};
use crate::error::{AnalogError, Result};
use crate::markdown;
use crate::models::{AnalogSettings, Task, TaskPatch};
use crate::storage::{self, FsBoardFiles};
use crate::store::BoardStore;
use crate::watcher::BoardWatcher;

pub struct App {
    config_path: PathBuf,
    vault: PathBuf,
    settings: Arc<RwLock<AnalogSettings>>,
    store: BoardStore,
    /// Opened through `settings.file_path` rather than `--board`
    default_board: bool,
    json: bool,
}

impl App {
    pub fn new(cli: &Cli) -> Self {
        let config_path = cli.config.clone().unwrap_or_else(storage::global_config_path);
        let settings = storage::load_settings(&config_path);
        let vault = cli.vault.clone().unwrap_or_else(|| PathBuf::from("."));
        let (path, default_board) = match &cli.board {
            Some(path) => (path.clone(), false),
            None => (storage::board_path(&vault, &settings), true),
        };
        debug!("[App::new] config={:?} board={:?}", config_path, path);

        let settings = Arc::new(RwLock::new(settings));
        Self {
            config_path,
            vault,
            store: BoardStore::new(path, Arc::clone(&settings)),
            settings,
            default_board,
            json: cli.json,
        }
    }

    pub fn store(&self) -> &BoardStore {
        &self.store
    }

    fn save_settings(&self) -> Result<()> {
        let settings = self.settings.read().clone();
        storage::save_settings(&self.config_path, &settings)
    }

    /// Load the board, run the daily reset when due, then the command
    pub async fn run(&self, command: Command) -> Result<()> {
        if command.uses_board() {
            self.store.load().await;
            let reset_enabled = self.settings.read().daily_reset;
            if reset_enabled && self.default_board && self.store.perform_daily_reset() {
                self.save_settings()?;
            }
        }

        let result = self.execute(command).await;
        self.store.flush().await;
        result
    }

    // ============================================
    // OUTPUT
    // ============================================

    fn print_json<T: serde::Serialize>(&self, value: &T) -> Result<()> {
        let text = serde_json::to_string_pretty(value)
            .map_err(|e| AnalogError::invalid_input(format!("JSON error: {e}")))?;
        println!("{text}");
        Ok(())
    }

    fn report_task(&self, id: &str) -> Result<()> {
        let found = self.store.read(|b| {
            b.position(id)
                .and_then(|(column, idx)| b.column(column).get(idx).map(|t| (column, idx, t.clone())))
        });
        let (column, idx, task) = found.ok_or_else(|| AnalogError::not_found(format!("task {id} vanished")))?;
        let reference = TaskRef { column, position: idx + 1 };
        if self.json {
            self.print_json(&board::TaskInfo::new(reference, &task, self.store.today()))
        } else {
            println!("{reference} {}", markdown::serialize_task(&task));
            Ok(())
        }
    }

    fn report_message(&self, message: &str) -> Result<()> {
        if self.json {
            self.print_json(&serde_json::json!({ "message": message }))
        } else {
            println!("{message}");
            Ok(())
        }
    }

    // ============================================
    // DISPATCH
    // ============================================

    fn edit(&self, reference: TaskRef, build: impl FnOnce(&Task) -> Result<TaskPatch>) -> Result<()> {
        let id = reference.resolve_id(&self.store)?;
        task_cmd::apply(&self.store, &id, build)?;
        self.report_task(&id)
    }

    async fn execute(&self, command: Command) -> Result<()> {
        match command {
            Command::Show => {
                let view = {
                    let settings = self.settings.read();
                    self.store
                        .read(|b| board::board_view(b, &settings, self.store.today()))
                };
                if self.json {
                    self.print_json(&view)
                } else {
                    print!("{}", board::render_text(&view));
                    Ok(())
                }
            }
            Command::Tags => {
                let tags = {
                    let settings = self.settings.read();
                    self.store.read(|b| settings_cmd::all_tags(&settings, b))
                };
                if self.json {
                    self.print_json(&tags)
                } else {
                    for tag in tags {
                        println!("#{tag}");
                    }
                    Ok(())
                }
            }
            Command::Add { column, text } => {
                let task = task_cmd::new_task(&text.join(" "), column)?;
                let id = task.id.clone();
                self.store.add_task(task);
                self.report_task(&id)
            }
            Command::Status { task } => self.edit(task, |t| Ok(task_cmd::cycle_status(t))),
            Command::Progress { task } => {
                let increment = self.settings.read().progress_increment;
                self.edit(task, |t| Ok(task_cmd::bump_progress(t, increment)))
            }
            Command::Delegate { task, person } => self.edit(task, |_| task_cmd::delegate(&person)),
            Command::Undelegate { task } => self.edit(task, |_| Ok(task_cmd::undelegate())),
            Command::Priority { task, value } => {
                let priority = parse_clearable(&value, task_cmd::parse_priority)?;
                self.edit(task, |_| Ok(task_cmd::set_priority(priority)))
            }
            Command::Due { task, value } => {
                let due = parse_clearable(&value, task_cmd::parse_due)?;
                self.edit(task, |_| Ok(task_cmd::set_due(due)))
            }
            Command::Effort { task, value } => {
                let effort = parse_clearable(&value, task_cmd::parse_effort)?;
                self.edit(task, |_| Ok(task_cmd::set_effort(effort)))
            }
            Command::Tag { task, tag } => self.toggle_tag(task, &tag),
            Command::Notes { task, text } => self.edit(task, |_| task_cmd::edit_notes(&text.join(" "))),
            Command::Describe { task, text } => self.edit(task, |_| task_cmd::describe(&text.join(" "))),
            Command::Rename { task, text } => self.edit(task, |t| task_cmd::rename(t, &text.join(" "))),
            Command::Move { task, column, index } => {
                let id = task.resolve_id(&self.store)?;
                self.store.move_task(&id, column, index);
                self.report_task(&id)
            }
            Command::Delete { task } => {
                let id = task.resolve_id(&self.store)?;
                let text = self.store.find_task(&id).map(|t| t.text).unwrap_or_default();
                self.store.delete_task(&id);
                self.report_message(&format!("deleted {task} '{text}'"))
            }
            Command::Subtask(command) => self.subtask(command),
            Command::Reset => {
                if self.store.perform_daily_reset() {
                    self.save_settings()?;
                    self.report_message("unfinished Today tasks moved to Next")
                } else {
                    self.report_message("daily reset already ran today")
                }
            }
            Command::NewBoard { path } => {
                let path = if path.is_absolute() { path } else { self.vault.join(path) };
                let created = storage::create_board_file(&FsBoardFiles, &path, self.store.today()).await?;
                self.report_message(&created.display().to_string())
            }
            Command::Watch => self.watch().await,
            Command::Config(command) => self.config(command),
        }
    }

    /// Toggle a tag; new tags join the custom vocabulary
    fn toggle_tag(&self, reference: TaskRef, raw: &str) -> Result<()> {
        let id = reference.resolve_id(&self.store)?;
        let mut added = None;
        task_cmd::apply(&self.store, &id, |t| {
            let (patch, tag) = task_cmd::toggle_tag(t, raw)?;
            if !t.tags.contains(&tag) {
                added = Some(tag);
            }
            Ok(patch)
        })?;

        if let Some(tag) = added {
            let new_to_vocabulary = self.settings.write().add_custom_tag(tag);
            if new_to_vocabulary {
                self.save_settings()?;
            }
        }
        self.report_task(&id)
    }

    fn subtask(&self, command: SubtaskCommand) -> Result<()> {
        match command {
            SubtaskCommand::Add { task, text } => self.edit(task, |t| subtask::add(t, &text.join(" "))),
            SubtaskCommand::Cycle { task, position } => self.edit(task, |t| subtask::cycle(t, position)),
            SubtaskCommand::Rename { task, position, text } => {
                self.edit(task, |t| subtask::rename(t, position, &text.join(" ")))
            }
            SubtaskCommand::Remove { task, position } => self.edit(task, |t| subtask::remove(t, position)),
            SubtaskCommand::Priority { task, position, value } => {
                let priority = parse_clearable(&value, task_cmd::parse_priority)?;
                self.edit(task, |t| subtask::set_priority(t, position, priority))
            }
            SubtaskCommand::Effort { task, position, value } => {
                let effort = parse_clearable(&value, task_cmd::parse_effort)?;
                self.edit(task, |t| subtask::set_effort(t, position, effort))
            }
            SubtaskCommand::Delegate { task, position, person } => {
                let person = parse_clearable(&person, |p| Ok(p.to_string()))?;
                self.edit(task, |t| subtask::delegate(t, position, person.as_deref()))
            }
        }
    }

    fn config(&self, command: ConfigCommand) -> Result<()> {
        match command {
            ConfigCommand::Show => {
                let settings = self.settings.read().clone();
                if self.json {
                    return self.print_json(&settings);
                }
                let yaml = serde_yaml::to_string(&settings)
                    .map_err(|e| AnalogError::config(format!("YAML error: {e}")))?;
                println!("# {}", self.config_path.display());
                print!("{yaml}");
                Ok(())
            }
            ConfigCommand::Set { key, value } => {
                settings_cmd::set_value(&mut self.settings.write(), &key, &value)?;
                self.save_settings()?;
                self.report_message(&format!("{key} updated"))
            }
            ConfigCommand::TagAdd { tag } => {
                let added = settings_cmd::add_tag(&mut self.settings.write(), &tag)?;
                match added {
                    Some(tag) => {
                        self.save_settings()?;
                        self.report_message(&format!("added #{tag}"))
                    }
                    None => self.report_message("tag already in the vocabulary"),
                }
            }
            ConfigCommand::TagRemove { tag } => {
                let removed = settings_cmd::remove_tag(&mut self.settings.write(), &tag)?;
                self.save_settings()?;
                self.report_message(&format!("removed #{removed}"))
            }
        }
    }

    async fn watch(&self) -> Result<()> {
        let path = self.store.path().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AnalogError::io(format!("creating {}", parent.display()), e))?;
        }

        let observer = self.store.clone();
        let _subscription = self.store.subscribe(move || {
            println!("board changed: {} tasks", observer.read(|b| b.len()));
        });

        let watcher = BoardWatcher::spawn(self.store.clone(), CancellationToken::new())?;
        info!("[App::watch] Watching {:?}, Ctrl-C to stop", path);

        let signal = tokio::signal::ctrl_c().await;
        watcher.stop().await;
        signal.map_err(|e| AnalogError::io("waiting for Ctrl-C", e))
    }
}
