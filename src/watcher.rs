// Board file watcher
// Bridges notify events into the runtime and reloads the store on external edits

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::ffi::{OsStr, OsString};
use std::path::PathBuf;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::{AnalogError, Result};
use crate::store::BoardStore;

/// Watches the board file's folder until cancelled or stopped
pub struct BoardWatcher {
    _watcher: RecommendedWatcher,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

fn is_board_event(event: &Event, file_name: &OsStr) -> bool {
    matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_))
        && event.paths.iter().any(|p| p.file_name() == Some(file_name))
}

impl BoardWatcher {
    /// Start watching; must be called from within a tokio runtime. The
    /// folder holding the board has to exist.
    pub fn spawn(store: BoardStore, cancel: CancellationToken) -> Result<Self> {
        let path = store.path().to_path_buf();
        let file_name: OsString = path
            .file_name()
            .map(OsStr::to_os_string)
            .ok_or_else(|| AnalogError::invalid_input(format!("{} is not a file path", path.display())))?;
        // Watch the folder: editors often replace the file rather than write it
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let (tx, mut rx) = mpsc::unbounded_channel::<Event>();
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
            Ok(event) => {
                let _ = tx.send(event);
            }
            Err(err) => warn!("[BoardWatcher] notify error: {}", err),
        })?;
        watcher.watch(&dir, RecursiveMode::NonRecursive)?;
        info!("[BoardWatcher::spawn] Watching {:?}", path);

        let token = cancel.clone();
        let task = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    event = rx.recv() => {
                        let Some(event) = event else { break };
                        // Coalesce the burst a single save produces
                        let mut relevant = is_board_event(&event, &file_name);
                        while let Ok(more) = rx.try_recv() {
                            relevant |= is_board_event(&more, &file_name);
                        }
                        if !relevant {
                            continue;
                        }
                        if store.is_saving() {
                            debug!("[BoardWatcher] Save in flight, ignoring event");
                            continue;
                        }
                        store.reload_if_external().await;
                    }
                }
            }
            debug!("[BoardWatcher] Stopped");
        });

        Ok(Self {
            _watcher: watcher,
            cancel,
            task,
        })
    }

    pub async fn stop(self) {
        self.cancel.cancel();
        if let Err(err) = self.task.await {
            warn!("[BoardWatcher::stop] Watch loop failed: {}", err);
        }
    }
}
