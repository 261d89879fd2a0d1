// Board store - the single authoritative in-memory board for one file
//
// Mutations are synchronous and run under one write guard. Every mutation
// notifies subscribers and then requests a save; saves are drop-latest: a
// request made while a write is in flight is discarded, and the next
// mutation carries the newest state to disk.

use chrono::{Local, NaiveDate};
use parking_lot::{Mutex, RwLock};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::markdown;
use crate::models::{AnalogSettings, BoardState, Column, Task, TaskPatch, TaskStatus};
use crate::storage::{BoardFiles, FsBoardFiles};

pub type Listener = Arc<dyn Fn() + Send + Sync>;
pub type Clock = Arc<dyn Fn() -> NaiveDate + Send + Sync>;

/// Save pipeline state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveState {
    Idle,
    InFlight,
    /// A save was requested and dropped while the current write runs; the
    /// file will lag the in-memory board until the next mutation saves.
    InFlightStale,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Written,
    /// Another save was in flight
    Dropped,
    Failed,
}

struct StoreInner {
    path: PathBuf,
    files: Arc<dyn BoardFiles>,
    settings: Arc<RwLock<AnalogSettings>>,
    clock: Clock,
    state: RwLock<BoardState>,
    loaded: AtomicBool,
    listeners: Mutex<Vec<(u64, Listener)>>,
    next_listener_id: AtomicU64,
    save_state: Mutex<SaveState>,
    /// Set when the last write finished with requests dropped behind it
    lagging: AtomicBool,
    pending_save: Mutex<Option<JoinHandle<()>>>,
    /// Last text this store wrote, used to recognise its own file events
    last_written: Mutex<Option<String>>,
}

/// Handle to one open board. Cloning shares the same board.
#[derive(Clone)]
pub struct BoardStore {
    inner: Arc<StoreInner>,
}

/// Returned by [`BoardStore::subscribe`]; dropping it unsubscribes.
#[must_use = "dropping the subscription unsubscribes the listener"]
pub struct Subscription {
    id: u64,
    store: Weak<StoreInner>,
}

impl Subscription {
    pub fn unsubscribe(self) {
        // Drop does the work
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.store.upgrade() {
            inner.listeners.lock().retain(|(id, _)| *id != self.id);
        }
    }
}

fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

impl BoardStore {
    /// Store over the local filesystem, dated by the local clock
    pub fn new(path: impl Into<PathBuf>, settings: Arc<RwLock<AnalogSettings>>) -> Self {
        Self::with_parts(path, settings, Arc::new(FsBoardFiles), Arc::new(local_today))
    }

    pub fn with_parts(
        path: impl Into<PathBuf>,
        settings: Arc<RwLock<AnalogSettings>>,
        files: Arc<dyn BoardFiles>,
        clock: Clock,
    ) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                path: path.into(),
                files,
                settings,
                clock,
                state: RwLock::new(BoardState::new()),
                loaded: AtomicBool::new(false),
                listeners: Mutex::new(Vec::new()),
                next_listener_id: AtomicU64::new(0),
                save_state: Mutex::new(SaveState::Idle),
                lagging: AtomicBool::new(false),
                pending_save: Mutex::new(None),
                last_written: Mutex::new(None),
            }),
        }
    }

    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    pub fn settings(&self) -> Arc<RwLock<AnalogSettings>> {
        Arc::clone(&self.inner.settings)
    }

    pub fn today(&self) -> NaiveDate {
        (self.inner.clock)()
    }

    /// False until the first `load()` completes
    pub fn is_loaded(&self) -> bool {
        self.inner.loaded.load(Ordering::Acquire)
    }

    /// Snapshot of the board
    pub fn state(&self) -> BoardState {
        self.inner.state.read().clone()
    }

    /// Borrow the board without cloning it
    pub fn read<R>(&self, f: impl FnOnce(&BoardState) -> R) -> R {
        f(&self.inner.state.read())
    }

    pub fn find_task(&self, id: &str) -> Option<Task> {
        self.inner.state.read().find(id).cloned()
    }

    // ============================================
    // SUBSCRIPTIONS
    // ============================================

    pub fn subscribe(&self, listener: impl Fn() + Send + Sync + 'static) -> Subscription {
        let id = self.inner.next_listener_id.fetch_add(1, Ordering::Relaxed);
        self.inner.listeners.lock().push((id, Arc::new(listener)));
        Subscription {
            id,
            store: Arc::downgrade(&self.inner),
        }
    }

    fn notify(&self) {
        // Listeners may call back into the store, so none of our locks are held
        let listeners: Vec<Listener> = self
            .inner
            .listeners
            .lock()
            .iter()
            .map(|(_, l)| Arc::clone(l))
            .collect();
        for listener in listeners {
            listener();
        }
    }

    fn changed(&self) {
        self.notify();
        self.request_save();
    }

    // ============================================
    // LOAD
    // ============================================

    /// Replace the board with the file's content (empty if absent or
    /// unreadable) and notify. Never fails.
    pub async fn load(&self) {
        let path = &self.inner.path;
        let board = match self.inner.files.read_text(path).await {
            Ok(Some(content)) => markdown::parse_board(&content),
            Ok(None) => {
                debug!("[BoardStore::load] {:?} does not exist, starting empty", path);
                BoardState::new()
            }
            Err(err) => {
                warn!("[BoardStore::load] Failed to read {:?}: {}", path, err);
                BoardState::new()
            }
        };

        info!("[BoardStore::load] Loaded {} tasks from {:?}", board.len(), path);
        *self.inner.state.write() = board;
        self.inner.loaded.store(true, Ordering::Release);
        self.notify();
    }

    /// Reconcile after a file-change event. Skipped while a save is in
    /// flight, when the file matches what this store last wrote, or when the
    /// file has vanished. Returns whether the board was replaced.
    pub async fn reload_if_external(&self) -> bool {
        if self.is_saving() {
            debug!("[BoardStore::reload_if_external] Save in flight, ignoring event");
            return false;
        }

        let content = match self.inner.files.read_text(&self.inner.path).await {
            Ok(Some(content)) => content,
            Ok(None) => {
                debug!("[BoardStore::reload_if_external] File missing, keeping board");
                return false;
            }
            Err(err) => {
                warn!("[BoardStore::reload_if_external] Failed to read {:?}: {}", self.inner.path, err);
                return false;
            }
        };

        if self.inner.last_written.lock().as_deref() == Some(content.as_str()) {
            debug!("[BoardStore::reload_if_external] Event was our own write");
            return false;
        }

        let board = markdown::parse_board(&content);
        info!("[BoardStore::reload_if_external] External edit, reloaded {} tasks", board.len());
        *self.inner.state.write() = board;
        self.inner.loaded.store(true, Ordering::Release);
        self.notify();
        true
    }

    // ============================================
    // SAVE
    // ============================================

    pub fn is_saving(&self) -> bool {
        *self.inner.save_state.lock() != SaveState::Idle
    }

    pub fn save_state(&self) -> SaveState {
        *self.inner.save_state.lock()
    }

    /// Claim the save slot and serialize the current board, or mark the
    /// in-flight save stale and return `None`.
    fn begin_save(&self) -> Option<String> {
        {
            let mut save = self.inner.save_state.lock();
            if *save != SaveState::Idle {
                *save = SaveState::InFlightStale;
                debug!("[BoardStore::save] Save already in flight, dropping request");
                return None;
            }
            *save = SaveState::InFlight;
            self.inner.lagging.store(false, Ordering::Release);
        }
        let board = self.inner.state.read();
        Some(markdown::serialize_board(&board, self.today()))
    }

    /// Write the board now, unless a save is already in flight
    pub async fn save(&self) -> SaveOutcome {
        match self.begin_save() {
            Some(content) => self.inner.write_board(content).await,
            None => SaveOutcome::Dropped,
        }
    }

    /// Fire-and-forget save on the ambient tokio runtime
    fn request_save(&self) {
        let Some(content) = self.begin_save() else {
            return;
        };

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!("[BoardStore::save] No async runtime, board not persisted");
            *self.inner.save_state.lock() = SaveState::Idle;
            return;
        };

        let inner = Arc::clone(&self.inner);
        let handle = runtime.spawn(async move {
            inner.write_board(content).await;
        });
        *self.inner.pending_save.lock() = Some(handle);
    }

    /// Wait for the save spawned by the latest mutation to finish
    pub async fn settle(&self) {
        loop {
            let handle = self.inner.pending_save.lock().take();
            match handle {
                Some(handle) => {
                    if let Err(err) = handle.await {
                        warn!("[BoardStore::settle] Save task failed: {}", err);
                    }
                }
                None => break,
            }
        }
    }

    /// Settle, then write once more if a save was dropped along the way, so
    /// the file matches the board. Used before the process exits.
    pub async fn flush(&self) {
        self.settle().await;
        if self.inner.lagging.load(Ordering::Acquire) {
            self.save().await;
        }
    }

    // ============================================
    // MUTATIONS
    // ============================================

    /// Append to the end of the task's column
    pub fn add_task(&self, task: Task) {
        debug!("[BoardStore::add_task] {} -> {}", task.id, task.column);
        {
            let mut board = self.inner.state.write();
            board.column_mut(task.column).push(task);
        }
        self.changed();
    }

    /// Remove the first task with `id`; notifies and saves even when absent
    pub fn delete_task(&self, id: &str) -> bool {
        let removed = {
            let mut board = self.inner.state.write();
            match board.position(id) {
                Some((col, idx)) => {
                    board.column_mut(col).remove(idx);
                    true
                }
                None => false,
            }
        };
        debug!("[BoardStore::delete_task] {} removed={}", id, removed);
        self.changed();
        removed
    }

    /// Merge `patch` into the first task with `id`; notifies and saves even
    /// when absent
    pub fn update_task(&self, id: &str, patch: TaskPatch) -> bool {
        let found = {
            let mut board = self.inner.state.write();
            match board.find_mut(id) {
                Some(task) => {
                    patch.apply(task);
                    true
                }
                None => false,
            }
        };
        debug!("[BoardStore::update_task] {} found={}", id, found);
        self.changed();
        found
    }

    /// Move a task to `to`, inserting at `index` (clamped) or appending.
    /// Unknown ids change nothing and trigger no notification.
    pub fn move_task(&self, id: &str, to: Column, index: Option<usize>) -> bool {
        {
            let mut board = self.inner.state.write();
            let Some((from, idx)) = board.position(id) else {
                debug!("[BoardStore::move_task] {} not found", id);
                return false;
            };
            let mut task = board.column_mut(from).remove(idx);
            task.column = to;
            let dest = board.column_mut(to);
            match index {
                Some(i) => dest.insert(i.min(dest.len()), task),
                None => dest.push(task),
            }
        }
        debug!("[BoardStore::move_task] {} -> {} at {:?}", id, to, index);
        self.changed();
        true
    }

    /// Once per calendar day: unfinished Today tasks go to the front of Next
    /// in their current order. Returns whether the board changed.
    pub fn perform_daily_reset(&self) -> bool {
        let today = self.today();
        if self.inner.settings.read().last_reset_date == Some(today) {
            debug!("[BoardStore::perform_daily_reset] Already ran for {}", today);
            return false;
        }

        let carried = {
            let mut board = self.inner.state.write();
            let (kept, mut carried): (Vec<Task>, Vec<Task>) = std::mem::take(&mut board.today)
                .into_iter()
                .partition(|t| t.status == TaskStatus::Completed);
            for task in &mut carried {
                task.column = Column::Next;
            }
            let count = carried.len();
            carried.append(&mut board.next);
            board.today = kept;
            board.next = carried;
            count
        };

        self.inner.settings.write().last_reset_date = Some(today);
        info!("[BoardStore::perform_daily_reset] Carried {} tasks into Next", carried);
        self.changed();
        true
    }
}

impl StoreInner {
    async fn write_board(&self, content: String) -> SaveOutcome {
        let result = async {
            if let Some(parent) = self.path.parent() {
                self.files.ensure_folder(parent).await?;
            }
            self.files.write_text(&self.path, &content).await
        }
        .await;

        let outcome = match result {
            Ok(()) => {
                debug!("[BoardStore::save] Wrote {} bytes to {:?}", content.len(), self.path);
                *self.last_written.lock() = Some(content);
                SaveOutcome::Written
            }
            Err(err) => {
                warn!("[BoardStore::save] Failed to write {:?}: {}", self.path, err);
                SaveOutcome::Failed
            }
        };

        let mut save = self.save_state.lock();
        if *save == SaveState::InFlightStale {
            debug!("[BoardStore::save] Requests were dropped during this write; file lags until the next save");
            self.lagging.store(true, Ordering::Release);
        }
        *save = SaveState::Idle;
        outcome
    }
}
