// Filesystem-based storage layer for the analog board
// Settings live in a markdown file with YAML frontmatter; boards are plain markdown

use async_trait::async_trait;
use chrono::NaiveDate;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::error::{AnalogError, Result};
use crate::markdown::{self, parse_frontmatter, to_markdown};
use crate::models::AnalogSettings;

pub const CONFIG_PATH_ENV: &str = "ANALOG_CONFIG_PATH";

// ============================================
// PATH HELPERS
// ============================================

/// Global config directory (~/.analog/)
pub fn global_config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".analog")
}

/// Global config file path, honouring `ANALOG_CONFIG_PATH`
pub fn global_config_path() -> PathBuf {
    match std::env::var_os(CONFIG_PATH_ENV) {
        Some(path) if !path.is_empty() => PathBuf::from(path),
        _ => global_config_dir().join("config.md"),
    }
}

/// Board file for the given vault directory
pub fn board_path(vault: &Path, settings: &AnalogSettings) -> PathBuf {
    vault.join(&settings.file_path)
}

// ============================================
// SETTINGS
// ============================================

const CONFIG_BODY: &str = "# Analog\n\nBoard settings are kept in the frontmatter above.\n";

/// Load settings; a missing or unreadable config yields defaults
pub fn load_settings(path: &Path) -> AnalogSettings {
    debug!("[load_settings] Config path: {:?}", path);

    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            debug!("[load_settings] Config file does not exist, using defaults");
            return AnalogSettings::default();
        }
        Err(err) => {
            warn!("[load_settings] Failed to read {:?}: {}", path, err);
            return AnalogSettings::default();
        }
    };

    match parse_frontmatter::<AnalogSettings>(&content) {
        Some((settings, _body)) => settings,
        None => {
            warn!("[load_settings] Failed to parse frontmatter in {:?}, using defaults", path);
            AnalogSettings::default()
        }
    }
}

pub fn save_settings(path: &Path, settings: &AnalogSettings) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| AnalogError::io(format!("creating {}", parent.display()), e))?;
    }

    let content = to_markdown(settings, CONFIG_BODY).map_err(|e| AnalogError::config(format!("YAML error: {e}")))?;
    fs::write(path, content).map_err(|e| AnalogError::io(format!("writing {}", path.display()), e))?;
    debug!("[save_settings] Wrote {:?}", path);
    Ok(())
}

// ============================================
// BOARD FILES
// ============================================

/// File primitives the board store is built on
#[async_trait]
pub trait BoardFiles: Send + Sync {
    /// `None` when the file does not exist
    async fn read_text(&self, path: &Path) -> std::io::Result<Option<String>>;

    async fn write_text(&self, path: &Path, content: &str) -> std::io::Result<()>;

    async fn ensure_folder(&self, path: &Path) -> std::io::Result<()>;
}

/// Local filesystem through tokio::fs
#[derive(Debug, Default, Clone, Copy)]
pub struct FsBoardFiles;

#[async_trait]
impl BoardFiles for FsBoardFiles {
    async fn read_text(&self, path: &Path) -> std::io::Result<Option<String>> {
        match tokio::fs::read_to_string(path).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn write_text(&self, path: &Path, content: &str) -> std::io::Result<()> {
        tokio::fs::write(path, content).await
    }

    async fn ensure_folder(&self, path: &Path) -> std::io::Result<()> {
        if path.as_os_str().is_empty() {
            return Ok(());
        }
        tokio::fs::create_dir_all(path).await
    }
}

/// Create an empty board document. Appends `.md` when missing and never
/// overwrites an existing file; returns the final path.
pub async fn create_board_file(files: &dyn BoardFiles, path: &Path, date: NaiveDate) -> Result<PathBuf> {
    let path = if path.extension().is_some_and(|ext| ext == "md") {
        path.to_path_buf()
    } else {
        let mut name = path.as_os_str().to_os_string();
        name.push(".md");
        PathBuf::from(name)
    };

    if let Some(parent) = path.parent() {
        files
            .ensure_folder(parent)
            .await
            .map_err(|e| AnalogError::io(format!("creating {}", parent.display()), e))?;
    }

    let existing = files
        .read_text(&path)
        .await
        .map_err(|e| AnalogError::io(format!("reading {}", path.display()), e))?;
    if existing.is_some() {
        info!("[create_board_file] {:?} already exists, leaving it untouched", path);
        return Ok(path);
    }

    files
        .write_text(&path, &markdown::new_board_document(date))
        .await
        .map_err(|e| AnalogError::io(format!("writing {}", path.display()), e))?;
    info!("[create_board_file] Created {:?}", path);
    Ok(path)
}
