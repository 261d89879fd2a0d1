// Analog board - markdown-backed Today / Next / Someday task board
// The markdown module maps the board file to BoardState and back; BoardStore
// owns the live board and persists mutations; BoardWatcher reloads on outside edits

pub mod app;
pub mod cli;
pub mod commands;
pub mod error;
pub mod format;
pub mod markdown;
pub mod models;
pub mod storage;
pub mod store;
pub mod watcher;

use tracing_subscriber::EnvFilter;

pub use error::{AnalogError, Result};

pub const LOG_ENV: &str = "ANALOG_LOG";

/// Log to stderr, filtered by `ANALOG_LOG` (default `warn`); `verbose`
/// forces `debug`
pub fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Run one command line
pub async fn run(cli: cli::Cli) -> anyhow::Result<()> {
    let app = app::App::new(&cli);
    app.run(cli.command).await?;
    Ok(())
}
