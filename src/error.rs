// Error type shared by storage, settings and the command layer
// The board codec and store never fail; only the outer layers surface these

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalogError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Config(String),

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("file watcher: {0}")]
    Watch(#[from] notify::Error),
}

impl AnalogError {
    pub fn invalid_input<M: Into<String>>(message: M) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn not_found<M: Into<String>>(message: M) -> Self {
        Self::NotFound(message.into())
    }

    pub fn config<M: Into<String>>(message: M) -> Self {
        Self::Config(message.into())
    }

    pub fn io<C: Into<String>>(context: C, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Stable machine-readable code, printed by the front end
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "invalid_input",
            Self::NotFound(_) => "not_found",
            Self::Config(_) => "config_error",
            Self::Io { .. } => "io_error",
            Self::Watch(_) => "watch_error",
        }
    }
}

pub type Result<T> = std::result::Result<T, AnalogError>;
