use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("failed to launch `{program}`: {source}")]
    Launch {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("a command is already running")]
    Busy,
    #[error("invocation has no program")]
    EmptyCommand,
}

impl RunnerError {
    pub(crate) fn launch(program: impl Into<String>, source: io::Error) -> Self {
        Self::Launch {
            program: program.into(),
            source,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to write settings to {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to serialize settings: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("no configuration directory available on this platform")]
    NoConfigDir,
    #[error("unknown settings key `{0}`")]
    UnknownKey(String),
    #[error("invalid value for `{key}`: {message}")]
    InvalidValue { key: String, message: String },
}

#[derive(Debug, Error)]
pub enum TerminalError {
    #[error("no terminal emulator found")]
    NoEmulator,
    #[error("failed to spawn terminal: {0}")]
    Spawn(#[from] io::Error),
}
