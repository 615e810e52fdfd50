use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub type Result<T, E = AppError> = std::result::Result<T, E>;

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum AppError {
    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("TOML Parsing Error: {0}")]
    TomlParse(String),

    #[error("TOML Serialization Error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Filesystem Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File Read Error: Path '{path}', Error: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("File Write Error: Path '{path}', Error: {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Decode Error: '{path}' is not valid UTF-8 text")]
    Decode { path: PathBuf },

    #[error("Glob Pattern Error: {0}")]
    Glob(String),

    #[error("Invalid Argument: {0}")]
    InvalidArgument(String),

    #[error("Duration Parsing Error: {0}")]
    DurationParse(String),

    #[error("Not a git repository: '{}'", .0.display())]
    NotARepository(PathBuf),

    #[error("No changes to commit.")]
    NoChanges,

    #[error("No staged changes. Stage your changes with 'git add' first.")]
    NothingStaged,

    #[error("git {subcommand} failed: {message}")]
    ToolInvocationFailed { subcommand: String, message: String },

    #[error("git {subcommand} timed out after {timeout:?}")]
    ToolTimeout {
        subcommand: String,
        timeout: Duration,
    },
}

impl AppError {
    pub fn tool(subcommand: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::ToolInvocationFailed {
            subcommand: subcommand.into(),
            message: message.into(),
        }
    }
}

impl From<globset::Error> for AppError {
    fn from(err: globset::Error) -> Self {
        AppError::Glob(format!("Globset error: {}", err))
    }
}
