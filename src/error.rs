//! Error types for sdkgen

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// sdkgen errors
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed catalog file or catalog node; `path` names the offending key path
    #[error("Config error at {path}: {message}")]
    Config { path: String, message: String },

    #[error("Duplicate namespace '{namespace}' produced by {first} and {second}")]
    DuplicateNamespace {
        namespace: String,
        first: String,
        second: String,
    },

    #[error("Duplicate task name '{0}'")]
    DuplicateTask(String),

    #[error("Unknown task: {0}")]
    UnknownTask(String),

    #[error("Missing setting: {0}")]
    MissingSetting(String),

    #[error("Generation failed for {task}:\n{output}")]
    Generation { task: String, output: String },

    #[error("{stage} failed for {task} ({status}):\n{output}")]
    Tool {
        task: String,
        stage: String,
        status: String,
        output: String,
    },

    #[error("{} of {total} task(s) failed: {}", failed.len(), failed.join(", "))]
    Bulk { failed: Vec<String>, total: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_norway::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl Error {
    pub fn config(path: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Config {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Other(s.to_string())
    }
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Other(s)
    }
}
