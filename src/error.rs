use thiserror::Error;

pub type Result<T> = std::result::Result<T, LintError>;

#[derive(Error, Debug)]
pub enum LintError {
    #[error("Parse error in {file}: {message}")]
    Parse { file: String, message: String },

    #[error("Issue '{0}' is already registered")]
    DuplicateIssue(String),

    #[error("Invalid issue ({id}): {message}")]
    InvalidIssue { id: String, message: String },

    #[error("Detector {detector} declares a callback its scope never reaches: {message}")]
    ScopeMismatch { detector: String, message: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Output error: {0}")]
    Output(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl LintError {
    pub fn exit_code(&self) -> i32 {
        2
    }

    pub(crate) fn parse(file: &std::path::Path, message: impl Into<String>) -> Self {
        Self::Parse {
            file: file.display().to_string(),
            message: message.into(),
        }
    }
}
