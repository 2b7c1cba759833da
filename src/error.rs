use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    GitError,
    NotARepository,
    FileNotFound,
    IoError,
    InvalidRequest,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GitError => write!(f, "GIT_ERROR"),
            Self::NotARepository => write!(f, "NOT_A_REPOSITORY"),
            Self::FileNotFound => write!(f, "FILE_NOT_FOUND"),
            Self::IoError => write!(f, "IO_ERROR"),
            Self::InvalidRequest => write!(f, "INVALID_REQUEST"),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ReviewError {
    pub code: ErrorCode,
    pub message: String,
}

impl fmt::Display for ReviewError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for ReviewError {}

impl ReviewError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn not_a_repository(dir: &str) -> Self {
        Self::new(
            ErrorCode::NotARepository,
            format!("Not a git work tree: {dir}"),
        )
    }

    pub fn file_not_found(path: &str) -> Self {
        Self::new(ErrorCode::FileNotFound, format!("File not found: {path}"))
    }
}

/// Map any error to a (code, message) pair for the JSON error envelope.
pub fn classify(e: &anyhow::Error) -> (String, String) {
    match e.downcast_ref::<ReviewError>() {
        Some(re) => (re.code.to_string(), re.message.clone()),
        None => (ErrorCode::IoError.to_string(), e.to_string()),
    }
}
