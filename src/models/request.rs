use serde::{Deserialize, Serialize};

/// A request to the review-sight engine over the session stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRequest {
    pub command: Command,
    /// Git repository directory (default: current directory)
    #[serde(default = "default_dir")]
    pub dir: String,
    /// Explicit file list; skips git diff resolution
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paths: Option<Vec<String>>,
    /// Base ref for git diff resolution
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base: Option<String>,
    /// Use staged changes (git diff --cached)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub staged: Option<bool>,
    /// Revisions to look back per file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub depth: Option<usize>,
    /// Max candidate authors per file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
    /// Author identities to exclude
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclude: Option<Vec<String>>,
    /// Consider the caller's own identity as a candidate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_self: Option<bool>,
    /// Include the per-file per-author score table
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<bool>,
}

fn default_dir() -> String {
    ".".to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Command {
    Suggest,
    Doctor,
}
