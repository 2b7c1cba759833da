use serde::{Deserialize, Serialize};

/// One reviewer and the changed files assigned to them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewerAssignment {
    pub reviewer: String,
    pub files: Vec<String>,
}

/// One candidate author's history against a single file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateScore {
    pub author: String,
    /// Commits by this author within the history window
    pub commits: u64,
    /// Normalized familiarity: commits / top commit count for the file
    pub score: f64,
}

/// Per-file candidate breakdown, in descending commit-count order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileCandidates {
    pub file: String,
    pub candidates: Vec<CandidateScore>,
}

/// The response envelope for the suggest command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub files_analyzed: usize,
    pub reviewers: Vec<ReviewerAssignment>,
    /// Files no candidate author has any recorded affinity for
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub uncovered: Vec<String>,
    /// Full file → author → score table; stripped unless requested
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub detail: Vec<FileCandidates>,
}
