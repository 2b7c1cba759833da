use anyhow::{Result, bail};
use std::path::PathBuf;

use ahash::AHashSet;
use tracing::debug;

use crate::engine::suggest::{self, ProgressSink};
use crate::error::{ErrorCode, ReviewError};
use crate::git::{self, GitHistoryProvider};
use crate::models::suggestion::Recommendation;

// ---------------------------------------------------------------------------
// AppService: unified core logic for CLI / Session
// ---------------------------------------------------------------------------

pub struct AppService;

/// Parameters for a reviewer suggestion run.
pub struct SuggestParams<'a> {
    /// Git repository directory
    pub dir: &'a str,
    /// Explicit file list; when absent, files come from git diff resolution
    pub paths: Option<Vec<String>>,
    /// Base ref for git diff resolution
    pub base: &'a str,
    /// Diff the index instead of the work tree
    pub staged: bool,
    /// Revisions to look back per file
    pub history_depth: usize,
    /// Max candidate authors per file
    pub candidate_limit: usize,
    /// Author identities to exclude
    pub exclude: Vec<String>,
    /// Keep the caller's own identity in the candidate pool
    pub include_self: bool,
}

impl Default for AppService {
    fn default() -> Self {
        Self::new()
    }
}

impl AppService {
    pub fn new() -> Self {
        Self
    }

    /// Suggest a minimal reviewer set for the run described by `params`.
    ///
    /// Resolves the changed-file list, assembles the exclusion set (the
    /// caller's own identity is excluded unless `include_self`), and hands
    /// the batch to the recommendation engine.
    pub fn suggest(
        &self,
        params: &SuggestParams<'_>,
        progress: &dyn ProgressSink,
    ) -> Result<Recommendation> {
        debug!(
            dir = params.dir,
            base = params.base,
            staged = params.staged,
            history_depth = params.history_depth,
            candidate_limit = params.candidate_limit,
            explicit_paths = params.paths.as_ref().map(|p| p.len()),
            "suggest called"
        );

        if params.history_depth == 0 {
            bail!(ReviewError::new(
                ErrorCode::InvalidRequest,
                "history depth must be at least 1",
            ));
        }
        if params.candidate_limit == 0 {
            bail!(ReviewError::new(
                ErrorCode::InvalidRequest,
                "candidate limit must be at least 1",
            ));
        }

        let canonical = self.validate_dir(params.dir)?;
        git::ensure_worktree(&canonical)?;

        let files = match &params.paths {
            Some(list) => list.clone(),
            None => git::changed_files(&canonical, params.base, params.staged)?,
        };
        if files.is_empty() {
            bail!(ReviewError::new(
                ErrorCode::InvalidRequest,
                "No changed files to analyze",
            ));
        }

        let mut excluded: AHashSet<String> = params.exclude.iter().cloned().collect();
        if !params.include_self
            && let Some(me) = git::self_identity(&canonical)
        {
            if let Some((name, email)) = git::split_identity(&me) {
                excluded.insert(name.to_string());
                excluded.insert(email.to_string());
            }
            excluded.insert(me);
        }

        let provider = GitHistoryProvider::new(
            canonical,
            excluded,
            params.history_depth,
            params.candidate_limit,
        );
        let recommendation =
            suggest::recommend(&files, &provider, params.candidate_limit, progress);

        debug!(
            files = recommendation.files_analyzed,
            reviewers = recommendation.reviewers.len(),
            uncovered = recommendation.uncovered.len(),
            "suggest completed"
        );
        Ok(recommendation)
    }

    /// Validate and canonicalize a directory path.
    fn validate_dir(&self, dir: &str) -> Result<PathBuf> {
        let canonical = std::fs::canonicalize(dir).map_err(|_| {
            ReviewError::new(
                ErrorCode::FileNotFound,
                format!("Directory not found: {dir}"),
            )
        })?;
        Ok(canonical)
    }
}
