use std::path::{Path, PathBuf};
use std::process::Command;

use ahash::{AHashMap, AHashSet};
use anyhow::{Result, bail};
use tracing::warn;

use crate::engine::suggest::HistoryProvider;
use crate::error::{ErrorCode, ReviewError};

/// Verify that `dir` lies inside a git work tree.
pub fn ensure_worktree(dir: &Path) -> Result<()> {
    let output = Command::new("git")
        .args(["rev-parse", "--is-inside-work-tree"])
        .current_dir(dir)
        .output()
        .map_err(|e| ReviewError::new(ErrorCode::GitError, format!("Failed to run git: {e}")))?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    if !output.status.success() || stdout.trim() != "true" {
        bail!(ReviewError::not_a_repository(&dir.display().to_string()));
    }
    Ok(())
}

/// Changed files from `git diff --name-only`, in diff order.
///
/// - `base`: the ref to diff against
/// - `staged`: diff the index instead of the work tree
pub fn changed_files(dir: &Path, base: &str, staged: bool) -> Result<Vec<String>> {
    let mut args = vec!["diff", "--name-only"];
    if staged {
        args.push("--cached");
    }
    args.push(base);

    let output = Command::new("git")
        .args(&args)
        .current_dir(dir)
        .output()
        .map_err(|e| ReviewError::new(ErrorCode::GitError, format!("Failed to run git: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!(ReviewError::new(
            ErrorCode::GitError,
            format!("git diff failed: {}", stderr.trim()),
        ));
    }

    Ok(String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

/// The configured git identity as "Name <email>", if any.
///
/// Falls back to whichever half is set when the other is missing.
pub fn self_identity(dir: &Path) -> Option<String> {
    let name = config_value(dir, "user.name");
    let email = config_value(dir, "user.email");
    match (name, email) {
        (Some(n), Some(e)) => Some(format!("{n} <{e}>")),
        (Some(n), None) => Some(n),
        (None, Some(e)) => Some(e),
        (None, None) => None,
    }
}

fn config_value(dir: &Path, key: &str) -> Option<String> {
    let output = Command::new("git")
        .args(["config", "--get", key])
        .current_dir(dir)
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let value = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (!value.is_empty()).then_some(value)
}

/// Split "Name <email>" into its parts.
pub(crate) fn split_identity(identity: &str) -> Option<(&str, &str)> {
    let open = identity.rfind('<')?;
    let close = identity.rfind('>')?;
    if close <= open {
        return None;
    }
    Some((identity[..open].trim(), &identity[open + 1..close]))
}

fn is_excluded(identity: &str, excluded: &AHashSet<String>) -> bool {
    if excluded.contains(identity) {
        return true;
    }
    if let Some((name, email)) = split_identity(identity) {
        return excluded.contains(name) || excluded.contains(email);
    }
    false
}

/// Count commits per author identity from raw `git log --format="%aN <%aE>"`
/// output: excluded identities dropped, sorted descending by count (count
/// ties keep first appearance in the log), capped at `limit`.
pub(crate) fn tally_authors<'a>(
    lines: impl Iterator<Item = &'a str>,
    excluded: &AHashSet<String>,
    limit: usize,
) -> Vec<(u64, String)> {
    let mut counts: AHashMap<String, u64> = AHashMap::new();
    let mut order: Vec<String> = Vec::new();
    for line in lines {
        let identity = line.trim();
        if identity.is_empty() || is_excluded(identity, excluded) {
            continue;
        }
        match counts.get_mut(identity) {
            Some(count) => *count += 1,
            None => {
                counts.insert(identity.to_string(), 1);
                order.push(identity.to_string());
            }
        }
    }

    let mut tallied: Vec<(u64, String)> = order
        .into_iter()
        .map(|identity| (counts[&identity], identity))
        .collect();
    // Stable sort: equal counts keep log order.
    tallied.sort_by(|a, b| b.0.cmp(&a.0));
    tallied.truncate(limit);
    tallied
}

/// Fetches per-file authorship history by shelling out to `git log`.
///
/// Emits one "«count»\t«identity»" line per candidate author, descending by
/// commit count, excluded identities dropped, capped at the candidate limit.
/// A failing git invocation is logged and reported as no history, so a
/// single unreadable file never aborts the run.
pub struct GitHistoryProvider {
    dir: PathBuf,
    excluded: AHashSet<String>,
    history_depth: usize,
    candidate_limit: usize,
}

impl GitHistoryProvider {
    pub fn new(
        dir: PathBuf,
        excluded: AHashSet<String>,
        history_depth: usize,
        candidate_limit: usize,
    ) -> Self {
        Self {
            dir,
            excluded,
            history_depth,
            candidate_limit,
        }
    }
}

impl HistoryProvider for GitHistoryProvider {
    fn history_lines(&self, file: &str) -> Vec<String> {
        let output = Command::new("git")
            .args(["log", "--no-merges", "--format=%aN <%aE>"])
            .arg(format!("--max-count={}", self.history_depth))
            .arg("--")
            .arg(file)
            .current_dir(&self.dir)
            .output();

        let output = match output {
            Ok(out) if out.status.success() => out,
            Ok(out) => {
                let stderr = String::from_utf8_lossy(&out.stderr);
                warn!(file, stderr = %stderr.trim(), "git log failed");
                return Vec::new();
            }
            Err(e) => {
                warn!(file, error = %e, "failed to run git log");
                return Vec::new();
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout);
        tally_authors(stdout.lines(), &self.excluded, self.candidate_limit)
            .into_iter()
            .map(|(count, identity)| format!("{count}\t{identity}"))
            .collect()
    }
}
