use std::sync::atomic::{AtomicUsize, Ordering};

use ahash::AHashSet;
use rayon::prelude::*;
use tracing::debug;

use crate::engine::affinity::AffinityMatrix;
use crate::engine::cover;
use crate::models::suggestion::{
    CandidateScore, FileCandidates, Recommendation, ReviewerAssignment,
};

/// Raw per-file authorship history.
///
/// Implementations yield one line per candidate author in the shape
/// "count, then identity", sorted by descending count, already filtered for
/// excluded authors and capped by the producer. A failed lookup is reported
/// as an empty list, never an error; lines that do not parse are tolerated
/// downstream.
pub trait HistoryProvider: Sync {
    fn history_lines(&self, file: &str) -> Vec<String>;
}

/// Receives ingestion progress: `completed` files fetched out of `total`.
pub trait ProgressSink: Sync {
    fn on_progress(&self, completed: usize, total: usize);
}

/// Sink that reports nothing.
pub struct SilentProgress;

impl ProgressSink for SilentProgress {
    fn on_progress(&self, _completed: usize, _total: usize) {}
}

/// Recommend a minimal-ish reviewer set for `files`.
///
/// For each distinct file, history lines are fetched from the provider
/// (concurrently; results are re-ordered to input order before ingestion),
/// parsed, normalized against the file's own top commit count, and recorded
/// into an [`AffinityMatrix`]. The greedy cover over files-as-elements /
/// authors-as-groups then yields the reviewer set; assignments are replayed
/// over the universe so every covered file belongs to exactly one reviewer.
///
/// At most `candidate_limit` records are ingested per file even if the
/// provider over-delivers.
pub fn recommend(
    files: &[String],
    provider: &impl HistoryProvider,
    candidate_limit: usize,
    progress: &dyn ProgressSink,
) -> Recommendation {
    let mut seen = AHashSet::new();
    let universe: Vec<String> = files
        .iter()
        .filter(|f| seen.insert(f.as_str()))
        .cloned()
        .collect();
    let total = universe.len();
    debug!(files = total, "recommend started");
    progress.on_progress(0, total);

    // History retrieval is independent per file; overlap the fetch I/O and
    // ingest sequentially afterwards so scores stay order-exact.
    let done = AtomicUsize::new(0);
    let histories: Vec<Vec<String>> = universe
        .par_iter()
        .map(|file| {
            let lines = provider.history_lines(file);
            let completed = done.fetch_add(1, Ordering::Relaxed) + 1;
            progress.on_progress(completed, total);
            lines
        })
        .collect();

    let mut matrix = AffinityMatrix::new();
    let mut detail = Vec::with_capacity(total);
    for (file, lines) in universe.iter().zip(&histories) {
        let records: Vec<(u64, String)> = lines
            .iter()
            .filter_map(|line| parse_record(line))
            .take(candidate_limit)
            .collect();

        let mut candidates = Vec::with_capacity(records.len());
        if let Some(&(top, _)) = records.first() {
            // The provider sorts descending, so the first surviving record
            // carries the file's top commit count.
            let top = top as f64;
            for (count, author) in &records {
                let score = *count as f64 / top;
                matrix.record(author, file, score);
                candidates.push(CandidateScore {
                    author: author.clone(),
                    commits: *count,
                    score,
                });
            }
        }
        detail.push(FileCandidates {
            file: file.clone(),
            candidates,
        });
    }

    let universe_set: AHashSet<String> = universe.iter().cloned().collect();
    let solution = cover::solve(&universe_set, matrix.authors(), &matrix);

    // Replay the selection over universe order: each file goes to the first
    // chosen reviewer whose footprint contains it, mirroring the solver's
    // footprint removal.
    let mut assigned: AHashSet<&str> = AHashSet::new();
    let mut reviewers = Vec::with_capacity(solution.chosen.len());
    for reviewer in &solution.chosen {
        let files: Vec<String> = universe
            .iter()
            .filter(|f| matrix.score_for(reviewer, f.as_str()) > 0.0 && assigned.insert(f.as_str()))
            .cloned()
            .collect();
        reviewers.push(ReviewerAssignment {
            reviewer: reviewer.clone(),
            files,
        });
    }

    let uncovered: Vec<String> = universe
        .iter()
        .filter(|f| solution.uncovered.contains(*f))
        .cloned()
        .collect();

    debug!(
        files = total,
        reviewers = reviewers.len(),
        uncovered = uncovered.len(),
        "recommend completed"
    );
    Recommendation {
        files_analyzed: total,
        reviewers,
        uncovered,
        detail,
    }
}

/// Parse one history line of the shape "«count» «identity»".
///
/// Returns `None` for anything else — counts that are missing, zero, or
/// non-numeric, and empty identities. Garbled external command output is
/// skipped, not surfaced.
fn parse_record(line: &str) -> Option<(u64, String)> {
    let (count_token, rest) = line.trim().split_once(char::is_whitespace)?;
    let count: u64 = count_token.parse().ok()?;
    if count == 0 {
        return None;
    }
    let identity = rest.trim();
    if identity.is_empty() {
        return None;
    }
    Some((count, identity.to_string()))
}
