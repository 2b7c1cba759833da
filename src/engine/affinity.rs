use ahash::{AHashMap, AHashSet};

use crate::engine::cover::Coverage;

/// Normalized per-author, per-file familiarity scores.
///
/// Arena-style mapping keyed by author then file; every stored score lies in
/// `(0, 1]`. Recording a non-positive score deletes the entry instead, so the
/// matrix never carries zero-weight pairs. The order in which authors first
/// appear is retained and serves as the canonical tie-break order for the
/// solver.
///
/// Mutated only during history ingestion; read-only while solving.
#[derive(Debug, Default)]
pub struct AffinityMatrix {
    scores: AHashMap<String, AHashMap<String, f64>>,
    order: Vec<String>,
}

impl AffinityMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the score for `(author, file)`.
    ///
    /// A score of zero or less removes any existing entry for the pair.
    pub fn record(&mut self, author: &str, file: &str, score: f64) {
        if score > 0.0 {
            if !self.scores.contains_key(author) {
                self.order.push(author.to_string());
            }
            self.scores
                .entry(author.to_string())
                .or_default()
                .insert(file.to_string(), score);
        } else if let Some(files) = self.scores.get_mut(author) {
            files.remove(file);
        }
    }

    /// Score for a single pair; `0.0` when no entry exists.
    pub fn score_for(&self, author: &str, file: &str) -> f64 {
        self.scores
            .get(author)
            .and_then(|files| files.get(file))
            .copied()
            .unwrap_or(0.0)
    }

    /// Files the author has a positive-score entry for; empty for unknown
    /// authors.
    pub fn files_covered_by(&self, author: &str) -> AHashSet<String> {
        self.scores
            .get(author)
            .map(|files| files.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Sum of the author's scores restricted to `candidates`.
    ///
    /// Returns `0.0` for an empty candidate set, a candidate set disjoint
    /// from the author's files, or an unknown author.
    pub fn total_score(&self, author: &str, candidates: &AHashSet<String>) -> f64 {
        let Some(files) = self.scores.get(author) else {
            return 0.0;
        };
        candidates
            .iter()
            .map(|f| files.get(f).copied().unwrap_or(0.0))
            .sum()
    }

    /// Authors in order of first appearance.
    pub fn authors(&self) -> &[String] {
        &self.order
    }
}

impl Coverage for AffinityMatrix {
    fn covered(&self, group: &str) -> AHashSet<String> {
        self.files_covered_by(group)
    }

    fn gain(&self, group: &str, remaining: &AHashSet<String>) -> f64 {
        self.total_score(group, remaining)
    }
}
