use ahash::AHashSet;

/// Coverage data for the greedy solver.
///
/// The solver is not tied to any particular data source; it only needs the
/// elements a group can cover and the score that group would contribute
/// toward a candidate set of still-uncovered elements.
pub trait Coverage {
    /// The group's full footprint: every element it can cover.
    fn covered(&self, group: &str) -> AHashSet<String>;

    /// The group's score restricted to `remaining`. Must be `0.0` for an
    /// unknown group or a disjoint candidate set.
    fn gain(&self, group: &str, remaining: &AHashSet<String>) -> f64;
}

/// Result of a greedy cover: chosen groups in selection order, plus the
/// elements no group could cover.
#[derive(Debug, Clone, PartialEq)]
pub struct Cover {
    pub chosen: Vec<String>,
    pub uncovered: AHashSet<String>,
}

/// Greedy weighted set cover.
///
/// Each round picks the group with the strictly highest gain over the
/// remaining elements; equal gains are resolved in favor of the group that
/// comes first in `groups`, which fixes the tie-break deterministically.
/// The chosen group's ENTIRE footprint is then consumed, not just the
/// elements that contributed to its gain. A best gain of zero ends the
/// solve; whatever is left over is uncovered.
///
/// Greedy is final here: no backtracking, no re-optimization. Terminates in
/// at most `groups.len()` rounds.
pub fn solve(universe: &AHashSet<String>, groups: &[String], data: &impl Coverage) -> Cover {
    let mut remaining = universe.clone();
    let mut available: Vec<&String> = groups.iter().collect();
    let mut chosen = Vec::new();

    while !remaining.is_empty() && !available.is_empty() {
        let mut best_idx = None;
        let mut best_gain = 0.0_f64;
        for (idx, group) in available.iter().enumerate() {
            let gain = data.gain(group.as_str(), &remaining);
            if gain > best_gain {
                best_gain = gain;
                best_idx = Some(idx);
            }
        }

        // Nothing left that any group can cover.
        let Some(idx) = best_idx else { break };

        let group = available.remove(idx);
        for element in data.covered(group) {
            remaining.remove(&element);
        }
        chosen.push(group.clone());
    }

    Cover {
        chosen,
        uncovered: remaining,
    }
}
