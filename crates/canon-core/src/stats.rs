//! Execution statistics accumulated by the search engine.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Counters describing one canonicalization run.
///
/// Every counter is advisory: none feeds back into the search. The duration
/// covers the traversal only, not graph construction or parsing.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statistics {
    /// Refinement passes, including the root refinement.
    pub refinements: u64,
    /// Discrete partitions reached.
    pub leaves_visited: u64,
    /// Times the best leaf was replaced after the first.
    pub best_leaf_updates: u64,
    /// Leaves strictly worse than both stored leaves.
    pub bad_leaves: u64,
    /// Deepest level the traversal reached.
    pub max_level: usize,
    /// Children removed by orbit (MCR) pruning.
    pub pruned_by_automorphism: u64,
    /// Subtrees cut by the node-invariant comparison.
    pub pruned_by_invariant: u64,
    /// Siblings dropped by the implicit-automorphism shortcut.
    pub pruned_by_implicit: u64,
    /// Automorphism generators discovered at equivalent leaves.
    pub automorphisms_found: u64,
    /// Calls to backtrack, including the terminating one.
    pub backtracks: u64,
    /// Target cells selected (= interior nodes first visited).
    pub target_cells_selected: u64,
    /// Wall-clock time of the traversal.
    pub duration: Duration,
}

impl Statistics {
    /// The traversal duration in `h/m/s/ms/µs` form, leading zero units
    /// omitted, microseconds shown only for sub-millisecond runs.
    pub fn pretty_time(&self) -> String {
        let total = self.duration;
        let mut out = String::new();
        let hours = total.as_secs() / 3600;
        let minutes = (total.as_secs() % 3600) / 60;
        let seconds = total.as_secs() % 60;
        let millis = total.subsec_millis();
        let micros = total.subsec_micros() % 1000;
        if hours > 0 {
            out.push_str(&format!("{}h ", hours));
        }
        if minutes > 0 {
            out.push_str(&format!("{}m ", minutes));
        }
        out.push_str(&format!("{}s {}ms", seconds, millis));
        if millis == 0 {
            out.push_str(&format!(" {}us", micros));
        }
        out
    }
}

impl fmt::Display for Statistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Total leaves visited: {} and automorphisms found: {}. \
             Times pruned by invariant: {}, automorphisms: {} and implicit: {}. \
             Refined {} times. Canonical updates: {}. Bad leaves: {}. \
             Backtracks: {}. Reached level: {}, total target cells: {}",
            self.leaves_visited,
            self.automorphisms_found,
            self.pruned_by_invariant,
            self.pruned_by_automorphism,
            self.pruned_by_implicit,
            self.refinements,
            self.best_leaf_updates,
            self.bad_leaves,
            self.backtracks,
            self.max_level,
            self.target_cells_selected,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pretty_time_omits_leading_zero_units() {
        let mut stats = Statistics {
            duration: Duration::new(3662, 5_000_000),
            ..Statistics::default()
        };
        assert_eq!(stats.pretty_time(), "1h 1m 2s 5ms");

        stats.duration = Duration::new(0, 42_000);
        assert_eq!(stats.pretty_time(), "0s 0ms 42us");

        stats.duration = Duration::new(75, 250_000_000);
        assert_eq!(stats.pretty_time(), "1m 15s 250ms");
    }

    #[test]
    fn display_mentions_every_headline_counter() {
        let stats = Statistics {
            leaves_visited: 7,
            automorphisms_found: 3,
            ..Statistics::default()
        };
        let line = stats.to_string();
        assert!(line.contains("leaves visited: 7"));
        assert!(line.contains("automorphisms found: 3"));
    }

    #[test]
    fn serializes_to_json() {
        let stats = Statistics::default();
        let json = serde_json::to_string(&stats).unwrap();
        assert_eq!(serde_json::from_str::<Statistics>(&json).unwrap(), stats);
    }
}
