//! Search statistics for diagnostics and tuning.

use serde::{Deserialize, Serialize};

/// Statistics collected during a solve.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchStats {
    /// States visited (including memo hits).
    pub nodes: u64,

    /// States valued without playing further.
    pub terminal_nodes: u64,

    /// Draw outcomes produced by the enumerator.
    pub outcomes: u64,

    /// States answered from the memo table.
    pub memo_hits: u64,

    /// Deepest line of plays explored.
    pub max_depth: u32,

    /// Wall time spent searching (microseconds).
    pub time_us: u64,
}

impl SearchStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold statistics from a separately searched branch into these
    pub fn merge(&mut self, other: &SearchStats) {
        self.nodes += other.nodes;
        self.terminal_nodes += other.terminal_nodes;
        self.outcomes += other.outcomes;
        self.memo_hits += other.memo_hits;
        self.max_depth = self.max_depth.max(other.max_depth);
    }

    #[must_use]
    pub fn nodes_per_second(&self) -> f64 {
        if self.time_us == 0 {
            0.0
        } else {
            self.nodes as f64 / (self.time_us as f64 / 1_000_000.0)
        }
    }

    #[must_use]
    pub fn memo_hit_rate(&self) -> f64 {
        if self.nodes == 0 {
            0.0
        } else {
            self.memo_hits as f64 / self.nodes as f64
        }
    }
}
