//! JSON report of a solve, for saving alongside the turn file.

use crate::card::CardDatabase;
use crate::simulation::config::SolverConfig;
use crate::simulation::playout::PlayoutSummary;
use crate::simulation::solver::Solution;
use crate::simulation::stats::SearchStats;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayReport {
    pub card: String,
    pub expected_coins: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolveReport {
    pub generated_at: String,
    pub turn_file: String,
    /// None when the best line is to stop playing actions
    pub best_card: Option<String>,
    pub expected_coins: f64,
    pub plays: Vec<PlayReport>,
    pub config: SolverConfig,
    pub stats: SearchStats,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub playouts: Option<PlayoutSummary>,
}

impl SolveReport {
    pub fn new(
        turn_file: &str,
        solution: &Solution,
        config: &SolverConfig,
        db: &CardDatabase,
    ) -> Self {
        SolveReport {
            generated_at: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            turn_file: turn_file.to_string(),
            best_card: solution.best.card.map(|c| db.name_of(c)),
            expected_coins: solution.best.value,
            plays: solution
                .plays
                .iter()
                .map(|p| PlayReport {
                    card: db.name_of(p.card),
                    expected_coins: p.value,
                })
                .collect(),
            config: config.clone(),
            stats: solution.stats.clone(),
            playouts: None,
        }
    }

    pub fn with_playouts(mut self, summary: PlayoutSummary) -> Self {
        self.playouts = Some(summary);
        self
    }

    /// Write the report as pretty JSON
    pub fn save(&self, path: &str) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
    }
}
