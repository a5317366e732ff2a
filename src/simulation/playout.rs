//! Monte Carlo playouts.
//!
//! Shuffles the deck, then plays the turn out card by card, asking the solver
//! for its choice at every step and drawing from the top of the shuffled
//! deck. Averaged over many seeds this converges on the solver's expectation,
//! which makes it an independent check of the frequency weighting.

use crate::card::CardId;
use crate::game::state::TurnState;
use crate::rng::GameRng;
use crate::simulation::solver::{SolveError, Solver};
use indicatif::ProgressBar;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::trace;

/// Result of a single playout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayoutResult {
    /// Coins available when no more actions were played
    pub coins: u32,
    /// Cards played, in order
    pub plays: Vec<CardId>,
}

/// Aggregate over many playouts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayoutSummary {
    pub trials: usize,
    pub base_seed: u64,
    pub mean: f64,
    /// Standard error of the mean
    pub std_error: f64,
    pub min: u32,
    pub max: u32,
    /// Final coins -> number of playouts
    pub distribution: BTreeMap<u32, usize>,
}

/// Play one turn out against a random deck order
pub fn run_playout(
    solver: &Solver<'_>,
    state: &TurnState,
    rng: &mut GameRng,
) -> Result<PlayoutResult, SolveError> {
    let db = solver.database();
    let mut order = rng.draw_order(state.deck()).into_iter();
    let mut current = state.clone();
    let mut plays = Vec::new();

    while let Some(card_id) = solver.best_card_to_play(&current)?.card {
        let card = db.card(card_id)?;
        current = current.play_from_hand(card)?;
        plays.push(card_id);

        if card.cards >= current.deck().size() {
            current = current.fold_deck_into_hand();
        } else {
            for drawn in order.by_ref().take(card.cards as usize) {
                current = current.draw_from_deck(drawn)?;
            }
        }
        trace!(card = %card.name, hand = %current.hand().describe(db), "playout step");
    }

    Ok(PlayoutResult {
        coins: current.coin_value(db),
        plays,
    })
}

/// Run `trials` playouts in parallel; trial `i` uses seed `base_seed + i`
pub fn run_playouts(
    solver: &Solver<'_>,
    state: &TurnState,
    trials: usize,
    base_seed: u64,
    progress: Option<&ProgressBar>,
) -> Result<PlayoutSummary, SolveError> {
    let results: Vec<PlayoutResult> = (0..trials)
        .into_par_iter()
        .map(|i| {
            let mut rng = GameRng::for_trial(base_seed, i as u64);
            let result = run_playout(solver, state, &mut rng);
            if let Some(pb) = progress {
                pb.inc(1);
            }
            result
        })
        .collect::<Result<_, _>>()?;

    Ok(summarize(&results, base_seed))
}

fn summarize(results: &[PlayoutResult], base_seed: u64) -> PlayoutSummary {
    let trials = results.len();
    let mut distribution = BTreeMap::new();
    for r in results {
        *distribution.entry(r.coins).or_insert(0) += 1;
    }

    let (mean, std_error) = if trials == 0 {
        (0.0, 0.0)
    } else {
        let n = trials as f64;
        let mean = results.iter().map(|r| f64::from(r.coins)).sum::<f64>() / n;
        let variance = if trials > 1 {
            results
                .iter()
                .map(|r| (f64::from(r.coins) - mean).powi(2))
                .sum::<f64>()
                / (n - 1.0)
        } else {
            0.0
        };
        (mean, (variance / n).sqrt())
    };

    PlayoutSummary {
        trials,
        base_seed,
        mean,
        std_error,
        min: results.iter().map(|r| r.coins).min().unwrap_or(0),
        max: results.iter().map(|r| r.coins).max().unwrap_or(0),
        distribution,
    }
}
