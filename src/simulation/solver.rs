//! Expected-value search over the rest of a turn.
//!
//! For each action card in hand the solver plays it, expands every way the
//! resulting draw can fall, values each outcome recursively and averages by
//! frequency. The best card is the one with the highest expectation; ties go
//! to the card that comes first in the catalog.

use crate::card::{CardDatabase, CardDatabaseError, CardDefinition, CardId};
use crate::game::state::{StateError, TurnState};
use crate::simulation::combinations::{draw_outcomes, total_frequency, DrawError};
use crate::simulation::config::SolverConfig;
use crate::simulation::stats::SearchStats;
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, trace};

#[derive(Error, Debug)]
pub enum SolveError {
    #[error("invalid game state: {0}")]
    State(#[from] StateError),
    #[error("card database error: {0}")]
    Database(#[from] CardDatabaseError),
    #[error("cannot enumerate draws: {0}")]
    Draw(#[from] DrawError),
    #[error("no draw outcomes after playing {0}")]
    NoOutcomes(String),
}

/// The card to play next (None: stop and buy) and the expected coins
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BestMove {
    pub card: Option<CardId>,
    pub value: f64,
}

/// Expected coins of playing one particular card now
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayValue {
    pub card: CardId,
    pub value: f64,
}

/// Full result of a solve from one state
#[derive(Debug, Clone)]
pub struct Solution {
    pub best: BestMove,
    /// Every playable card at the root, in catalog order
    pub plays: Vec<PlayValue>,
    pub stats: SearchStats,
}

/// Memo key: the state plus the plays still allowed from it
type MemoKey = (TurnState, Option<u32>);

#[derive(Default)]
struct SearchContext {
    memo: FxHashMap<MemoKey, BestMove>,
    stats: SearchStats,
}

pub struct Solver<'a> {
    db: &'a CardDatabase,
    config: SolverConfig,
}

impl<'a> Solver<'a> {
    pub fn new(db: &'a CardDatabase, config: SolverConfig) -> Self {
        Solver { db, config }
    }

    pub fn database(&self) -> &'a CardDatabase {
        self.db
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Best action card to play from `state` and its expected coin value
    pub fn best_card_to_play(&self, state: &TurnState) -> Result<BestMove, SolveError> {
        Ok(self.solve(state)?.best)
    }

    /// Solve from `state`, keeping the value of every root candidate
    pub fn solve(&self, state: &TurnState) -> Result<Solution, SolveError> {
        let start = Instant::now();
        let mut ctx = SearchContext::default();
        ctx.stats.nodes += 1;

        let plays = if self.is_terminal(state, 0) {
            ctx.stats.terminal_nodes += 1;
            Vec::new()
        } else if self.config.parallel {
            self.evaluate_plays_parallel(state, &mut ctx.stats)?
        } else {
            self.evaluate_plays(state, 0, &mut ctx)?
        };

        let best = self.best_of(state, &plays);
        ctx.stats.time_us = start.elapsed().as_micros() as u64;

        let best_name = best
            .card
            .map(|c| self.db.name_of(c))
            .unwrap_or_else(|| "none".to_string());
        debug!(
            best = %best_name,
            value = best.value,
            nodes = ctx.stats.nodes,
            memo_hits = ctx.stats.memo_hits,
            time_us = ctx.stats.time_us,
            "solve finished"
        );

        Ok(Solution {
            best,
            plays,
            stats: ctx.stats,
        })
    }

    fn is_terminal(&self, state: &TurnState, depth: u32) -> bool {
        state.actions() == 0
            || self.config.max_plays.is_some_and(|max| depth >= max)
            || state.playable_actions(self.db).next().is_none()
    }

    fn search(
        &self,
        state: &TurnState,
        depth: u32,
        ctx: &mut SearchContext,
    ) -> Result<BestMove, SolveError> {
        ctx.stats.nodes += 1;
        ctx.stats.max_depth = ctx.stats.max_depth.max(depth);

        if self.is_terminal(state, depth) {
            ctx.stats.terminal_nodes += 1;
            return Ok(BestMove {
                card: None,
                value: f64::from(state.coin_value(self.db)),
            });
        }

        let key = self.config.memoize.then(|| {
            let budget = self.config.max_plays.map(|max| max.saturating_sub(depth));
            (state.clone(), budget)
        });
        if let Some(hit) = key.as_ref().and_then(|k| ctx.memo.get(k)).copied() {
            ctx.stats.memo_hits += 1;
            return Ok(hit);
        }

        let plays = self.evaluate_plays(state, depth, ctx)?;
        let best = self.best_of(state, &plays);

        if let Some(key) = key {
            ctx.memo.insert(key, best);
        }
        Ok(best)
    }

    fn evaluate_plays(
        &self,
        state: &TurnState,
        depth: u32,
        ctx: &mut SearchContext,
    ) -> Result<Vec<PlayValue>, SolveError> {
        let mut plays = Vec::new();
        for card in state.playable_actions(self.db) {
            let value = self.play_value(state, card, depth, ctx)?;
            trace!(depth, card = %card.name, value, "play evaluated");
            plays.push(PlayValue {
                card: card.id,
                value,
            });
        }
        Ok(plays)
    }

    /// Root candidates searched independently on the rayon pool
    fn evaluate_plays_parallel(
        &self,
        state: &TurnState,
        stats: &mut SearchStats,
    ) -> Result<Vec<PlayValue>, SolveError> {
        let candidates: Vec<&CardDefinition> = state.playable_actions(self.db).collect();

        let results = candidates
            .par_iter()
            .map(|card| {
                let mut ctx = SearchContext::default();
                let value = self.play_value(state, card, 0, &mut ctx)?;
                debug!(card = %card.name, value, nodes = ctx.stats.nodes, "branch finished");
                Ok((
                    PlayValue {
                        card: card.id,
                        value,
                    },
                    ctx.stats,
                ))
            })
            .collect::<Result<Vec<_>, SolveError>>()?;

        let mut plays = Vec::with_capacity(results.len());
        for (play, branch_stats) in results {
            stats.merge(&branch_stats);
            plays.push(play);
        }
        Ok(plays)
    }

    /// Frequency-weighted mean value of playing `card` from `state`
    fn play_value(
        &self,
        state: &TurnState,
        card: &CardDefinition,
        depth: u32,
        ctx: &mut SearchContext,
    ) -> Result<f64, SolveError> {
        let played = state.play_from_hand(card)?;
        let outcomes = draw_outcomes(&played, card.cards, self.config.enumeration)?;
        ctx.stats.outcomes += outcomes.len() as u64;

        let total = total_frequency(&outcomes);
        if total == 0 {
            return Err(SolveError::NoOutcomes(card.name.clone()));
        }

        let mut sum = 0.0;
        for outcome in &outcomes {
            let value = self.search(&outcome.state, depth + 1, ctx)?.value;
            sum += outcome.frequency as f64 * value;
        }
        Ok(sum / total as f64)
    }

    fn best_of(&self, state: &TurnState, plays: &[PlayValue]) -> BestMove {
        match pick_best(plays) {
            Some(play) => BestMove {
                card: Some(play.card),
                value: play.value,
            },
            None => BestMove {
                card: None,
                value: f64::from(state.coin_value(self.db)),
            },
        }
    }
}

/// Values closer than this are the same expectation summed in another order
const TIE_TOLERANCE: f64 = 1e-9;

/// Highest value wins; the earliest play keeps a tie
fn pick_best(plays: &[PlayValue]) -> Option<PlayValue> {
    let mut best: Option<PlayValue> = None;
    for play in plays {
        if best.map_or(true, |b| play.value > b.value + TIE_TOLERANCE) {
            best = Some(*play);
        }
    }
    best
}
