//! Draw outcome enumeration.
//!
//! Drawing `k` cards from a shuffled deck is expanded into every distinct
//! result, each weighted by how many ordered draws of physical cards produce
//! it. Weights of one enumeration always add up to `n * (n-1) * ... * (n-k+1)`
//! for a deck of `n` cards, so weighted averages are exact expectations.

use crate::card::CardId;
use crate::game::state::{StateError, TurnState};
use crate::simulation::config::DrawEnumeration;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DrawError {
    #[error(transparent)]
    State(#[from] StateError),
    #[error("drawing {draw} of {deck} cards has too many orderings to weigh")]
    FrequencyOverflow { deck: u32, draw: u32 },
}

/// A resulting state and the number of equally likely draws leading to it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub state: TurnState,
    pub frequency: u128,
}

impl Outcome {
    pub fn new(state: TurnState, frequency: u128) -> Self {
        Outcome { state, frequency }
    }
}

/// Every outcome of drawing `draw_count` cards from the deck into hand.
///
/// Drawing nothing yields the state itself. Drawing at least as many cards
/// as the deck holds moves the whole deck into hand. Fails when the number
/// of ordered draws does not fit in a `u128`; no single weight or partial
/// sum can exceed that total.
pub fn draw_outcomes(
    state: &TurnState,
    draw_count: u32,
    mode: DrawEnumeration,
) -> Result<Vec<Outcome>, DrawError> {
    if draw_count == 0 {
        return Ok(vec![Outcome::new(state.clone(), 1)]);
    }
    let deck_size = state.deck().size();
    if draw_count >= deck_size {
        return Ok(vec![Outcome::new(state.fold_deck_into_hand(), 1)]);
    }

    let overflow = DrawError::FrequencyOverflow {
        deck: deck_size,
        draw: draw_count,
    };
    if falling_factorial(deck_size, draw_count).is_none() {
        return Err(overflow);
    }

    let mut outcomes = Vec::new();
    match mode {
        DrawEnumeration::Combinations => {
            let available: Vec<(CardId, u32)> = state.deck().iter().collect();
            // remaining_after[i]: copies held by cards i.. of `available`
            let mut remaining_after = vec![0u32; available.len() + 1];
            for i in (0..available.len()).rev() {
                remaining_after[i] = remaining_after[i + 1] + available[i].1;
            }
            let mut picks = Vec::with_capacity(available.len());
            let search = CombinationSearch {
                state,
                available: &available,
                remaining_after: &remaining_after,
                overflow: &overflow,
            };
            search.choose(0, draw_count, 1, &mut picks, &mut outcomes)?;
        }
        DrawEnumeration::Sequences => {
            draw_sequences(state, draw_count, 1, &overflow, &mut outcomes)?;
        }
    }
    Ok(outcomes)
}

/// Sum of frequencies across outcomes
pub fn total_frequency(outcomes: &[Outcome]) -> u128 {
    outcomes.iter().map(|o| o.frequency).sum()
}

struct CombinationSearch<'a> {
    state: &'a TurnState,
    available: &'a [(CardId, u32)],
    remaining_after: &'a [u32],
    overflow: &'a DrawError,
}

impl CombinationSearch<'_> {
    /// Decide how many copies of `available[idx]` to draw, then recurse.
    ///
    /// Taking `x` of `count` copies while `need` draws remain contributes
    /// C(need, x) slot choices times count!/(count-x)! ordered picks.
    fn choose(
        &self,
        idx: usize,
        need: u32,
        weight: u128,
        picks: &mut Vec<(CardId, u32)>,
        outcomes: &mut Vec<Outcome>,
    ) -> Result<(), DrawError> {
        if need == 0 {
            let drawn = self.state.draw_many(picks)?;
            outcomes.push(Outcome::new(drawn, weight));
            return Ok(());
        }
        if idx == self.available.len() || self.remaining_after[idx] < need {
            return Ok(());
        }

        let (card, count) = self.available[idx];
        let min_take = need.saturating_sub(self.remaining_after[idx + 1]);
        let max_take = need.min(count);

        for take in min_take..=max_take {
            let next_weight = binomial(need, take)
                .zip(falling_factorial(count, take))
                .and_then(|(slots, picked)| slots.checked_mul(picked))
                .and_then(|factor| weight.checked_mul(factor))
                .ok_or_else(|| self.overflow.clone())?;
            if take > 0 {
                picks.push((card, take));
            }
            self.choose(idx + 1, need - take, next_weight, picks, outcomes)?;
            if take > 0 {
                picks.pop();
            }
        }
        Ok(())
    }
}

/// Draw one identity at a time; (A, B) and (B, A) stay separate outcomes
fn draw_sequences(
    state: &TurnState,
    draw_count: u32,
    weight: u128,
    overflow: &DrawError,
    outcomes: &mut Vec<Outcome>,
) -> Result<(), DrawError> {
    if draw_count == 0 {
        outcomes.push(Outcome::new(state.clone(), weight));
        return Ok(());
    }
    for (card, count) in state.deck().iter() {
        let next = state.draw_from_deck(card)?;
        let next_weight = weight
            .checked_mul(u128::from(count))
            .ok_or_else(|| overflow.clone())?;
        draw_sequences(&next, draw_count - 1, next_weight, overflow, outcomes)?;
    }
    Ok(())
}

fn binomial(n: u32, k: u32) -> Option<u128> {
    if k > n {
        return Some(0);
    }
    let k = k.min(n - k);
    (0..k).try_fold(1u128, |acc, i| {
        Some(acc.checked_mul(u128::from(n - i))? / u128::from(i + 1))
    })
}

fn falling_factorial(n: u32, k: u32) -> Option<u128> {
    (0..k).try_fold(1u128, |acc, i| acc.checked_mul(u128::from(n.saturating_sub(i))))
}
