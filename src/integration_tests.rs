//! Integration tests for the turn solver
//! Cross-checks the solver against a brute-force expansion of every draw

use crate::card::{CardDatabase, CardId};
use crate::game::state::TurnState;
use crate::game::zones::CardMultiset;
use crate::simulation::config::{DrawEnumeration, SolverConfig};
use crate::simulation::solver::Solver;
use crate::simulation::turn::{parse_turn, parse_turn_file, SAMPLE_TURN};

/// Best value where every draw is expanded into each ordered selection of
/// physical deck cards, all counted once
fn brute_force_value(state: &TurnState, db: &CardDatabase) -> f64 {
    let coins = f64::from(state.coin_value(db));
    if state.actions() == 0 {
        return coins;
    }

    let mut best: Option<f64> = None;
    for card in state.playable_actions(db) {
        let played = state.play_from_hand(card).expect("card is in hand");
        let value = if card.cards >= played.deck().size() {
            brute_force_value(&played.fold_deck_into_hand(), db)
        } else {
            let positions = played.deck().to_cards();
            let mut sum = 0.0;
            let mut orderings = 0u64;
            for_each_ordered_selection(&positions, card.cards as usize, &mut |drawn: &[CardId]| {
                let mut next = played.clone();
                for &c in drawn {
                    next = next.draw_from_deck(c).expect("drawn card is in deck");
                }
                sum += brute_force_value(&next, db);
                orderings += 1;
            });
            sum / orderings as f64
        };
        if best.map_or(true, |b| value > b) {
            best = Some(value);
        }
    }
    best.unwrap_or(coins)
}

fn for_each_ordered_selection(items: &[CardId], k: usize, visit: &mut dyn FnMut(&[CardId])) {
    fn walk(
        items: &[CardId],
        k: usize,
        used: &mut [bool],
        current: &mut Vec<CardId>,
        visit: &mut dyn FnMut(&[CardId]),
    ) {
        if current.len() == k {
            visit(current);
            return;
        }
        for i in 0..items.len() {
            if !used[i] {
                used[i] = true;
                current.push(items[i]);
                walk(items, k, used, current, visit);
                current.pop();
                used[i] = false;
            }
        }
    }
    let mut used = vec![false; items.len()];
    walk(items, k, &mut used, &mut Vec::with_capacity(k), visit);
}

fn pile(db: &CardDatabase, names: &[&str]) -> CardMultiset {
    names
        .iter()
        .map(|n| db.get_card(n).expect("card exists").id)
        .collect()
}

#[test]
fn test_reference_turn_matches_brute_force() {
    let db = CardDatabase::builtin().expect("Failed to load cards");
    let state = TurnState::starting(
        pile(
            &db,
            &["Silver", "Copper", "Copper", "Copper", "Silver", "Laboratory", "Market", "Market"],
        ),
        pile(&db, &["Militia", "Market", "Laboratory", "Copper", "Copper"]),
        CardMultiset::new(),
        pile(&db, &["Copper", "Copper", "Copper"]),
    );

    let best = Solver::new(&db, SolverConfig::default())
        .best_card_to_play(&state)
        .expect("solve succeeds");
    assert!(best.card.is_some(), "action cards in hand should be played");

    let brute = brute_force_value(&state, &db);
    assert!(
        (best.value - brute).abs() < 1e-9,
        "solver {} vs brute force {}",
        best.value,
        brute
    );
}

#[test]
fn test_turn_file_matches_sample() {
    let db = CardDatabase::builtin().expect("Failed to load cards");
    let from_file = parse_turn_file("turn.txt", &db).expect("Failed to parse turn.txt");
    let sample = parse_turn(SAMPLE_TURN, &db).expect("Failed to parse sample");
    assert_eq!(from_file, sample);
}

#[test]
fn test_treasure_only_hand() {
    let db = CardDatabase::builtin().expect("Failed to load cards");
    let state = TurnState::starting(
        pile(&db, &["Laboratory", "Gold", "Smithy"]),
        pile(&db, &["Gold", "Silver", "Copper", "Copper", "Copper"]),
        CardMultiset::new(),
        pile(&db, &["Market"]),
    );
    let best = Solver::new(&db, SolverConfig::default())
        .best_card_to_play(&state)
        .unwrap();
    assert_eq!(best.card, None);
    assert_eq!(best.value, f64::from(state.coin_value(&db)));
    assert_eq!(best.value, 8.0);
}

#[test]
fn test_big_draws_match_brute_force() {
    let db = CardDatabase::builtin().expect("Failed to load cards");
    let state = TurnState::starting(
        pile(&db, &["Copper", "Silver", "Gold", "Copper", "Village", "Militia"]),
        pile(&db, &["Smithy", "Village", "Council Room"]),
        CardMultiset::new(),
        CardMultiset::new(),
    );
    let brute = brute_force_value(&state, &db);
    for enumeration in [DrawEnumeration::Combinations, DrawEnumeration::Sequences] {
        let config = SolverConfig::default().with_enumeration(enumeration);
        let best = Solver::new(&db, config).best_card_to_play(&state).unwrap();
        assert!(
            (best.value - brute).abs() < 1e-9,
            "{:?}: solver {} vs brute force {}",
            enumeration,
            best.value,
            brute
        );
    }
}

#[test]
fn test_custom_catalog_order_breaks_ties() {
    // Same cards as the built-in catalog, Militia listed before Laboratory
    let json = r#"[
        { "id": 5, "name": "Militia", "category": "action", "coins": 2 },
        { "id": 3, "name": "Laboratory", "category": "action", "actions": 1, "cards": 2 },
        { "id": 0, "name": "Copper", "category": "treasure", "coins": 1 }
    ]"#;
    let db = CardDatabase::from_json(json).expect("valid catalog");
    let state = TurnState::starting(
        CardMultiset::new(),
        pile(&db, &["Laboratory", "Militia"]),
        CardMultiset::new(),
        CardMultiset::new(),
    );
    let best = Solver::new(&db, SolverConfig::default())
        .best_card_to_play(&state)
        .unwrap();
    assert_eq!(best.card, Some(CardId(5)));
    assert_eq!(best.value, 2.0);
}

#[test]
fn test_solving_leaves_state_untouched() {
    let db = CardDatabase::builtin().expect("Failed to load cards");
    let state = parse_turn(SAMPLE_TURN, &db).unwrap();
    let snapshot = state.clone();
    let solver = Solver::new(&db, SolverConfig::default().with_parallel(true));
    let first = solver.solve(&state).unwrap();
    let second = solver.solve(&state).unwrap();
    assert_eq!(state, snapshot);
    assert_eq!(first.best, second.best);
}
