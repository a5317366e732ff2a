use crate::card::{CardDatabase, CardDatabaseError};
use crate::game::state::TurnState;
use crate::game::zones::{CardMultiset, Pile};
use thiserror::Error;

/// The reference turn shipped in `turn.txt`
pub const SAMPLE_TURN: &str = "\
actions = 1
buys = 1
coins = 0

[deck]
2 Silver
3 Copper
1 Laboratory
2 Market

[hand]
1 Militia
1 Market
1 Laboratory
2 Copper

[discard]
3 Copper
";

#[derive(Error, Debug)]
pub enum TurnFileError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Invalid turn format at line {line}: {reason}")]
    InvalidFormat { line: usize, reason: String },
    #[error("Card database error: {0}")]
    DatabaseError(#[from] CardDatabaseError),
}

/// Parse a turn file into the starting state
pub fn parse_turn_file(path: &str, database: &CardDatabase) -> Result<TurnState, TurnFileError> {
    let content = std::fs::read_to_string(path)?;
    parse_turn(&content, database)
}

/// Parse a turn description.
///
/// Format: optional `actions = N`, `buys = N`, `coins = N` lines, then
/// `[deck]`, `[hand]`, `[in_play]` and `[discard]` sections holding
/// "COUNT Card Name" lines. Comments start with # or //.
pub fn parse_turn(content: &str, database: &CardDatabase) -> Result<TurnState, TurnFileError> {
    let mut piles = [
        CardMultiset::new(),
        CardMultiset::new(),
        CardMultiset::new(),
        CardMultiset::new(),
    ];
    let (mut actions, mut buys, mut coins) = (1u32, 1u32, 0u32);
    let mut section: Option<Pile> = None;
    let mut total_cards = 0u32;

    for (line_num, line) in content.lines().enumerate() {
        let line_no = line_num + 1;
        let trimmed = line.trim();

        // Skip empty lines and comments
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with("//") {
            continue;
        }

        if let Some(header) = trimmed.strip_prefix('[') {
            let name = header.strip_suffix(']').ok_or_else(|| TurnFileError::InvalidFormat {
                line: line_no,
                reason: format!("unterminated section header '{}'", trimmed),
            })?;
            section = Some(parse_section(name.trim()).ok_or_else(|| {
                TurnFileError::InvalidFormat {
                    line: line_no,
                    reason: format!("unknown section '{}'", name.trim()),
                }
            })?);
            continue;
        }

        if let Some((key, value)) = trimmed.split_once('=') {
            let value: u32 = value.trim().parse().map_err(|_| TurnFileError::InvalidFormat {
                line: line_no,
                reason: format!("'{}' is not a valid number", value.trim()),
            })?;
            match key.trim() {
                "actions" => actions = value,
                "buys" => buys = value,
                "coins" => coins = value,
                other => {
                    return Err(TurnFileError::InvalidFormat {
                        line: line_no,
                        reason: format!("unknown setting '{}'", other),
                    })
                }
            }
            continue;
        }

        let pile = section.ok_or_else(|| TurnFileError::InvalidFormat {
            line: line_no,
            reason: "card listed before any [deck]/[hand]/[in_play]/[discard] section".to_string(),
        })?;

        // Parse "N Card Name" format
        let (count_str, card_name) =
            trimmed.split_once(' ').ok_or_else(|| TurnFileError::InvalidFormat {
                line: line_no,
                reason: "Expected format: 'COUNT CARD_NAME'".to_string(),
            })?;

        let count: u32 = count_str.parse().map_err(|_| TurnFileError::InvalidFormat {
            line: line_no,
            reason: format!("'{}' is not a valid number", count_str),
        })?;

        let card = database.get_card(card_name.trim())?;
        let too_many = || TurnFileError::InvalidFormat {
            line: line_no,
            reason: format!("turn holds more than {} cards", u32::MAX),
        };
        // Later moves between piles stay within this total
        total_cards = total_cards.checked_add(count).ok_or_else(too_many)?;
        piles[pile_index(pile)]
            .try_add_many(card.id, count)
            .map_err(|_| too_many())?;
    }

    let [deck, hand, in_play, discard] = piles;
    Ok(TurnState::new(deck, hand, in_play, discard, actions, buys, coins))
}

fn parse_section(name: &str) -> Option<Pile> {
    match name.to_ascii_lowercase().replace(' ', "_").as_str() {
        "deck" => Some(Pile::Deck),
        "hand" => Some(Pile::Hand),
        "in_play" | "inplay" => Some(Pile::InPlay),
        "discard" => Some(Pile::Discard),
        _ => None,
    }
}

fn pile_index(pile: Pile) -> usize {
    match pile {
        Pile::Deck => 0,
        Pile::Hand => 1,
        Pile::InPlay => 2,
        Pile::Discard => 3,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn db() -> CardDatabase {
        CardDatabase::builtin().expect("Failed to load cards")
    }

    #[test]
    fn test_parse_sample_turn() {
        let db = db();
        let state = parse_turn(SAMPLE_TURN, &db).expect("Failed to parse turn");

        assert_eq!(state.deck().size(), 8);
        assert_eq!(state.hand().size(), 5);
        assert_eq!(state.in_play().size(), 0);
        assert_eq!(state.discard().size(), 3);
        assert_eq!(state.total_card_count(), 16);
        assert_eq!((state.actions(), state.buys(), state.action_coins()), (1, 1, 0));

        let market = db.get_card("Market").unwrap().id;
        assert_eq!(state.deck().count_of(market), 2);
        assert_eq!(state.hand().count_of(market), 1);
    }

    #[test]
    fn test_scalars_default_and_override() {
        let db = db();
        let state = parse_turn("[hand]\n1 Militia\n", &db).unwrap();
        assert_eq!((state.actions(), state.buys(), state.action_coins()), (1, 1, 0));

        let state = parse_turn("actions = 2\ncoins = 3\n// no cards\n", &db).unwrap();
        assert_eq!((state.actions(), state.buys(), state.action_coins()), (2, 1, 3));
        assert_eq!(state.total_card_count(), 0);
    }

    #[test]
    fn test_repeated_lines_accumulate() {
        let db = db();
        let state = parse_turn("[In Play]\n1 Market\n2 Market\n", &db).unwrap();
        let market = db.get_card("Market").unwrap().id;
        assert_eq!(state.in_play().count_of(market), 3);
    }

    #[test]
    fn test_invalid_lines() {
        let db = db();
        let cases = [
            "1 Copper\n",
            "[deck\n",
            "[graveyard]\n",
            "[deck]\nthree Copper\n",
            "[deck]\nCopper\n",
            "mana = 4\n",
            "actions = lots\n",
        ];
        for content in cases {
            assert!(
                matches!(
                    parse_turn(content, &db),
                    Err(TurnFileError::InvalidFormat { line: _, reason: _ })
                ),
                "{:?} should be rejected",
                content
            );
        }
    }

    #[test]
    fn test_card_total_must_fit() {
        let db = db();
        let cases = [
            ("[deck]\n4000000000 Copper\n4000000000 Copper\n", 3),
            ("[deck]\n4000000000 Copper\n[hand]\n4000000000 Silver\n", 4),
        ];
        for (content, bad_line) in cases {
            match parse_turn(content, &db) {
                Err(TurnFileError::InvalidFormat { line, .. }) => assert_eq!(line, bad_line),
                other => panic!("{:?} should be rejected, got {:?}", content, other),
            }
        }

        let state = parse_turn("[deck]\n4000000000 Copper\n[discard]\n294967295 Silver\n", &db)
            .expect("total of u32::MAX cards fits");
        assert_eq!(state.total_card_count(), u64::from(u32::MAX));
    }

    #[test]
    fn test_unknown_card() {
        let db = db();
        let result = parse_turn("[hand]\n1 Province\n", &db);
        assert!(matches!(
            result,
            Err(TurnFileError::DatabaseError(CardDatabaseError::CardNotFound(_)))
        ));
    }

    #[test]
    fn test_error_reports_line_number() {
        let db = db();
        match parse_turn("# header\n\n[deck]\n2 Copper\nx Silver\n", &db) {
            Err(TurnFileError::InvalidFormat { line, .. }) => assert_eq!(line, 5),
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
