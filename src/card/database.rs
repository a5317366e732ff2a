use crate::card::types::{CardDefinition, CardId};
use rustc_hash::FxHashMap;
use thiserror::Error;

/// Catalog compiled into the binary
const BUILTIN_CARDS: &str = include_str!("../../cards.json");

#[derive(Error, Debug)]
pub enum CardDatabaseError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("Card not found: {0}")]
    CardNotFound(String),
    #[error("Unknown card id: {0}")]
    UnknownCardId(CardId),
    #[error("Invalid card data: {0}")]
    InvalidCard(String),
}

/// Read-only card catalog.
///
/// Iteration follows catalog order (the order cards appear in the source
/// JSON), which is also the tie-break order of the solver.
#[derive(Debug, Clone)]
pub struct CardDatabase {
    cards: Vec<CardDefinition>,
    by_id: FxHashMap<CardId, usize>,
    by_name: FxHashMap<String, usize>,
}

impl CardDatabase {
    /// The catalog embedded at build time
    pub fn builtin() -> Result<Self, CardDatabaseError> {
        Self::from_json(BUILTIN_CARDS)
    }

    /// Load cards from a JSON file
    pub fn from_file(path: &str) -> Result<Self, CardDatabaseError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self, CardDatabaseError> {
        let cards: Vec<CardDefinition> = serde_json::from_str(content)?;
        Self::from_cards(cards)
    }

    /// Build a catalog from definitions, rejecting duplicate ids or names
    pub fn from_cards(cards: Vec<CardDefinition>) -> Result<Self, CardDatabaseError> {
        let mut by_id = FxHashMap::default();
        let mut by_name = FxHashMap::default();

        for (idx, card) in cards.iter().enumerate() {
            if by_id.insert(card.id, idx).is_some() {
                return Err(CardDatabaseError::InvalidCard(format!(
                    "duplicate card id {}",
                    card.id
                )));
            }
            if by_name.insert(card.name.clone(), idx).is_some() {
                return Err(CardDatabaseError::InvalidCard(format!(
                    "duplicate card name '{}'",
                    card.name
                )));
            }
        }

        let db = CardDatabase { cards, by_id, by_name };
        db.validate()?;
        Ok(db)
    }

    /// Get a card by name
    pub fn get_card(&self, name: &str) -> Result<&CardDefinition, CardDatabaseError> {
        self.by_name
            .get(name)
            .map(|&idx| &self.cards[idx])
            .ok_or_else(|| CardDatabaseError::CardNotFound(name.to_string()))
    }

    /// Get a card by id
    pub fn card(&self, id: CardId) -> Result<&CardDefinition, CardDatabaseError> {
        self.get(id).ok_or(CardDatabaseError::UnknownCardId(id))
    }

    pub fn get(&self, id: CardId) -> Option<&CardDefinition> {
        self.by_id.get(&id).map(|&idx| &self.cards[idx])
    }

    /// Display name for an id, falling back to the raw id
    pub fn name_of(&self, id: CardId) -> String {
        self.get(id)
            .map(|c| c.name.clone())
            .unwrap_or_else(|| id.to_string())
    }

    /// All cards in catalog order
    pub fn cards(&self) -> impl Iterator<Item = &CardDefinition> {
        self.cards.iter()
    }

    pub fn action_cards(&self) -> impl Iterator<Item = &CardDefinition> {
        self.cards.iter().filter(|c| c.is_action())
    }

    pub fn treasure_cards(&self) -> impl Iterator<Item = &CardDefinition> {
        self.cards.iter().filter(|c| c.is_treasure())
    }

    /// Get total number of cards
    pub fn card_count(&self) -> usize {
        self.cards.len()
    }

    pub fn validate(&self) -> Result<(), CardDatabaseError> {
        if self.cards.is_empty() {
            return Err(CardDatabaseError::InvalidCard(
                "No cards loaded".to_string(),
            ));
        }
        if let Some(card) = self.cards.iter().find(|c| c.name.trim().is_empty()) {
            return Err(CardDatabaseError::InvalidCard(format!(
                "card {} has an empty name",
                card.id
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::types::CardCategory;

    #[test]
    fn test_load_builtin_cards() {
        let db = CardDatabase::builtin().expect("Failed to load cards");
        assert_eq!(db.card_count(), 10);
    }

    #[test]
    fn test_get_card() {
        let db = CardDatabase::builtin().expect("Failed to load cards");
        let market = db.get_card("Market").expect("Market should exist");
        assert_eq!(market.category, CardCategory::Action);
        assert_eq!((market.actions, market.buys, market.coins, market.cards), (1, 1, 1, 1));

        let by_id = db.card(market.id).expect("lookup by id");
        assert_eq!(by_id.name, "Market");
    }

    #[test]
    fn test_card_not_found() {
        let db = CardDatabase::builtin().expect("Failed to load cards");
        assert!(matches!(
            db.get_card("Province"),
            Err(CardDatabaseError::CardNotFound(_))
        ));
        assert!(matches!(
            db.card(CardId(99)),
            Err(CardDatabaseError::UnknownCardId(CardId(99)))
        ));
    }

    #[test]
    fn test_catalog_order() {
        let db = CardDatabase::builtin().expect("Failed to load cards");
        let actions: Vec<&str> = db.action_cards().map(|c| c.name.as_str()).collect();
        assert_eq!(
            actions,
            vec![
                "Laboratory",
                "Market",
                "Militia",
                "Festival",
                "Smithy",
                "Village",
                "Council Room"
            ]
        );
        let treasures: Vec<u32> = db.treasure_cards().map(|c| c.coins).collect();
        assert_eq!(treasures, vec![1, 2, 3]);
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let json = r#"[
            { "id": 0, "name": "Copper", "category": "treasure", "coins": 1 },
            { "id": 0, "name": "Silver", "category": "treasure", "coins": 2 }
        ]"#;
        assert!(matches!(
            CardDatabase::from_json(json),
            Err(CardDatabaseError::InvalidCard(_))
        ));
    }

    #[test]
    fn test_empty_catalog_rejected() {
        assert!(CardDatabase::from_json("[]").is_err());
    }

    #[test]
    fn test_name_of_unknown_id() {
        let db = CardDatabase::builtin().expect("Failed to load cards");
        assert_eq!(db.name_of(CardId(0)), "Copper");
        assert_eq!(db.name_of(CardId(42)), "#42");
    }
}
