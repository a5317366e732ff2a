use crate::card::{CardDatabase, CardId};
use im::OrdMap;
use std::fmt;
use thiserror::Error;

/// The four piles a card can sit in during a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pile {
    Deck,
    Hand,
    InPlay,
    Discard,
}

impl fmt::Display for Pile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pile::Deck => write!(f, "deck"),
            Pile::Hand => write!(f, "hand"),
            Pile::InPlay => write!(f, "in play"),
            Pile::Discard => write!(f, "discard"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PileError {
    #[error("no copies of card {0} to remove")]
    CardNotPresent(CardId),
    #[error("adding {count} copies of card {card} overflows the pile")]
    CountOverflow { card: CardId, count: u32 },
}

/// Unordered pile of cards: count per card id.
///
/// Backed by a persistent map, so clones share structure. Zero counts are
/// never stored, which keeps equality and hashing canonical.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct CardMultiset {
    counts: OrdMap<CardId, u32>,
    size: u32,
}

impl CardMultiset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_cards<I: IntoIterator<Item = CardId>>(cards: I) -> Self {
        let mut pile = Self::new();
        for card in cards {
            pile.add(card);
        }
        pile
    }

    pub fn add(&mut self, card: CardId) {
        self.add_many(card, 1);
    }

    /// Add copies moved in from another pile of the same turn.
    ///
    /// Cards of one turn never total more than `u32::MAX`, so this cannot
    /// overflow there; use `try_add_many` for counts from outside.
    pub fn add_many(&mut self, card: CardId, count: u32) {
        if count == 0 {
            return;
        }
        let current = self.count_of(card);
        self.counts.insert(card, current + count);
        self.size += count;
    }

    pub fn try_add_many(&mut self, card: CardId, count: u32) -> Result<(), PileError> {
        let overflow = PileError::CountOverflow { card, count };
        // The pile size bounds every count, so checking it covers both
        self.size.checked_add(count).ok_or(overflow)?;
        self.add_many(card, count);
        Ok(())
    }

    pub fn remove(&mut self, card: CardId) -> Result<(), PileError> {
        match self.count_of(card) {
            0 => Err(PileError::CardNotPresent(card)),
            1 => {
                self.counts.remove(&card);
                self.size -= 1;
                Ok(())
            }
            n => {
                self.counts.insert(card, n - 1);
                self.size -= 1;
                Ok(())
            }
        }
    }

    pub fn count_of(&self, card: CardId) -> u32 {
        self.counts.get(&card).copied().unwrap_or(0)
    }

    pub fn contains(&self, card: CardId) -> bool {
        self.count_of(card) > 0
    }

    /// Pairwise sum of two piles
    pub fn merge(&self, other: &CardMultiset) -> CardMultiset {
        let mut merged = self.clone();
        for (card, count) in other.iter() {
            merged.add_many(card, count);
        }
        merged
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Distinct cards with their counts, in id order
    pub fn iter(&self) -> impl Iterator<Item = (CardId, u32)> + '_ {
        self.counts.iter().map(|(card, count)| (*card, *count))
    }

    /// One entry per physical card, in id order
    pub fn to_cards(&self) -> Vec<CardId> {
        let mut cards = Vec::with_capacity(self.size as usize);
        for (card, count) in self.iter() {
            cards.extend(std::iter::repeat(card).take(count as usize));
        }
        cards
    }

    /// "2 Copper, 1 Silver" style listing in catalog order
    pub fn describe(&self, db: &CardDatabase) -> String {
        if self.is_empty() {
            return "(empty)".to_string();
        }
        let mut parts: Vec<String> = db
            .cards()
            .filter(|c| self.contains(c.id))
            .map(|c| format!("{} {}", self.count_of(c.id), c.name))
            .collect();
        // Ids missing from the catalog still show up
        for (card, count) in self.iter() {
            if db.get(card).is_none() {
                parts.push(format!("{} {}", count, card));
            }
        }
        parts.join(", ")
    }
}

impl FromIterator<CardId> for CardMultiset {
    fn from_iter<I: IntoIterator<Item = CardId>>(iter: I) -> Self {
        Self::from_cards(iter)
    }
}
