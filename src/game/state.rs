use crate::card::{CardDatabase, CardDefinition, CardId};
use crate::game::zones::{CardMultiset, Pile, PileError};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StateError {
    #[error("card {card} is not in the {pile}")]
    CardNotInPile {
        card: CardId,
        pile: Pile,
        #[source]
        source: PileError,
    },
    #[error("no action available to play {0}")]
    NoActionsRemaining(String),
}

/// Snapshot of a turn: the four piles plus remaining resources.
///
/// Values are never mutated after construction; every transition returns a
/// new state. Piles share structure with their parent, so cloning is cheap.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TurnState {
    deck: CardMultiset,
    hand: CardMultiset,
    in_play: CardMultiset,
    discard: CardMultiset,
    actions: u32,
    buys: u32,
    /// Coins granted by played action cards
    action_coins: u32,
}

impl TurnState {
    pub fn new(
        deck: CardMultiset,
        hand: CardMultiset,
        in_play: CardMultiset,
        discard: CardMultiset,
        actions: u32,
        buys: u32,
        action_coins: u32,
    ) -> Self {
        TurnState {
            deck,
            hand,
            in_play,
            discard,
            actions,
            buys,
            action_coins,
        }
    }

    /// Start-of-turn resources: one action, one buy, no coins
    pub fn starting(
        deck: CardMultiset,
        hand: CardMultiset,
        in_play: CardMultiset,
        discard: CardMultiset,
    ) -> Self {
        Self::new(deck, hand, in_play, discard, 1, 1, 0)
    }

    pub fn deck(&self) -> &CardMultiset {
        &self.deck
    }

    pub fn hand(&self) -> &CardMultiset {
        &self.hand
    }

    pub fn in_play(&self) -> &CardMultiset {
        &self.in_play
    }

    pub fn discard(&self) -> &CardMultiset {
        &self.discard
    }

    pub fn actions(&self) -> u32 {
        self.actions
    }

    pub fn buys(&self) -> u32 {
        self.buys
    }

    pub fn action_coins(&self) -> u32 {
        self.action_coins
    }

    /// Play a card from hand: it moves to in play, consumes one action and
    /// credits whatever the card grants. Drawing is left to the caller.
    pub fn play_from_hand(&self, card: &CardDefinition) -> Result<TurnState, StateError> {
        if self.actions == 0 {
            return Err(StateError::NoActionsRemaining(card.name.clone()));
        }
        let actions = (self.actions - 1).saturating_add(card.actions);

        let mut next = self.clone();
        next.hand
            .remove(card.id)
            .map_err(|source| StateError::CardNotInPile {
                card: card.id,
                pile: Pile::Hand,
                source,
            })?;
        next.in_play.add(card.id);
        next.actions = actions;
        next.buys = self.buys + card.buys;
        next.action_coins = self.action_coins + card.coins;
        Ok(next)
    }

    pub fn draw_from_deck(&self, card: CardId) -> Result<TurnState, StateError> {
        let mut next = self.clone();
        next.deck
            .remove(card)
            .map_err(|source| StateError::CardNotInPile {
                card,
                pile: Pile::Deck,
                source,
            })?;
        next.hand.add(card);
        Ok(next)
    }

    /// Draw the given number of copies of each card at once
    pub fn draw_many(&self, cards: &[(CardId, u32)]) -> Result<TurnState, StateError> {
        let mut next = self.clone();
        for &(card, count) in cards {
            if next.deck.count_of(card) < count {
                return Err(StateError::CardNotInPile {
                    card,
                    pile: Pile::Deck,
                    source: PileError::CardNotPresent(card),
                });
            }
            for _ in 0..count {
                next.deck
                    .remove(card)
                    .map_err(|source| StateError::CardNotInPile {
                        card,
                        pile: Pile::Deck,
                        source,
                    })?;
            }
            next.hand.add_many(card, count);
        }
        Ok(next)
    }

    /// Move the whole remaining deck into hand.
    ///
    /// The discard pile is never reshuffled into a new deck.
    pub fn fold_deck_into_hand(&self) -> TurnState {
        let mut next = self.clone();
        next.hand = self.hand.merge(&self.deck);
        next.deck = CardMultiset::new();
        next
    }

    /// Treasure value of the hand plus coins granted by played actions
    pub fn coin_value(&self, db: &CardDatabase) -> u32 {
        let treasure: u32 = db
            .treasure_cards()
            .map(|c| c.coins * self.hand.count_of(c.id))
            .sum();
        treasure + self.action_coins
    }

    pub fn total_card_count(&self) -> u64 {
        [&self.deck, &self.hand, &self.in_play, &self.discard]
            .iter()
            .map(|pile| u64::from(pile.size()))
            .sum()
    }

    /// Action cards from the catalog that are in hand, in catalog order
    pub fn playable_actions<'a>(
        &'a self,
        db: &'a CardDatabase,
    ) -> impl Iterator<Item = &'a CardDefinition> + 'a {
        db.action_cards().filter(move |c| self.hand.contains(c.id))
    }

    pub fn describe(&self, db: &CardDatabase) -> String {
        format!(
            "Deck    ({:2}): {}\nHand    ({:2}): {}\nIn play ({:2}): {}\nDiscard ({:2}): {}\nActions: {}  Buys: {}  Action coins: {}",
            self.deck.size(),
            self.deck.describe(db),
            self.hand.size(),
            self.hand.describe(db),
            self.in_play.size(),
            self.in_play.describe(db),
            self.discard.size(),
            self.discard.describe(db),
            self.actions,
            self.buys,
            self.action_coins,
        )
    }
}
