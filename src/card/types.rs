use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier of a card definition
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardId(pub u16);

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Card categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardCategory {
    Treasure,
    Action,
}

/// A card definition: what a card grants when held or played
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardDefinition {
    pub id: CardId,
    pub name: String,
    pub category: CardCategory,
    /// +Actions when played
    #[serde(default)]
    pub actions: u32,
    /// +Buys when played
    #[serde(default)]
    pub buys: u32,
    /// Coins: granted on play for actions, held value for treasures
    #[serde(default)]
    pub coins: u32,
    /// +Cards when played
    #[serde(default)]
    pub cards: u32,
}

impl CardDefinition {
    pub fn is_action(&self) -> bool {
        self.category == CardCategory::Action
    }

    pub fn is_treasure(&self) -> bool {
        self.category == CardCategory::Treasure
    }
}

impl fmt::Display for CardDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
