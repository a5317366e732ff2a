pub mod state;
pub mod zones;

pub use state::{StateError, TurnState};
pub use zones::{CardMultiset, Pile, PileError};
