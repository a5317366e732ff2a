pub mod database;
pub mod types;

pub use database::{CardDatabase, CardDatabaseError};
pub use types::{CardCategory, CardDefinition, CardId};
