pub mod convert;
pub mod schema;

// Re-exports for internal module use
pub use convert::character_to_card;
pub use schema::{CardData, CharacterBook, CharacterCard, LoreEntry};
