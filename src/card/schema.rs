//! Interchange character card model following the v3 specification.

use serde::{Deserialize, Serialize};

/// A `chara_card_v3` card as consumed by third-party frontends.
///
/// The six persona fields appear twice: at the top level for readers that
/// predate the nested layout, and inside [`CardData`] alongside the v3
/// extension fields.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CharacterCard {
    pub spec: String,
    pub spec_version: String,
    pub name: String,
    pub description: String,
    pub personality: String,
    pub scenario: String,
    pub first_mes: String,
    pub mes_example: String,
    pub avatar: String,
    pub tags: Vec<String>,
    pub data: CardData,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CardData {
    pub name: String,
    pub description: String,
    pub personality: String,
    pub scenario: String,
    pub first_mes: String,
    pub mes_example: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub creator: String,
    #[serde(default)]
    pub alternate_greetings: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub character_book: Option<CharacterBook>,
}

/// Lorebook wrapper. Only present on cards with at least one lore entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CharacterBook {
    pub name: String,
    pub scan_depth: u32,
    pub token_budget: u32,
    pub recursive_scanning: bool,
    pub entries: Vec<LoreEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoreEntry {
    pub keys: Vec<String>,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub case_sensitive: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scan_depth: Option<u32>,
    pub enabled: bool,
    pub insertion_order: i64,
    pub constant: bool,
    pub name: String,
    pub comment: String,
}
