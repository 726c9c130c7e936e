//! Internal character record model.
//!
//! These structs mirror the application's JSON snapshots (camelCase field
//! names on the wire). Optional fields use `Option<T>` with defaults applied
//! at conversion time, so a record missing them still round-trips byte-stable.

use serde::{Deserialize, Serialize};

/// A character snapshot as supplied by the caller for one export.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Character {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub personality: String,
    #[serde(default)]
    pub scenario: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Path to the avatar image on disk, if one was ever assigned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_path: Option<String>,
    /// Inlined `data:image/png;base64,…` URI. Only populated on the cloned
    /// record inside a native export so re-import can restore the original
    /// avatar.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_story_id: Option<String>,
    #[serde(default)]
    pub stories: Vec<Story>,
    #[serde(default)]
    pub constant_reminders: Vec<ConstantReminder>,
}

/// One story branch of a character.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Story {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_welcome_message_id: Option<String>,
    #[serde(default)]
    pub welcome_messages: Vec<WelcomeMessage>,
    #[serde(default)]
    pub example_dialogues: Vec<ExampleDialogue>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WelcomeMessage {
    pub id: String,
    #[serde(default)]
    pub text: String,
}

/// A single example exchange. Either side may be empty; a dialogue with both
/// sides empty contributes nothing to an export.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExampleDialogue {
    #[serde(default)]
    pub user_text: String,
    #[serde(default)]
    pub character_text: String,
}

/// A lore reminder that is always in scope for the character.
///
/// Everything beyond `keys` and `text` is optional on the wire; conversion
/// applies the documented defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConstantReminder {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub keys: Vec<String>,
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub case_sensitive: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scan_depth: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constant: Option<bool>,
}

impl Story {
    /// The welcome message an export should lead with: the one matching
    /// `activeWelcomeMessageId`, falling back to the first when there is no
    /// match or no id.
    pub fn active_welcome_message(&self) -> Option<&WelcomeMessage> {
        if let Some(id) = &self.active_welcome_message_id {
            if let Some(found) = self.welcome_messages.iter().find(|m| &m.id == id) {
                return Some(found);
            }
        }
        self.welcome_messages.first()
    }

    /// Text of the active welcome message, empty when the story has none.
    pub fn active_welcome_text(&self) -> &str {
        self.active_welcome_message()
            .map(|m| m.text.as_str())
            .unwrap_or("")
    }
}

impl ExampleDialogue {
    pub fn is_empty(&self) -> bool {
        self.user_text.is_empty() && self.character_text.is_empty()
    }
}
