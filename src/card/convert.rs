//! Conversion from the internal character record to the interchange card.
//!
//! The conversion is deterministic and total: missing optional pieces degrade
//! to documented defaults (empty strings, the `100 + index` insertion order)
//! instead of erroring, so any well-formed record snapshot converts.

use crate::card::schema::{CardData, CharacterBook, CharacterCard, LoreEntry};
use crate::character::{Character, ConstantReminder, Story};
use crate::core::constants::{
    CARD_SPEC, CARD_SPEC_VERSION, LOREBOOK_ORDER_BASE, LOREBOOK_SCAN_DEPTH, LOREBOOK_TOKEN_BUDGET,
};

/// Build an interchange card from a character and the caller-selected
/// stories, in selection order.
///
/// The active story (id match on `activeStoryId`, else the first selection)
/// provides `first_mes` and the example transcript; every other selection
/// with a non-empty welcome message contributes to `alternate_greetings`.
pub fn character_to_card(character: &Character, stories: &[Story]) -> CharacterCard {
    let active_index = active_story_index(character, stories);
    let active_story = active_index.map(|i| &stories[i]);

    let first_mes = active_story
        .map(|s| s.active_welcome_text().to_string())
        .unwrap_or_default();

    let alternate_greetings: Vec<String> = stories
        .iter()
        .enumerate()
        .filter(|(i, _)| Some(*i) != active_index)
        .map(|(_, story)| story.active_welcome_text())
        .filter(|text| !text.is_empty())
        .map(|text| text.to_string())
        .collect();

    let mes_example = active_story.map(example_transcript).unwrap_or_default();

    let entries: Vec<LoreEntry> = character
        .constant_reminders
        .iter()
        .enumerate()
        .map(|(i, reminder)| reminder_to_lore_entry(reminder, i))
        .collect();
    let character_book = if entries.is_empty() {
        None
    } else {
        Some(CharacterBook {
            name: format!("{}'s Lorebook", character.name),
            scan_depth: LOREBOOK_SCAN_DEPTH,
            token_budget: LOREBOOK_TOKEN_BUDGET,
            recursive_scanning: false,
            entries,
        })
    };

    CharacterCard {
        spec: CARD_SPEC.to_string(),
        spec_version: CARD_SPEC_VERSION.to_string(),
        name: character.name.clone(),
        description: character.description.clone(),
        personality: character.personality.clone(),
        scenario: character.scenario.clone(),
        first_mes: first_mes.clone(),
        mes_example: mes_example.clone(),
        avatar: "none".to_string(),
        tags: Vec::new(),
        data: CardData {
            name: character.name.clone(),
            description: character.description.clone(),
            personality: character.personality.clone(),
            scenario: character.scenario.clone(),
            first_mes,
            mes_example,
            tags: character.tags.clone(),
            creator: character.creator.clone().unwrap_or_default(),
            alternate_greetings,
            character_book,
        },
    }
}

fn active_story_index(character: &Character, stories: &[Story]) -> Option<usize> {
    if stories.is_empty() {
        return None;
    }
    if let Some(active_id) = &character.active_story_id {
        if let Some(index) = stories.iter().position(|s| &s.id == active_id) {
            return Some(index);
        }
    }
    Some(0)
}

/// Flatten a story's example dialogues into a `<START>`-delimited transcript.
///
/// Each non-empty dialogue becomes one block; a side with no text is omitted
/// rather than emitting an empty turn, and dialogues with neither side are
/// dropped entirely.
fn example_transcript(story: &Story) -> String {
    let mut blocks = Vec::new();
    for dialogue in &story.example_dialogues {
        if dialogue.is_empty() {
            continue;
        }
        let mut lines = vec!["<START>".to_string()];
        if !dialogue.user_text.is_empty() {
            lines.push(format!("{{{{user}}}}: {}", dialogue.user_text));
        }
        if !dialogue.character_text.is_empty() {
            lines.push(format!("{{{{char}}}}: {}", dialogue.character_text));
        }
        blocks.push(lines.join("\n"));
    }
    blocks.join("\n")
}

fn reminder_to_lore_entry(reminder: &ConstantReminder, index: usize) -> LoreEntry {
    let label = reminder
        .name
        .clone()
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| format!("Entry {}", index + 1));

    LoreEntry {
        keys: reminder.keys.clone(),
        content: reminder.text.clone(),
        case_sensitive: reminder.case_sensitive,
        scan_depth: reminder.scan_depth,
        enabled: reminder.enabled.unwrap_or(true),
        insertion_order: reminder
            .priority
            .unwrap_or(LOREBOOK_ORDER_BASE + index as i64),
        constant: reminder.constant.unwrap_or(false),
        comment: label.clone(),
        name: label,
    }
}
