//! Native full-fidelity export envelope.
//!
//! Unlike the interchange card, the native envelope carries the complete
//! internal record, so a re-import loses nothing. The embedded record is a
//! clone of the caller's snapshot; concurrent exports of the same in-memory
//! character cannot observe each other's mutations.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::character::Character;
use crate::core::constants::{NATIVE_TYPE, NATIVE_VERSION};

/// Envelope written into the `swelld` tEXt chunk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NativeExport {
    #[serde(rename = "type")]
    pub export_type: String,
    pub version: String,
    pub exported_at: String,
    pub data: Character,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flows: Option<Vec<serde_json::Value>>,
}

/// Assemble the native envelope for one export call.
///
/// Stories are filtered to the selection set only when the selection is
/// non-empty; an empty selection passes every story through. `avatar_data`
/// is the pre-overlay data URI captured by the pipeline, attached verbatim
/// so re-import can restore the original avatar even though the displayed
/// pixels carry the composited logo. `flows` is attached only when the
/// caller requested embedding (`Some`) and supplied at least one flow.
pub fn build_native_export(
    character: &Character,
    selected_story_ids: &[String],
    avatar_data: Option<String>,
    flows: Option<&[serde_json::Value]>,
) -> NativeExport {
    let mut data = character.clone();

    if !selected_story_ids.is_empty() {
        data.stories
            .retain(|story| selected_story_ids.contains(&story.id));
    }

    if avatar_data.is_some() {
        data.avatar_data = avatar_data;
    }

    let flows = flows
        .filter(|flows| !flows.is_empty())
        .map(|flows| flows.to_vec());

    NativeExport {
        export_type: NATIVE_TYPE.to_string(),
        version: NATIVE_VERSION.to_string(),
        exported_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        data,
        flows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::Story;

    fn character_with_stories(ids: &[&str]) -> Character {
        Character {
            id: "c1".to_string(),
            name: "Eve".to_string(),
            description: String::new(),
            personality: String::new(),
            scenario: String::new(),
            creator: None,
            tags: Vec::new(),
            avatar_path: None,
            avatar_data: None,
            active_story_id: None,
            stories: ids
                .iter()
                .map(|id| Story {
                    id: id.to_string(),
                    name: String::new(),
                    active_welcome_message_id: None,
                    welcome_messages: Vec::new(),
                    example_dialogues: Vec::new(),
                })
                .collect(),
            constant_reminders: Vec::new(),
        }
    }

    #[test]
    fn filters_stories_to_selection() {
        let character = character_with_stories(&["s1", "s2", "s3"]);
        let selection = vec!["s1".to_string(), "s3".to_string()];

        let export = build_native_export(&character, &selection, None, None);
        let ids: Vec<&str> = export.data.stories.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["s1", "s3"]);

        // The caller's snapshot is untouched.
        assert_eq!(character.stories.len(), 3);
    }

    #[test]
    fn empty_selection_passes_all_stories_through() {
        let character = character_with_stories(&["s1", "s2"]);
        let export = build_native_export(&character, &[], None, None);
        assert_eq!(export.data.stories.len(), 2);
    }

    #[test]
    fn attaches_avatar_data_verbatim() {
        let character = character_with_stories(&[]);
        let uri = "data:image/png;base64,AAAA".to_string();
        let export = build_native_export(&character, &[], Some(uri.clone()), None);
        assert_eq!(export.data.avatar_data, Some(uri));
    }

    #[test]
    fn omits_flows_when_not_requested_or_empty() {
        let character = character_with_stories(&[]);

        let export = build_native_export(&character, &[], None, None);
        assert!(export.flows.is_none());

        let export = build_native_export(&character, &[], None, Some(&[]));
        assert!(export.flows.is_none());

        let json = serde_json::to_string(&export).unwrap();
        assert!(!json.contains("\"flows\""));
    }

    #[test]
    fn embeds_non_empty_flows() {
        let character = character_with_stories(&[]);
        let flows = vec![serde_json::json!({"id": "f1", "nodes": []})];
        let export = build_native_export(&character, &[], None, Some(&flows));
        assert_eq!(export.flows.as_ref().map(Vec::len), Some(1));
    }

    #[test]
    fn envelope_serializes_with_expected_keys() {
        let character = character_with_stories(&[]);
        let export = build_native_export(&character, &[], None, None);
        assert_eq!(export.export_type, "swelldreams-character");
        assert_eq!(export.version, "1.5");

        let json = serde_json::to_string(&export).unwrap();
        assert!(json.contains("\"type\":\"swelldreams-character\""));
        assert!(json.contains("\"exportedAt\""));

        // The timestamp must parse back as RFC 3339.
        chrono::DateTime::parse_from_rfc3339(&export.exported_at).unwrap();
    }
}
