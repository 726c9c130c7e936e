//! Export orchestration.
//!
//! One call = one written PNG. The pipeline acquires and normalizes the
//! avatar, applies the profile's visual treatment, builds the metadata JSON,
//! splices it into the image, and persists the result. Every step before the
//! final write is pure buffer-to-buffer work, so a failure anywhere leaves no
//! partial file behind.

use std::fmt;
use std::fs;
use std::path::PathBuf;

use tracing::debug;

use crate::card::character_to_card;
use crate::character::{Character, Story};
use crate::core::constants::{CCV3_KEYWORD, CHARA_KEYWORD, NATIVE_KEYWORD};
use crate::export::avatar::{
    default_logo, normalize_to_png, overlay_logo, resolve_avatar_bytes, to_data_uri, AvatarError,
};
use crate::export::native::build_native_export;
use crate::png_text::{embed_text_chunks, PngTextError, TextChunk};

/// Which metadata payload the exported PNG carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportProfile {
    /// `chara` + `ccv3` chunks with the interchange card, readable by
    /// third-party frontends.
    Interchange,
    /// A single `swelld` chunk with the full-fidelity native envelope.
    Native,
}

impl ExportProfile {
    /// Output subdirectory for this profile.
    pub fn dir_name(&self) -> &'static str {
        match self {
            ExportProfile::Interchange => "interchange",
            ExportProfile::Native => "native",
        }
    }
}

impl fmt::Display for ExportProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// Everything one export call needs, supplied by the caller as a snapshot.
pub struct ExportRequest<'a> {
    pub character: &'a Character,
    pub profile: ExportProfile,
    /// Story ids to include. Empty selects every story.
    pub selected_story_ids: Vec<String>,
    /// Caller-resolved avatar file. `None`, or a missing file, falls back to
    /// the procedural placeholder.
    pub avatar_path: Option<PathBuf>,
    /// Flows to embed in a native export. `None` means embedding was not
    /// requested; `Some` with an empty list still omits the `flows` key.
    pub flows: Option<Vec<serde_json::Value>>,
    /// Logo image composited onto native exports. Falls back to the built-in
    /// badge when absent.
    pub logo: Option<Vec<u8>>,
    /// Directory under which the per-profile output directory is created.
    pub output_root: PathBuf,
}

#[derive(Debug)]
pub enum ExportError {
    /// Avatar acquisition or raster treatment failed.
    Avatar(AvatarError),
    /// The base image is not a complete PNG.
    Format(PngTextError),
    /// Metadata could not be serialized to JSON.
    Serialize(serde_json::Error),
    /// Destination directory or file could not be written.
    Io(std::io::Error),
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportError::Avatar(err) => write!(f, "{err}"),
            ExportError::Format(err) => write!(f, "invalid base PNG: {err}"),
            ExportError::Serialize(err) => write!(f, "metadata serialization failed: {err}"),
            ExportError::Io(err) => write!(f, "export I/O error: {err}"),
        }
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExportError::Avatar(err) => Some(err),
            ExportError::Format(err) => Some(err),
            ExportError::Serialize(err) => Some(err),
            ExportError::Io(err) => Some(err),
        }
    }
}

impl From<AvatarError> for ExportError {
    fn from(err: AvatarError) -> Self {
        ExportError::Avatar(err)
    }
}

impl From<PngTextError> for ExportError {
    fn from(err: PngTextError) -> Self {
        ExportError::Format(err)
    }
}

impl From<serde_json::Error> for ExportError {
    fn from(err: serde_json::Error) -> Self {
        ExportError::Serialize(err)
    }
}

impl From<std::io::Error> for ExportError {
    fn from(err: std::io::Error) -> Self {
        ExportError::Io(err)
    }
}

/// Run the full export pipeline and return the path of the written PNG.
///
/// The destination is `<output_root>/<profile>/<sanitized name>.png` and is
/// overwritten unconditionally; concurrent exports to the same name are
/// last-write-wins.
pub fn export_character(request: &ExportRequest<'_>) -> Result<PathBuf, ExportError> {
    let character = request.character;

    let raw = resolve_avatar_bytes(request.avatar_path.as_deref(), &character.name)?;
    let normalized = normalize_to_png(&raw)?;
    debug!(
        profile = %request.profile,
        bytes = normalized.len(),
        "avatar normalized"
    );

    // The clean copy must be captured before any visual treatment so a
    // re-import recovers the avatar without the logo baked in.
    let avatar_data = matches!(request.profile, ExportProfile::Native)
        .then(|| to_data_uri(&normalized));

    let base_png = match request.profile {
        ExportProfile::Native => {
            let logo = request.logo.clone().unwrap_or_else(default_logo);
            overlay_logo(&normalized, &logo)?
        }
        ExportProfile::Interchange => normalized,
    };

    let chunks = build_metadata_chunks(request, avatar_data)?;
    let bytes = embed_text_chunks(&base_png, &chunks)?;

    let out_dir = request.output_root.join(request.profile.dir_name());
    fs::create_dir_all(&out_dir)?;
    let path = out_dir.join(format!("{}.png", sanitize_file_name(&character.name)));
    fs::write(&path, &bytes)?;
    debug!(path = %path.display(), "character exported");
    Ok(path)
}

fn build_metadata_chunks(
    request: &ExportRequest<'_>,
    avatar_data: Option<String>,
) -> Result<Vec<TextChunk>, ExportError> {
    let character = request.character;
    match request.profile {
        ExportProfile::Interchange => {
            let stories = selected_stories(character, &request.selected_story_ids);
            let card = character_to_card(character, &stories);
            let json = serde_json::to_string(&card)?;
            // Two chunks, byte-identical payloads, for readers expecting
            // either keyword.
            Ok(vec![
                TextChunk::new(CHARA_KEYWORD, json.clone()),
                TextChunk::new(CCV3_KEYWORD, json),
            ])
        }
        ExportProfile::Native => {
            let envelope = build_native_export(
                character,
                &request.selected_story_ids,
                avatar_data,
                request.flows.as_deref(),
            );
            let json = serde_json::to_string(&envelope)?;
            Ok(vec![TextChunk::new(NATIVE_KEYWORD, json)])
        }
    }
}

/// The caller's story selection in record order; an empty selection means
/// every story.
fn selected_stories(character: &Character, selected_ids: &[String]) -> Vec<Story> {
    if selected_ids.is_empty() {
        return character.stories.clone();
    }
    character
        .stories
        .iter()
        .filter(|story| selected_ids.contains(&story.id))
        .cloned()
        .collect()
}

/// Replace every character outside `[A-Za-z0-9]` with `_`.
pub fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}
