//! Re-import of previously exported cards.
//!
//! Reads the metadata back out of a card PNG: extract the keyed tEXt value,
//! base64-decode, UTF-8 decode, parse, validate. Used by the `inspect`
//! command and by round-trip tests. This is not a general third-party card
//! reader; it understands the two profiles this crate writes.

use std::fmt;
use std::fs;
use std::path::Path;

use base64::Engine;

use crate::card::CharacterCard;
use crate::core::constants::{CARD_SPEC, CCV3_KEYWORD, CHARA_KEYWORD, NATIVE_KEYWORD, NATIVE_TYPE};
use crate::export::native::NativeExport;
use crate::png_text::{extract_text, PngTextError};

/// Errors that can occur when reading an exported card back
#[derive(Debug)]
pub enum ImportError {
    /// File could not be found or read
    FileNotFound(String),
    /// PNG parsing failed
    InvalidPng(String),
    /// PNG metadata missing
    MissingMetadata(String),
    /// Payload decoding or JSON parsing failed
    InvalidJson(String),
    /// Envelope validation failed
    ValidationFailed(Vec<String>),
}

impl fmt::Display for ImportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportError::FileNotFound(msg) => {
                write!(f, "File not found: {}", msg)
            }
            ImportError::InvalidPng(msg) => {
                write!(f, "Invalid PNG: {}", msg)
            }
            ImportError::MissingMetadata(msg) => {
                write!(f, "Missing metadata: {}", msg)
            }
            ImportError::InvalidJson(msg) => {
                write!(f, "Invalid JSON: {}", msg)
            }
            ImportError::ValidationFailed(errors) => {
                writeln!(f, "Card validation failed:")?;
                for error in errors {
                    writeln!(f, "  • {}", error)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ImportError {}

/// Read the native envelope out of a `swelld`-profile PNG.
pub fn read_native_export<P: AsRef<Path>>(path: P) -> Result<NativeExport, ImportError> {
    let path = path.as_ref();
    let json = read_payload(path, &[NATIVE_KEYWORD])?;

    let envelope: NativeExport = serde_json::from_str(&json)
        .map_err(|e| ImportError::InvalidJson(format!("{}: {}", path.display(), e)))?;

    let mut errors = Vec::new();
    if envelope.export_type != NATIVE_TYPE {
        errors.push(format!(
            "Unexpected export type: expected '{}', got '{}'",
            NATIVE_TYPE, envelope.export_type
        ));
    }
    if envelope.data.name.is_empty() {
        errors.push("Character name is required and cannot be empty".to_string());
    }
    if !errors.is_empty() {
        return Err(ImportError::ValidationFailed(errors));
    }

    Ok(envelope)
}

/// Read the interchange card out of a `chara`/`ccv3`-profile PNG.
///
/// Both keywords carry the same payload on files this crate writes; either
/// one satisfies the read.
pub fn read_interchange_card<P: AsRef<Path>>(path: P) -> Result<CharacterCard, ImportError> {
    let path = path.as_ref();
    let json = read_payload(path, &[CHARA_KEYWORD, CCV3_KEYWORD])?;

    let card: CharacterCard = serde_json::from_str(&json)
        .map_err(|e| ImportError::InvalidJson(format!("{}: {}", path.display(), e)))?;

    let mut errors = Vec::new();
    if card.spec != CARD_SPEC {
        errors.push(format!(
            "Invalid spec field: expected '{}', got '{}'",
            CARD_SPEC, card.spec
        ));
    }
    if card.data.name.is_empty() {
        errors.push("Character name is required and cannot be empty".to_string());
    }
    if !errors.is_empty() {
        return Err(ImportError::ValidationFailed(errors));
    }

    Ok(card)
}

fn read_payload(path: &Path, keywords: &[&str]) -> Result<String, ImportError> {
    let bytes = fs::read(path)
        .map_err(|e| ImportError::FileNotFound(format!("{}: {}", path.display(), e)))?;

    let mut value = None;
    for keyword in keywords {
        match extract_text(&bytes, keyword) {
            Ok(text) => {
                value = Some(text);
                break;
            }
            Err(PngTextError::MissingKeyword(_)) => continue,
            Err(err) => {
                return Err(ImportError::InvalidPng(format!(
                    "{}: {}",
                    path.display(),
                    err
                )))
            }
        }
    }
    let value = value.ok_or_else(|| {
        ImportError::MissingMetadata(format!(
            "{}: PNG does not contain '{}' metadata in tEXt chunk",
            path.display(),
            keywords.join("' or '")
        ))
    })?;

    let decoded = base64::prelude::BASE64_STANDARD
        .decode(value.as_bytes())
        .map_err(|e| ImportError::InvalidJson(format!("{}: Base64 decode failed: {}", path.display(), e)))?;

    String::from_utf8(decoded)
        .map_err(|e| ImportError::InvalidJson(format!("{}: UTF-8 decode failed: {}", path.display(), e)))
}
