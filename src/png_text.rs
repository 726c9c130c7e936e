//! PNG `tEXt` chunk codec.
//!
//! Character exports ride inside standard PNG ancillary `tEXt` chunks so the
//! file renders normally in any image viewer while carrying a machine-readable
//! payload. Values are always base64-encoded UTF-8 JSON, never raw JSON, so
//! the payload stays transport-safe for keyword-scanning tools.
//!
//! Chunks are located with a forward, length-driven walk: read each chunk's
//! declared length, skip that many bytes, repeat until `IEND`. Every access is
//! bounds-checked against the buffer.

use std::fmt;

use base64::Engine;
use crc32fast::Hasher;

pub const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// Longest keyword the PNG spec allows in a tEXt chunk.
const MAX_KEYWORD_LEN: usize = 79;

#[derive(Debug, PartialEq, Eq)]
pub enum PngTextError {
    InvalidSignature,
    TruncatedChunk,
    InvalidChunkLength,
    MissingIend,
    InvalidCrc { chunk_type: [u8; 4] },
    InvalidKeyword(String),
    MalformedText(&'static str),
    MissingKeyword(String),
}

impl fmt::Display for PngTextError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PngTextError::InvalidSignature => write!(f, "file is not a PNG"),
            PngTextError::TruncatedChunk => write!(f, "unexpected end of PNG data"),
            PngTextError::InvalidChunkLength => {
                write!(f, "chunk length exceeds PNG bounds")
            }
            PngTextError::MissingIend => {
                write!(f, "PNG has no IEND chunk")
            }
            PngTextError::InvalidCrc { chunk_type } => {
                write!(
                    f,
                    "chunk {} failed CRC validation",
                    display_chunk_type(chunk_type)
                )
            }
            PngTextError::InvalidKeyword(keyword) => {
                write!(f, "invalid tEXt keyword: '{}'", keyword)
            }
            PngTextError::MalformedText(reason) => {
                write!(f, "malformed tEXt chunk: {}", reason)
            }
            PngTextError::MissingKeyword(keyword) => {
                write!(f, "missing '{}' tEXt metadata", keyword)
            }
        }
    }
}

impl std::error::Error for PngTextError {}

/// A keyword/JSON pair destined for one `tEXt` chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextChunk {
    pub keyword: String,
    pub json: String,
}

impl TextChunk {
    pub fn new(keyword: impl Into<String>, json: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            json: json.into(),
        }
    }
}

struct RawChunk {
    chunk_type: [u8; 4],
    data_start: usize,
    data_end: usize,
}

impl RawChunk {
    /// Offset of the byte just past this chunk's CRC.
    fn end(&self) -> usize {
        self.data_end + 4
    }
}

fn read_chunk(data: &[u8], offset: usize) -> Result<RawChunk, PngTextError> {
    if offset + 8 > data.len() {
        return Err(PngTextError::MissingIend);
    }
    let length = u32::from_be_bytes(data[offset..offset + 4].try_into().unwrap()) as usize;
    let chunk_type: [u8; 4] = data[offset + 4..offset + 8]
        .try_into()
        .expect("slice of length 4");
    let data_start = offset + 8;
    let data_end = data_start
        .checked_add(length)
        .ok_or(PngTextError::InvalidChunkLength)?;
    if data_end + 4 > data.len() {
        return Err(PngTextError::TruncatedChunk);
    }
    Ok(RawChunk {
        chunk_type,
        data_start,
        data_end,
    })
}

/// Walk the chunk sequence and return the offset where the IEND chunk begins
/// (the first byte of its length field).
fn find_iend_offset(data: &[u8]) -> Result<usize, PngTextError> {
    if data.len() < PNG_SIGNATURE.len() || data[..PNG_SIGNATURE.len()] != PNG_SIGNATURE {
        return Err(PngTextError::InvalidSignature);
    }

    let mut offset = PNG_SIGNATURE.len();
    loop {
        let chunk = read_chunk(data, offset)?;
        if &chunk.chunk_type == b"IEND" {
            return Ok(offset);
        }
        offset = chunk.end();
    }
}

/// Encode one `tEXt` chunk carrying `json` under `keyword`.
///
/// The JSON string is UTF-8 encoded then base64'd; the chunk data is
/// `keyword ‖ NUL ‖ base64(json)`. The CRC covers the chunk type and data but
/// not the length field, per the PNG spec.
///
/// # Errors
///
/// Returns [`PngTextError::InvalidKeyword`] when the keyword is empty, longer
/// than 79 bytes, or contains characters outside Latin-1 (including NUL);
/// such keywords have no defined tEXt encoding.
pub fn build_text_chunk(keyword: &str, json: &str) -> Result<Vec<u8>, PngTextError> {
    let keyword_bytes = latin1_keyword_bytes(keyword)?;

    let value = base64::prelude::BASE64_STANDARD.encode(json.as_bytes());

    let mut data = Vec::with_capacity(keyword_bytes.len() + 1 + value.len());
    data.extend_from_slice(&keyword_bytes);
    data.push(0);
    data.extend_from_slice(value.as_bytes());

    let mut hasher = Hasher::new();
    hasher.update(b"tEXt");
    hasher.update(&data);
    let crc = hasher.finalize();

    let mut out = Vec::with_capacity(12 + data.len());
    out.extend_from_slice(&(data.len() as u32).to_be_bytes());
    out.extend_from_slice(b"tEXt");
    out.extend_from_slice(&data);
    out.extend_from_slice(&crc.to_be_bytes());
    Ok(out)
}

/// Splice `tEXt` chunks into `png` immediately before its IEND chunk.
///
/// The buffer is split at the start of IEND; every byte before and after the
/// split point is carried into the output unchanged, including any
/// nonstandard trailing bytes after IEND. New chunks appear in the order
/// given. An empty chunk list returns the input unchanged (the walk still
/// validates that an IEND chunk exists).
///
/// # Errors
///
/// Returns an error when the buffer is not a PNG, a declared chunk length
/// overruns the buffer, or no IEND chunk is present.
pub fn embed_text_chunks(png: &[u8], chunks: &[TextChunk]) -> Result<Vec<u8>, PngTextError> {
    let iend_offset = find_iend_offset(png)?;

    let mut encoded = Vec::with_capacity(chunks.len());
    for chunk in chunks {
        encoded.push(build_text_chunk(&chunk.keyword, &chunk.json)?);
    }

    let added: usize = encoded.iter().map(Vec::len).sum();
    let mut out = Vec::with_capacity(png.len() + added);
    out.extend_from_slice(&png[..iend_offset]);
    for chunk in &encoded {
        out.extend_from_slice(chunk);
    }
    out.extend_from_slice(&png[iend_offset..]);
    Ok(out)
}

/// Return the value of the first `tEXt` chunk carrying `keyword`.
///
/// Each visited chunk's CRC is verified before its data is trusted. The value
/// is returned as Latin-1 text; callers holding base64 payloads decode it
/// themselves.
pub fn extract_text(data: &[u8], keyword: &str) -> Result<String, PngTextError> {
    if data.len() < PNG_SIGNATURE.len() || data[..PNG_SIGNATURE.len()] != PNG_SIGNATURE {
        return Err(PngTextError::InvalidSignature);
    }

    let mut offset = PNG_SIGNATURE.len();
    while offset + 8 <= data.len() {
        let chunk = read_chunk(data, offset)?;
        let chunk_data = &data[chunk.data_start..chunk.data_end];
        let crc_bytes: [u8; 4] = data[chunk.data_end..chunk.data_end + 4]
            .try_into()
            .expect("slice of length 4");
        let actual_crc = u32::from_be_bytes(crc_bytes);
        let mut hasher = Hasher::new();
        hasher.update(&chunk.chunk_type);
        hasher.update(chunk_data);
        if actual_crc != hasher.finalize() {
            return Err(PngTextError::InvalidCrc {
                chunk_type: chunk.chunk_type,
            });
        }

        if &chunk.chunk_type == b"tEXt" {
            let Some(null_pos) = chunk_data.iter().position(|&b| b == 0) else {
                return Err(PngTextError::MalformedText("missing keyword separator"));
            };
            let keyword_bytes = &chunk_data[..null_pos];
            let value_bytes = &chunk_data[null_pos + 1..];
            let chunk_keyword: String = keyword_bytes.iter().map(|&b| b as char).collect();
            if chunk_keyword == keyword {
                let text: String = value_bytes.iter().map(|&b| b as char).collect();
                return Ok(text);
            }
        }

        offset = chunk.end();
        if &chunk.chunk_type == b"IEND" {
            break;
        }
    }

    Err(PngTextError::MissingKeyword(keyword.to_string()))
}

fn latin1_keyword_bytes(keyword: &str) -> Result<Vec<u8>, PngTextError> {
    let bytes: Vec<u8> = keyword
        .chars()
        .map(|c| {
            let code = c as u32;
            if code == 0 || code > 0xFF {
                Err(PngTextError::InvalidKeyword(keyword.to_string()))
            } else {
                Ok(code as u8)
            }
        })
        .collect::<Result<_, _>>()?;
    if bytes.is_empty() || bytes.len() > MAX_KEYWORD_LEN {
        return Err(PngTextError::InvalidKeyword(keyword.to_string()));
    }
    Ok(bytes)
}

fn display_chunk_type(chunk_type: &[u8; 4]) -> String {
    chunk_type
        .iter()
        .map(|&b| {
            if (32..=126).contains(&b) {
                b as char
            } else {
                '.'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_IHDR: [u8; 13] = [
        0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x02, 0x00, 0x00, 0x00,
    ];

    const TEST_IDAT: [u8; 12] = [
        0x78, 0xDA, 0x63, 0x60, 0x60, 0x60, 0x00, 0x00, 0x00, 0x04, 0x00, 0x01,
    ];

    fn build_png(with_iend: bool) -> Vec<u8> {
        let mut png = Vec::new();
        png.extend_from_slice(&PNG_SIGNATURE);
        png.extend_from_slice(&chunk(*b"IHDR", &TEST_IHDR));
        png.extend_from_slice(&chunk(*b"IDAT", &TEST_IDAT));
        if with_iend {
            png.extend_from_slice(&chunk(*b"IEND", &[]));
        }
        png
    }

    fn chunk(chunk_type: [u8; 4], data: &[u8]) -> Vec<u8> {
        let mut out = Vec::with_capacity(12 + data.len());
        out.extend_from_slice(&(data.len() as u32).to_be_bytes());
        out.extend_from_slice(&chunk_type);
        out.extend_from_slice(data);
        let mut hasher = Hasher::new();
        hasher.update(&chunk_type);
        hasher.update(data);
        out.extend_from_slice(&hasher.finalize().to_be_bytes());
        out
    }

    #[test]
    fn builds_chunk_with_expected_layout() {
        let built = build_text_chunk("chara", "{\"name\":\"Eve\"}").unwrap();
        let expected_value = b"eyJuYW1lIjoiRXZlIn0=";

        let length = u32::from_be_bytes(built[0..4].try_into().unwrap()) as usize;
        assert_eq!(length, 5 + 1 + expected_value.len());
        assert_eq!(&built[4..8], b"tEXt");
        assert_eq!(&built[8..13], b"chara");
        assert_eq!(built[13], 0);
        assert_eq!(&built[14..14 + expected_value.len()], expected_value);
        assert_eq!(built.len(), 12 + length);
    }

    #[test]
    fn chunk_crc_matches_reference_implementation() {
        // CRC-32 (zlib polynomial) of "tEXt" + "chara\0eyJuYW1lIjoiRXZlIn0="
        // computed with an independent implementation.
        let built = build_text_chunk("chara", "{\"name\":\"Eve\"}").unwrap();
        let crc = u32::from_be_bytes(built[built.len() - 4..].try_into().unwrap());
        assert_eq!(crc, 0x3B24_6CEC);
    }

    #[test]
    fn crc_hasher_matches_check_values() {
        let mut hasher = Hasher::new();
        hasher.update(b"123456789");
        assert_eq!(hasher.finalize(), 0xCBF4_3926);

        let mut hasher = Hasher::new();
        hasher.update(b"IEND");
        assert_eq!(hasher.finalize(), 0xAE42_6082);
    }

    #[test]
    fn round_trips_keyword_and_json() {
        let json = "{\"data\":{\"name\":\"Ärger\",\"text\":\"line1\\nline2\"}}";
        let png = embed_text_chunks(&build_png(true), &[TextChunk::new("swelld", json)]).unwrap();

        let value = extract_text(&png, "swelld").unwrap();
        let decoded = base64::prelude::BASE64_STANDARD
            .decode(value.as_bytes())
            .unwrap();
        assert_eq!(String::from_utf8(decoded).unwrap(), json);
    }

    #[test]
    fn embed_grows_buffer_by_exact_chunk_lengths() {
        let png = build_png(true);
        let chunks = [
            TextChunk::new("chara", "{\"a\":1}"),
            TextChunk::new("ccv3", "{\"a\":1}"),
        ];
        let built: usize = chunks
            .iter()
            .map(|c| build_text_chunk(&c.keyword, &c.json).unwrap().len())
            .sum();

        let out = embed_text_chunks(&png, &chunks).unwrap();
        assert_eq!(out.len(), png.len() + built);
    }

    #[test]
    fn embed_preserves_head_and_tail_bytes() {
        let mut png = build_png(true);
        // Nonstandard trailing bytes after IEND must survive untouched.
        png.extend_from_slice(b"trailing-junk");
        let iend_offset = png.len() - b"trailing-junk".len() - 12;

        let out = embed_text_chunks(&png, &[TextChunk::new("swelld", "{}")]).unwrap();

        assert_eq!(&out[..iend_offset], &png[..iend_offset]);
        let inserted = out.len() - png.len();
        assert_eq!(&out[iend_offset + inserted..], &png[iend_offset..]);
        assert!(out.ends_with(b"trailing-junk"));
    }

    #[test]
    fn embedded_chunks_sit_immediately_before_iend() {
        let png = build_png(true);
        let out = embed_text_chunks(&png, &[TextChunk::new("swelld", "{}")]).unwrap();

        let iend_offset = find_iend_offset(&out).unwrap();
        let chunk_len = build_text_chunk("swelld", "{}").unwrap().len();
        assert_eq!(&out[iend_offset - chunk_len + 4..iend_offset - chunk_len + 8], b"tEXt");
        assert_eq!(&out[iend_offset + 4..iend_offset + 8], b"IEND");
    }

    #[test]
    fn embed_with_no_chunks_returns_input_unchanged() {
        let png = build_png(true);
        let out = embed_text_chunks(&png, &[]).unwrap();
        assert_eq!(out, png);
    }

    #[test]
    fn embed_rejects_missing_iend() {
        let png = build_png(false);
        let result = embed_text_chunks(&png, &[TextChunk::new("swelld", "{}")]);
        assert!(matches!(result, Err(PngTextError::MissingIend)));
    }

    #[test]
    fn embed_rejects_invalid_signature() {
        let result = embed_text_chunks(b"notpng", &[TextChunk::new("swelld", "{}")]);
        assert!(matches!(result, Err(PngTextError::InvalidSignature)));
    }

    #[test]
    fn embed_rejects_truncated_chunk() {
        let mut png = build_png(true);
        png.truncate(png.len() - 2);
        let result = embed_text_chunks(&png, &[]);
        assert!(matches!(result, Err(PngTextError::TruncatedChunk)));
    }

    #[test]
    fn rejects_non_latin1_keyword() {
        let result = build_text_chunk("日本語", "{}");
        assert!(matches!(result, Err(PngTextError::InvalidKeyword(_))));
    }

    #[test]
    fn rejects_empty_and_oversized_keywords() {
        assert!(matches!(
            build_text_chunk("", "{}"),
            Err(PngTextError::InvalidKeyword(_))
        ));
        let long = "k".repeat(80);
        assert!(matches!(
            build_text_chunk(&long, "{}"),
            Err(PngTextError::InvalidKeyword(_))
        ));
    }

    #[test]
    fn accepts_latin1_supplement_keyword() {
        // é is U+00E9, inside Latin-1.
        let built = build_text_chunk("résumé", "{}").unwrap();
        assert_eq!(&built[8..14], &[b'r', 0xE9, b's', b'u', b'm', 0xE9]);
    }

    #[test]
    fn extract_reports_missing_keyword() {
        let png = build_png(true);
        let result = extract_text(&png, "chara");
        assert!(matches!(result, Err(PngTextError::MissingKeyword(_))));
    }

    #[test]
    fn extract_rejects_corrupted_crc() {
        let mut png = embed_text_chunks(&build_png(true), &[TextChunk::new("chara", "{}")]).unwrap();
        // Flip a bit inside the tEXt chunk data.
        let iend_offset = find_iend_offset(&png).unwrap();
        png[iend_offset - 6] ^= 0x01;
        let result = extract_text(&png, "chara");
        assert!(matches!(result, Err(PngTextError::InvalidCrc { .. })));
    }

    #[test]
    fn extract_finds_first_of_duplicate_keywords() {
        let chunks = [
            TextChunk::new("chara", "{\"v\":1}"),
            TextChunk::new("chara", "{\"v\":2}"),
        ];
        let png = embed_text_chunks(&build_png(true), &chunks).unwrap();
        let value = extract_text(&png, "chara").unwrap();
        let decoded = base64::prelude::BASE64_STANDARD
            .decode(value.as_bytes())
            .unwrap();
        assert_eq!(String::from_utf8(decoded).unwrap(), "{\"v\":1}");
    }
}
