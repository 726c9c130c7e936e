//! Avatar acquisition and raster treatment.
//!
//! The export pipeline never hands raw caller bytes to the chunk codec: every
//! avatar is decoded and re-encoded as a canonical single-frame PNG first, so
//! the embed step always receives a valid base raster. Pixel work (decode,
//! re-encode, overlay compositing, placeholder rendering) is delegated to the
//! `image` crate.

use std::fmt;
use std::io::Cursor;
use std::io::ErrorKind;
use std::path::Path;

use base64::Engine;
use crc32fast::Hasher;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, Rgba, RgbaImage};
use tracing::debug;

use crate::core::constants::PLACEHOLDER_SIZE;

#[derive(Debug)]
pub enum AvatarError {
    /// Avatar file exists but could not be read.
    Io(std::io::Error),
    /// Avatar or logo bytes could not be decoded, or the result could not be
    /// re-encoded.
    Image(image::ImageError),
}

impl fmt::Display for AvatarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AvatarError::Io(err) => write!(f, "avatar I/O error: {err}"),
            AvatarError::Image(err) => write!(f, "avatar image error: {err}"),
        }
    }
}

impl std::error::Error for AvatarError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AvatarError::Io(err) => Some(err),
            AvatarError::Image(err) => Some(err),
        }
    }
}

impl From<image::ImageError> for AvatarError {
    fn from(err: image::ImageError) -> Self {
        AvatarError::Image(err)
    }
}

/// Resolve the avatar bytes for a character.
///
/// A readable file wins. An absent file (or no path at all) falls back to the
/// procedural placeholder and never fails; any other read error is fatal.
pub fn resolve_avatar_bytes(path: Option<&Path>, name: &str) -> Result<Vec<u8>, AvatarError> {
    if let Some(path) = path {
        match std::fs::read(path) {
            Ok(bytes) => return Ok(bytes),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "avatar file missing, using placeholder");
            }
            Err(err) => return Err(AvatarError::Io(err)),
        }
    }
    Ok(placeholder_avatar(name))
}

/// Decode any supported raster input and re-encode it as a single-frame PNG.
pub fn normalize_to_png(bytes: &[u8]) -> Result<Vec<u8>, AvatarError> {
    let decoded = image::load_from_memory(bytes)?;
    encode_png(&DynamicImage::ImageRgba8(decoded.to_rgba8()))
}

/// Composite the logo over the bottom-right corner of a normalized avatar.
///
/// The logo is scaled to a quarter of the avatar's width, keeping its aspect
/// ratio, and inset by a small margin.
pub fn overlay_logo(avatar_png: &[u8], logo_bytes: &[u8]) -> Result<Vec<u8>, AvatarError> {
    let mut base = image::load_from_memory(avatar_png)?.to_rgba8();
    let logo = image::load_from_memory(logo_bytes)?;

    let target_width = (base.width() / 4).max(1);
    let scaled = logo.resize(target_width, target_width, FilterType::Lanczos3);
    let margin = (base.width() / 32) as i64;
    let x = base.width() as i64 - scaled.width() as i64 - margin;
    let y = base.height() as i64 - scaled.height() as i64 - margin;
    image::imageops::overlay(&mut base, &scaled.to_rgba8(), x.max(0), y.max(0));

    encode_png(&DynamicImage::ImageRgba8(base))
}

/// Render the deterministic placeholder avatar for a character name.
///
/// The palette is derived from a CRC-32 of the name, so the same character
/// always gets the same image without any shared counter or RNG state.
pub fn placeholder_avatar(name: &str) -> Vec<u8> {
    let mut hasher = Hasher::new();
    hasher.update(name.as_bytes());
    let seed = hasher.finalize();

    let base = [
        128u8.wrapping_add((seed & 0x7F) as u8),
        128u8.wrapping_add(((seed >> 8) & 0x7F) as u8),
        128u8.wrapping_add(((seed >> 16) & 0x7F) as u8),
    ];
    let shade = [base[0] / 2, base[1] / 2, base[2] / 2];

    let size = PLACEHOLDER_SIZE;
    let img = RgbaImage::from_fn(size, size, |x, y| {
        // A diagonal band over a flat field, offset by the seed so different
        // names read differently at a glance.
        let band = (x + y + (seed % size)) % size;
        if band < size / 3 {
            Rgba([shade[0], shade[1], shade[2], 255])
        } else {
            Rgba([base[0], base[1], base[2], 255])
        }
    });

    encode_png(&DynamicImage::ImageRgba8(img))
        .expect("in-memory placeholder encoding cannot fail")
}

/// Render the fallback logo badge used when no logo file is configured: a
/// translucent dark square with a light border.
pub fn default_logo() -> Vec<u8> {
    let size = 64u32;
    let img = RgbaImage::from_fn(size, size, |x, y| {
        let on_border = x < 3 || y < 3 || x >= size - 3 || y >= size - 3;
        if on_border {
            Rgba([235, 235, 235, 255])
        } else {
            Rgba([24, 24, 32, 200])
        }
    });
    encode_png(&DynamicImage::ImageRgba8(img)).expect("in-memory badge encoding cannot fail")
}

/// Inline PNG bytes as a `data:image/png;base64,…` URI.
pub fn to_data_uri(png_bytes: &[u8]) -> String {
    format!(
        "data:image/png;base64,{}",
        base64::prelude::BASE64_STANDARD.encode(png_bytes)
    )
}

fn encode_png(img: &DynamicImage) -> Result<Vec<u8>, AvatarError> {
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png)?;
    Ok(out.into_inner())
}
