use anyhow::{Context, Result};
use coverhue_core::{extract_colors, Bitmap, ResultColors, ScaleQuality};
use log::debug;
use palette::Srgb;
use serde::Serialize;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThemePalette {
    pub background: String,
    pub primary: String,
    pub secondary: String,
    pub detail: String,
}

impl ThemePalette {
    pub fn from_colors(colors: &ResultColors) -> Self {
        Self {
            background: color_to_hex(colors.background),
            primary: color_to_hex(colors.primary),
            secondary: color_to_hex(colors.secondary),
            detail: color_to_hex(colors.detail),
        }
    }
}

impl From<ResultColors> for ThemePalette {
    fn from(colors: ResultColors) -> Self {
        Self::from_colors(&colors)
    }
}

/// Decodes a cover art file into an RGBA bitmap.
pub fn load_bitmap<P: AsRef<Path>>(path: P) -> Result<Bitmap> {
    let path = path.as_ref();
    let img = image::open(path)
        .with_context(|| format!("Failed to open image {}", path.display()))?;
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    debug!("Decoded {} as {}x{}", path.display(), width, height);
    Bitmap::new(width, height, rgba.into_raw())
        .with_context(|| format!("Unusable image {}", path.display()))
}

pub fn extract_palette<P: AsRef<Path>>(path: P, quality: ScaleQuality) -> Result<ThemePalette> {
    let bitmap = load_bitmap(&path)?;
    let colors = extract_colors(&bitmap, quality).context("Failed to extract colors")?;
    Ok(ThemePalette::from_colors(&colors))
}

pub fn color_to_hex(color: Srgb<u8>) -> String {
    format!("#{:02x}{:02x}{:02x}", color.red, color.green, color.blue)
}

pub fn parse_hex(hex: &str) -> Option<Srgb<u8>> {
    let hex = hex.strip_prefix('#').unwrap_or(hex);
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some(Srgb::new(r, g, b))
}
