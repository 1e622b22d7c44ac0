//! Image rendering shared toolkit.
//!
//! One palette, one font loader, and the pure layout math both renderers
//! use. Fonts come from `CARD_FONT_PATH` or well-known system locations and
//! are loaded once, eagerly, so rendering never blocks on a font scan;
//! when no font is found renderers error and callers fall back to
//! text-only embeds.

pub mod battle;
pub mod card;

use std::sync::OnceLock;

use ab_glyph::FontArc;
use image::{Rgba, RgbaImage};

/// Convert a `0xRRGGBB` colour to an opaque pixel.
pub fn rgba(hex: u32) -> Rgba<u8> {
    Rgba([
        ((hex >> 16) & 0xff) as u8,
        ((hex >> 8) & 0xff) as u8,
        (hex & 0xff) as u8,
        0xff,
    ])
}

pub const BACKGROUND: u32 = 0x1e2124;
pub const PANEL: u32 = 0x2b2f33;
pub const TEXT_PRIMARY: u32 = 0xf5f5f5;
pub const TEXT_MUTED: u32 = 0xa0a6ab;
pub const HP_GREEN: u32 = 0x2ecc71;
pub const HP_RED: u32 = 0xe74c3c;

static FONT: OnceLock<Option<FontArc>> = OnceLock::new();

const FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
];

fn load_font() -> Option<FontArc> {
    let mut candidates: Vec<String> = Vec::new();
    if let Ok(path) = std::env::var("CARD_FONT_PATH") {
        candidates.push(path);
    }
    candidates.extend(FONT_CANDIDATES.iter().map(|p| p.to_string()));

    for path in candidates {
        if let Ok(bytes) = std::fs::read(&path) {
            match FontArc::try_from_vec(bytes) {
                Ok(font) => {
                    tracing::info!("card font loaded from {path}");
                    return Some(font);
                }
                Err(e) => tracing::warn!("font at {path} failed to parse: {e}"),
            }
        }
    }
    tracing::warn!("no usable font found; image rendering disabled");
    None
}

/// Load fonts up front so the first render doesn't block the runtime.
pub fn init_fonts() {
    let _ = FONT.get_or_init(load_font);
}

/// The shared render font, if one was found.
pub fn font() -> Option<&'static FontArc> {
    FONT.get_or_init(load_font).as_ref()
}

/// Filled width of a bar `total_px` wide showing `current` of `max`.
pub fn bar_fill_px(current: i64, max: i64, total_px: u32) -> u32 {
    if max <= 0 {
        return 0;
    }
    let clamped = current.clamp(0, max);
    ((clamped as u128 * total_px as u128) / max as u128) as u32
}

/// HP bars shift from green to red below one third.
pub fn hp_colour(current: i64, max: i64) -> u32 {
    if max > 0 && current * 3 <= max {
        HP_RED
    } else {
        HP_GREEN
    }
}

/// Deterministic accent colour for a character portrait placeholder,
/// derived from the name so every card of a character looks the same.
pub fn portrait_colour(name: &str) -> u32 {
    let mut hash: u64 = 1469598103934665603;
    for b in name.bytes() {
        hash = hash.wrapping_mul(31).wrapping_add(b as u64);
    }
    // Keep the channel floor high enough to read against the dark panel.
    let r = 0x50 + (hash & 0x7f) as u32;
    let g = 0x50 + ((hash >> 8) & 0x7f) as u32;
    let b = 0x50 + ((hash >> 16) & 0x7f) as u32;
    (r << 16) | (g << 8) | b
}

/// Encode a finished canvas as PNG bytes.
pub fn encode_png(img: RgbaImage) -> Result<Vec<u8>, String> {
    let mut buf = Vec::new();
    let mut cursor = std::io::Cursor::new(&mut buf);
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut cursor, image::ImageFormat::Png)
        .map_err(|e| format!("png encode failed: {e}"))?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bar_fill_clamps_and_scales() {
        assert_eq!(bar_fill_px(50, 100, 200), 100);
        assert_eq!(bar_fill_px(-5, 100, 200), 0);
        assert_eq!(bar_fill_px(150, 100, 200), 200);
        assert_eq!(bar_fill_px(10, 0, 200), 0);
    }

    #[test]
    fn hp_colour_turns_red_when_low() {
        assert_eq!(hp_colour(100, 100), HP_GREEN);
        assert_eq!(hp_colour(33, 100), HP_RED);
        assert_eq!(hp_colour(34, 100), HP_GREEN);
    }

    #[test]
    fn portrait_colour_is_stable_and_bright() {
        assert_eq!(portrait_colour("Rem"), portrait_colour("Rem"));
        let c = portrait_colour("Megumin");
        assert!(((c >> 16) & 0xff) >= 0x50);
    }

    #[test]
    fn encode_png_produces_a_png_header() {
        let img = RgbaImage::from_pixel(4, 4, rgba(BACKGROUND));
        let bytes = encode_png(img).unwrap();
        assert_eq!(&bytes[1..4], b"PNG");
    }
}
