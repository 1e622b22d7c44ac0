//! Card art renderer.

use ab_glyph::PxScale;
use image::RgbaImage;
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut, draw_text_mut};
use imageproc::rect::Rect;

use super::{bar_fill_px, encode_png, font, portrait_colour, rgba};
use crate::store::documents::CardDoc;

pub const CARD_W: u32 = 400;
pub const CARD_H: u32 = 560;

const PORTRAIT_Y: i32 = 64;
const PORTRAIT_H: u32 = 300;
const STAT_BAR_W: u32 = 220;

/// Render a card to PNG bytes.
///
/// Errors when no font is available; callers degrade to a text embed.
pub fn render_card(card: &CardDoc) -> Result<Vec<u8>, String> {
    let font = font().ok_or("no font available for rendering")?;
    let mut img = RgbaImage::from_pixel(CARD_W, CARD_H, rgba(super::BACKGROUND));

    // Rarity frame.
    let frame = rgba(card.rarity.colour());
    for inset in 0..4 {
        draw_hollow_rect_mut(
            &mut img,
            Rect::at(inset, inset).of_size(CARD_W - 2 * inset as u32, CARD_H - 2 * inset as u32),
            frame,
        );
    }

    // Name banner.
    draw_text_mut(
        &mut img,
        rgba(super::TEXT_PRIMARY),
        16,
        18,
        PxScale::from(30.0),
        font,
        &card.character.name,
    );

    // Portrait placeholder: a vertical fade of the character's colour.
    let base = portrait_colour(&card.character.name);
    for y in 0..PORTRAIT_H {
        let fade = 100 - (y * 45 / PORTRAIT_H);
        let scale = |channel: u32| (channel * fade / 100).min(0xff);
        let colour = (scale((base >> 16) & 0xff) << 16)
            | (scale((base >> 8) & 0xff) << 8)
            | scale(base & 0xff);
        draw_filled_rect_mut(
            &mut img,
            Rect::at(16, PORTRAIT_Y + y as i32).of_size(CARD_W - 32, 1),
            rgba(colour),
        );
    }

    // Series and level/rarity line under the portrait.
    let below = PORTRAIT_Y + PORTRAIT_H as i32 + 14;
    draw_text_mut(
        &mut img,
        rgba(super::TEXT_MUTED),
        16,
        below,
        PxScale::from(20.0),
        font,
        &card.character.series,
    );
    draw_text_mut(
        &mut img,
        frame,
        16,
        below + 28,
        PxScale::from(22.0),
        font,
        &format!("{}  ·  Lv. {}", card.rarity.label(), card.level),
    );

    // Stat strip.
    let stats = [
        ("HP", card.stats.hp, 250),
        ("ATK", card.stats.attack, 60),
        ("DEF", card.stats.defense, 40),
        ("SPD", card.stats.speed, 30),
    ];
    let mut y = below + 70;
    for (label, value, scale_max) in stats {
        draw_text_mut(
            &mut img,
            rgba(super::TEXT_MUTED),
            16,
            y,
            PxScale::from(18.0),
            font,
            label,
        );
        draw_filled_rect_mut(
            &mut img,
            Rect::at(70, y + 3).of_size(STAT_BAR_W, 12),
            rgba(super::PANEL),
        );
        let fill = bar_fill_px(value, scale_max, STAT_BAR_W).max(2);
        draw_filled_rect_mut(
            &mut img,
            Rect::at(70, y + 3).of_size(fill, 12),
            frame,
        );
        draw_text_mut(
            &mut img,
            rgba(super::TEXT_PRIMARY),
            70 + STAT_BAR_W as i32 + 12,
            y,
            PxScale::from(18.0),
            font,
            &value.to_string(),
        );
        y += 26;
    }

    encode_png(img)
}
