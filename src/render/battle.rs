//! Battle scene renderer: two card panels, HP bars, round banner.

use ab_glyph::PxScale;
use image::RgbaImage;
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut, draw_text_mut};
use imageproc::rect::Rect;

use super::{bar_fill_px, encode_png, font, hp_colour, portrait_colour, rgba};
use crate::battle::engine::BattleState;
use crate::battle::units::BattleUnit;

pub const SCENE_W: u32 = 800;
pub const SCENE_H: u32 = 360;

const PANEL_W: u32 = 340;
const PANEL_H: u32 = 240;
const HP_BAR_W: u32 = 300;

fn draw_unit_panel(img: &mut RgbaImage, unit: &BattleUnit, x: i32) -> Result<(), String> {
    let font = font().ok_or("no font available for rendering")?;

    draw_filled_rect_mut(
        img,
        Rect::at(x, 70).of_size(PANEL_W, PANEL_H),
        rgba(super::PANEL),
    );
    draw_hollow_rect_mut(
        img,
        Rect::at(x, 70).of_size(PANEL_W, PANEL_H),
        rgba(portrait_colour(&unit.name)),
    );

    draw_text_mut(
        img,
        rgba(super::TEXT_PRIMARY),
        x + 16,
        86,
        PxScale::from(24.0),
        font,
        &unit.name,
    );
    draw_text_mut(
        img,
        rgba(super::TEXT_MUTED),
        x + 16,
        118,
        PxScale::from(18.0),
        font,
        &format!("Lv. {}", unit.level),
    );

    // HP bar with numeric overlay.
    draw_filled_rect_mut(
        img,
        Rect::at(x + 16, 150).of_size(HP_BAR_W, 18),
        rgba(super::BACKGROUND),
    );
    let fill = bar_fill_px(unit.current_hp, unit.max_hp, HP_BAR_W);
    if fill > 0 {
        draw_filled_rect_mut(
            img,
            Rect::at(x + 16, 150).of_size(fill, 18),
            rgba(hp_colour(unit.current_hp, unit.max_hp)),
        );
    }
    draw_text_mut(
        img,
        rgba(super::TEXT_PRIMARY),
        x + 16,
        174,
        PxScale::from(16.0),
        font,
        &format!("{} / {}", unit.current_hp.max(0), unit.max_hp),
    );

    // Active statuses.
    let statuses: Vec<String> = unit
        .statuses
        .iter()
        .map(|s| format!("{}({})", s.kind.label(), s.remaining))
        .collect();
    if !statuses.is_empty() {
        draw_text_mut(
            img,
            rgba(super::TEXT_MUTED),
            x + 16,
            206,
            PxScale::from(16.0),
            font,
            &statuses.join("  "),
        );
    }
    Ok(())
}

/// Render the current battle state to PNG bytes.
pub fn render_battle(state: &BattleState) -> Result<Vec<u8>, String> {
    let font = font().ok_or("no font available for rendering")?;
    let mut img = RgbaImage::from_pixel(SCENE_W, SCENE_H, rgba(super::BACKGROUND));

    draw_text_mut(
        &mut img,
        rgba(super::TEXT_PRIMARY),
        16,
        16,
        PxScale::from(26.0),
        font,
        &format!("Round {}", state.round),
    );

    draw_unit_panel(&mut img, &state.challenger, 24)?;
    draw_unit_panel(&mut img, &state.opponent, (SCENE_W - PANEL_W - 24) as i32)?;

    draw_text_mut(
        &mut img,
        rgba(super::TEXT_MUTED),
        (SCENE_W / 2 - 18) as i32,
        (SCENE_H / 2 - 10) as i32,
        PxScale::from(30.0),
        font,
        "VS",
    );

    // Last few transcript lines along the bottom.
    let tail: Vec<&String> = state.transcript.iter().rev().take(2).collect();
    let mut y = (SCENE_H - 42) as i32;
    for line in tail {
        draw_text_mut(
            &mut img,
            rgba(super::TEXT_MUTED),
            24,
            y,
            PxScale::from(15.0),
            font,
            line,
        );
        y += 18;
    }

    encode_png(img)
}
