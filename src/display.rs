/// Rendering layer.  All terminal I/O lives here.
///
/// Each function receives a mutable writer and an immutable view of the
/// run.  No game logic is performed; this module only translates state
/// into terminal commands.  One map tile is two columns wide and one row
/// tall; entities are placed by their pixel center.

use std::io::Write;

use crossterm::{
    cursor,
    style::{self, Color, Print},
    terminal,
    QueueableCommand,
};
use dungeon_crawler::assets::{AssetKey, SpriteSet};
use dungeon_crawler::config::{HUD_HEIGHT, MAP_HEIGHT, MAP_WIDTH, TILE_SIZE};
use dungeon_crawler::controller::Run;
use dungeon_crawler::dungeon::Tile;
use dungeon_crawler::geometry::Rect;
use dungeon_crawler::level::{LevelState, SpriteKind};

// ── Colour palette ────────────────────────────────────────────────────────────

const C_WALL: Color = Color::DarkGrey;
const C_FLOOR: Color = Color::Grey;
const C_HUD_HEART: Color = Color::Red;
const C_HUD_COINS: Color = Color::Yellow;
const C_HUD_INFO: Color = Color::White;
const C_PLAYER: Color = Color::Blue;
const C_ENEMY: Color = Color::Green;
const C_BOSS: Color = Color::Magenta;
const C_BULLET: Color = Color::Red;
const C_COIN: Color = Color::Yellow;
const C_DOOR: Color = Color::DarkRed;
const C_HINT: Color = Color::DarkGrey;
const C_DISABLED: Color = Color::DarkGrey;

/// Terminal rows taken by the HUD above the map.
const HUD_ROWS: u16 = 2;
const CELL_COLS: u16 = 2;
const MAP_COLS: u16 = MAP_WIDTH as u16 * CELL_COLS;
const MAP_ROWS: u16 = MAP_HEIGHT as u16;

fn sprite_color(kind: SpriteKind) -> Color {
    match kind {
        SpriteKind::Player => C_PLAYER,
        SpriteKind::Enemy => C_ENEMY,
        SpriteKind::Boss => C_BOSS,
        SpriteKind::Bullet => C_BULLET,
        SpriteKind::Coin => C_COIN,
        SpriteKind::Door => C_DOOR,
    }
}

/// Terminal cell under a pixel-space box center, if it is on the map.
fn cell_of(rect: &Rect) -> Option<(u16, u16)> {
    let (cx, cy) = rect.center();
    let half_tile = TILE_SIZE / CELL_COLS as i32;
    let col = cx.div_euclid(half_tile);
    let row = (cy - HUD_HEIGHT).div_euclid(TILE_SIZE);
    if col < 0 || row < 0 || col >= MAP_COLS as i32 - 1 || row >= MAP_ROWS as i32 {
        return None;
    }
    Some((col as u16, row as u16 + HUD_ROWS))
}

// ── Public entry points ───────────────────────────────────────────────────────

/// Render one frame of the level being played.
pub fn render_level<W: Write>(out: &mut W, run: &Run, sprites: &SpriteSet) -> std::io::Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    draw_hud(out, run, sprites)?;
    draw_map(out, &run.current, sprites)?;
    for (kind, rect) in run.current.snapshot() {
        draw_sprite(out, kind, &rect, sprites)?;
    }
    draw_controls_hint(out)?;

    finish(out)
}

pub fn render_shop<W: Write>(out: &mut W, run: &Run) -> std::io::Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    out.queue(cursor::MoveTo(4, 2))?;
    out.queue(style::SetForegroundColor(C_HUD_COINS))?;
    out.queue(Print(format!("Shop - Coins: {}", run.current.player.coins)))?;

    for (i, offer) in run.shop_offers().iter().enumerate() {
        let line = if offer.owned {
            format!("{}: {} [PURCHASED]", i + 1, offer.item.label())
        } else {
            format!("{}: {} - {} coins", i + 1, offer.item.label(), offer.cost)
        };
        let color = if offer.affordable { C_HUD_INFO } else { C_DISABLED };
        out.queue(cursor::MoveTo(4, 4 + i as u16 * 2))?;
        out.queue(style::SetForegroundColor(color))?;
        out.queue(Print(line))?;
    }

    out.queue(cursor::MoveTo(4, 11))?;
    out.queue(style::SetForegroundColor(C_HINT))?;
    out.queue(Print(format!(
        "Multishot level {}   Enter: leave shop",
        run.upgrades.multishot_level
    )))?;

    finish(out)
}

pub fn render_game_over<W: Write>(out: &mut W, run: &Run) -> std::io::Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    let lines: &[(String, Color)] = &[
        ("╔════════════════════╗".to_string(), Color::Red),
        ("║    GAME  OVER      ║".to_string(), Color::Red),
        ("╚════════════════════╝".to_string(), Color::Red),
        (format!("Level Reached: {}", run.level_reached()), Color::White),
        ("R - Restart Game   Q - Quit".to_string(), Color::White),
    ];

    let cx = MAP_COLS / 2;
    let start_row = (MAP_ROWS + HUD_ROWS) / 2 - lines.len() as u16 / 2;
    for (i, (msg, color)) in lines.iter().enumerate() {
        let col = cx.saturating_sub(msg.chars().count() as u16 / 2);
        out.queue(cursor::MoveTo(col, start_row + i as u16))?;
        out.queue(style::SetForegroundColor(*color))?;
        out.queue(Print(msg))?;
    }

    finish(out)
}

fn finish<W: Write>(out: &mut W) -> std::io::Result<()> {
    // Park cursor in a harmless spot and flush
    out.queue(style::ResetColor)?;
    out.queue(cursor::MoveTo(0, MAP_ROWS + HUD_ROWS + 1))?;
    out.flush()?;
    Ok(())
}

// ── HUD (rows 0–1) ────────────────────────────────────────────────────────────

fn draw_hud<W: Write>(out: &mut W, run: &Run, sprites: &SpriteSet) -> std::io::Result<()> {
    let player = &run.current.player;

    // Hearts, left
    out.queue(cursor::MoveTo(0, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_HEART))?;
    for _ in 0..player.health / 2 {
        out.queue(Print(sprites.glyph(AssetKey::Heart)))?;
    }
    if player.health % 2 == 1 {
        out.queue(Print(sprites.glyph(AssetKey::HalfHeart)))?;
    }

    // Level & upgrades, centre
    let mut info = format!("Level {}", run.level);
    if player.multishot_level > 0 {
        info.push_str(&format!("  Multishot: Lvl {}", player.multishot_level));
    }
    if player.has_homing {
        info.push_str("  Homing: ON");
    }
    out.queue(cursor::MoveTo((MAP_COLS / 2).saturating_sub(info.len() as u16 / 2), 0))?;
    out.queue(style::SetForegroundColor(C_HUD_INFO))?;
    out.queue(Print(&info))?;

    // Coins, right
    let coins = format!("Coins: {}", player.coins);
    out.queue(cursor::MoveTo(MAP_COLS.saturating_sub(coins.len() as u16), 0))?;
    out.queue(style::SetForegroundColor(C_HUD_COINS))?;
    out.queue(Print(&coins))?;

    let status = format!(
        "Enemies: {}{}",
        run.current.enemies_left(),
        if run.current.boss_alive() { "  BOSS" } else { "" }
    );
    out.queue(cursor::MoveTo(0, 1))?;
    out.queue(style::SetForegroundColor(C_HINT))?;
    out.queue(Print(status))?;
    Ok(())
}

// ── Map & entities ────────────────────────────────────────────────────────────

fn draw_map<W: Write>(out: &mut W, level: &LevelState, sprites: &SpriteSet) -> std::io::Result<()> {
    let grid = &level.dungeon.grid;
    let floor = sprites.glyph(AssetKey::Floor);
    for y in 0..grid.height() {
        out.queue(cursor::MoveTo(0, y as u16 + HUD_ROWS))?;
        for x in 0..grid.width() {
            match grid.get(x, y) {
                Some(Tile::Floor) => {
                    out.queue(style::SetForegroundColor(C_FLOOR))?;
                    out.queue(Print(floor))?;
                }
                _ => {
                    out.queue(style::SetForegroundColor(C_WALL))?;
                    out.queue(Print("▓▓"))?;
                }
            }
        }
    }
    Ok(())
}

fn draw_sprite<W: Write>(
    out: &mut W,
    kind: SpriteKind,
    rect: &Rect,
    sprites: &SpriteSet,
) -> std::io::Result<()> {
    if let Some((col, row)) = cell_of(rect) {
        out.queue(cursor::MoveTo(col, row))?;
        out.queue(style::SetForegroundColor(sprite_color(kind)))?;
        out.queue(Print(sprites.glyph(kind)))?;
    }
    Ok(())
}

// ── Controls hint (last row) ──────────────────────────────────────────────────

fn draw_controls_hint<W: Write>(out: &mut W) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(0, MAP_ROWS + HUD_ROWS))?;
    out.queue(style::SetForegroundColor(C_HINT))?;
    out.queue(Print("W A S D : Move   ← ↑ → ↓ : Shoot   Esc / Q : Quit"))?;
    Ok(())
}
