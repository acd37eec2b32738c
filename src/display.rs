//! Terminal renderer.  Everything that touches the screen lives here.
//!
//! Each function receives a mutable writer and an immutable `Frame` taken
//! from the simulation.  No game logic is performed; this module only
//! translates world-pixel sprites into terminal cells.

use std::f32::consts::TAU;
use std::io::Write;

use crossterm::{
    cursor,
    style::{self, Color, Print},
    terminal, QueueableCommand,
};
use motion_shooter::config::World;
use motion_shooter::entities::Rgb;
use motion_shooter::game::GameStatus;
use motion_shooter::snapshot::{EnemySprite, Frame, Hud, Ring, Shape, Sprite};

// ── Colour palette ────────────────────────────────────────────────────────────

const C_BORDER: Color = Color::DarkBlue;
const C_FLASH: Color = Color::White;
const C_HUD_SCORE: Color = Color::Yellow;
const C_HUD_LIVES: Color = Color::Red;
const C_HUD_CHARGE: Color = Color::Cyan;
const C_HINT: Color = Color::DarkGrey;
const C_HP_BAR: Color = Color::Green;

/// Flash alpha above which the border is drawn lit.
const FLASH_VISIBLE: f32 = 0.2;
/// Points sampled around a shockwave ring.
const RING_POINTS: usize = 24;

fn rgb(c: Rgb) -> Color {
    Color::Rgb {
        r: c.0,
        g: c.1,
        b: c.2,
    }
}

// ── World → terminal mapping ──────────────────────────────────────────────────

/// Play area is everything inside the border: columns `1..cols-1`, rows
/// `2..rows-2`.  Row 0 is the HUD, the last row the controls hint.
#[derive(Clone, Copy, Debug)]
pub struct Viewport {
    pub cols: u16,
    pub rows: u16,
    world: World,
    shake: (f32, f32),
}

impl Viewport {
    pub fn new(cols: u16, rows: u16, world: World) -> Self {
        Self {
            cols,
            rows,
            world,
            shake: (0.0, 0.0),
        }
    }

    fn play_cols(&self) -> f32 {
        self.cols.saturating_sub(2).max(1) as f32
    }

    fn play_rows(&self) -> f32 {
        self.rows.saturating_sub(4).max(1) as f32
    }

    /// World pixel → cell, or `None` outside the play area.
    fn cell(&self, x: f32, y: f32) -> Option<(u16, u16)> {
        let cx = (x + self.shake.0) / self.world.width * self.play_cols();
        let cy = (y + self.shake.1) / self.world.height * self.play_rows();
        if !(0.0..self.play_cols()).contains(&cx) || !(0.0..self.play_rows()).contains(&cy) {
            return None;
        }
        Some((1 + cx as u16, 2 + cy as u16))
    }
}

// ── Public entry points ───────────────────────────────────────────────────────

/// Render one complete frame.
pub fn render<W: Write>(out: &mut W, view: &Viewport, frame: &Frame) -> std::io::Result<()> {
    let mut view = *view;
    view.shake = (frame.overlay.shake.x, frame.overlay.shake.y);

    out.queue(terminal::Clear(terminal::ClearType::All))?;

    draw_border(out, &view, frame.overlay.flash_alpha > FLASH_VISIBLE)?;
    draw_hud(out, &view, &frame.hud)?;

    for ring in &frame.rings {
        draw_ring(out, &view, ring)?;
    }
    for particle in &frame.particles {
        draw_particle(out, &view, particle)?;
    }
    for enemy in &frame.enemies {
        draw_enemy(out, &view, enemy)?;
    }
    for bullet in frame.bullets.iter().chain(&frame.enemy_bullets) {
        draw_bullet(out, &view, bullet)?;
    }

    if frame.player.visible {
        draw_player(out, &view, frame)?;
    }
    draw_controls_hint(out, &view)?;

    if frame.hud.status == GameStatus::GameOver {
        draw_game_over(out, &view, &frame.hud)?;
    }

    // Park cursor in a harmless spot and flush
    out.queue(style::ResetColor)?;
    out.queue(cursor::MoveTo(0, view.rows.saturating_sub(1)))?;
    out.flush()?;
    Ok(())
}

/// Title screen, optionally with the last start-up error.
pub fn render_title<W: Write>(
    out: &mut W,
    view: &Viewport,
    error: Option<&str>,
) -> std::io::Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    let cx = view.cols / 2;
    let cy = view.rows / 2;

    let lines: &[(&str, Color)] = &[
        ("★  MOTION  SHOOTER  ★", Color::Cyan),
        ("", Color::White),
        ("← → / A D : lean left / right", Color::DarkGrey),
        ("SPACE     : raise a hand to fire", Color::DarkGrey),
        ("hold B    : charge bomb, release to detonate", Color::DarkGrey),
        ("", Color::White),
        ("ENTER - Start   Q - Quit", Color::White),
    ];
    let top = cy.saturating_sub(lines.len() as u16 / 2 + 1);
    for (i, (text, color)) in lines.iter().enumerate() {
        centered(out, cx, top + i as u16, text, *color)?;
    }

    if let Some(msg) = error {
        centered(out, cx, top + lines.len() as u16 + 1, msg, Color::Red)?;
    }

    out.queue(style::ResetColor)?;
    out.flush()?;
    Ok(())
}

fn centered<W: Write>(out: &mut W, cx: u16, row: u16, text: &str, color: Color) -> std::io::Result<()> {
    let col = cx.saturating_sub(text.chars().count() as u16 / 2);
    out.queue(cursor::MoveTo(col, row))?;
    out.queue(style::SetForegroundColor(color))?;
    out.queue(Print(text))?;
    Ok(())
}

// ── Border ────────────────────────────────────────────────────────────────────

fn draw_border<W: Write>(out: &mut W, view: &Viewport, lit: bool) -> std::io::Result<()> {
    let w = view.cols as usize;
    let h = view.rows;

    out.queue(style::SetForegroundColor(if lit { C_FLASH } else { C_BORDER }))?;

    // Row 1: top bar
    out.queue(cursor::MoveTo(0, 1))?;
    out.queue(Print(format!("┌{}┐", "─".repeat(w.saturating_sub(2)))))?;

    // Row h-2: bottom bar
    out.queue(cursor::MoveTo(0, h.saturating_sub(2)))?;
    out.queue(Print(format!("└{}┘", "─".repeat(w.saturating_sub(2)))))?;

    // Side walls
    for row in 2..h.saturating_sub(2) {
        out.queue(cursor::MoveTo(0, row))?;
        out.queue(Print("│"))?;
        out.queue(cursor::MoveTo(view.cols.saturating_sub(1), row))?;
        out.queue(Print("│"))?;
    }

    Ok(())
}

// ── HUD (row 0) ───────────────────────────────────────────────────────────────

fn draw_hud<W: Write>(out: &mut W, view: &Viewport, hud: &Hud) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(1, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_SCORE))?;
    out.queue(Print(format!("Score:{:>6}", hud.score)))?;

    // Bomb charge, centred
    let filled = (hud.bomb_charge / 10.0).round() as usize;
    let charge = format!("Bomb[{}{}]", "█".repeat(filled), "·".repeat(10 - filled.min(10)));
    let lx = (view.cols / 2).saturating_sub(charge.chars().count() as u16 / 2);
    out.queue(cursor::MoveTo(lx, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_CHARGE))?;
    out.queue(Print(&charge))?;

    // Hearts on the right
    let hearts = format!(
        "HP:{}{}",
        "♥".repeat(hud.hp as usize),
        "♡".repeat(hud.max_hp.saturating_sub(hud.hp) as usize)
    );
    let rx = view.cols.saturating_sub(hearts.chars().count() as u16 + 1);
    out.queue(cursor::MoveTo(rx, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_LIVES))?;
    out.queue(Print(&hearts))?;

    Ok(())
}

// ── Entities ──────────────────────────────────────────────────────────────────

fn draw_player<W: Write>(out: &mut W, view: &Viewport, frame: &Frame) -> std::io::Result<()> {
    // 2 rows, 3 cols:
    //   ▲
    //  /█\
    let p = &frame.player;
    let c = p.sprite.rect.center();
    let Some((col, row)) = view.cell(c.x, p.sprite.rect.y) else {
        return Ok(());
    };

    if let Some(radius) = p.halo {
        draw_circle(out, view, c.x, c.y, radius, '✦', Color::Yellow)?;
    }

    out.queue(style::SetForegroundColor(rgb(p.sprite.color)))?;
    out.queue(cursor::MoveTo(col, row))?;
    out.queue(Print("▲"))?;
    if row + 1 < view.rows.saturating_sub(2) {
        out.queue(cursor::MoveTo(col.saturating_sub(1).max(1), row + 1))?;
        out.queue(Print("/█\\"))?;
    }

    // Bomb cooldown bar above the ship
    if let Some(ready) = p.bomb_ready {
        if row > 2 {
            let filled = (ready * 3.0).floor() as usize;
            out.queue(cursor::MoveTo(col.saturating_sub(1).max(1), row - 1))?;
            out.queue(style::SetForegroundColor(Color::Yellow))?;
            out.queue(Print(format!("{}{}", "▔".repeat(filled), " ".repeat(3 - filled.min(3)))))?;
        }
    }
    Ok(())
}

fn draw_enemy<W: Write>(out: &mut W, view: &Viewport, enemy: &EnemySprite) -> std::io::Result<()> {
    let s = &enemy.sprite;
    let c = s.rect.center();
    let Some((col, row)) = view.cell(c.x, c.y) else {
        return Ok(());
    };
    let glyph = match s.shape {
        Shape::Square => "[■]",
        Shape::Diamond => "<◆>",
        _ => "(●)",
    };
    out.queue(cursor::MoveTo(col.saturating_sub(1).max(1), row))?;
    out.queue(style::SetForegroundColor(rgb(s.color)))?;
    out.queue(Print(glyph))?;

    if let Some(ratio) = enemy.hp_ratio {
        if row > 2 {
            let filled = (ratio * 3.0).ceil() as usize;
            out.queue(cursor::MoveTo(col.saturating_sub(1).max(1), row - 1))?;
            out.queue(style::SetForegroundColor(C_HP_BAR))?;
            out.queue(Print(format!("{}{}", "▁".repeat(filled), " ".repeat(3 - filled.min(3)))))?;
        }
    }
    Ok(())
}

fn draw_bullet<W: Write>(out: &mut W, view: &Viewport, bullet: &Sprite) -> std::io::Result<()> {
    let c = bullet.rect.center();
    let Some((col, row)) = view.cell(c.x, c.y) else {
        return Ok(());
    };
    let glyph = match bullet.shape {
        Shape::Bar => "║",
        _ => "•",
    };
    out.queue(cursor::MoveTo(col, row))?;
    out.queue(style::SetForegroundColor(rgb(bullet.color)))?;
    out.queue(Print(glyph))?;
    Ok(())
}

fn draw_particle<W: Write>(out: &mut W, view: &Viewport, particle: &Sprite) -> std::io::Result<()> {
    let c = particle.rect.center();
    let Some((col, row)) = view.cell(c.x, c.y) else {
        return Ok(());
    };
    // Fade by swapping to lighter glyphs as alpha drops
    let glyph = if particle.alpha > 0.66 {
        "*"
    } else if particle.alpha > 0.33 {
        "+"
    } else {
        "·"
    };
    out.queue(cursor::MoveTo(col, row))?;
    out.queue(style::SetForegroundColor(rgb(particle.color)))?;
    out.queue(Print(glyph))?;
    Ok(())
}

fn draw_ring<W: Write>(out: &mut W, view: &Viewport, ring: &Ring) -> std::io::Result<()> {
    if ring.alpha <= 0.1 {
        return Ok(());
    }
    draw_circle(out, view, ring.center.x, ring.center.y, ring.radius, '∘', rgb(ring.color))
}

fn draw_circle<W: Write>(
    out: &mut W,
    view: &Viewport,
    x: f32,
    y: f32,
    radius: f32,
    glyph: char,
    color: Color,
) -> std::io::Result<()> {
    if radius <= 0.0 {
        return Ok(());
    }
    out.queue(style::SetForegroundColor(color))?;
    for i in 0..RING_POINTS {
        let a = i as f32 / RING_POINTS as f32 * TAU;
        if let Some((col, row)) = view.cell(x + a.cos() * radius, y + a.sin() * radius) {
            out.queue(cursor::MoveTo(col, row))?;
            out.queue(Print(glyph))?;
        }
    }
    Ok(())
}

// ── Controls hint (last row) ──────────────────────────────────────────────────

fn draw_controls_hint<W: Write>(out: &mut W, view: &Viewport) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(1, view.rows.saturating_sub(1)))?;
    out.queue(style::SetForegroundColor(C_HINT))?;
    out.queue(Print("← → / A D : Move   SPACE : Fire   hold B : Bomb   Q : Quit"))?;
    Ok(())
}

// ── Game-over overlay ─────────────────────────────────────────────────────────

fn draw_game_over<W: Write>(out: &mut W, view: &Viewport, hud: &Hud) -> std::io::Result<()> {
    let score_line = format!("Final Score: {:>6}", hud.final_score.unwrap_or(hud.score));

    let lines: &[(&str, Color)] = &[
        ("╔════════════════════╗", Color::Red),
        ("║    GAME  OVER      ║", Color::Red),
        ("╚════════════════════╝", Color::Red),
        (score_line.as_str(), Color::Yellow),
        ("R - Play Again  Q - Quit", Color::White),
    ];

    let cx = view.cols / 2;
    let start_row = (view.rows / 2).saturating_sub(lines.len() as u16 / 2);
    for (i, (msg, color)) in lines.iter().enumerate() {
        centered(out, cx, start_row + i as u16, msg, *color)?;
    }
    Ok(())
}
