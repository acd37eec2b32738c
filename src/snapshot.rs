//! Immutable per-tick view of everything a renderer or HUD needs.  Building
//! a frame never touches gameplay state.

use rand::Rng;
use serde::Serialize;

use crate::entities::{Enemy, EnemyKind, Entity, Rgb};
use crate::game::{Game, GameStatus};
use crate::geometry::{Rect, Vec2};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Shape {
    /// Player ship, nose up.
    Triangle,
    Circle,
    Diamond,
    Square,
    /// Thin player shot.
    Bar,
    /// Particle, drawn as a rotated rounded square.
    Chip,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Sprite {
    pub rect: Rect,
    pub shape: Shape,
    pub color: Rgb,
    pub alpha: f32,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EnemySprite {
    pub sprite: Sprite,
    pub kind: EnemyKind,
    /// `Some` only for enemies with more than one hit point.
    pub hp_ratio: Option<f32>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PlayerSprite {
    pub sprite: Sprite,
    /// False on the dark half of the invincibility blink.
    pub visible: bool,
    /// Glow radius while the bomb is active.
    pub halo: Option<f32>,
    /// Cooldown bar fill, `Some` while the bomb is recharging.
    pub bomb_ready: Option<f32>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Ring {
    pub center: Vec2,
    pub radius: f32,
    pub color: Rgb,
    pub alpha: f32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct Overlay {
    pub flash_alpha: f32,
    pub shake: Vec2,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Hud {
    pub status: GameStatus,
    pub score: u32,
    pub hp: u32,
    pub max_hp: u32,
    pub bomb_charge: f32,
    pub final_score: Option<u32>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Frame {
    pub player: PlayerSprite,
    pub bullets: Vec<Sprite>,
    pub enemy_bullets: Vec<Sprite>,
    pub enemies: Vec<EnemySprite>,
    pub particles: Vec<Sprite>,
    pub rings: Vec<Ring>,
    pub overlay: Overlay,
    pub hud: Hud,
}

pub const PLAYER_COLOR: Rgb = Rgb::CYAN;
pub const BULLET_COLOR: Rgb = Rgb::GREEN;
pub const ENEMY_BULLET_COLOR: Rgb = Rgb::RED;

fn enemy_shape(kind: EnemyKind) -> Shape {
    match kind {
        EnemyKind::Shooter => Shape::Square,
        EnemyKind::Zigzag => Shape::Diamond,
        EnemyKind::Normal | EnemyKind::Strong => Shape::Circle,
    }
}

fn enemy_sprite(enemy: &Enemy) -> EnemySprite {
    EnemySprite {
        sprite: Sprite {
            rect: enemy.bounds(),
            shape: enemy_shape(enemy.kind()),
            color: enemy.color(),
            alpha: 1.0,
        },
        kind: enemy.kind(),
        hp_ratio: (enemy.max_hp() > 1).then(|| enemy.hp_ratio()),
    }
}

/// Build the frame for the current state.  `rng` only drives the shake
/// jitter.
pub fn capture(game: &Game, rng: &mut impl Rng) -> Frame {
    let player = game.player();
    let player = PlayerSprite {
        sprite: Sprite {
            rect: player.bounds(),
            shape: Shape::Triangle,
            color: PLAYER_COLOR,
            alpha: 1.0,
        },
        visible: player.is_active() && player.is_visible(),
        halo: player.is_bomb_active().then(|| player.bounds().w * 2.0),
        bomb_ready: (player.bomb_cooldown() > 0).then(|| player.bomb_ready_ratio()),
    };

    let bullets = game
        .bullets()
        .active_bullets()
        .map(|b| Sprite {
            rect: b.bounds(),
            shape: Shape::Bar,
            color: BULLET_COLOR,
            alpha: 1.0,
        })
        .collect();

    let enemy_bullets = game
        .bullets()
        .active_enemy_bullets()
        .map(|b| Sprite {
            rect: b.bounds(),
            shape: Shape::Circle,
            color: ENEMY_BULLET_COLOR,
            alpha: 1.0,
        })
        .collect();

    let enemies = game.enemies().active_enemies().map(enemy_sprite).collect();

    let effects = game.effects();
    let particles = effects
        .particles()
        .iter()
        .map(|p| Sprite {
            rect: p.bounds(),
            shape: Shape::Chip,
            color: p.color,
            alpha: p.alpha(),
        })
        .collect();
    let rings = effects
        .shockwaves()
        .iter()
        .map(|w| Ring {
            center: w.center,
            radius: w.radius(),
            color: w.color,
            alpha: w.alpha(),
        })
        .collect();

    Frame {
        player,
        bullets,
        enemy_bullets,
        enemies,
        particles,
        rings,
        overlay: Overlay {
            flash_alpha: effects.flash_alpha(),
            shake: effects.shake_offset(rng),
        },
        hud: game.hud(),
    }
}
