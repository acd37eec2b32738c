//! Simulated entities: kinematic state plus the per-frame update rule.
//!
//! Gameplay entities (bullets, enemies) advance once per tick.  Cosmetic
//! entities (particles, shockwaves) advance by wall-clock seconds.

use serde::Serialize;

use crate::bullets::BulletSink;
use crate::config::World;
use crate::geometry::{Rect, Vec2};

// ── Shared capability ────────────────────────────────────────────────────────

/// Anything the simulation can place, cull, and collide.
///
/// Advancing is not part of the trait: each kind steps on different inputs.
/// `Bullet::update()` needs nothing, `EnemyBullet::update(&World)` needs the
/// bottom edge, `Enemy::advance(&World, &mut impl BulletSink)` may fire, and
/// particles and shockwaves take wall-clock seconds.  The managers that own
/// each kind call the right one.
pub trait Entity {
    fn position(&self) -> Vec2;
    fn is_active(&self) -> bool;
    /// Axis-aligned box in world pixels.  Round or diamond shapes report a
    /// conservative enclosing box.
    fn bounds(&self) -> Rect;
}

/// Colour hint handed to the renderer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const WHITE: Rgb = Rgb(0xff, 0xff, 0xff);
    pub const RED: Rgb = Rgb(0xff, 0x44, 0x44);
    pub const GREEN: Rgb = Rgb(0x00, 0xff, 0x00);
    pub const CYAN: Rgb = Rgb(0x00, 0xff, 0xff);
    pub const YELLOW: Rgb = Rgb(0xff, 0xff, 0x00);
    pub const ORANGE: Rgb = Rgb(0xff, 0x88, 0x00);
    pub const ICE: Rgb = Rgb(0x9a, 0xfc, 0xff);
}

// ── Projectiles ──────────────────────────────────────────────────────────────

pub const BULLET_WIDTH: f32 = 4.0;
pub const BULLET_HEIGHT: f32 = 15.0;
pub const BULLET_SPEED: f32 = 8.0;

pub const ENEMY_BULLET_SIZE: f32 = 6.0;
pub const ENEMY_BULLET_SPEED: f32 = 4.0;

/// Player shot.  Travels straight up from its top-left origin.
#[derive(Clone, Debug, PartialEq)]
pub struct Bullet {
    pub x: f32,
    pub y: f32,
    active: bool,
}

impl Bullet {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y, active: true }
    }

    pub fn update(&mut self) {
        self.y -= BULLET_SPEED;
        if self.y + BULLET_HEIGHT < 0.0 {
            self.active = false;
        }
    }

    pub fn deactivate(&mut self) {
        self.active = false;
    }
}

impl Entity for Bullet {
    fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, BULLET_WIDTH, BULLET_HEIGHT)
    }
}

/// Shooter-enemy shot.  Position is the centre of a small round pellet.
#[derive(Clone, Debug, PartialEq)]
pub struct EnemyBullet {
    pub x: f32,
    pub y: f32,
    active: bool,
}

impl EnemyBullet {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y, active: true }
    }

    pub fn update(&mut self, world: &World) {
        self.y += ENEMY_BULLET_SPEED;
        if self.y > world.height {
            self.active = false;
        }
    }

    pub fn deactivate(&mut self) {
        self.active = false;
    }
}

impl Entity for EnemyBullet {
    fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn bounds(&self) -> Rect {
        let half = ENEMY_BULLET_SIZE / 2.0;
        Rect::new(self.x - half, self.y - half, ENEMY_BULLET_SIZE, ENEMY_BULLET_SIZE)
    }
}

// ── Enemies ──────────────────────────────────────────────────────────────────

pub const ENEMY_SIZE: f32 = 30.0;
pub const ENEMY_BASE_SPEED: f32 = 1.5;
pub const STRONG_SPEED_FACTOR: f32 = 0.8;
pub const SHOOTER_SPEED_FACTOR: f32 = 0.7;
pub const SHOOTER_FIRE_INTERVAL: u32 = 90;
pub const ZIGZAG_AMPLITUDE: f32 = 100.0;
pub const ZIGZAG_FREQUENCY: f32 = 0.02;
/// How far past a side edge an enemy may drift before it is culled.
pub const ENEMY_SIDE_MARGIN: f32 = 50.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum EnemyKind {
    Normal,
    Strong,
    Shooter,
    Zigzag,
}

impl EnemyKind {
    pub fn max_hp(self) -> u32 {
        match self {
            EnemyKind::Strong => 3,
            EnemyKind::Shooter => 2,
            EnemyKind::Normal | EnemyKind::Zigzag => 1,
        }
    }

    /// Points for a bullet kill.
    pub fn score(self) -> u32 {
        match self {
            EnemyKind::Strong => 50,
            _ => 10,
        }
    }
}

/// Per-type motion parameters.  Only the data a variant needs lives in it.
#[derive(Clone, Debug, PartialEq)]
pub enum Behavior {
    Normal,
    Strong {
        speed_factor: f32,
    },
    Shooter {
        speed_factor: f32,
        fire_interval: u32,
        fire_timer: u32,
    },
    Zigzag {
        origin_x: f32,
        amplitude: f32,
        frequency: f32,
    },
}

impl Behavior {
    pub fn for_kind(kind: EnemyKind, x: f32) -> Self {
        match kind {
            EnemyKind::Normal => Behavior::Normal,
            EnemyKind::Strong => Behavior::Strong {
                speed_factor: STRONG_SPEED_FACTOR,
            },
            EnemyKind::Shooter => Behavior::Shooter {
                speed_factor: SHOOTER_SPEED_FACTOR,
                fire_interval: SHOOTER_FIRE_INTERVAL,
                fire_timer: 0,
            },
            EnemyKind::Zigzag => Behavior::Zigzag {
                origin_x: x,
                amplitude: ZIGZAG_AMPLITUDE,
                frequency: ZIGZAG_FREQUENCY,
            },
        }
    }

    pub fn kind(&self) -> EnemyKind {
        match self {
            Behavior::Normal => EnemyKind::Normal,
            Behavior::Strong { .. } => EnemyKind::Strong,
            Behavior::Shooter { .. } => EnemyKind::Shooter,
            Behavior::Zigzag { .. } => EnemyKind::Zigzag,
        }
    }
}

/// Result of a single bullet hit on an enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HitOutcome {
    Survived,
    Destroyed,
    /// The enemy was already out of play; nothing changed.
    Ignored,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Enemy {
    pub x: f32,
    pub y: f32,
    speed: f32,
    hp: u32,
    max_hp: u32,
    active: bool,
    /// Ticks since spawn.
    age: u32,
    behavior: Behavior,
}

impl Enemy {
    pub fn new(kind: EnemyKind, x: f32, y: f32) -> Self {
        let max_hp = kind.max_hp();
        Self {
            x,
            y,
            speed: ENEMY_BASE_SPEED,
            hp: max_hp,
            max_hp,
            active: true,
            age: 0,
            behavior: Behavior::for_kind(kind, x),
        }
    }

    pub fn kind(&self) -> EnemyKind {
        self.behavior.kind()
    }

    pub fn behavior(&self) -> &Behavior {
        &self.behavior
    }

    pub fn hp(&self) -> u32 {
        self.hp
    }

    pub fn max_hp(&self) -> u32 {
        self.max_hp
    }

    pub fn hp_ratio(&self) -> f32 {
        self.hp as f32 / self.max_hp as f32
    }

    pub fn center(&self) -> Vec2 {
        self.bounds().center()
    }

    /// Advance one tick of type-specific motion.  Shooters push their shots
    /// into `sink`.
    pub fn advance(&mut self, world: &World, sink: &mut impl BulletSink) {
        self.age += 1;

        match &mut self.behavior {
            Behavior::Normal => {
                self.y += self.speed;
            }
            Behavior::Strong { speed_factor } => {
                self.y += self.speed * *speed_factor;
            }
            Behavior::Shooter {
                speed_factor,
                fire_interval,
                fire_timer,
            } => {
                self.y += self.speed * *speed_factor;
                *fire_timer += 1;
                if *fire_timer >= *fire_interval {
                    sink.fire_from_enemy(self.x + ENEMY_SIZE / 2.0, self.y + ENEMY_SIZE);
                    *fire_timer = 0;
                }
            }
            Behavior::Zigzag {
                origin_x,
                amplitude,
                frequency,
            } => {
                self.y += self.speed;
                self.x = *origin_x + (self.age as f32 * *frequency).sin() * *amplitude;
            }
        }

        if self.y > world.height {
            self.active = false;
        }
        if self.x < -ENEMY_SIDE_MARGIN || self.x > world.width + ENEMY_SIDE_MARGIN {
            self.active = false;
        }
    }

    /// Take one bullet.  Calling this on an enemy that is already out of
    /// play is a caller error; it reports `Ignored` and leaves hp alone.
    pub fn apply_hit(&mut self) -> HitOutcome {
        if !self.active || self.hp == 0 {
            return HitOutcome::Ignored;
        }
        self.hp -= 1;
        if self.hp == 0 {
            self.active = false;
            HitOutcome::Destroyed
        } else {
            HitOutcome::Survived
        }
    }

    /// Remove from play without scoring (contact with the player, bomb).
    pub fn deactivate(&mut self) {
        self.active = false;
    }

    pub fn color(&self) -> Rgb {
        let r = self.hp_ratio();
        match self.kind() {
            EnemyKind::Normal => Rgb::RED,
            EnemyKind::Strong => Rgb(
                (155.0 + 100.0 * (1.0 - r)) as u8,
                (155.0 + 100.0 * r) as u8,
                255,
            ),
            EnemyKind::Shooter => Rgb(255, (150.0 * r) as u8, 50),
            EnemyKind::Zigzag => Rgb(50, 255, (150.0 * r + 100.0) as u8),
        }
    }
}

impl Entity for Enemy {
    fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, ENEMY_SIZE, ENEMY_SIZE)
    }
}

// ── Cosmetic effects ─────────────────────────────────────────────────────────

/// Velocity multiplier applied on every particle update.
pub const PARTICLE_DRAG: f32 = 0.98;

#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: f32,
    pub color: Rgb,
    /// Seconds left.
    pub life: f32,
    pub max_life: f32,
    pub rotation: f32,
    /// Radians per second.
    pub spin: f32,
}

impl Particle {
    pub fn update(&mut self, dt: f32) {
        self.life -= dt;
        self.pos.x += self.vel.x * dt;
        self.pos.y += self.vel.y * dt;
        self.vel.x *= PARTICLE_DRAG;
        self.vel.y *= PARTICLE_DRAG;
        self.rotation += self.spin * dt;
    }

    pub fn alpha(&self) -> f32 {
        (self.life / self.max_life).max(0.0)
    }
}

impl Entity for Particle {
    fn position(&self) -> Vec2 {
        self.pos
    }

    fn is_active(&self) -> bool {
        self.life > 0.0
    }

    fn bounds(&self) -> Rect {
        let half = self.size / 2.0;
        Rect::new(self.pos.x - half, self.pos.y - half, self.size, self.size)
    }
}

/// Expanding ring.  Radius follows a cubic ease-out toward `max_radius`.
#[derive(Clone, Debug, PartialEq)]
pub struct Shockwave {
    pub center: Vec2,
    pub max_radius: f32,
    pub life: f32,
    pub max_life: f32,
    pub color: Rgb,
}

impl Shockwave {
    pub fn new(center: Vec2, max_radius: f32, life: f32, color: Rgb) -> Self {
        Self {
            center,
            max_radius,
            life,
            max_life: life,
            color,
        }
    }

    pub fn update(&mut self, dt: f32) {
        self.life -= dt;
    }

    /// 0 at spawn, 1 at expiry.
    pub fn progress(&self) -> f32 {
        (1.0 - self.life / self.max_life).clamp(0.0, 1.0)
    }

    pub fn radius(&self) -> f32 {
        let inv = 1.0 - self.progress();
        self.max_radius * (1.0 - inv * inv * inv)
    }

    pub fn alpha(&self) -> f32 {
        1.0 - self.progress()
    }
}

impl Entity for Shockwave {
    fn position(&self) -> Vec2 {
        self.center
    }

    fn is_active(&self) -> bool {
        self.life > 0.0
    }

    fn bounds(&self) -> Rect {
        let r = self.radius();
        Rect::new(self.center.x - r, self.center.y - r, r * 2.0, r * 2.0)
    }
}
