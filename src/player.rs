//! The player's ship: smoothed movement, fire-rate limit, bomb state
//! machine and post-hit invincibility.  Each timer advances once per tick,
//! independently of the others.

use crate::bullets::BulletSink;
use crate::config::{Tunables, World};
use crate::entities::{Entity, BULLET_WIDTH};
use crate::geometry::{clamp, lerp, map_range, Rect, Vec2};

pub const PLAYER_SIZE: f32 = 40.0;
/// Distance between the ship's top edge and the bottom of the world.
const PLAYER_BOTTOM_OFFSET: f32 = 100.0;
/// Blink period while invincible, in ticks.
const BLINK_TICKS: u32 = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DamageOutcome {
    /// Invincible, bomb-shielded, or already down.
    Ignored,
    Hurt,
    Killed,
}

#[derive(Clone, Debug)]
pub struct Player {
    pub x: f32,
    pub y: f32,
    target_x: f32,
    world: World,
    smooth_factor: f32,
    hp: u32,
    max_hp: u32,
    active: bool,

    fire_timer: u32,
    fire_interval: u32,

    bomb_cooldown: u32,
    bomb_cooldown_max: u32,
    bomb_active: bool,
    bomb_elapsed: u32,
    bomb_duration: u32,

    invincible: bool,
    invincible_timer: u32,
    invincible_duration: u32,
}

impl Player {
    pub fn new(tunables: &Tunables) -> Self {
        let world = tunables.world;
        let x = world.width / 2.0 - PLAYER_SIZE / 2.0;
        Self {
            x,
            y: world.height - PLAYER_BOTTOM_OFFSET,
            target_x: x,
            world,
            smooth_factor: tunables.smooth_factor,
            hp: tunables.max_hp,
            max_hp: tunables.max_hp,
            active: true,
            fire_timer: 0,
            fire_interval: tunables.fire_interval,
            bomb_cooldown: 0,
            bomb_cooldown_max: tunables.bomb_cooldown,
            bomb_active: false,
            bomb_elapsed: 0,
            bomb_duration: tunables.bomb_duration,
            invincible: false,
            invincible_timer: 0,
            invincible_duration: tunables.invincible_duration,
        }
    }

    // ── Movement ─────────────────────────────────────────────────────────────

    /// `normalized` is 0.0 (left edge) to 1.0 (right edge).
    pub fn set_target_x(&mut self, normalized: f32) {
        let right = self.world.width - PLAYER_SIZE;
        self.target_x = clamp(map_range(normalized, 0.0, 1.0, 0.0, right), 0.0, right);
    }

    pub fn target_x(&self) -> f32 {
        self.target_x
    }

    /// Advance movement and all three timers by one tick.
    pub fn step(&mut self) {
        self.x = lerp(self.x, self.target_x, self.smooth_factor);

        self.fire_timer = self.fire_timer.saturating_add(1);

        if self.bomb_cooldown > 0 {
            self.bomb_cooldown -= 1;
        }

        if self.bomb_active {
            self.bomb_elapsed += 1;
            if self.bomb_elapsed >= self.bomb_duration {
                self.bomb_active = false;
                self.bomb_elapsed = 0;
            }
        }

        if self.invincible {
            self.invincible_timer += 1;
            if self.invincible_timer >= self.invincible_duration {
                self.invincible = false;
                self.invincible_timer = 0;
            }
        }
    }

    // ── Firing ───────────────────────────────────────────────────────────────

    pub fn can_fire(&self) -> bool {
        self.fire_timer >= self.fire_interval
    }

    /// Fire one shot from the nose.  Returns `false` (and does nothing)
    /// while the fire cooldown is still running.
    pub fn fire(&mut self, sink: &mut impl BulletSink) -> bool {
        if !self.can_fire() {
            return false;
        }
        let nose_x = self.x + PLAYER_SIZE / 2.0 - BULLET_WIDTH / 2.0;
        sink.fire_from_player(nose_x, self.y);
        self.fire_timer = 0;
        true
    }

    // ── Bomb ─────────────────────────────────────────────────────────────────

    pub fn activate_bomb(&mut self) -> bool {
        if self.bomb_cooldown != 0 || self.bomb_active {
            return false;
        }
        self.bomb_active = true;
        self.bomb_elapsed = 0;
        self.bomb_cooldown = self.bomb_cooldown_max;
        true
    }

    /// Charge-gated variant: the charge level belongs to the control
    /// collaborator, the player only applies the gate.
    pub fn activate_bomb_with_charge(&mut self, charge: f32, threshold: f32) -> bool {
        if charge < threshold {
            return false;
        }
        self.activate_bomb()
    }

    pub fn is_bomb_active(&self) -> bool {
        self.bomb_active
    }

    pub fn bomb_cooldown(&self) -> u32 {
        self.bomb_cooldown
    }

    /// 0.0 right after a bomb, 1.0 once it is ready again.
    pub fn bomb_ready_ratio(&self) -> f32 {
        if self.bomb_cooldown_max == 0 {
            return 1.0;
        }
        1.0 - self.bomb_cooldown as f32 / self.bomb_cooldown_max as f32
    }

    // ── Damage ───────────────────────────────────────────────────────────────

    pub fn take_damage(&mut self) -> DamageOutcome {
        if !self.active || self.invincible || self.bomb_active {
            return DamageOutcome::Ignored;
        }
        assert!(self.hp > 0, "active player with zero hp");
        self.hp -= 1;
        if self.hp == 0 {
            self.active = false;
            DamageOutcome::Killed
        } else {
            self.invincible = true;
            self.invincible_timer = 0;
            DamageOutcome::Hurt
        }
    }

    pub fn is_invincible(&self) -> bool {
        self.invincible
    }

    /// Hidden on alternating blink windows while invincible.
    pub fn is_visible(&self) -> bool {
        !(self.invincible && (self.invincible_timer / BLINK_TICKS) % 2 == 0)
    }

    pub fn hp(&self) -> u32 {
        self.hp
    }

    pub fn max_hp(&self) -> u32 {
        self.max_hp
    }

    pub fn center(&self) -> Vec2 {
        self.bounds().center()
    }
}

impl Entity for Player {
    fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, PLAYER_SIZE, PLAYER_SIZE)
    }
}
