//! Gameplay pacing knobs.
//!
//! Every timer here counts simulation ticks (one tick per display refresh,
//! nominally 60 per second).  Fixed entity geometry lives next to the
//! entity in `entities.rs`.

use serde::{Deserialize, Serialize};

use crate::error::GameError;

/// Smallest world that still leaves room for the enemy spawn margins.
const MIN_WORLD_WIDTH: f32 = 160.0;
const MIN_WORLD_HEIGHT: f32 = 160.0;

/// Playfield size in world pixels.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct World {
    pub width: f32,
    pub height: f32,
}

impl Default for World {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tunables {
    pub world: World,

    /// Fraction of the remaining distance the ship covers each tick.
    pub smooth_factor: f32,
    pub max_hp: u32,
    pub fire_interval: u32,
    pub bomb_cooldown: u32,
    pub bomb_duration: u32,
    pub invincible_duration: u32,

    pub spawn_interval: u32,
    pub spawn_interval_min: u32,
    pub spawn_interval_step: u32,
    /// Ticks between spawn-rate escalations.
    pub difficulty_interval: u32,

    /// Minimum ticks between two accepted fire pulses.
    pub fire_debounce: u32,
    /// Minimum ticks between two accepted bomb triggers.
    pub bomb_debounce: u32,
    /// Require `bomb_charge_threshold` charge before a bomb may fire.
    pub bomb_requires_charge: bool,
    pub bomb_charge_threshold: f32,
}

impl Default for Tunables {
    fn default() -> Self {
        Self {
            world: World::default(),
            smooth_factor: 0.2,
            max_hp: 3,
            fire_interval: 10,
            bomb_cooldown: 180,
            bomb_duration: 60,
            invincible_duration: 120,
            spawn_interval: 120,
            spawn_interval_min: 30,
            spawn_interval_step: 5,
            difficulty_interval: 1800,
            fire_debounce: 6,
            bomb_debounce: 30,
            bomb_requires_charge: true,
            bomb_charge_threshold: 50.0,
        }
    }
}

impl Tunables {
    /// Parse a (possibly partial) JSON document over the defaults.
    pub fn from_json(text: &str) -> Result<Self, GameError> {
        let tunables: Tunables =
            serde_json::from_str(text).map_err(|e| GameError::Config(e.to_string()))?;
        tunables.validate()?;
        Ok(tunables)
    }

    pub fn validate(&self) -> Result<(), GameError> {
        let fail = |msg: String| Err(GameError::Config(msg));

        if !(self.world.width >= MIN_WORLD_WIDTH && self.world.height >= MIN_WORLD_HEIGHT) {
            return fail(format!(
                "world {}x{} is smaller than {MIN_WORLD_WIDTH}x{MIN_WORLD_HEIGHT}",
                self.world.width, self.world.height
            ));
        }
        if !(self.smooth_factor > 0.0 && self.smooth_factor <= 1.0) {
            return fail(format!("smooth_factor {} outside (0, 1]", self.smooth_factor));
        }
        if self.max_hp == 0 {
            return fail("max_hp must be at least 1".into());
        }
        if self.spawn_interval_min == 0 || self.difficulty_interval == 0 {
            return fail("spawn_interval_min and difficulty_interval must be non-zero".into());
        }
        if self.spawn_interval_min > self.spawn_interval {
            return fail(format!(
                "spawn_interval_min {} exceeds spawn_interval {}",
                self.spawn_interval_min, self.spawn_interval
            ));
        }
        if !(0.0..=100.0).contains(&self.bomb_charge_threshold) {
            return fail(format!(
                "bomb_charge_threshold {} outside [0, 100]",
                self.bomb_charge_threshold
            ));
        }
        Ok(())
    }
}
