//! Cosmetic effects: particles, shockwave rings, screen flash and camera
//! shake.
//!
//! Nothing here feeds back into gameplay.  All decay runs on wall-clock
//! seconds rather than ticks.

use std::f32::consts::TAU;

use rand::Rng;

use crate::entities::{Entity, Particle, Rgb, Shockwave};
use crate::geometry::Vec2;

const EXPLOSION_PARTICLES: f32 = 18.0;
const EXPLOSION_RING_RADIUS: f32 = 60.0;
const EXPLOSION_RING_LIFE: f32 = 0.5;
const HIT_SPARK_PARTICLES: usize = 6;
const BOMB_PARTICLES: usize = 60;
const BOMB_RING_LIFE: f32 = 0.8;
const BOMB_FLASH: f32 = 0.6;
const FLASH_MAX: f32 = 0.8;
/// Flash alpha lost per second.
const FLASH_DECAY: f32 = 2.5;
pub const BOMB_SHAKE_INTENSITY: f32 = 14.0;
pub const BOMB_SHAKE_DURATION: f32 = 0.35;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct Shake {
    intensity: f32,
    duration: f32,
    remaining: f32,
}

#[derive(Clone, Debug, Default)]
pub struct EffectManager {
    particles: Vec<Particle>,
    shockwaves: Vec<Shockwave>,
    flash_alpha: f32,
    shake: Shake,
}

/// Randomised burst parameters, each a `[min, min + spread)` range.
struct Burst {
    speed: (f32, f32),
    size: (f32, f32),
    life: (f32, f32),
}

impl EffectManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, dt: f32) {
        for particle in &mut self.particles {
            particle.update(dt);
        }
        self.particles.retain(|p| p.is_active());

        for wave in &mut self.shockwaves {
            wave.update(dt);
        }
        self.shockwaves.retain(|w| w.is_active());

        if self.flash_alpha > 0.0 {
            self.flash_alpha = (self.flash_alpha - dt * FLASH_DECAY).max(0.0);
        }
        if self.shake.remaining > 0.0 {
            self.shake.remaining = (self.shake.remaining - dt).max(0.0);
        }
    }

    // ── Spawners ─────────────────────────────────────────────────────────────

    pub fn spawn_explosion(&mut self, rng: &mut impl Rng, at: Vec2, color: Rgb, strength: f32) {
        let count = (EXPLOSION_PARTICLES * strength).floor() as usize;
        let burst = Burst {
            speed: (80.0 * strength, 160.0 * strength),
            size: (4.0, 6.0),
            life: (0.35, 0.4),
        };
        for _ in 0..count {
            self.push_particle(rng, at, color, &burst);
        }
        self.shockwaves.push(Shockwave::new(
            at,
            EXPLOSION_RING_RADIUS * strength,
            EXPLOSION_RING_LIFE,
            color,
        ));
    }

    pub fn spawn_hit_spark(&mut self, rng: &mut impl Rng, at: Vec2, color: Rgb) {
        let burst = Burst {
            speed: (60.0, 120.0),
            size: (2.0, 4.0),
            life: (0.2, 0.25),
        };
        for _ in 0..HIT_SPARK_PARTICLES {
            self.push_particle(rng, at, color, &burst);
        }
    }

    /// Full-screen bomb blast centred on `at`, sized for a `width`×`height`
    /// screen.
    pub fn spawn_bomb_wave(&mut self, rng: &mut impl Rng, at: Vec2, width: f32, height: f32) {
        self.flash_alpha = (self.flash_alpha + BOMB_FLASH).min(FLASH_MAX);
        self.shockwaves.push(Shockwave::new(
            at,
            width.max(height) * 0.8,
            BOMB_RING_LIFE,
            Rgb::ICE,
        ));
        let burst = Burst {
            speed: (120.0, 220.0),
            size: (4.0, 8.0),
            life: (0.4, 0.6),
        };
        for _ in 0..BOMB_PARTICLES {
            let color = if rng.gen::<f32>() > 0.5 {
                Rgb::ICE
            } else {
                Rgb::WHITE
            };
            self.push_particle(rng, at, color, &burst);
        }
        self.start_shake(BOMB_SHAKE_INTENSITY, BOMB_SHAKE_DURATION);
    }

    /// Replace whatever shake is running.
    pub fn start_shake(&mut self, intensity: f32, duration: f32) {
        self.shake = Shake {
            intensity,
            duration,
            remaining: duration,
        };
    }

    fn push_particle(&mut self, rng: &mut impl Rng, at: Vec2, color: Rgb, burst: &Burst) {
        let angle = rng.gen::<f32>() * TAU;
        let speed = rng.gen::<f32>() * burst.speed.1 + burst.speed.0;
        let life = rng.gen::<f32>() * burst.life.1 + burst.life.0;
        self.particles.push(Particle {
            pos: at,
            vel: Vec2::new(angle.cos() * speed, angle.sin() * speed),
            size: rng.gen::<f32>() * burst.size.1 + burst.size.0,
            color,
            life,
            max_life: life,
            rotation: rng.gen::<f32>() * TAU,
            spin: (rng.gen::<f32>() - 0.5) * 6.0,
        });
    }

    // ── Views ────────────────────────────────────────────────────────────────

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn shockwaves(&self) -> &[Shockwave] {
        &self.shockwaves
    }

    pub fn flash_alpha(&self) -> f32 {
        self.flash_alpha
    }

    pub fn is_shaking(&self) -> bool {
        self.shake.remaining > 0.0
    }

    /// Fresh random offset per call, fading out with the remaining shake
    /// time.
    pub fn shake_offset(&self, rng: &mut impl Rng) -> Vec2 {
        if self.shake.remaining <= 0.0 || self.shake.duration <= 0.0 {
            return Vec2::default();
        }
        let scale = self.shake.intensity * (self.shake.remaining / self.shake.duration);
        Vec2::new(
            rng.gen_range(-1.0f32..1.0) * scale,
            rng.gen_range(-1.0f32..1.0) * scale,
        )
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
