//! Enemy spawner and the collection of live enemies.

use rand::Rng;
use tracing::{debug, trace};

use crate::bullets::BulletSink;
use crate::config::{Tunables, World};
use crate::entities::{Enemy, EnemyKind, Entity, ENEMY_SIZE};

/// Spawned enemies stay this far from the left edge...
const SPAWN_MARGIN_LEFT: f32 = 50.0;
/// ...and this far from the right edge (margin plus the enemy's own width).
const SPAWN_MARGIN_RIGHT: f32 = 50.0 + ENEMY_SIZE;

// ── Spawn distribution ───────────────────────────────────────────────────────

impl EnemyKind {
    /// Map one uniform roll in `[0, 1)` to a kind.  Thresholds are
    /// cumulative and checked in a fixed order.
    pub fn from_roll(roll: f32) -> EnemyKind {
        if roll < 0.10 {
            EnemyKind::Strong
        } else if roll < 0.25 {
            EnemyKind::Shooter
        } else if roll < 0.45 {
            EnemyKind::Zigzag
        } else {
            EnemyKind::Normal
        }
    }

    pub fn roll(rng: &mut impl Rng) -> EnemyKind {
        EnemyKind::from_roll(rng.gen::<f32>())
    }
}

// ── Manager ──────────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct EnemyManager {
    enemies: Vec<Enemy>,
    spawn_timer: u32,
    spawn_interval: u32,
    initial_interval: u32,
    min_interval: u32,
    interval_step: u32,
}

impl EnemyManager {
    pub fn new(tunables: &Tunables) -> Self {
        Self {
            enemies: Vec::new(),
            spawn_timer: 0,
            spawn_interval: tunables.spawn_interval,
            initial_interval: tunables.spawn_interval,
            min_interval: tunables.spawn_interval_min,
            interval_step: tunables.spawn_interval_step,
        }
    }

    /// One tick: maybe spawn, then move every enemy and cull the dead.
    pub fn step(&mut self, rng: &mut impl Rng, world: &World, sink: &mut impl BulletSink) {
        self.spawn_timer += 1;
        if self.spawn_timer >= self.spawn_interval {
            self.spawn(rng, world);
            self.spawn_timer = 0;
        }

        for enemy in &mut self.enemies {
            enemy.advance(world, sink);
        }
        self.purge_inactive();
    }

    /// Spawn one enemy of a rolled kind just above the top edge.
    pub fn spawn(&mut self, rng: &mut impl Rng, world: &World) -> EnemyKind {
        let min_x = SPAWN_MARGIN_LEFT as i32;
        let max_x = ((world.width - SPAWN_MARGIN_RIGHT) as i32).max(min_x);
        let x = rng.gen_range(min_x..=max_x) as f32;
        let kind = EnemyKind::roll(rng);
        trace!(?kind, x, "enemy spawned");
        self.spawn_at(kind, x, -ENEMY_SIZE);
        kind
    }

    pub fn spawn_at(&mut self, kind: EnemyKind, x: f32, y: f32) {
        self.enemies.push(Enemy::new(kind, x, y));
    }

    pub fn purge_inactive(&mut self) {
        self.enemies.retain(|e| e.is_active());
    }

    /// Shorten the spawn interval by one step, never below the floor.
    pub fn increase_difficulty(&mut self) {
        self.spawn_interval = self
            .spawn_interval
            .saturating_sub(self.interval_step)
            .max(self.min_interval);
        debug!(spawn_interval = self.spawn_interval, "difficulty increased");
    }

    pub fn spawn_interval(&self) -> u32 {
        self.spawn_interval
    }

    pub fn active_enemies(&self) -> impl Iterator<Item = &Enemy> + '_ {
        self.enemies.iter().filter(|e| e.is_active())
    }

    pub(crate) fn active_enemies_mut(&mut self) -> impl Iterator<Item = &mut Enemy> + '_ {
        self.enemies.iter_mut().filter(|e| e.is_active())
    }

    pub fn len(&self) -> usize {
        self.enemies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.enemies.is_empty()
    }

    /// Back to the freshly-constructed state, spawn pacing included.
    pub fn clear(&mut self) {
        self.enemies.clear();
        self.spawn_timer = 0;
        self.spawn_interval = self.initial_interval;
    }
}
