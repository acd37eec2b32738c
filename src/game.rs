//! The orchestrator: one `Game` value owns the player, every manager, the
//! score and the title → playing → game-over state machine.
//!
//! A tick runs in a fixed order so that the same control frames, the same
//! delta sequence and the same RNG seed always produce the same outcome:
//!
//! 0. take the latest control frame (move target, fire pulse, bomb trigger)
//! 1. advance the player
//! 2. advance bullets (move + cull)
//! 3. advance enemies (spawn + move + cull)
//! 4. player bullets × enemies
//! 5. enemies × player, unless the bomb is active
//! 6. enemy bullets × player, unless bomb-active or invincible
//! 7. difficulty escalation
//! 8. cosmetic effects, on wall-clock delta
//!
//! Anything deactivated during 4–6 is purged before the tick returns.

use std::sync::Arc;

use rand::Rng;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::bullets::BulletManager;
use crate::config::Tunables;
use crate::control::{ControlFrame, ControlSignals, ControlSource};
use crate::effects::EffectManager;
use crate::enemies::EnemyManager;
use crate::entities::{EnemyKind, Entity, HitOutcome};
use crate::error::GameError;
use crate::geometry::overlaps;
use crate::player::{DamageOutcome, Player};
use crate::snapshot::{self, Frame, Hud, PLAYER_COLOR};

/// Points per enemy wiped out by a bomb.
pub const BOMB_KILL_SCORE: u32 = 100;
const DAMAGE_SHAKE_INTENSITY: f32 = 8.0;
const DAMAGE_SHAKE_DURATION: f32 = 0.25;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum GameStatus {
    Title,
    Playing,
    GameOver,
}

/// What happened during one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Enemies destroyed by player bullets.
    pub kills: u32,
    /// Bullet hits that did not destroy the enemy.
    pub hits: u32,
    pub bomb_kills: u32,
    /// Times the player actually lost a hit point.
    pub damage_taken: u32,
    pub fired: bool,
    pub bomb: bool,
    pub difficulty_raised: bool,
    pub game_over: bool,
}

pub struct Game {
    tunables: Tunables,
    status: GameStatus,
    player: Player,
    bullets: BulletManager,
    enemies: EnemyManager,
    effects: EffectManager,
    score: u32,
    final_score: Option<u32>,
    tick_count: u64,
    difficulty_timer: u32,
    last_fire_tick: Option<u64>,
    last_bomb_tick: Option<u64>,
    bomb_charge: f32,
    signals: Arc<ControlSignals>,
    source: Box<dyn ControlSource>,
}

impl Game {
    pub fn new(tunables: Tunables, source: Box<dyn ControlSource>) -> Result<Self, GameError> {
        tunables.validate()?;
        Ok(Self {
            status: GameStatus::Title,
            player: Player::new(&tunables),
            bullets: BulletManager::new(),
            enemies: EnemyManager::new(&tunables),
            effects: EffectManager::new(),
            score: 0,
            final_score: None,
            tick_count: 0,
            difficulty_timer: 0,
            last_fire_tick: None,
            last_bomb_tick: None,
            bomb_charge: 0.0,
            signals: Arc::new(ControlSignals::new()),
            source,
            tunables,
        })
    }

    // ── State machine ────────────────────────────────────────────────────────

    /// Title → playing.  The control source must come up first; if it does
    /// not, the game stays on the title screen untouched.
    pub fn start(&mut self) -> Result<(), GameError> {
        if self.status != GameStatus::Title {
            return Err(GameError::InvalidTransition {
                from: self.status,
                action: "start",
            });
        }
        if let Err(err) = self.source.initialize(Arc::clone(&self.signals)) {
            warn!(%err, "control source failed to initialize");
            return Err(err.into());
        }
        self.reset_session();
        self.status = GameStatus::Playing;
        info!("game started");
        Ok(())
    }

    /// Game over → playing.  The control source is reset, not re-initialized.
    pub fn restart(&mut self) -> Result<(), GameError> {
        if self.status != GameStatus::GameOver {
            return Err(GameError::InvalidTransition {
                from: self.status,
                action: "restart",
            });
        }
        self.source.reset();
        self.signals.clear();
        self.reset_session();
        self.status = GameStatus::Playing;
        info!("game restarted");
        Ok(())
    }

    /// Tear down the control source.  Safe to call at any time.
    pub fn shutdown(&mut self) {
        self.source.shutdown();
    }

    fn reset_session(&mut self) {
        self.score = 0;
        self.final_score = None;
        self.tick_count = 0;
        self.difficulty_timer = 0;
        self.last_fire_tick = None;
        self.last_bomb_tick = None;
        self.bomb_charge = 0.0;
        self.player = Player::new(&self.tunables);
        self.bullets.clear();
        self.enemies.clear();
        self.effects.clear();
    }

    fn game_over(&mut self) {
        self.status = GameStatus::GameOver;
        self.final_score = Some(self.score);
        info!(score = self.score, ticks = self.tick_count, "game over");
    }

    // ── Tick ─────────────────────────────────────────────────────────────────

    /// Run one simulation tick.  `dt` is the wall-clock time since the last
    /// tick in seconds and only drives cosmetic effects.
    ///
    /// Outside the playing state only effects advance.
    pub fn tick(&mut self, dt: f32, rng: &mut impl Rng) -> Result<TickReport, GameError> {
        if !dt.is_finite() || dt < 0.0 {
            return Err(GameError::InvalidDelta(dt));
        }

        let mut report = TickReport::default();
        if self.status != GameStatus::Playing {
            self.effects.update(dt);
            return Ok(report);
        }

        self.tick_count += 1;
        let world = self.tunables.world;

        let controls = self.signals.take();
        self.apply_controls(controls, rng, &mut report);

        self.player.step();
        self.bullets.step(&world);
        self.enemies.step(rng, &world, &mut self.bullets);

        self.resolve_bullet_hits(rng, &mut report);
        self.resolve_contacts(rng, &mut report);
        self.resolve_enemy_fire(rng, &mut report);

        self.bullets.purge_inactive();
        self.enemies.purge_inactive();

        if !self.player.is_active() {
            self.game_over();
            report.game_over = true;
        } else {
            self.difficulty_timer += 1;
            if self.difficulty_timer >= self.tunables.difficulty_interval {
                self.enemies.increase_difficulty();
                self.difficulty_timer = 0;
                report.difficulty_raised = true;
            }
        }

        self.effects.update(dt);
        Ok(report)
    }

    fn apply_controls(&mut self, controls: ControlFrame, rng: &mut impl Rng, report: &mut TickReport) {
        if let Some(x) = controls.target_x {
            self.player.set_target_x(x);
        }
        self.bomb_charge = controls.bomb_charge;

        if controls.fire
            && debounce_elapsed(self.last_fire_tick, self.tick_count, self.tunables.fire_debounce)
        {
            self.last_fire_tick = Some(self.tick_count);
            report.fired = self.player.fire(&mut self.bullets);
        }

        if let Some(level) = controls.bomb_trigger {
            if debounce_elapsed(self.last_bomb_tick, self.tick_count, self.tunables.bomb_debounce) {
                self.last_bomb_tick = Some(self.tick_count);
                self.detonate_bomb(level, rng, report);
            }
        }
    }

    /// Attempt a bomb with the reported charge.  On success every enemy on
    /// screen is destroyed and scored.
    fn detonate_bomb(&mut self, charge: f32, rng: &mut impl Rng, report: &mut TickReport) -> bool {
        let activated = if self.tunables.bomb_requires_charge {
            self.player
                .activate_bomb_with_charge(charge, self.tunables.bomb_charge_threshold)
        } else {
            self.player.activate_bomb()
        };
        if !activated {
            return false;
        }

        let mut cleared = 0;
        for enemy in self.enemies.active_enemies_mut() {
            enemy.deactivate();
            self.effects
                .spawn_explosion(rng, enemy.center(), enemy.color(), 1.0);
            cleared += 1;
        }
        self.score += BOMB_KILL_SCORE * cleared;

        let world = self.tunables.world;
        self.effects
            .spawn_bomb_wave(rng, self.player.center(), world.width, world.height);

        report.bomb = true;
        report.bomb_kills += cleared;
        debug!(charge, cleared, "bomb detonated");
        true
    }

    /// Pass A.  Each bullet is spent on the first enemy it overlaps.
    fn resolve_bullet_hits(&mut self, rng: &mut impl Rng, report: &mut TickReport) {
        for bullet in self.bullets.active_bullets_mut() {
            let bullet_box = bullet.bounds();
            for enemy in self.enemies.active_enemies_mut() {
                if !overlaps(&bullet_box, &enemy.bounds()) {
                    continue;
                }
                bullet.deactivate();
                match enemy.apply_hit() {
                    HitOutcome::Destroyed => {
                        let kind = enemy.kind();
                        self.score += kind.score();
                        report.kills += 1;
                        let strength = if kind == EnemyKind::Strong { 1.4 } else { 1.0 };
                        self.effects
                            .spawn_explosion(rng, enemy.center(), enemy.color(), strength);
                    }
                    HitOutcome::Survived => {
                        report.hits += 1;
                        self.effects
                            .spawn_hit_spark(rng, enemy.center(), enemy.color());
                    }
                    HitOutcome::Ignored => {}
                }
                break;
            }
        }
    }

    /// Pass B.  Contact kills the enemy but scores nothing.
    fn resolve_contacts(&mut self, rng: &mut impl Rng, report: &mut TickReport) {
        if self.player.is_bomb_active() {
            return;
        }
        let player_box = self.player.bounds();
        for enemy in self.enemies.active_enemies_mut() {
            if !overlaps(&enemy.bounds(), &player_box) {
                continue;
            }
            enemy.deactivate();
            self.effects
                .spawn_explosion(rng, enemy.center(), enemy.color(), 0.8);
            damage_player(&mut self.player, &mut self.effects, rng, report);
        }
    }

    /// Pass C.
    fn resolve_enemy_fire(&mut self, rng: &mut impl Rng, report: &mut TickReport) {
        let player_box = self.player.bounds();
        for shot in self.bullets.active_enemy_bullets_mut() {
            if self.player.is_bomb_active() || self.player.is_invincible() || !self.player.is_active()
            {
                break;
            }
            if overlaps(&shot.bounds(), &player_box) {
                shot.deactivate();
                damage_player(&mut self.player, &mut self.effects, rng, report);
            }
        }
    }

    // ── Views ────────────────────────────────────────────────────────────────

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    /// Set once the game is over.
    pub fn final_score(&self) -> Option<u32> {
        self.final_score
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn tunables(&self) -> &Tunables {
        &self.tunables
    }

    /// Handle the control collaborator writes into.
    pub fn signals(&self) -> Arc<ControlSignals> {
        Arc::clone(&self.signals)
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut Player {
        &mut self.player
    }

    pub fn bullets(&self) -> &BulletManager {
        &self.bullets
    }

    pub fn bullets_mut(&mut self) -> &mut BulletManager {
        &mut self.bullets
    }

    pub fn enemies(&self) -> &EnemyManager {
        &self.enemies
    }

    pub fn enemies_mut(&mut self) -> &mut EnemyManager {
        &mut self.enemies
    }

    pub fn effects(&self) -> &EffectManager {
        &self.effects
    }

    pub fn hud(&self) -> Hud {
        Hud {
            status: self.status,
            score: self.score,
            hp: self.player.hp(),
            max_hp: self.player.max_hp(),
            bomb_charge: self.bomb_charge,
            final_score: self.final_score,
        }
    }

    pub fn snapshot(&self, rng: &mut impl Rng) -> Frame {
        snapshot::capture(self, rng)
    }
}

impl Drop for Game {
    fn drop(&mut self) {
        self.source.shutdown();
    }
}

fn damage_player(
    player: &mut Player,
    effects: &mut EffectManager,
    rng: &mut impl Rng,
    report: &mut TickReport,
) {
    match player.take_damage() {
        DamageOutcome::Ignored => {}
        DamageOutcome::Hurt | DamageOutcome::Killed => {
            report.damage_taken += 1;
            effects.spawn_hit_spark(rng, player.center(), PLAYER_COLOR);
            effects.start_shake(DAMAGE_SHAKE_INTENSITY, DAMAGE_SHAKE_DURATION);
        }
    }
}

/// True when no accepted event yet, or at least `cooldown` ticks have passed
/// since the last one.
fn debounce_elapsed(last: Option<u64>, now: u64, cooldown: u32) -> bool {
    last.map_or(true, |t| now.saturating_sub(t) >= u64::from(cooldown))
}
