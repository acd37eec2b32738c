//! Control-signal producers for the terminal front end.
//!
//! `KeyboardPad` stands in for a pose detector: it samples the held keys on
//! its own thread and clock, and writes the latest move / fire / bomb
//! signals into the game's `ControlSignals`.  `Autopilot` drives the same
//! signals from a fixed script for headless runs.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossterm::event::KeyCode;
use motion_shooter::control::{BombCharge, ControlSignals, ControlSource, EdgeTrigger};
use motion_shooter::error::ControlError;

/// Sampling period of the pad thread, roughly a camera frame.
const SAMPLE_PERIOD: Duration = Duration::from_millis(33);
/// Normalized screen widths per second while leaning.
const LEAN_SPEED: f32 = 0.9;
/// Charge gained per second of holding the bomb key: full in one second.
const CHARGE_RATE: f32 = 100.0;

/// A key is considered "held" if its last press/repeat event arrived within
/// this many frames.  Covers terminals that don't emit key-release events:
/// the OS key-repeat rate is ≥ 15 Hz, so a window of 4 frames (≈133 ms) is
/// always refreshed before expiry.
pub const HOLD_WINDOW: u64 = 4;

/// Returns true if `key` was seen within the last `HOLD_WINDOW` frames.
pub fn is_held(key_frame: &HashMap<KeyCode, u64>, key: &KeyCode, frame: u64) -> bool {
    key_frame
        .get(key)
        .map(|&last| frame.saturating_sub(last) <= HOLD_WINDOW)
        .unwrap_or(false)
}

/// Body-pose equivalents the keyboard can express.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct KeyLevels {
    pub left: bool,
    pub right: bool,
    /// One hand raised.
    pub fire: bool,
    /// Both hands raised.
    pub bomb: bool,
}

impl KeyLevels {
    pub fn from_keys(key_frame: &HashMap<KeyCode, u64>, frame: u64) -> Self {
        let held = |codes: &[KeyCode]| codes.iter().any(|c| is_held(key_frame, c, frame));
        Self {
            left: held(&[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')]),
            right: held(&[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')]),
            fire: held(&[KeyCode::Char(' ')]),
            bomb: held(&[KeyCode::Char('b'), KeyCode::Char('B')]),
        }
    }
}

fn lock_levels(levels: &Mutex<KeyLevels>) -> MutexGuard<'_, KeyLevels> {
    levels.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

// ── Keyboard pad ──────────────────────────────────────────────────────────────

pub struct KeyboardPad {
    levels: Arc<Mutex<KeyLevels>>,
    stop: Arc<AtomicBool>,
    reset: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl KeyboardPad {
    /// Returns the pad and the handle the UI loop writes key levels into.
    pub fn new() -> (Self, Arc<Mutex<KeyLevels>>) {
        let levels = Arc::new(Mutex::new(KeyLevels::default()));
        let pad = Self {
            levels: Arc::clone(&levels),
            stop: Arc::new(AtomicBool::new(false)),
            reset: Arc::new(AtomicBool::new(false)),
            worker: None,
        };
        (pad, levels)
    }
}

impl ControlSource for KeyboardPad {
    fn initialize(&mut self, signals: Arc<ControlSignals>) -> Result<(), ControlError> {
        if self.worker.is_some() {
            return Ok(());
        }
        self.stop.store(false, Ordering::SeqCst);
        let levels = Arc::clone(&self.levels);
        let stop = Arc::clone(&self.stop);
        let reset = Arc::clone(&self.reset);
        let worker = thread::Builder::new()
            .name("keyboard-pad".into())
            .spawn(move || sample_loop(&levels, &signals, &stop, &reset))
            .map_err(|e| ControlError::new(format!("cannot spawn pad thread: {e}")))?;
        self.worker = Some(worker);
        tracing::debug!("keyboard pad started");
        Ok(())
    }

    fn reset(&mut self) {
        self.reset.store(true, Ordering::SeqCst);
    }

    fn shutdown(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                tracing::warn!("keyboard pad thread panicked");
            }
        }
    }
}

fn sample_loop(
    levels: &Mutex<KeyLevels>,
    signals: &ControlSignals,
    stop: &AtomicBool,
    reset: &AtomicBool,
) {
    let mut target = 0.5f32;
    let mut fire = EdgeTrigger::default();
    let mut charge = BombCharge::new(CHARGE_RATE);
    let mut last = Instant::now();

    while !stop.load(Ordering::SeqCst) {
        thread::sleep(SAMPLE_PERIOD);
        let now = Instant::now();
        let dt = now.duration_since(last).as_secs_f32();
        last = now;

        if reset.swap(false, Ordering::SeqCst) {
            target = 0.5;
            fire.reset();
            charge.reset();
        }

        let lv = *lock_levels(levels);
        if lv.left {
            target -= LEAN_SPEED * dt;
        }
        if lv.right {
            target += LEAN_SPEED * dt;
        }
        target = target.clamp(0.0, 1.0);
        signals.on_move(target);

        // Both hands up is a bomb, not a shot
        if fire.rising(lv.fire && !lv.bomb) {
            signals.on_fire_pulse();
        }
        if let Some(level) = charge.update(lv.bomb, dt) {
            signals.on_bomb_trigger(level);
        }
        signals.on_bomb_charge(charge.level());
    }
}

// ── Headless autopilot ────────────────────────────────────────────────────────

/// Control source for headless runs.  Initialization always succeeds; the
/// signals are written synchronously by `Autopilot::drive`.
#[derive(Debug, Default)]
pub struct Scripted;

impl ControlSource for Scripted {
    fn initialize(&mut self, _signals: Arc<ControlSignals>) -> Result<(), ControlError> {
        Ok(())
    }

    fn reset(&mut self) {}

    fn shutdown(&mut self) {}
}

/// Sweeps side to side, taps fire on a fixed rhythm and charges a full bomb
/// every twenty seconds.
#[derive(Debug)]
pub struct Autopilot {
    fire: EdgeTrigger,
    charge: BombCharge,
}

/// Ticks per fire-gesture cycle (hand up for half of it).
const AUTO_FIRE_CYCLE: u64 = 12;
const AUTO_BOMB_EVERY: u64 = 1200;
/// Ticks the bomb gesture is held; a bit over a second at 60 Hz.
const AUTO_BOMB_HOLD: u64 = 65;

impl Autopilot {
    pub fn new() -> Self {
        Self {
            fire: EdgeTrigger::default(),
            charge: BombCharge::new(CHARGE_RATE),
        }
    }

    pub fn drive(&mut self, tick: u64, dt: f32, signals: &ControlSignals) {
        let sweep = (tick as f32 * 0.01).sin() * 0.5 + 0.5;
        signals.on_move(sweep);

        let hand_up = tick % AUTO_FIRE_CYCLE < AUTO_FIRE_CYCLE / 2;
        if self.fire.rising(hand_up) {
            signals.on_fire_pulse();
        }

        let phase = tick % AUTO_BOMB_EVERY;
        let charging = tick >= AUTO_BOMB_EVERY && phase < AUTO_BOMB_HOLD;
        if let Some(level) = self.charge.update(charging, dt) {
            signals.on_bomb_trigger(level);
        }
        signals.on_bomb_charge(self.charge.level());
    }
}

impl Default for Autopilot {
    fn default() -> Self {
        Self::new()
    }
}
