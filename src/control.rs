//! Boundary between the out-of-band control collaborator (pose detection,
//! keyboard, scripted autopilot) and the tick loop.
//!
//! The collaborator writes into [`ControlSignals`] whenever it likes; the
//! tick loop takes one [`ControlFrame`] at the top of every tick.  Each
//! signal is a single overwrite-on-write slot: nothing is queued, only the
//! latest value per tick survives.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::ControlError;

pub const BOMB_CHARGE_MAX: f32 = 100.0;

/// Everything the tick loop learns from the collaborator in one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ControlFrame {
    /// Latest normalized horizontal target, if one was ever reported.
    pub target_x: Option<f32>,
    /// A fire gesture started since the previous take.
    pub fire: bool,
    /// Latest charge level in `[0, 100]`.
    pub bomb_charge: f32,
    /// A bomb gesture completed since the previous take, with the charge it
    /// reached.
    pub bomb_trigger: Option<f32>,
}

#[derive(Debug, Default)]
pub struct ControlSignals {
    slot: Mutex<ControlFrame>,
}

impl ControlSignals {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, ControlFrame> {
        // Every field is Copy; a poisoned slot still holds a whole frame.
        self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn on_move(&self, normalized_x: f32) {
        if normalized_x.is_finite() {
            self.lock().target_x = Some(normalized_x.clamp(0.0, 1.0));
        }
    }

    pub fn on_fire_pulse(&self) {
        self.lock().fire = true;
    }

    pub fn on_bomb_charge(&self, level: f32) {
        if level.is_finite() {
            self.lock().bomb_charge = level.clamp(0.0, BOMB_CHARGE_MAX);
        }
    }

    pub fn on_bomb_trigger(&self, level: f32) {
        if level.is_finite() {
            self.lock().bomb_trigger = Some(level.clamp(0.0, BOMB_CHARGE_MAX));
        }
    }

    /// Read the latest state and consume the one-shot pulses.
    pub fn take(&self) -> ControlFrame {
        let mut slot = self.lock();
        let frame = *slot;
        slot.fire = false;
        slot.bomb_trigger = None;
        frame
    }

    /// Forget everything, including the last move target.
    pub fn clear(&self) {
        *self.lock() = ControlFrame::default();
    }
}

/// A producer of control signals.
///
/// `shutdown` must be safe to call at any time, more than once, and must not
/// panic.
pub trait ControlSource {
    fn initialize(&mut self, signals: Arc<ControlSignals>) -> Result<(), ControlError>;
    fn reset(&mut self);
    fn shutdown(&mut self);
}

// ── Collaborator-side helpers ────────────────────────────────────────────────

/// Turns a level signal ("hand is raised") into a rising-edge pulse.
#[derive(Clone, Copy, Debug, Default)]
pub struct EdgeTrigger {
    high: bool,
}

impl EdgeTrigger {
    /// True only on the sample where `level` goes from low to high.
    pub fn rising(&mut self, level: bool) -> bool {
        let fired = level && !self.high;
        self.high = level;
        fired
    }

    pub fn reset(&mut self) {
        self.high = false;
    }
}

/// Charge accumulator for a hold-to-charge bomb gesture.
///
/// Charge grows while the gesture is held and drops straight to zero on
/// release; the release reports the level that was reached.
#[derive(Clone, Copy, Debug)]
pub struct BombCharge {
    level: f32,
    /// Charge gained per second of holding.
    rate: f32,
    held: bool,
}

impl BombCharge {
    pub fn new(rate: f32) -> Self {
        Self {
            level: 0.0,
            rate,
            held: false,
        }
    }

    /// Feed one sample.  Returns `Some(level)` on the sample where the
    /// gesture is released after any charging.
    pub fn update(&mut self, held: bool, dt: f32) -> Option<f32> {
        let released = self.held && !held;
        self.held = held;

        if held {
            self.level = (self.level + self.rate * dt).min(BOMB_CHARGE_MAX);
            return None;
        }
        if released && self.level > 0.0 {
            let reached = self.level;
            self.level = 0.0;
            return Some(reached);
        }
        self.level = 0.0;
        None
    }

    pub fn level(&self) -> f32 {
        self.level
    }

    pub fn reset(&mut self) {
        self.level = 0.0;
        self.held = false;
    }
}
