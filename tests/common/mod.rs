#![allow(dead_code)]

use std::sync::Arc;

use motion_shooter::config::Tunables;
use motion_shooter::control::{ControlSignals, ControlSource};
use motion_shooter::error::ControlError;
use motion_shooter::game::Game;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Frame delta used by every scripted tick, one 60 Hz refresh.
pub const DT: f32 = 1.0 / 60.0;

pub fn seeded_rng() -> StdRng {
    StdRng::seed_from_u64(42)
}

/// Control source that always comes up.  Tests write signals straight into
/// `Game::signals()`.
#[derive(Default)]
pub struct OkSource;

impl ControlSource for OkSource {
    fn initialize(&mut self, _signals: Arc<ControlSignals>) -> Result<(), ControlError> {
        Ok(())
    }

    fn reset(&mut self) {}

    fn shutdown(&mut self) {}
}

/// Control source whose initialization always fails, like a missing camera.
pub struct FailingSource;

impl ControlSource for FailingSource {
    fn initialize(&mut self, _signals: Arc<ControlSignals>) -> Result<(), ControlError> {
        Err(ControlError::new("camera not found"))
    }

    fn reset(&mut self) {}

    fn shutdown(&mut self) {}
}

/// A started game with the given tunables.
pub fn playing_game(tunables: Tunables) -> Game {
    let mut game = Game::new(tunables, Box::new(OkSource)).unwrap();
    game.start().unwrap();
    game
}

/// Tunables with spawning pushed far enough out that no enemy appears on
/// its own during a short test.
pub fn quiet_tunables() -> Tunables {
    Tunables {
        spawn_interval: 100_000,
        ..Tunables::default()
    }
}
