//! Simulation core for a motion-controlled arcade shooter.
//!
//! The core knows nothing about how control signals are produced or how
//! pixels reach a screen. A control collaborator writes into
//! [`control::ControlSignals`]; a renderer reads [`snapshot::Frame`].

pub mod bullets;
pub mod config;
pub mod control;
pub mod effects;
pub mod enemies;
pub mod entities;
pub mod error;
pub mod game;
pub mod geometry;
pub mod player;
pub mod snapshot;
