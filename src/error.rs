use std::fmt;

use crate::game::GameStatus;

/// Failure reported by a control-signal source while starting up.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ControlError {
    pub reason: String,
}

impl ControlError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ControlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "control source unavailable: {}", self.reason)
    }
}

impl std::error::Error for ControlError {}

#[derive(Clone, Debug, PartialEq)]
pub enum GameError {
    ControlInit(ControlError),
    InvalidTransition { from: GameStatus, action: &'static str },
    InvalidDelta(f32),
    Config(String),
}

impl fmt::Display for GameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ControlInit(err) => write!(f, "failed to start: {err}"),
            Self::InvalidTransition { from, action } => {
                write!(f, "cannot {action} while in {from:?} state")
            }
            Self::InvalidDelta(dt) => write!(f, "invalid frame delta: {dt}"),
            Self::Config(msg) => write!(f, "invalid configuration: {msg}"),
        }
    }
}

impl std::error::Error for GameError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ControlInit(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ControlError> for GameError {
    fn from(err: ControlError) -> Self {
        Self::ControlInit(err)
    }
}
