//! Player identity.
//!
//! Identity is owned by the host and never changes during a game; all
//! per-round state lives separately in the [`RoundTable`](super::RoundTable).

use std::fmt;

/// Stable player identifier assigned by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlayerId(pub u32);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A participant as seen by the rules engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub id: PlayerId,
    pub username: String,
}

impl Player {
    pub fn new(id: u32, username: impl Into<String>) -> Self {
        Self {
            id: PlayerId(id),
            username: username.into(),
        }
    }
}
