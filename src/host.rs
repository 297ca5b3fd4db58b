//! The host side of a game.
//!
//! The rules engine never talks to connections directly. Everything a player
//! sees goes through a [`Host`]: private messages, the persistent side panel
//! that lists the roles in play, and the struck-through name of a dead
//! player. Two hosts ship with the crate: [`ConsoleHost`] for the binary and
//! [`RecordingHost`] for embedding and tests.

use std::io::Write;

use tracing::warn;

use crate::game::{Player, PlayerId};

/// Text colours understood by clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    Red,
    BrightRed,
    Green,
    BrightGreen,
    Yellow,
    NightBlue,
}

/// Side effects a game performs on its players.
pub trait Host {
    /// Sends a private chat line.
    fn send(&mut self, to: &Player, text: &str, color: Option<Color>);

    /// Appends a line to the player's side panel.
    fn left_send(&mut self, to: &Player, text: &str, color: Option<Color>);

    /// Strikes `victim`'s name through in `viewer`'s player list.
    fn strike_through(&mut self, viewer: &Player, victim: &str);

    /// Called once the instance has reset after a finished game.
    fn game_ended(&mut self) {}
}

/// Writes every delivery as a line of text.
///
/// Private messages are `@<name> <text>`, side-panel lines are
/// `@<name> [panel] <text>`, strike-throughs are `@<name> ~<victim>~`, and a
/// reset is `* game over`.
pub struct ConsoleHost<W: Write> {
    out: W,
}

impl<W: Write> ConsoleHost<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, line: std::fmt::Arguments<'_>) {
        if let Err(e) = writeln!(self.out, "{}", line).and_then(|()| self.out.flush()) {
            warn!(error = %e, "failed to write host output");
        }
    }
}

impl<W: Write> Host for ConsoleHost<W> {
    fn send(&mut self, to: &Player, text: &str, _color: Option<Color>) {
        self.line(format_args!("@{} {}", to.username, text));
    }

    fn left_send(&mut self, to: &Player, text: &str, _color: Option<Color>) {
        self.line(format_args!("@{} [panel] {}", to.username, text));
    }

    fn strike_through(&mut self, viewer: &Player, victim: &str) {
        self.line(format_args!("@{} ~{}~", viewer.username, victim));
    }

    fn game_ended(&mut self) {
        self.line(format_args!("* game over"));
    }
}

/// One recorded host side effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Message {
        to: PlayerId,
        text: String,
        color: Option<Color>,
    },
    Panel {
        to: PlayerId,
        text: String,
        color: Option<Color>,
    },
    Strike {
        viewer: PlayerId,
        victim: String,
    },
    GameEnded,
}

/// Keeps every delivery in memory.
#[derive(Debug, Clone, Default)]
pub struct RecordingHost {
    pub deliveries: Vec<Delivery>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Chat lines delivered to `player`, oldest first.
    pub fn messages_to(&self, player: PlayerId) -> Vec<&str> {
        self.deliveries
            .iter()
            .filter_map(|d| match d {
                Delivery::Message { to, text, .. } if *to == player => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Side-panel lines delivered to `player`, oldest first.
    pub fn panel_of(&self, player: PlayerId) -> Vec<&str> {
        self.deliveries
            .iter()
            .filter_map(|d| match d {
                Delivery::Panel { to, text, .. } if *to == player => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// True if `player` received exactly `text` as a chat line.
    pub fn received(&self, player: PlayerId, text: &str) -> bool {
        self.messages_to(player).contains(&text)
    }

    /// Names struck through in `viewer`'s player list.
    pub fn struck_for(&self, viewer: PlayerId) -> Vec<&str> {
        self.deliveries
            .iter()
            .filter_map(|d| match d {
                Delivery::Strike { viewer: v, victim } if *v == viewer => Some(victim.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn games_ended(&self) -> usize {
        self.deliveries
            .iter()
            .filter(|d| matches!(d, Delivery::GameEnded))
            .count()
    }

    pub fn clear(&mut self) {
        self.deliveries.clear();
    }
}

impl Host for RecordingHost {
    fn send(&mut self, to: &Player, text: &str, color: Option<Color>) {
        self.deliveries.push(Delivery::Message {
            to: to.id,
            text: text.to_string(),
            color,
        });
    }

    fn left_send(&mut self, to: &Player, text: &str, color: Option<Color>) {
        self.deliveries.push(Delivery::Panel {
            to: to.id,
            text: text.to_string(),
            color,
        });
    }

    fn strike_through(&mut self, viewer: &Player, victim: &str) {
        self.deliveries.push(Delivery::Strike {
            viewer: viewer.id,
            victim: victim.to_string(),
        });
    }

    fn game_ended(&mut self) {
        self.deliveries.push(Delivery::GameEnded);
    }
}
