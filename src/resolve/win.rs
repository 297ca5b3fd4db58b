//! Win condition.

use crate::game::{Alignment, RoundTable};

/// Result of checking the living players at dawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Ongoing,
    TownWin,
    MafiaWin,
}

impl Outcome {
    /// The announcement for a finished game.
    pub const fn announcement(self) -> Option<&'static str> {
        match self {
            Outcome::Ongoing => None,
            Outcome::TownWin => Some("The town have won!"),
            Outcome::MafiaWin => Some("The mafia have won!"),
        }
    }
}

/// Town wins when no mafia member is alive; otherwise the mafia win when
/// no town member is alive. An empty table counts as a town win.
pub fn evaluate(table: &RoundTable) -> Outcome {
    let mut mafia_alive = false;
    let mut town_alive = false;
    for (_, state) in table.iter().filter(|(_, s)| s.alive()) {
        match state.alignment() {
            Alignment::Mafia => mafia_alive = true,
            Alignment::Town => town_alive = true,
        }
    }

    if !mafia_alive {
        Outcome::TownWin
    } else if !town_alive {
        Outcome::MafiaWin
    } else {
        Outcome::Ongoing
    }
}
