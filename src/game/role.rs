//! Role definitions and the fixed rosters.
//!
//! Roles carry no behaviour of their own: everything the night resolver needs
//! is the role identity and its alignment. Rosters are keyed by lobby size.

use std::fmt;

/// Smallest lobby that has a roster.
pub const MIN_PLAYERS: usize = 7;

/// Largest lobby that has a roster.
pub const MAX_PLAYERS: usize = 9;

/// The team a role plays for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Alignment {
    Mafia,
    Town,
}

impl Alignment {
    /// Returns the phrase shown to a sheriff after an investigation.
    pub const fn label(self) -> &'static str {
        match self {
            Alignment::Mafia => "mafia",
            Alignment::Town => "town member",
        }
    }
}

impl fmt::Display for Alignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A role that can be dealt to a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Mafioso,
    Townie,
    Doctor,
    Sheriff,
    Vigilante,
    /// Fully resolved at night but absent from every shipped roster.
    Escort,
}

/// Every role, in night-priority order where it matters.
pub const ALL_ROLES: [Role; 6] = [
    Role::Escort,
    Role::Doctor,
    Role::Mafioso,
    Role::Sheriff,
    Role::Vigilante,
    Role::Townie,
];

impl Role {
    /// Returns the lowercase role name used in chat.
    pub const fn name(self) -> &'static str {
        match self {
            Role::Mafioso => "mafioso",
            Role::Townie => "townie",
            Role::Doctor => "doctor",
            Role::Sheriff => "sheriff",
            Role::Vigilante => "vigilante",
            Role::Escort => "escort",
        }
    }

    pub const fn alignment(self) -> Alignment {
        match self {
            Role::Mafioso => Alignment::Mafia,
            Role::Townie | Role::Doctor | Role::Sheriff | Role::Vigilante | Role::Escort => {
                Alignment::Town
            }
        }
    }

    pub const fn is_mafia(self) -> bool {
        matches!(self.alignment(), Alignment::Mafia)
    }

    /// Returns the private reveal line, e.g. "You are an escort".
    pub fn reveal(self) -> String {
        let article = match self {
            Role::Escort => "an",
            _ => "a",
        };
        format!("You are {} {}", article, self.name())
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Errors raised when picking a roster.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RosterError {
    #[error(
        "no roster for {0} players (need {min} to {max})",
        min = MIN_PLAYERS,
        max = MAX_PLAYERS
    )]
    UnsupportedSize(usize),
}

const SEVEN_PLAYER: [Role; 7] = [
    Role::Mafioso,
    Role::Mafioso,
    Role::Doctor,
    Role::Vigilante,
    Role::Sheriff,
    Role::Townie,
    Role::Townie,
];

const EIGHT_PLAYER: [Role; 8] = [
    Role::Mafioso,
    Role::Mafioso,
    Role::Doctor,
    Role::Vigilante,
    Role::Sheriff,
    Role::Townie,
    Role::Townie,
    Role::Townie,
];

const NINE_PLAYER: [Role; 9] = [
    Role::Mafioso,
    Role::Mafioso,
    Role::Doctor,
    Role::Vigilante,
    Role::Sheriff,
    Role::Townie,
    Role::Townie,
    Role::Townie,
    Role::Townie,
];

/// Returns the unshuffled roster for a lobby of `size` players.
pub fn roster_for(size: usize) -> Result<&'static [Role], RosterError> {
    match size {
        7 => Ok(&SEVEN_PLAYER),
        8 => Ok(&EIGHT_PLAYER),
        9 => Ok(&NINE_PLAYER),
        other => Err(RosterError::UnsupportedSize(other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count(roster: &[Role], role: Role) -> usize {
        roster.iter().filter(|r| **r == role).count()
    }

    #[test]
    fn rosters_match_lobby_size() {
        for size in MIN_PLAYERS..=MAX_PLAYERS {
            let roster = roster_for(size).unwrap();
            assert_eq!(roster.len(), size);
            assert_eq!(count(roster, Role::Mafioso), 2);
            assert_eq!(count(roster, Role::Doctor), 1);
            assert_eq!(count(roster, Role::Sheriff), 1);
            assert_eq!(count(roster, Role::Vigilante), 1);
            assert_eq!(count(roster, Role::Escort), 0);
            assert_eq!(count(roster, Role::Townie), size - 5);
        }
    }

    #[test]
    fn unsupported_sizes_are_rejected() {
        assert_eq!(roster_for(6), Err(RosterError::UnsupportedSize(6)));
        assert_eq!(roster_for(10), Err(RosterError::UnsupportedSize(10)));
        assert_eq!(roster_for(0), Err(RosterError::UnsupportedSize(0)));
    }

    #[test]
    fn unsupported_size_message_names_the_range() {
        assert_eq!(
            RosterError::UnsupportedSize(6).to_string(),
            "no roster for 6 players (need 7 to 9)"
        );
    }

    #[test]
    fn only_mafioso_is_mafia() {
        for role in ALL_ROLES {
            assert_eq!(role.is_mafia(), role == Role::Mafioso, "{}", role);
        }
    }

    #[test]
    fn reveal_uses_article() {
        assert_eq!(Role::Mafioso.reveal(), "You are a mafioso");
        assert_eq!(Role::Escort.reveal(), "You are an escort");
    }

    #[test]
    fn alignment_labels() {
        assert_eq!(Alignment::Mafia.to_string(), "mafia");
        assert_eq!(Alignment::Town.to_string(), "town member");
    }
}
