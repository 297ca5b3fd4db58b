//! Game data model.
//!
//! Roles and rosters, player identity, per-round player state and the
//! phase/trial cycle of an instance.

pub mod cycle;
pub mod player;
pub mod role;
pub mod round;

pub use cycle::{Cycle, GamePhase, TrialState};
pub use player::{Player, PlayerId};
pub use role::{roster_for, Alignment, Role, RosterError, ALL_ROLES, MAX_PLAYERS, MIN_PLAYERS};
pub use round::{FinalVote, PlayerRoundState, RoundTable};
