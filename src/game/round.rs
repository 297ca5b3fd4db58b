//! Per-player round state.
//!
//! Each player in play owns one [`PlayerRoundState`], bound at game start to
//! the role it was dealt. The [`RoundTable`] keeps those states keyed by
//! player id and remembers seating order, which every scan in the resolvers
//! follows.

use std::collections::HashMap;

use super::player::PlayerId;
use super::role::{Alignment, Role};

/// A trial verdict ballot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FinalVote {
    Guilty,
    #[default]
    Abstain,
    Innocent,
}

/// Mutable state of one player for the current night and trial.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerRoundState {
    role: Role,
    alive: bool,
    pub died_this_night: bool,
    pub target: Option<PlayerId>,
    pub healed: bool,
    pub role_blocked: bool,
    wolf_votes: u32,
    pub vote: Option<PlayerId>,
    pub final_vote: FinalVote,
}

impl PlayerRoundState {
    /// Creates a living player holding `role`.
    pub fn new(role: Role) -> Self {
        Self {
            role,
            alive: true,
            died_this_night: false,
            target: None,
            healed: false,
            role_blocked: false,
            wolf_votes: 0,
            vote: None,
            final_vote: FinalVote::Abstain,
        }
    }

    pub const fn role(&self) -> Role {
        self.role
    }

    pub const fn alignment(&self) -> Alignment {
        self.role.alignment()
    }

    pub const fn alive(&self) -> bool {
        self.alive
    }

    pub const fn wolf_votes(&self) -> u32 {
        self.wolf_votes
    }

    /// Marks the player dead. Returns false if they were already dead.
    pub fn kill(&mut self) -> bool {
        if !self.alive {
            return false;
        }
        self.alive = false;
        self.died_this_night = true;
        true
    }

    /// Counts one mafia vote against this player.
    ///
    /// Votes against mafia-aligned players are not counted. Returns whether
    /// the vote was counted.
    pub fn increment_wolf_vote(&mut self) -> bool {
        if self.role.is_mafia() {
            return false;
        }
        self.wolf_votes += 1;
        true
    }

    /// Clears the night-scoped fields.
    pub fn reset_after_night(&mut self) {
        self.target = None;
        self.healed = false;
        self.wolf_votes = 0;
        self.role_blocked = false;
    }

    /// Clears the trial-scoped fields.
    pub fn reset_after_trial(&mut self) {
        self.vote = None;
        self.final_vote = FinalVote::Abstain;
    }
}

/// Round state of every player in play, keyed by id and kept in seating order.
#[derive(Debug, Clone, Default)]
pub struct RoundTable {
    order: Vec<PlayerId>,
    states: HashMap<PlayerId, PlayerRoundState>,
}

impl RoundTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `id` to `role` and seats them after everyone already seated.
    /// Re-seating an existing id replaces its state in place.
    pub fn seat(&mut self, id: PlayerId, role: Role) {
        if self.states.insert(id, PlayerRoundState::new(role)).is_none() {
            self.order.push(id);
        }
    }

    pub fn clear(&mut self) {
        self.order.clear();
        self.states.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn get(&self, id: PlayerId) -> Option<&PlayerRoundState> {
        self.states.get(&id)
    }

    pub fn get_mut(&mut self, id: PlayerId) -> Option<&mut PlayerRoundState> {
        self.states.get_mut(&id)
    }

    /// Seating order.
    pub fn order(&self) -> &[PlayerId] {
        &self.order
    }

    /// Iterates states in seating order.
    pub fn iter(&self) -> impl Iterator<Item = (PlayerId, &PlayerRoundState)> + '_ {
        self.order.iter().map(move |id| (*id, &self.states[id]))
    }

    pub fn is_alive(&self, id: PlayerId) -> bool {
        self.get(id).is_some_and(PlayerRoundState::alive)
    }

    pub fn alive_count(&self) -> usize {
        self.iter().filter(|(_, s)| s.alive()).count()
    }

    /// Ids holding `role`, in seating order.
    pub fn holders(&self, role: Role) -> Vec<PlayerId> {
        self.iter()
            .filter(|(_, s)| s.role() == role)
            .map(|(id, _)| id)
            .collect()
    }

    pub fn reset_after_night(&mut self) {
        self.states
            .values_mut()
            .for_each(PlayerRoundState::reset_after_night);
    }

    pub fn reset_after_trial(&mut self) {
        self.states
            .values_mut()
            .for_each(PlayerRoundState::reset_after_trial);
    }

    /// Clears every `died_this_night` flag once dawn has been announced.
    pub fn clear_night_deaths(&mut self) {
        for state in self.states.values_mut() {
            state.died_this_night = false;
        }
    }
}
