//! Phase and trial state of a game instance.
//!
//! The day/night phase, the trial state and the ended flag are one value,
//! [`Cycle`], which is replaced wholesale on every transition. The epoch
//! changes only when the instance is reset, so a timer armed for an earlier
//! game is recognised with a single comparison.

/// Day or night.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GamePhase {
    Day,
    Night,
}

/// Where the day's trial stands. Only meaningful during the day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrialState {
    Ended,
    Nominate,
    Verdict,
}

/// The current cycle of one game instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cycle {
    pub epoch: u64,
    pub phase: GamePhase,
    pub trial: TrialState,
    pub ended: bool,
}

impl Cycle {
    /// The pre-start cycle of a game instance: day, no trial, not ended.
    pub const fn fresh(epoch: u64) -> Self {
        Self {
            epoch,
            phase: GamePhase::Day,
            trial: TrialState::Ended,
            ended: false,
        }
    }

    /// The cycle a reset instance starts from.
    pub const fn next_game(self) -> Self {
        Self::fresh(self.epoch + 1)
    }

    pub const fn with_phase(self, phase: GamePhase) -> Self {
        Self { phase, ..self }
    }

    pub const fn with_trial(self, trial: TrialState) -> Self {
        Self { trial, ..self }
    }

    pub const fn concluded(self) -> Self {
        Self {
            ended: true,
            trial: TrialState::Ended,
            ..self
        }
    }

    /// True if a timer armed in `epoch` may still act on this cycle.
    pub const fn accepts(self, epoch: u64) -> bool {
        !self.ended && self.epoch == epoch
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_cycle_is_day_without_trial() {
        let cycle = Cycle::fresh(0);
        assert_eq!(cycle.phase, GamePhase::Day);
        assert_eq!(cycle.trial, TrialState::Ended);
        assert!(!cycle.ended);
    }

    #[test]
    fn transitions_replace_single_fields() {
        let cycle = Cycle::fresh(3)
            .with_phase(GamePhase::Night)
            .with_trial(TrialState::Nominate);
        assert_eq!(cycle.epoch, 3);
        assert_eq!(cycle.phase, GamePhase::Night);
        assert_eq!(cycle.trial, TrialState::Nominate);
    }

    #[test]
    fn concluded_cycle_rejects_its_own_timers() {
        let cycle = Cycle::fresh(1).with_trial(TrialState::Verdict);
        assert!(cycle.accepts(1));

        let done = cycle.concluded();
        assert!(done.ended);
        assert_eq!(done.trial, TrialState::Ended);
        assert!(!done.accepts(1));
    }

    #[test]
    fn next_game_rejects_previous_epoch() {
        let cycle = Cycle::fresh(1).with_phase(GamePhase::Night).concluded();
        let next = cycle.next_game();
        assert_eq!(next, Cycle::fresh(2));
        assert!(!next.accepts(1));
        assert!(next.accepts(2));
    }
}
