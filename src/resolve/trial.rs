//! Trial tallies.
//!
//! The nomination tally picks the player put on trial; the verdict tally
//! decides whether they are executed. Both only count living voters.

use crate::game::{FinalVote, PlayerId, RoundTable};

/// Votes needed to put someone on trial with `alive` players left.
pub const fn quorum(alive: usize) -> usize {
    alive / 2
}

/// Returns the first living candidate, in seating order, whose nomination
/// count reaches quorum. A candidate needs at least one vote.
pub fn find_accused(table: &RoundTable) -> Option<PlayerId> {
    let needed = quorum(table.alive_count()).max(1);
    table
        .order()
        .iter()
        .copied()
        .filter(|candidate| table.is_alive(*candidate))
        .find(|candidate| nominations(table, *candidate) >= needed)
}

/// Counts living players whose nomination vote names `candidate`.
pub fn nominations(table: &RoundTable, candidate: PlayerId) -> usize {
    table
        .iter()
        .filter(|(_, s)| s.alive() && s.vote == Some(candidate))
        .count()
}

/// The guilty and innocent ballots of a trial, in seating order.
/// Abstentions are not recorded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Verdict {
    pub guilty: Vec<PlayerId>,
    pub innocent: Vec<PlayerId>,
    /// Every counted ballot in seating order, for the per-voter readout.
    pub ballots: Vec<(PlayerId, FinalVote)>,
}

impl Verdict {
    /// The accused is executed only on a strict guilty majority.
    pub fn convicts(&self) -> bool {
        self.guilty.len() > self.innocent.len()
    }
}

/// Tallies the final votes of every living player.
pub fn tally_verdict(table: &RoundTable) -> Verdict {
    let mut verdict = Verdict::default();
    for (id, state) in table.iter().filter(|(_, s)| s.alive()) {
        match state.final_vote {
            FinalVote::Guilty => verdict.guilty.push(id),
            FinalVote::Innocent => verdict.innocent.push(id),
            FinalVote::Abstain => continue,
        }
        verdict.ballots.push((id, state.final_vote));
    }
    verdict
}
