//! Night-action resolution.
//!
//! Applies every submitted night action to the round table in a fixed role
//! priority: escorts, doctors, the mafia plurality kill, sheriffs, then
//! vigilantes. Submission order never matters, only role priority and
//! seating order.

use crate::game::{Alignment, PlayerId, Role, RoundTable};

/// A private result delivered to one player at dawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NightNote {
    /// The player's action was cancelled by an escort.
    Roleblocked,
    /// Sent to every living mafioso: who the mafia went after and whether
    /// the victim pulled through.
    MafiaAttack {
        target: Option<PlayerId>,
        survived: bool,
    },
    /// A sheriff's investigation result.
    Investigation {
        target: PlayerId,
        alignment: Alignment,
    },
    /// A vigilante's shot.
    VigilanteShot { target: PlayerId, survived: bool },
}

/// Everything one night produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NightOutcome {
    /// Private notes in the order they were produced.
    pub notes: Vec<(PlayerId, NightNote)>,
    /// Players killed tonight, in kill order.
    pub killed: Vec<PlayerId>,
}

impl NightOutcome {
    /// Notes addressed to `player`.
    pub fn notes_for(&self, player: PlayerId) -> impl Iterator<Item = &NightNote> + '_ {
        self.notes
            .iter()
            .filter(move |(to, _)| *to == player)
            .map(|(_, note)| note)
    }
}

/// A night action snapshotted at the start of resolution.
#[derive(Debug, Clone, Copy)]
struct Action {
    actor: PlayerId,
    role: Role,
    target: PlayerId,
}

/// Resolves the night over `table`.
///
/// Kills are applied to the table as they happen (`alive` cleared,
/// `died_this_night` set). Night-scoped fields are left in place for the
/// caller to inspect and clear.
pub fn resolve_night(table: &mut RoundTable) -> NightOutcome {
    let actions = snapshot_actions(table);
    let mut outcome = NightOutcome::default();

    apply_escorts(table, &actions);
    apply_doctors(table, &actions, &mut outcome);
    apply_mafia(table, &actions, &mut outcome);
    apply_sheriffs(table, &actions, &mut outcome);
    apply_vigilantes(table, &actions, &mut outcome);

    outcome
}

/// Collects the targets of living actors whose target is still alive.
fn snapshot_actions(table: &RoundTable) -> Vec<Action> {
    table
        .iter()
        .filter(|(_, state)| state.alive())
        .filter_map(|(actor, state)| {
            let target = state.target?;
            table.is_alive(target).then_some(Action {
                actor,
                role: state.role(),
                target,
            })
        })
        .collect()
}

fn actions_of(actions: &[Action], role: Role) -> impl Iterator<Item = &Action> + '_ {
    actions.iter().filter(move |a| a.role == role)
}

fn is_blocked(table: &RoundTable, id: PlayerId) -> bool {
    table.get(id).is_some_and(|s| s.role_blocked)
}

fn is_healed(table: &RoundTable, id: PlayerId) -> bool {
    table.get(id).is_some_and(|s| s.healed)
}

fn kill(table: &mut RoundTable, id: PlayerId, outcome: &mut NightOutcome) {
    if let Some(state) = table.get_mut(id) {
        if state.kill() {
            outcome.killed.push(id);
        }
    }
}

fn apply_escorts(table: &mut RoundTable, actions: &[Action]) {
    for action in actions_of(actions, Role::Escort) {
        if let Some(target) = table.get_mut(action.target) {
            target.role_blocked = true;
        }
    }
}

fn apply_doctors(table: &mut RoundTable, actions: &[Action], outcome: &mut NightOutcome) {
    for action in actions_of(actions, Role::Doctor) {
        if is_blocked(table, action.actor) {
            outcome.notes.push((action.actor, NightNote::Roleblocked));
            continue;
        }
        if let Some(target) = table.get_mut(action.target) {
            target.healed = true;
        }
    }
}

/// Picks the mafia's plurality target and carries out the attack.
///
/// A candidate takes the lead only by strictly exceeding the running
/// maximum, so ties go to whoever reached the count first.
fn apply_mafia(table: &mut RoundTable, actions: &[Action], outcome: &mut NightOutcome) {
    let mut max_votes = 0;
    let mut chosen = None;

    for action in actions_of(actions, Role::Mafioso) {
        if is_blocked(table, action.actor) {
            outcome.notes.push((action.actor, NightNote::Roleblocked));
            continue;
        }
        let Some(target) = table.get_mut(action.target) else {
            continue;
        };
        if !target.increment_wolf_vote() {
            continue;
        }
        if target.wolf_votes() > max_votes {
            max_votes = target.wolf_votes();
            chosen = Some(action.target);
        }
    }

    let mafiosi: Vec<PlayerId> = table
        .holders(Role::Mafioso)
        .into_iter()
        .filter(|id| table.is_alive(*id))
        .collect();

    let survived = match chosen {
        Some(target) if is_healed(table, target) => true,
        Some(target) => {
            kill(table, target, outcome);
            false
        }
        None => false,
    };

    for mafioso in mafiosi {
        outcome.notes.push((
            mafioso,
            NightNote::MafiaAttack {
                target: chosen,
                survived,
            },
        ));
    }
}

fn apply_sheriffs(table: &RoundTable, actions: &[Action], outcome: &mut NightOutcome) {
    for action in actions_of(actions, Role::Sheriff) {
        if is_blocked(table, action.actor) {
            outcome.notes.push((action.actor, NightNote::Roleblocked));
            continue;
        }
        let Some(target) = table.get(action.target) else {
            continue;
        };
        outcome.notes.push((
            action.actor,
            NightNote::Investigation {
                target: action.target,
                alignment: target.alignment(),
            },
        ));
    }
}

fn apply_vigilantes(table: &mut RoundTable, actions: &[Action], outcome: &mut NightOutcome) {
    for action in actions_of(actions, Role::Vigilante) {
        if is_blocked(table, action.actor) {
            outcome.notes.push((action.actor, NightNote::Roleblocked));
            continue;
        }
        let survived = is_healed(table, action.target);
        if !survived {
            kill(table, action.target, outcome);
        }
        outcome.notes.push((
            action.actor,
            NightNote::VigilanteShot {
                target: action.target,
                survived,
            },
        ));
    }
}
