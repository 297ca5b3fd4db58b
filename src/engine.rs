//! Game instance.
//!
//! Holds the lobby, the round table, the chat rooms and the phase timers of
//! one game, and drives the day → trial → night cycle. Every phase handler
//! starts by checking that the game has not concluded, so a timer that fires
//! after a win (or after a reset) does nothing.

use std::time::Duration;

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, info, trace, warn};

use crate::chat::MessageRoom;
use crate::config::{spoken, GameConfig};
use crate::game::{
    roster_for, Cycle, FinalVote, GamePhase, Player, PlayerId, Role, RosterError, RoundTable,
    TrialState, MAX_PLAYERS,
};
use crate::host::{Color, Host};
use crate::protocol::{parse_chat, ChatCommand, CommandError};
use crate::resolve::{evaluate, find_accused, resolve_night, tally_verdict, NightNote, Outcome};
use crate::schedule::{Scheduler, Step, Tick, TimerKind};

/// Errors raised by lobby operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LobbyError {
    #[error("a game is already in progress")]
    InProgress,

    #[error("the lobby is full ({} players)", MAX_PLAYERS)]
    Full,

    #[error("player {0} has already joined")]
    DuplicateId(PlayerId),

    #[error("the name '{0}' is taken")]
    NameTaken(String),

    #[error(transparent)]
    Roster(#[from] RosterError),
}

/// One game instance.
pub struct Game<H: Host> {
    config: GameConfig,
    host: H,
    players: Vec<Player>,
    table: RoundTable,
    cycle: Cycle,
    in_play: bool,
    day_chat: MessageRoom,
    mafia_chat: MessageRoom,
    scheduler: Scheduler,
    nomination_started: Option<Instant>,
    rng: SmallRng,
}

impl<H: Host> Game<H> {
    /// Creates an empty lobby. Timer ticks arrive on the returned receiver
    /// and must be fed back through [`Game::handle_tick`].
    pub fn new(config: GameConfig, host: H) -> (Self, mpsc::UnboundedReceiver<Tick>) {
        let (scheduler, ticks) = Scheduler::new();
        let rng = if config.seed == 0 {
            SmallRng::from_entropy()
        } else {
            SmallRng::seed_from_u64(config.seed)
        };
        let game = Game {
            config,
            host,
            players: Vec::new(),
            table: RoundTable::new(),
            cycle: Cycle::fresh(0),
            in_play: false,
            day_chat: MessageRoom::new(),
            mafia_chat: MessageRoom::new(),
            scheduler,
            nomination_started: None,
            rng,
        };
        (game, ticks)
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn cycle(&self) -> Cycle {
        self.cycle
    }

    pub fn table(&self) -> &RoundTable {
        &self.table
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn in_play(&self) -> bool {
        self.in_play
    }

    pub fn day_chat(&self) -> &MessageRoom {
        &self.day_chat
    }

    pub fn mafia_chat(&self) -> &MessageRoom {
        &self.mafia_chat
    }

    pub fn has_pending_advance(&self) -> bool {
        self.scheduler.has_advance()
    }

    pub fn has_pending_poll(&self) -> bool {
        self.scheduler.has_poll()
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn player_named(&self, username: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.username == username)
    }

    fn name_of(&self, id: PlayerId) -> String {
        self.player(id)
            .map_or_else(|| id.to_string(), |p| p.username.clone())
    }

    fn halted(&self) -> bool {
        !self.in_play || self.cycle.ended
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Adds a player to the lobby.
    pub fn add_player(&mut self, player: Player) -> Result<(), LobbyError> {
        if self.in_play {
            return Err(LobbyError::InProgress);
        }
        if self.players.len() >= MAX_PLAYERS {
            return Err(LobbyError::Full);
        }
        if self.player(player.id).is_some() {
            return Err(LobbyError::DuplicateId(player.id));
        }
        if self.player_named(&player.username).is_some() {
            return Err(LobbyError::NameTaken(player.username));
        }
        info!(player = %player.username, lobby = self.players.len() + 1, "player joined");
        self.day_chat.add(player.clone());
        self.players.push(player);
        Ok(())
    }

    /// Deals roles and schedules the first night.
    pub fn start(&mut self) -> Result<(), LobbyError> {
        if self.in_play {
            return Err(LobbyError::InProgress);
        }
        let roster = roster_for(self.players.len())?;

        let names: Vec<&str> = self.players.iter().map(|p| p.username.as_str()).collect();
        self.day_chat
            .broadcast(&mut self.host, &format!("Players: {}", names.join(", ")), None);
        let roles: Vec<&str> = roster.iter().map(|r| r.name()).collect();
        self.day_chat.broadcast(
            &mut self.host,
            &format!("Roles in this game: {}", roles.join(", ")),
            None,
        );
        for player in &self.players {
            for role in roster {
                let color = if role.is_mafia() {
                    Color::BrightRed
                } else {
                    Color::BrightGreen
                };
                self.host.left_send(player, role.name(), Some(color));
            }
        }

        let mut deck = roster.to_vec();
        deck.shuffle(&mut self.rng);

        self.day_chat.mute_all();
        self.table.clear();
        self.mafia_chat.clear();
        for (player, role) in self.players.iter().zip(deck) {
            self.table.seat(player.id, role);
            let color = if role.is_mafia() {
                Color::Red
            } else {
                Color::Green
            };
            self.host.send(player, &role.reveal(), Some(color));
            if role.is_mafia() {
                self.mafia_chat.add(player.clone());
                self.mafia_chat.mute(player.id);
            }
        }

        self.in_play = true;
        self.cycle = Cycle::fresh(self.cycle.epoch);
        info!(epoch = self.cycle.epoch, players = self.players.len(), "game started");
        self.scheduler
            .advance_after(self.cycle.epoch, self.config.start_delay(), Step::Night);
        Ok(())
    }

    /// Handles a player leaving. In play this is an immediate kill.
    pub fn disconnect(&mut self, id: PlayerId) {
        if !self.in_play {
            self.players.retain(|p| p.id != id);
            self.day_chat.remove(id);
            debug!(player = %id, "player left the lobby");
            return;
        }
        if self.kill(id) {
            // Night leavers are reported at dawn like any other night death.
            if self.cycle.phase == GamePhase::Day {
                if let Some(state) = self.table.get_mut(id) {
                    state.died_this_night = false;
                }
            }
            self.day_chat.mute(id);
            self.mafia_chat.mute(id);
            let name = self.name_of(id);
            info!(player = %name, "player disconnected and died");
            self.day_chat
                .broadcast(&mut self.host, &format!("{} has died.", name), None);
        }
    }

    /// Handles one raw chat line from a player.
    pub fn receive(&mut self, from: PlayerId, msg: &str) {
        let Some(sender) = self.player(from).cloned() else {
            warn!(player = %from, "message from unknown player");
            return;
        };
        match parse_chat(msg) {
            None => self.relay(&sender, msg),
            Some(parsed) => {
                if let Err(e) = parsed.and_then(|cmd| self.apply_command(&sender, cmd)) {
                    debug!(player = %sender.username, error = %e, "command rejected");
                    self.host.send(&sender, &e.to_string(), Some(Color::Red));
                }
            }
        }
    }

    /// Applies a timer tick. Ticks from cancelled timers, earlier games, or a
    /// concluded game are ignored.
    pub fn handle_tick(&mut self, tick: Tick) {
        if !self.scheduler.accept(&tick) {
            trace!(?tick, "discarding tick from a cancelled timer");
            return;
        }
        match tick.kind {
            TimerKind::Advance(Step::End) if tick.epoch == self.cycle.epoch => self.end(),
            _ if !self.cycle.accepts(tick.epoch) => {
                debug!(?tick, epoch = self.cycle.epoch, "ignoring stale tick");
            }
            TimerKind::Poll => self.tally_votes(),
            TimerKind::Advance(step) => self.advance(step),
        }
    }

    fn advance(&mut self, step: Step) {
        match step {
            Step::Night => self.night(),
            Step::NightResolution => self.night_resolution(),
            Step::TrialVote => self.trial_vote(),
            Step::FinalVote(accused) => self.final_vote(accused),
            Step::Verdict(accused) => self.verdict(accused),
            Step::End => self.end(),
        }
    }

    // ------------------------------------------------------------------
    // Player commands
    // ------------------------------------------------------------------

    fn relay(&mut self, sender: &Player, msg: &str) {
        let line = format!("{}: {}", sender.username, msg);
        if !self.in_play {
            self.day_chat.receive(&mut self.host, sender.id, &line, None);
            return;
        }
        let Some(state) = self.table.get(sender.id) else {
            return;
        };
        if !state.alive() {
            return;
        }
        let is_mafia = state.role().is_mafia();
        self.day_chat.receive(&mut self.host, sender.id, &line, None);
        if is_mafia {
            self.mafia_chat.receive(&mut self.host, sender.id, &line, None);
        }
    }

    fn apply_command(&mut self, sender: &Player, cmd: ChatCommand) -> Result<(), CommandError> {
        if !self.in_play {
            return Err(CommandError::NotStarted);
        }
        if !self.table.is_alive(sender.id) {
            return Err(CommandError::SenderDead);
        }

        match cmd {
            ChatCommand::Act { target } => {
                if self.cycle.phase != GamePhase::Night {
                    return Err(CommandError::NotNight);
                }
                let target_id = self.living_target(&target)?;
                if let Some(state) = self.table.get_mut(sender.id) {
                    state.target = Some(target_id);
                }
                self.host.send(
                    sender,
                    &format!("Your choice of '{}' has been received.", target),
                    None,
                );
            }
            ChatCommand::Vote { target } => {
                if self.cycle.trial != TrialState::Nominate {
                    return Err(CommandError::NotNominating);
                }
                let target_id = self.living_target(&target)?;
                if let Some(state) = self.table.get_mut(sender.id) {
                    state.vote = Some(target_id);
                }
                self.host.send(
                    sender,
                    &format!("Your choice of '{}' has been received.", target),
                    None,
                );
                self.day_chat.broadcast(
                    &mut self.host,
                    &format!("{} voted for '{}'.", sender.username, target),
                    None,
                );
            }
            ChatCommand::Guilty => {
                self.cast_final_vote(sender, FinalVote::Guilty)?;
                self.host.send(sender, "You have voted guilty.", None);
            }
            ChatCommand::Innocent => {
                self.cast_final_vote(sender, FinalVote::Innocent)?;
                self.host.send(sender, "You have voted innocent.", None);
            }
        }
        Ok(())
    }

    fn cast_final_vote(&mut self, sender: &Player, vote: FinalVote) -> Result<(), CommandError> {
        if self.cycle.trial != TrialState::Verdict {
            return Err(CommandError::NotVerdict);
        }
        if let Some(state) = self.table.get_mut(sender.id) {
            state.final_vote = vote;
        }
        Ok(())
    }

    fn living_target(&self, username: &str) -> Result<PlayerId, CommandError> {
        let player = self
            .player_named(username)
            .ok_or_else(|| CommandError::UnknownPlayer(username.to_string()))?;
        if !self.table.is_alive(player.id) {
            return Err(CommandError::DeadTarget);
        }
        Ok(player.id)
    }

    // ------------------------------------------------------------------
    // Phase handlers
    // ------------------------------------------------------------------

    fn night(&mut self) {
        if self.halted() {
            return;
        }
        self.cycle = self
            .cycle
            .with_phase(GamePhase::Night)
            .with_trial(TrialState::Ended);
        self.table.reset_after_night();
        info!(epoch = self.cycle.epoch, "night has fallen");

        self.day_chat
            .broadcast(&mut self.host, "Night has fallen.", Some(Color::NightBlue));

        self.mafia_chat.unmute_all();
        for (id, state) in self.table.iter() {
            if !state.alive() {
                self.mafia_chat.mute(id);
            }
        }
        self.mafia_chat.broadcast(
            &mut self.host,
            "This is the mafia chat, you can talk to other mafia now in secret.",
            None,
        );
        let mafia: Vec<String> = self
            .table
            .holders(Role::Mafioso)
            .into_iter()
            .map(|id| self.name_of(id))
            .collect();
        self.mafia_chat.broadcast(
            &mut self.host,
            &format!("The mafia are : {}", mafia.join(", ")),
            None,
        );
        self.day_chat.broadcast(
            &mut self.host,
            &format!(
                "Type '/act username' to do your action on someone. E.g /act frank will \
                 perform your action on frank. You have {} to act.",
                spoken(self.config.night())
            ),
            None,
        );

        self.scheduler.advance_after(
            self.cycle.epoch,
            self.config.night(),
            Step::NightResolution,
        );
    }

    fn night_resolution(&mut self) {
        if self.halted() {
            return;
        }
        let outcome = resolve_night(&mut self.table);

        for victim in &outcome.killed {
            self.strike_for_all(*victim);
        }
        for (to, note) in &outcome.notes {
            let Some(player) = self.player(*to).cloned() else {
                continue;
            };
            for (line, color) in self.describe(note) {
                self.host.send(&player, &line, color);
            }
        }

        let victims: Vec<PlayerId> = self
            .table
            .iter()
            .filter(|(_, s)| s.died_this_night)
            .map(|(id, _)| id)
            .collect();
        for player in self.players.iter().filter(|p| victims.contains(&p.id)) {
            self.host
                .send(player, "You have been killed!", Some(Color::Red));
        }

        self.table.reset_after_night();
        self.mafia_chat.mute_all();
        self.cycle = self.cycle.with_phase(GamePhase::Day);
        info!(epoch = self.cycle.epoch, deaths = victims.len(), "dawn has broken");

        self.day_chat
            .broadcast(&mut self.host, "Dawn has broken.", Some(Color::Yellow));
        self.day_chat.unmute_all();
        for (id, state) in self.table.iter() {
            if !state.alive() {
                self.day_chat.mute(id);
            }
        }
        self.day_chat.broadcast(&mut self.host, "The deaths:", None);
        if victims.is_empty() {
            self.day_chat.broadcast(&mut self.host, "Nobody died.", None);
        } else {
            for victim in &victims {
                let line = format!("{} has died.", self.name_of(*victim));
                self.day_chat.broadcast(&mut self.host, &line, None);
            }
        }
        self.table.clear_night_deaths();

        self.day();
    }

    /// Renders a night note as the chat lines its recipient sees.
    fn describe(&self, note: &NightNote) -> Vec<(String, Option<Color>)> {
        match *note {
            NightNote::Roleblocked => vec![("You were roleblocked.".to_string(), Some(Color::Red))],
            NightNote::MafiaAttack {
                target: None,
                ..
            } => vec![(
                "Your target is: no one, as none of you chose a target.".to_string(),
                None,
            )],
            NightNote::MafiaAttack {
                target: Some(target),
                survived,
            } => {
                let name = self.name_of(target);
                let result = if survived {
                    format!("{} was healed during the night and so they have survived.", name)
                } else {
                    format!("{} has died.", name)
                };
                vec![
                    (format!("Your target is: {}", name), None),
                    ("You attack your target.".to_string(), None),
                    (result, None),
                ]
            }
            NightNote::Investigation { target, alignment } => vec![
                ("You investigated your target:".to_string(), None),
                (format!("{} is a {}.", self.name_of(target), alignment), None),
            ],
            NightNote::VigilanteShot { target, survived } => {
                let name = self.name_of(target);
                let result = if survived {
                    format!("{} was healed, and so has survived your attack.", name)
                } else {
                    format!("{} has died.", name)
                };
                vec![("You shoot your target.".to_string(), None), (result, None)]
            }
        }
    }

    fn day(&mut self) {
        if self.halted() {
            return;
        }
        if self.check_win() {
            return;
        }
        self.day_chat.broadcast(
            &mut self.host,
            &format!(
                "{} of general discussion until the trials begin. Discuss who to nominate!",
                spoken(self.config.day())
            ),
            None,
        );
        self.scheduler
            .advance_after(self.cycle.epoch, self.config.day(), Step::TrialVote);
    }

    /// Ends the game if one side has been wiped out. Returns true if it did.
    fn check_win(&mut self) -> bool {
        let outcome = evaluate(&self.table);
        let Some(text) = outcome.announcement() else {
            return false;
        };
        let color = match outcome {
            Outcome::MafiaWin => Color::Red,
            _ => Color::Green,
        };
        self.day_chat.broadcast(&mut self.host, text, Some(color));
        self.cycle = self.cycle.concluded();
        self.day_chat.unmute_all();
        self.scheduler.cancel_all();
        self.nomination_started = None;
        info!(epoch = self.cycle.epoch, ?outcome, "game over");
        self.scheduler
            .advance_after(self.cycle.epoch, self.config.end_grace(), Step::End);
        true
    }

    fn trial_vote(&mut self) {
        if self.halted() {
            return;
        }
        self.day_chat.mute_all();
        self.day_chat.broadcast(
            &mut self.host,
            "The trial has begun! The player with a majority of votes will be put on trial.",
            None,
        );
        self.day_chat.broadcast(
            &mut self.host,
            &format!(
                "Max {}. Only one trial per day, so choose carefully!",
                spoken(self.config.nomination())
            ),
            None,
        );
        self.day_chat.broadcast(
            &mut self.host,
            "Vote with '/vote', e.g /vote frank casts a vote for frank",
            None,
        );

        self.table.reset_after_trial();
        self.cycle = self.cycle.with_trial(TrialState::Nominate);
        self.nomination_started = Some(Instant::now());
        debug!(epoch = self.cycle.epoch, "nominations open");
        self.scheduler
            .poll_every(self.cycle.epoch, self.config.poll());
    }

    fn tally_votes(&mut self) {
        if self.halted() || self.cycle.trial != TrialState::Nominate {
            return;
        }
        if let Some(accused) = find_accused(&self.table) {
            self.scheduler.cancel_poll();
            self.nomination_started = None;
            self.defense_speech(accused);
            return;
        }

        let elapsed = self
            .nomination_started
            .map_or(Duration::ZERO, |started| started.elapsed());
        if elapsed >= self.config.nomination() {
            self.scheduler.cancel_poll();
            self.nomination_started = None;
            self.table.reset_after_trial();
            self.cycle = self.cycle.with_trial(TrialState::Ended);
            info!(epoch = self.cycle.epoch, "nominations timed out");
            self.day_chat
                .broadcast(&mut self.host, "Time's up! Night will now begin.", None);
            self.night();
        }
    }

    fn defense_speech(&mut self, accused: PlayerId) {
        if self.halted() {
            return;
        }
        debug_assert!(self.table.is_alive(accused), "only the living go on trial");
        self.cycle = self.cycle.with_trial(TrialState::Ended);
        let name = self.name_of(accused);
        info!(epoch = self.cycle.epoch, accused = %name, "trial begins");

        self.day_chat
            .broadcast(&mut self.host, &format!("{} is on trial.", name), None);
        self.day_chat.broadcast(
            &mut self.host,
            &format!(
                "The accused can defend themselves for {}.",
                spoken(self.config.defense())
            ),
            None,
        );
        self.day_chat.mute_all();
        self.day_chat.unmute(accused);

        self.scheduler.advance_after(
            self.cycle.epoch,
            self.config.defense(),
            Step::FinalVote(accused),
        );
    }

    fn final_vote(&mut self, accused: PlayerId) {
        if self.halted() {
            return;
        }
        self.cycle = self.cycle.with_trial(TrialState::Verdict);
        self.day_chat.mute_all();
        let lines = [
            format!(
                "{} to vote: guilty, innocent, or abstain.",
                spoken(self.config.verdict())
            ),
            "To vote guilty, type '/guilty'".to_string(),
            "To vote innocent, type '/innocent'".to_string(),
            "To abstain, do nothing.".to_string(),
        ];
        for line in &lines {
            self.day_chat.broadcast(&mut self.host, line, None);
        }
        self.scheduler.advance_after(
            self.cycle.epoch,
            self.config.verdict(),
            Step::Verdict(accused),
        );
    }

    fn verdict(&mut self, accused: PlayerId) {
        if self.halted() {
            return;
        }
        let verdict = tally_verdict(&self.table);
        for (voter, vote) in &verdict.ballots {
            let word = match vote {
                FinalVote::Guilty => "guilty",
                FinalVote::Innocent => "innocent",
                FinalVote::Abstain => continue,
            };
            let line = format!("{} voted {}", self.name_of(*voter), word);
            self.day_chat.broadcast(&mut self.host, &line, None);
        }

        let name = self.name_of(accused);
        if verdict.convicts() {
            if self.kill(accused) {
                if let Some(state) = self.table.get_mut(accused) {
                    state.died_this_night = false;
                }
                self.day_chat.mute(accused);
            }
            self.day_chat
                .broadcast(&mut self.host, &format!("{} has died.", name), None);
        } else {
            self.day_chat.broadcast(
                &mut self.host,
                &format!("{} has been acquitted", name),
                None,
            );
        }
        info!(
            epoch = self.cycle.epoch,
            accused = %name,
            guilty = verdict.guilty.len(),
            innocent = verdict.innocent.len(),
            convicted = verdict.convicts(),
            "verdict"
        );

        self.cycle = self.cycle.with_trial(TrialState::Ended);
        self.table.reset_after_trial();
        self.scheduler.advance_after(
            self.cycle.epoch,
            self.config.post_verdict(),
            Step::Night,
        );
    }

    /// Resets a concluded game to its pre-start state and hands it back.
    fn end(&mut self) {
        if !self.cycle.ended {
            return;
        }
        self.scheduler.cancel_all();
        self.cycle = self.cycle.next_game();
        self.in_play = false;
        self.table.clear();
        self.mafia_chat.clear();
        self.day_chat.unmute_all();
        self.nomination_started = None;
        info!(epoch = self.cycle.epoch, "game reset");
        self.host.game_ended();
    }

    // ------------------------------------------------------------------
    // Kills
    // ------------------------------------------------------------------

    /// Kills a living player and strikes their name through for everyone.
    /// Returns false if they were already dead or not in play.
    fn kill(&mut self, id: PlayerId) -> bool {
        let Some(state) = self.table.get_mut(id) else {
            return false;
        };
        if !state.kill() {
            return false;
        }
        self.strike_for_all(id);
        true
    }

    fn strike_for_all(&mut self, victim: PlayerId) {
        let name = self.name_of(victim);
        for viewer in &self.players {
            self.host.strike_through(viewer, &name);
        }
    }
}
