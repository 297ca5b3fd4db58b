//! Session loop.
//!
//! Serializes everything that touches a [`Game`]: timer ticks and host
//! inputs are handled one at a time on a single task, so phase handlers
//! never interleave.

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::engine::{Game, LobbyError};
use crate::game::{Player, PlayerId};
use crate::host::Host;
use crate::schedule::Tick;

/// An event from the host side of a game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Join(Player),
    Start,
    Message { from: PlayerId, text: String },
    Leave(PlayerId),
    Shutdown,
}

impl<H: Host> Game<H> {
    /// Applies one host input. Lobby failures are returned; chat rejections
    /// go to the player.
    pub fn apply(&mut self, input: Input) -> Result<(), LobbyError> {
        match input {
            Input::Join(player) => self.add_player(player),
            Input::Start => self.start(),
            Input::Message { from, text } => {
                self.receive(from, &text);
                Ok(())
            }
            Input::Leave(id) => {
                self.disconnect(id);
                Ok(())
            }
            Input::Shutdown => Ok(()),
        }
    }
}

/// Drives `game` until a [`Input::Shutdown`] arrives or the input channel
/// closes, then hands the game back.
pub async fn run<H: Host>(
    mut game: Game<H>,
    mut ticks: mpsc::UnboundedReceiver<Tick>,
    mut inputs: mpsc::Receiver<Input>,
) -> Game<H> {
    loop {
        tokio::select! {
            Some(tick) = ticks.recv() => game.handle_tick(tick),
            input = inputs.recv() => match input {
                None | Some(Input::Shutdown) => break,
                Some(input) => {
                    if let Err(e) = game.apply(input) {
                        warn!(error = %e, "host input rejected");
                    }
                }
            },
        }
    }
    debug!("session closed");
    game
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::game::GamePhase;
    use crate::host::RecordingHost;
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn run_drives_timers_until_shutdown() {
        let config = GameConfig {
            seed: 3,
            ..GameConfig::default()
        };
        let (game, ticks) = Game::new(config, RecordingHost::new());
        let (tx, rx) = mpsc::channel(16);
        let session = tokio::spawn(run(game, ticks, rx));

        for i in 0..7 {
            tx.send(Input::Join(Player::new(i, format!("p{i}"))))
                .await
                .unwrap();
        }
        tx.send(Input::Start).await.unwrap();
        tokio::time::sleep(Duration::from_secs(11)).await;
        tx.send(Input::Shutdown).await.unwrap();

        let game = session.await.unwrap();
        assert!(game.in_play());
        assert_eq!(game.cycle().phase, GamePhase::Night);
        assert!(game.host().received(PlayerId(0), "Night has fallen."));
    }

    #[tokio::test(start_paused = true)]
    async fn rejected_input_does_not_stop_the_loop() {
        let (game, ticks) = Game::new(GameConfig::default(), RecordingHost::new());
        let (tx, rx) = mpsc::channel(16);
        let session = tokio::spawn(run(game, ticks, rx));

        tx.send(Input::Start).await.unwrap();
        tx.send(Input::Join(Player::new(1, "solo"))).await.unwrap();
        drop(tx);

        let game = session.await.unwrap();
        assert!(!game.in_play());
        assert_eq!(game.players().len(), 1);
    }
}
