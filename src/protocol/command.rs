//! In-game chat commands.
//!
//! Players act by typing slash commands into chat. Parsing only recognises
//! the command and its argument; whether it is allowed right now is decided
//! by the game. Every rejection is a [`CommandError`] whose message is sent
//! back to the player verbatim.

/// A parsed player command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    /// `/act <username>`: choose tonight's target.
    Act { target: String },
    /// `/vote <username>`: nominate someone for trial.
    Vote { target: String },
    /// `/guilty`
    Guilty,
    /// `/innocent` or `/inno`
    Innocent,
}

/// Why a command was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("Unknown command '{0}'.")]
    UnknownCommand(String),

    #[error("Usage: {0} <username>")]
    MissingTarget(&'static str),

    #[error("There's no player called '{0}'. Try again.")]
    UnknownPlayer(String),

    #[error("That player is dead, you cannot vote for them.")]
    DeadTarget,

    #[error("You can only use /act at night.")]
    NotNight,

    #[error("There is no nomination vote right now.")]
    NotNominating,

    #[error("There is no verdict vote right now.")]
    NotVerdict,

    #[error("You are dead.")]
    SenderDead,

    #[error("The game hasn't started yet.")]
    NotStarted,
}

/// Parses a raw chat message.
///
/// Returns `None` for ordinary chat (anything not starting with `/`).
pub fn parse_chat(msg: &str) -> Option<Result<ChatCommand, CommandError>> {
    let trimmed = msg.trim();
    if !trimmed.starts_with('/') {
        return None;
    }

    let (name, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (trimmed, ""),
    };

    let parsed = match name {
        "/act" => target_argument("/act", rest).map(|target| ChatCommand::Act { target }),
        "/vote" => {
            // Only the first word names the nominee.
            let first = rest.split_whitespace().next().unwrap_or("");
            target_argument("/vote", first).map(|target| ChatCommand::Vote { target })
        }
        "/guilty" => Ok(ChatCommand::Guilty),
        "/innocent" | "/inno" => Ok(ChatCommand::Innocent),
        other => Err(CommandError::UnknownCommand(other.to_string())),
    };
    Some(parsed)
}

fn target_argument(command: &'static str, arg: &str) -> Result<String, CommandError> {
    if arg.is_empty() {
        return Err(CommandError::MissingTarget(command));
    }
    Ok(arg.to_string())
}
