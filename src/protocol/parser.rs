//! Console host command parser.
//!
//! The `nightfall` binary hosts one game over stdin, one host command per
//! line. This parses those lines into [`Command`] variants that the main
//! loop dispatches on.

use tracing::warn;

/// A parsed host command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Add a player to the lobby: `join <name>`.
    Join { name: String },

    /// Deal roles and begin the game.
    Start,

    /// A raw chat line from a player: `say <name> <text...>`.
    Say { name: String, text: String },

    /// A player disconnects: `leave <name>`.
    Leave { name: String },

    /// Stop hosting.
    Quit,
}

/// Parses a single line of input into a `Command`.
///
/// Returns `None` for empty lines or unrecognized commands. Malformed
/// arguments for known commands also return `None` after logging a warning.
pub fn parse_command(line: &str) -> Option<Command> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }

    let tokens: Vec<&str> = trimmed.split_whitespace().collect();

    match tokens[0] {
        "start" => Some(Command::Start),
        "quit" => Some(Command::Quit),

        "join" => parse_name(&tokens, "join").map(|name| Command::Join { name }),
        "leave" => parse_name(&tokens, "leave").map(|name| Command::Leave { name }),
        "say" => parse_say(&tokens, trimmed),

        other => {
            warn!(command = other, "unknown command");
            None
        }
    }
}

/// Parses `<keyword> <name>`.
fn parse_name(tokens: &[&str], keyword: &str) -> Option<String> {
    if tokens.len() != 2 {
        warn!("malformed {keyword}: expected '{keyword} <name>'");
        return None;
    }
    Some(tokens[1].to_string())
}

/// Parses `say <name> <text...>`, keeping the text exactly as typed.
fn parse_say(tokens: &[&str], full_line: &str) -> Option<Command> {
    if tokens.len() < 3 {
        warn!("malformed say: expected 'say <name> <text>'");
        return None;
    }
    let name = tokens[1];
    let text = full_line
        .strip_prefix("say")
        .unwrap_or("")
        .trim_start()
        .strip_prefix(name)
        .unwrap_or("")
        .trim()
        .to_string();
    Some(Command::Say {
        name: name.to_string(),
        text,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_start_command() {
        assert_eq!(parse_command("start"), Some(Command::Start));
    }

    #[test]
    fn parse_quit_command() {
        assert_eq!(parse_command("quit"), Some(Command::Quit));
    }

    #[test]
    fn parse_empty_line_returns_none() {
        assert_eq!(parse_command(""), None);
        assert_eq!(parse_command("  "), None);
        assert_eq!(parse_command("\t"), None);
    }

    #[test]
    fn parse_unknown_command_returns_none() {
        assert_eq!(parse_command("foobar"), None);
    }

    #[test]
    fn parse_join_and_leave() {
        assert_eq!(
            parse_command("join alice"),
            Some(Command::Join {
                name: "alice".to_string()
            })
        );
        assert_eq!(
            parse_command("leave alice"),
            Some(Command::Leave {
                name: "alice".to_string()
            })
        );
    }

    #[test]
    fn parse_join_malformed_returns_none() {
        assert_eq!(parse_command("join"), None);
        assert_eq!(parse_command("join two words"), None);
        assert_eq!(parse_command("leave"), None);
    }

    #[test]
    fn parse_say_keeps_text() {
        assert_eq!(
            parse_command("say alice /act bob"),
            Some(Command::Say {
                name: "alice".to_string(),
                text: "/act bob".to_string(),
            })
        );
        assert_eq!(
            parse_command("  say bob   I am  the doctor "),
            Some(Command::Say {
                name: "bob".to_string(),
                text: "I am  the doctor".to_string(),
            })
        );
    }

    #[test]
    fn parse_say_malformed_returns_none() {
        assert_eq!(parse_command("say"), None);
        assert_eq!(parse_command("say alice"), None);
    }

    #[test]
    fn parse_with_leading_trailing_whitespace() {
        assert_eq!(parse_command("  start  "), Some(Command::Start));
        assert_eq!(parse_command("  quit  "), Some(Command::Quit));
    }
}
