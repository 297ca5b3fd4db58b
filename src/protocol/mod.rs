//! Text protocols.
//!
//! Player chat commands (`/act`, `/vote`, `/guilty`, `/innocent`) and the
//! line-based host protocol the binary reads from stdin.

pub mod command;
pub mod parser;

pub use command::{parse_chat, ChatCommand, CommandError};
pub use parser::{parse_command, Command};
