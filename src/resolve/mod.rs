//! Rule resolution.
//!
//! Resolves a night's hidden actions, the day's trial tallies, and the win
//! condition over the round table.

pub mod night;
pub mod trial;
pub mod win;

pub use night::{resolve_night, NightNote, NightOutcome};
pub use trial::{find_accused, nominations, quorum, tally_verdict, Verdict};
pub use win::{evaluate, Outcome};
