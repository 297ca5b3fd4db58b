//! Nightfall: a rules engine for a mafia social-deduction game.
//!
//! Exposes the game model, the night/trial/win resolvers, the timed phase
//! scheduler, and the text protocols for use by integration tests and the
//! binary entry point.

pub mod chat;
pub mod config;
pub mod engine;
pub mod game;
pub mod host;
pub mod logging;
pub mod protocol;
pub mod resolve;
pub mod schedule;
pub mod session;
