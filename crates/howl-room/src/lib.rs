//! Room lifecycle and action resolution for howl.
//!
//! One [`Room`] is one isolated game instance: its configuration,
//! membership, the night/day state machine, the message log, and win
//! evaluation. A running game owns a night coordinator task that walks the
//! sub-phase sequence and holds a wait-gate open per phase; concurrently,
//! player tasks submit actions that resolve or bounce off that gate.
//!
//! # Key types
//!
//! - [`Room`] — cheap-clone handle to one game room
//! - [`PlayerAction`] / [`ActionOutcome`] — the action-legality contract
//! - [`Player`] / [`RoleCaps`] — a member and their role capabilities
//! - [`RoomConfig`] — pacing knobs (phase delay, deal delay, log cap)
//! - [`RoomError`] — what can go wrong

mod action;
mod config;
mod error;
mod log;
mod night;
mod player;
mod room;

pub use action::{ActionOutcome, PlayerAction};
pub use config::RoomConfig;
pub use error::RoomError;
pub use player::{Player, PlayerReceiver, PlayerSender, PlayerView, RoleCaps};
pub use room::{Room, RoomOverview};
