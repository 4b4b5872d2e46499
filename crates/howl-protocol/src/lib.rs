//! Shared types for the howl game moderator.
//!
//! Everything that more than one layer needs to name lives here: player
//! roles and factions, the night/day stage enum, per-room rule variants,
//! room identifiers, and the entries of a room's message log. The room and
//! registry crates build on these; the UI/transport layer reads them to
//! decide which controls to render.
//!
//! # Key types
//!
//! - [`Role`] / [`Faction`] — who a player is, and which side they count for
//! - [`PlayerStatus`] — alive/dead plus the transient pending markers
//! - [`GameStage`] — the currently open sub-phase, with its eligible roles
//! - [`WitchRule`] / [`GuardRule`] — immutable per-room rule choices
//! - [`RoomSetting`] — the room-creation configuration (role composition)
//! - [`LogEntry`] — one addressed entry of a room's append-only log

mod role;
mod setting;
mod types;

pub use role::{Faction, GameStage, PlayerStatus, Role};
pub use setting::{GuardRule, RoomSetting, WitchRule};
pub use types::{ControlSignal, LogEntry, RoomId, SYSTEM_MARKER};
