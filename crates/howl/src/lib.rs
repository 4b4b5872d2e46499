//! A moderator for the Werewolf/Mafia party game.
//!
//! One process hosts many independent rooms. Within a room, players
//! alternate between a public day vote and a sequence of private,
//! role-specific night sub-phases, with hidden win conditions evaluated
//! automatically after every night and every vote.
//!
//! This meta-crate re-exports the pieces and provides the unified
//! [`HowlError`]:
//!
//! - [`Registry`](howl_registry::Registry) — players and rooms, process-wide
//! - [`Room`](howl_room::Room) — one game instance and its state machine
//! - [`PlayerAction`](howl_room::PlayerAction) — what players submit
//! - [`howl_protocol`] — the shared enums and log model
//!
//! The UI/transport layer is an external collaborator: it polls the room's
//! read models, submits at most one action per tick, and renders the room
//! log filtered per recipient.

mod error;

pub use error::HowlError;
pub use howl_protocol as protocol;
pub use howl_registry::{Registry, RegistryError};
pub use howl_room::{
    ActionOutcome, Player, PlayerAction, PlayerReceiver, PlayerSender, PlayerView, Room,
    RoomConfig, RoomError, RoomOverview,
};

/// Commonly used imports for consumers of the moderator core.
pub mod prelude {
    pub use crate::{HowlError, Registry, Room};
    pub use howl_protocol::{
        Faction, GameStage, GuardRule, LogEntry, PlayerStatus, Role, RoomId, RoomSetting,
        WitchRule,
    };
    pub use howl_room::{ActionOutcome, PlayerAction, RoomConfig};
}
