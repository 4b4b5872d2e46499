//! Error types for the room layer.

use howl_protocol::RoomId;

/// Errors that can occur during room operations.
///
/// The first group are ordinary pre-condition failures, reported back so
/// the caller can re-prompt the user. The syncer and night-task variants
/// signal invariant violations: they abort the offending request and are
/// logged at error level at the call site.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// The room already has as many members as it has roles to deal.
    #[error("room {0} is full")]
    RoomFull(RoomId),

    /// The player is already a member of this room.
    #[error("player \"{0}\" is already in the room")]
    AlreadyInRoom(String),

    /// No member with that nickname.
    #[error("player \"{0}\" is not in the room")]
    NotInRoom(String),

    /// The game can't start until every seat is taken.
    #[error("not enough players: {have} of {need} seats taken")]
    InsufficientPlayers { need: usize, have: usize },

    /// No day vote is currently awaiting resolution.
    #[error("no vote is open")]
    NoVoteOpen,

    /// No hunter shot is currently awaiting resolution.
    #[error("no hunter shot is pending")]
    NoShotPending,

    /// A previous game's night task has not finished yet.
    #[error("a previous night task is still running")]
    NightTaskActive,

    /// The player's log syncer was already started.
    #[error("log syncer already running for \"{0}\"")]
    SyncerRunning(String),

    /// The player's log syncer was not running when it should have been.
    #[error("no log syncer running for \"{0}\"")]
    SyncerNotRunning(String),
}
