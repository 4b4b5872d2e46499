//! Error types for the registry layer.

use howl_protocol::RoomId;
use howl_room::RoomError;

/// Errors that can occur during registry operations.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// The nickname is taken, or collides with the reserved system marker.
    #[error("nickname \"{0}\" is already taken")]
    DuplicateNickname(String),

    /// No player is registered under that nickname.
    #[error("no player registered as \"{0}\"")]
    UnknownPlayer(String),

    /// The player is already a member of a room.
    #[error("player \"{0}\" is already in room {1}")]
    AlreadyInRoom(String, RoomId),

    /// No room with that id.
    #[error("room {0} not found")]
    RoomNotFound(RoomId),

    /// Every seat in the room is taken.
    #[error("room {0} is full")]
    RoomFull(RoomId),

    /// A room-level failure while evicting or joining.
    #[error(transparent)]
    Room(#[from] RoomError),
}
