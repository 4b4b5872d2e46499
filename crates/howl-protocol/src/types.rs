//! Room identity and the message-log model.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Reserved addressee marking a log entry as a broadcast to the whole room.
///
/// Nicknames containing this marker are rejected at registration so a player
/// can never impersonate the moderator.
pub const SYSTEM_MARKER: &str = "@system";

// ---------------------------------------------------------------------------
// RoomId
// ---------------------------------------------------------------------------

/// A unique identifier for a room (one game instance).
///
/// Newtype over `u64` so a room id can't be confused with any other number.
/// `#[serde(transparent)]` keeps the wire form a bare integer.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct RoomId(pub u64);

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Log entries
// ---------------------------------------------------------------------------

/// A client-control signal carried on the log.
///
/// Control entries have no player-visible text; they instruct the client to
/// adjust its UI immediately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControlSignal {
    /// Dismiss any currently-open input prompt. Emitted when a gate closes,
    /// so players whose choice became moot stop seeing a stale prompt.
    DismissPrompt,
}

/// One entry of a room's append-only message log.
///
/// The log is the single source of truth for everything players see. The
/// UI layer renders it filtered per recipient: private entries only for the
/// named player, broadcasts for everyone, control signals for everyone but
/// without text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogEntry {
    /// Visible only to the named player.
    Private { to: String, text: String },
    /// Visible to every player in the room.
    Broadcast { text: String },
    /// No text; a UI instruction for every client.
    Control(ControlSignal),
}

impl LogEntry {
    /// Whether this entry should be delivered to `nick`.
    pub fn visible_to(&self, nick: &str) -> bool {
        match self {
            Self::Private { to, .. } => to == nick,
            Self::Broadcast { .. } | Self::Control(_) => true,
        }
    }

    /// The player-readable text, if any.
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Private { text, .. } | Self::Broadcast { text } => Some(text),
            Self::Control(_) => None,
        }
    }
}
