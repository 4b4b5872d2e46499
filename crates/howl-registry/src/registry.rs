//! The registry: every player and every room in the process.
//!
//! One `Registry` is owned by the server's top level and handed to whatever
//! needs lookup. It is the only state shared across rooms; everything else
//! belongs to exactly one room. All mutations are short, non-suspending map
//! edits under one async mutex.

use std::collections::HashMap;

use howl_protocol::{RoomId, RoomSetting, SYSTEM_MARKER};
use howl_room::{PlayerReceiver, PlayerSender, Room, RoomConfig};
use rand::Rng;
use tokio::sync::{mpsc, Mutex};

use crate::RegistryError;

struct PlayerEntry {
    /// Sender half of the player's private channel; handed to a room on
    /// join so its log syncer can reach the player.
    sender: PlayerSender,
    /// The room this player currently sits in, if any. A player is in at
    /// most one room at a time.
    room: Option<RoomId>,
}

struct RegistryInner {
    players: HashMap<String, PlayerEntry>,
    rooms: HashMap<RoomId, Room>,
}

/// Process-wide store of players and rooms.
pub struct Registry {
    inner: Mutex<RegistryInner>,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(RegistryInner {
                players: HashMap::new(),
                rooms: HashMap::new(),
            }),
        }
    }

    // -- players ------------------------------------------------------------

    /// Pre-allocation check: is this nickname usable?
    ///
    /// Case-sensitive exact match against registered players, plus a
    /// collision check against the reserved system marker.
    pub async fn validate_nickname(&self, nick: &str) -> Result<(), RegistryError> {
        let inner = self.inner.lock().await;
        check_nickname(&inner, nick)
    }

    /// Registers a player and returns the receiver half of their private
    /// message channel.
    pub async fn create_player(&self, nick: &str) -> Result<PlayerReceiver, RegistryError> {
        let mut inner = self.inner.lock().await;
        check_nickname(&inner, nick)?;
        let (tx, rx) = mpsc::unbounded_channel();
        inner
            .players
            .insert(nick.to_string(), PlayerEntry { sender: tx, room: None });
        tracing::info!(nick, "player registered");
        Ok(rx)
    }

    /// Deregisters a player, evicting them from their room first. A room
    /// left without members is deregistered along with them.
    pub async fn remove_player(&self, nick: &str) -> Result<(), RegistryError> {
        let occupied = {
            let mut inner = self.inner.lock().await;
            let Some(entry) = inner.players.remove(nick) else {
                tracing::error!(nick, "attempted to free an unregistered player");
                return Err(RegistryError::UnknownPlayer(nick.to_string()));
            };
            entry
                .room
                .and_then(|id| inner.rooms.get(&id).cloned().map(|room| (id, room)))
        };

        if let Some((room_id, room)) = occupied {
            let now_empty = room.remove_player(nick).await?;
            if now_empty {
                let mut inner = self.inner.lock().await;
                inner.rooms.remove(&room_id);
                tracing::info!(room_id = %room_id, "room deregistered, last player left");
            }
        }
        tracing::info!(nick, "player deregistered");
        Ok(())
    }

    pub async fn player_count(&self) -> usize {
        self.inner.lock().await.players.len()
    }

    // -- rooms --------------------------------------------------------------

    /// Creates a room with default pacing and registers it.
    pub async fn create_room(&self, setting: RoomSetting) -> Room {
        self.create_room_with(setting, RoomConfig::default()).await
    }

    /// Creates a room with explicit pacing and registers it.
    ///
    /// The new id is one past the highest live id, or a fresh small random
    /// id when no rooms exist.
    pub async fn create_room_with(&self, setting: RoomSetting, config: RoomConfig) -> Room {
        let mut inner = self.inner.lock().await;
        let id = match inner.rooms.keys().map(|r| r.0).max() {
            Some(highest) => RoomId(highest + 1),
            None => RoomId(rand::rng().random_range(0..=100)),
        };
        let room = Room::new(id, setting, config);
        inner.rooms.insert(id, room.clone());
        tracing::info!(room_id = %id, "room created");
        room
    }

    pub async fn get_room(&self, id: RoomId) -> Option<Room> {
        self.inner.lock().await.rooms.get(&id).cloned()
    }

    /// Deregisters a room. No-op if the id is unknown.
    pub async fn remove_room(&self, id: RoomId) {
        if self.inner.lock().await.rooms.remove(&id).is_some() {
            tracing::info!(room_id = %id, "room removed");
        }
    }

    pub async fn room_count(&self) -> usize {
        self.inner.lock().await.rooms.len()
    }

    pub async fn room_ids(&self) -> Vec<RoomId> {
        self.inner.lock().await.rooms.keys().copied().collect()
    }

    // -- membership ---------------------------------------------------------

    /// Pre-join check usable before prompting: does the room exist, and is
    /// there a free seat?
    pub async fn validate_join(&self, id: RoomId) -> Result<(), RegistryError> {
        let room = self
            .get_room(id)
            .await
            .ok_or(RegistryError::RoomNotFound(id))?;
        if room.is_full().await {
            return Err(RegistryError::RoomFull(id));
        }
        Ok(())
    }

    /// Puts a registered player into a room.
    pub async fn join_room(&self, nick: &str, id: RoomId) -> Result<Room, RegistryError> {
        let (sender, room) = {
            let inner = self.inner.lock().await;
            let entry = inner
                .players
                .get(nick)
                .ok_or_else(|| RegistryError::UnknownPlayer(nick.to_string()))?;
            if let Some(current) = entry.room {
                return Err(RegistryError::AlreadyInRoom(nick.to_string(), current));
            }
            let room = inner
                .rooms
                .get(&id)
                .cloned()
                .ok_or(RegistryError::RoomNotFound(id))?;
            (entry.sender.clone(), room)
        };

        // The room re-checks capacity under its own lock; the pre-check in
        // validate_join only exists for friendlier prompting.
        room.add_player(nick, sender)
            .await
            .map_err(|err| match err {
                howl_room::RoomError::RoomFull(id) => RegistryError::RoomFull(id),
                other => RegistryError::Room(other),
            })?;

        let mut inner = self.inner.lock().await;
        if let Some(entry) = inner.players.get_mut(nick) {
            entry.room = Some(id);
        }
        Ok(room)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

fn check_nickname(inner: &RegistryInner, nick: &str) -> Result<(), RegistryError> {
    if nick.contains(SYSTEM_MARKER) || inner.players.contains_key(nick) {
        return Err(RegistryError::DuplicateNickname(nick.to_string()));
    }
    Ok(())
}
