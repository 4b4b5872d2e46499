//! Player records: identity, dealt role, status, and role capabilities.

use howl_protocol::{GameStage, LogEntry, PlayerStatus, Role};
use serde::Serialize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::RoomError;

/// Sender half of a player's private message channel. The player's log
/// syncer forwards every log entry visible to them into this channel; the
/// transport layer holds the receiver.
pub type PlayerSender = mpsc::UnboundedSender<LogEntry>;

/// Receiver half of a player's private message channel.
pub type PlayerReceiver = mpsc::UnboundedReceiver<LogEntry>;

// ---------------------------------------------------------------------------
// Role capabilities
// ---------------------------------------------------------------------------

/// Role-specific capability record, attached only to players holding the
/// corresponding role. A tagged variant, not a bag of optional fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum RoleCaps {
    /// The witch's two single-use potions.
    Witch { heal: bool, poison: bool },
    /// The guard's memory of last night's target, for the
    /// no-same-target-two-nights-running rule.
    Guard { last_protect: Option<String> },
}

impl RoleCaps {
    /// The fresh capability record a newly dealt role starts with.
    pub fn for_role(role: Role) -> Option<RoleCaps> {
        match role {
            Role::Witch => Some(RoleCaps::Witch { heal: true, poison: true }),
            Role::Guard => Some(RoleCaps::Guard { last_protect: None }),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Player
// ---------------------------------------------------------------------------

/// One room member. Role, status, and capabilities are set only while a
/// game is running; all three are cleared when the game stops.
#[derive(Debug)]
pub struct Player {
    pub nick: String,
    pub role: Option<Role>,
    pub status: Option<PlayerStatus>,
    pub caps: Option<RoleCaps>,
    pub(crate) sender: PlayerSender,
    syncer: Option<JoinHandle<()>>,
}

impl Player {
    pub(crate) fn new(nick: &str, sender: PlayerSender) -> Self {
        Self {
            nick: nick.to_string(),
            role: None,
            status: None,
            caps: None,
            sender,
            syncer: None,
        }
    }

    /// True iff this player may act in the given stage: they are not dead,
    /// and their role is in the stage's eligible set.
    pub fn should_act(&self, stage: Option<GameStage>) -> bool {
        if self.status == Some(PlayerStatus::Dead) {
            return false;
        }
        match (stage, self.role) {
            (Some(stage), Some(role)) => stage.eligible_roles().contains(&role),
            _ => false,
        }
    }

    pub fn witch_has_heal(&self) -> bool {
        matches!(self.caps, Some(RoleCaps::Witch { heal: true, .. }))
    }

    pub fn witch_has_poison(&self) -> bool {
        matches!(self.caps, Some(RoleCaps::Witch { poison: true, .. }))
    }

    pub fn last_protect(&self) -> Option<&str> {
        match &self.caps {
            Some(RoleCaps::Guard { last_protect }) => last_protect.as_deref(),
            _ => None,
        }
    }

    pub(crate) fn start_syncer(&mut self, task: JoinHandle<()>) -> Result<(), RoomError> {
        if self.syncer.is_some() {
            task.abort();
            return Err(RoomError::SyncerRunning(self.nick.clone()));
        }
        self.syncer = Some(task);
        Ok(())
    }

    pub(crate) fn stop_syncer(&mut self) -> Result<(), RoomError> {
        match self.syncer.take() {
            Some(task) => {
                task.abort();
                Ok(())
            }
            None => Err(RoomError::SyncerNotRunning(self.nick.clone())),
        }
    }
}

/// Read-model snapshot of one player, for the UI layer's poll.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerView {
    pub nick: String,
    pub role: Option<Role>,
    pub status: Option<PlayerStatus>,
    /// Whether this player may act in the room's current stage.
    pub should_act: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(role: Option<Role>, status: Option<PlayerStatus>) -> Player {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut p = Player::new("p", tx);
        p.role = role;
        p.status = status;
        p
    }

    #[test]
    fn test_should_act_requires_matching_role() {
        let witch = player(Some(Role::Witch), Some(PlayerStatus::Alive));
        assert!(witch.should_act(Some(GameStage::Witch)));
        assert!(!witch.should_act(Some(GameStage::Wolf)));
        assert!(!witch.should_act(Some(GameStage::Day)));
        assert!(!witch.should_act(None));
    }

    #[test]
    fn test_should_act_false_for_dead_players() {
        let wolf = player(Some(Role::Wolf), Some(PlayerStatus::Dead));
        assert!(!wolf.should_act(Some(GameStage::Wolf)));
    }

    #[test]
    fn test_both_wolf_roles_act_in_the_wolf_stage() {
        let king = player(Some(Role::WolfKing), Some(PlayerStatus::Alive));
        assert!(king.should_act(Some(GameStage::Wolf)));
    }

    #[test]
    fn test_pending_dead_players_still_act() {
        // A wolf-bitten hunter is only PENDING_DEAD during the night and
        // still takes their turn.
        let hunter = player(Some(Role::Hunter), Some(PlayerStatus::PendingDead));
        assert!(hunter.should_act(Some(GameStage::Hunter)));
    }

    #[test]
    fn test_fresh_caps_per_role() {
        assert_eq!(
            RoleCaps::for_role(Role::Witch),
            Some(RoleCaps::Witch { heal: true, poison: true })
        );
        assert_eq!(
            RoleCaps::for_role(Role::Guard),
            Some(RoleCaps::Guard { last_protect: None })
        );
        assert_eq!(RoleCaps::for_role(Role::Citizen), None);
        assert_eq!(RoleCaps::for_role(Role::WolfKing), None);
    }
}
