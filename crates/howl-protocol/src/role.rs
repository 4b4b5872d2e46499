//! Roles, factions, player statuses, and the game stage enum.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Role & Faction
// ---------------------------------------------------------------------------

/// A dealt character role.
///
/// `Wolf`/`WolfKing` form the wolf faction; `Citizen` is the plain good
/// faction; the rest are "god" roles. Faction membership is always derived
/// through [`Role::faction`], never stored alongside the role.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Role {
    Wolf,
    WolfKing,
    Detective,
    Witch,
    Guard,
    Hunter,
    Citizen,
}

/// Which side a role counts for when the win condition is tallied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Faction {
    Wolf,
    Citizen,
    God,
}

impl Role {
    /// Special god roles on the good side, selectable at room creation.
    pub const GOD_CITIZEN_OPTIONS: [Role; 4] =
        [Role::Detective, Role::Witch, Role::Guard, Role::Hunter];

    /// Special roles on the wolf side, selectable at room creation.
    pub const GOD_WOLF_OPTIONS: [Role; 1] = [Role::WolfKing];

    /// The faction this role is tallied under.
    pub fn faction(self) -> Faction {
        match self {
            Role::Wolf | Role::WolfKing => Faction::Wolf,
            Role::Citizen => Faction::Citizen,
            Role::Detective | Role::Witch | Role::Guard | Role::Hunter => Faction::God,
        }
    }

    /// Whether this is a god role (any role beyond plain wolf/citizen on the
    /// good side). The wolf king is a special wolf, not a god.
    pub fn is_god(self) -> bool {
        matches!(self.faction(), Faction::God)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::Wolf => "werewolf",
            Role::WolfKing => "wolf king",
            Role::Detective => "detective",
            Role::Witch => "witch",
            Role::Guard => "guard",
            Role::Hunter => "hunter",
            Role::Citizen => "citizen",
        };
        write!(f, "{name}")
    }
}

// ---------------------------------------------------------------------------
// PlayerStatus
// ---------------------------------------------------------------------------

/// A player's life state.
///
/// The `Pending*` markers are transient: they exist only between a
/// night/vote action and the next win evaluation, which collapses every
/// pending marker to either `Alive` or `Dead`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerStatus {
    Alive,
    Dead,
    /// Marked for elimination by the wolves (or a guard/heal conflict).
    PendingDead,
    /// Marked saved by the witch's heal potion.
    PendingHeal,
    /// Marked for elimination by the witch's poison.
    PendingPoison,
    /// Marked protected by the guard.
    PendingGuard,
}

impl PlayerStatus {
    /// Whether the player survives the upcoming collapse and is tallied as
    /// alive during win evaluation.
    pub fn counts_as_alive(self) -> bool {
        matches!(
            self,
            PlayerStatus::Alive | PlayerStatus::PendingHeal | PlayerStatus::PendingGuard
        )
    }

    /// Whether the upcoming collapse eliminates the player.
    pub fn is_doomed(self) -> bool {
        matches!(self, PlayerStatus::PendingDead | PlayerStatus::PendingPoison)
    }
}

impl fmt::Display for PlayerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PlayerStatus::Alive => "alive",
            PlayerStatus::Dead => "out",
            PlayerStatus::PendingDead => "marked for death",
            PlayerStatus::PendingHeal => "saved by the witch",
            PlayerStatus::PendingPoison => "poisoned",
            PlayerStatus::PendingGuard => "under guard",
        };
        write!(f, "{name}")
    }
}

// ---------------------------------------------------------------------------
// GameStage
// ---------------------------------------------------------------------------

/// The currently active sub-phase of a room. At most one at a time,
/// global to the room; `None` between phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameStage {
    /// Public day phase: the town discusses, the host resolves the vote.
    Day,
    Wolf,
    Detective,
    Witch,
    Guard,
    Hunter,
    /// A slain hunter's one-time retaliation, resolved by the host before
    /// the day vote.
    HunterShoot,
}

impl GameStage {
    /// The roles allowed to act while this stage is open.
    ///
    /// `Day` and `HunterShoot` map to no roles: both are resolved by the
    /// host through dedicated room operations, not player actions.
    pub fn eligible_roles(self) -> &'static [Role] {
        match self {
            GameStage::Day | GameStage::HunterShoot => &[],
            GameStage::Wolf => &[Role::Wolf, Role::WolfKing],
            GameStage::Detective => &[Role::Detective],
            GameStage::Witch => &[Role::Witch],
            GameStage::Guard => &[Role::Guard],
            GameStage::Hunter => &[Role::Hunter],
        }
    }
}

impl fmt::Display for GameStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GameStage::Day => "day",
            GameStage::Wolf => "wolves",
            GameStage::Detective => "detective",
            GameStage::Witch => "witch",
            GameStage::Guard => "guard",
            GameStage::Hunter => "hunter",
            GameStage::HunterShoot => "hunter's shot",
        };
        write!(f, "{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_faction_is_derived_from_role() {
        assert_eq!(Role::Wolf.faction(), Faction::Wolf);
        assert_eq!(Role::WolfKing.faction(), Faction::Wolf);
        assert_eq!(Role::Citizen.faction(), Faction::Citizen);
        assert_eq!(Role::Detective.faction(), Faction::God);
        assert_eq!(Role::Witch.faction(), Faction::God);
        assert_eq!(Role::Guard.faction(), Faction::God);
        assert_eq!(Role::Hunter.faction(), Faction::God);
    }

    #[test]
    fn test_wolf_king_is_not_a_god() {
        assert!(!Role::WolfKing.is_god());
        assert!(Role::Hunter.is_god());
        assert!(!Role::Citizen.is_god());
    }

    #[test]
    fn test_stage_eligible_roles() {
        assert_eq!(GameStage::Wolf.eligible_roles(), &[Role::Wolf, Role::WolfKing]);
        assert_eq!(GameStage::Witch.eligible_roles(), &[Role::Witch]);
        assert!(GameStage::Day.eligible_roles().is_empty());
        assert!(GameStage::HunterShoot.eligible_roles().is_empty());
    }

    #[test]
    fn test_pending_status_classification() {
        assert!(PlayerStatus::PendingHeal.counts_as_alive());
        assert!(PlayerStatus::PendingGuard.counts_as_alive());
        assert!(!PlayerStatus::PendingDead.counts_as_alive());
        assert!(PlayerStatus::PendingPoison.is_doomed());
        assert!(!PlayerStatus::Dead.is_doomed());
        assert!(!PlayerStatus::Dead.counts_as_alive());
    }
}
