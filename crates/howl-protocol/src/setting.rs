//! Per-room rule variants and the room-creation configuration.

use serde::{Deserialize, Serialize};

use crate::Role;

// ---------------------------------------------------------------------------
// Rule variants
// ---------------------------------------------------------------------------

/// When the witch may spend her heal potion on herself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WitchRule {
    /// Self-rescue is allowed on the first night only.
    SelfRescueFirstNightOnly,
    /// Self-rescue is never allowed.
    NoSelfRescue,
    /// Self-rescue is always allowed.
    AlwaysSelfRescue,
}

/// How a simultaneous guard-protect and witch-heal on the same target
/// resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GuardRule {
    /// Protect and heal cancel out: the target dies.
    MedConflict,
    /// Protect and heal stack: the target lives.
    NoMedConflict,
}

// ---------------------------------------------------------------------------
// RoomSetting
// ---------------------------------------------------------------------------

/// The configuration a room is created with.
///
/// The role composition is a multiset: `wolves` plain werewolves,
/// `citizens` plain citizens, plus any selected special roles. Its total
/// size is the exact number of players the room requires. Immutable for the
/// life of the room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomSetting {
    /// Number of plain werewolves.
    pub wolves: usize,
    /// Number of plain citizens.
    pub citizens: usize,
    /// Selected special wolf roles (at most one of each).
    pub god_wolves: Vec<Role>,
    /// Selected god roles on the good side (at most one of each).
    pub god_citizens: Vec<Role>,
    /// Witch self-rescue rule.
    pub witch_rule: WitchRule,
    /// Guard/heal conflict rule.
    pub guard_rule: GuardRule,
}

impl RoomSetting {
    /// Builds the full role multiset to deal from.
    pub fn roles(&self) -> Vec<Role> {
        let mut roles = Vec::with_capacity(self.required_players());
        roles.extend(std::iter::repeat_n(Role::Wolf, self.wolves));
        roles.extend(std::iter::repeat_n(Role::Citizen, self.citizens));
        roles.extend(self.god_wolves.iter().copied());
        roles.extend(self.god_citizens.iter().copied());
        roles
    }

    /// How many players this room needs before the game can start.
    pub fn required_players(&self) -> usize {
        self.wolves + self.citizens + self.god_wolves.len() + self.god_citizens.len()
    }
}

impl Default for RoomSetting {
    /// The classic small lobby: 3 wolves vs 4 citizens, no god roles.
    fn default() -> Self {
        Self {
            wolves: 3,
            citizens: 4,
            god_wolves: Vec::new(),
            god_citizens: Vec::new(),
            witch_rule: WitchRule::SelfRescueFirstNightOnly,
            guard_rule: GuardRule::NoMedConflict,
        }
    }
}
