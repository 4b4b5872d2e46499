//! Player actions and their legality rules.
//!
//! [`Room::submit`](crate::Room::submit) is the guard: it checks the gate
//! and `should_act`, then hands the action to [`apply`]. The body signals
//! its outcome with [`ActionOutcome`]: `Accepted` closes the gate (including
//! information-only actions and skips), `Rejected` carries a reason for the
//! actor and leaves the gate open for a retry.

use howl_protocol::{GuardRule, PlayerStatus, RoomSetting, WitchRule};

use crate::player::{Player, RoleCaps};
use crate::room::RoomState;

/// An action a player can submit against an open gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerAction {
    /// Decline to act. Closes the gate without mutating anything.
    Skip,
    /// Mark the target for elimination tonight.
    WolfKill { target: String },
    /// Privately learn the target's role.
    DetectiveReveal { target: String },
    /// Spend the heal potion on the target.
    WitchHeal { target: String },
    /// Spend the poison on the target.
    WitchPoison { target: String },
    /// Shield the target for the night.
    GuardProtect { target: String },
    /// Privately learn whether the gun may be fired tonight.
    HunterGunStatus,
}

/// The tagged outcome of an action body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    Accepted,
    Rejected(String),
}

/// Runs one action body against the room state. Caller has already
/// verified the gate is open and the actor may act in the current stage.
pub(crate) fn apply(
    st: &mut RoomState,
    setting: &RoomSetting,
    actor: &str,
    action: &PlayerAction,
) -> ActionOutcome {
    match action {
        PlayerAction::Skip => ActionOutcome::Accepted,
        PlayerAction::WolfKill { target } => wolf_kill(st, target),
        PlayerAction::DetectiveReveal { target } => detective_reveal(st, actor, target),
        PlayerAction::WitchHeal { target } => witch_heal(st, setting, actor, target),
        PlayerAction::WitchPoison { target } => witch_poison(st, actor, target),
        PlayerAction::GuardProtect { target } => guard_protect(st, setting, actor, target),
        PlayerAction::HunterGunStatus => hunter_gun_status(st, actor),
    }
}

fn no_such_player(target: &str) -> ActionOutcome {
    ActionOutcome::Rejected(format!("no player named \"{target}\""))
}

fn wolf_kill(st: &mut RoomState, target: &str) -> ActionOutcome {
    let Some(p) = st.player_mut(target) else {
        return no_such_player(target);
    };
    p.status = Some(PlayerStatus::PendingDead);
    ActionOutcome::Accepted
}

fn detective_reveal(st: &mut RoomState, actor: &str, target: &str) -> ActionOutcome {
    let Some(role) = st.player(target).and_then(|p| p.role) else {
        return no_such_player(target);
    };
    st.send_private(actor, format!("{target} is the {role}"));
    ActionOutcome::Accepted
}

fn witch_heal(
    st: &mut RoomState,
    setting: &RoomSetting,
    actor: &str,
    target: &str,
) -> ActionOutcome {
    if target == actor {
        match setting.witch_rule {
            WitchRule::NoSelfRescue => {
                return ActionOutcome::Rejected("you cannot save yourself".into());
            }
            WitchRule::SelfRescueFirstNightOnly if st.round != 1 => {
                return ActionOutcome::Rejected(
                    "you may only save yourself on the first night".into(),
                );
            }
            _ => {}
        }
    }
    if !st.player(actor).is_some_and(Player::witch_has_heal) {
        return ActionOutcome::Rejected("no heal potion left".into());
    }
    let Some(p) = st.player_mut(target) else {
        return no_such_player(target);
    };
    p.status = Some(PlayerStatus::PendingHeal);
    spend_witch_heal(st, actor);
    ActionOutcome::Accepted
}

fn witch_poison(st: &mut RoomState, actor: &str, target: &str) -> ActionOutcome {
    if !st.player(actor).is_some_and(Player::witch_has_poison) {
        return ActionOutcome::Rejected("no poison left".into());
    }
    let Some(p) = st.player_mut(target) else {
        return no_such_player(target);
    };
    p.status = Some(PlayerStatus::PendingPoison);
    if let Some(w) = st.player_mut(actor) {
        if let Some(RoleCaps::Witch { poison, .. }) = &mut w.caps {
            *poison = false;
        }
    }
    ActionOutcome::Accepted
}

fn spend_witch_heal(st: &mut RoomState, actor: &str) {
    if let Some(w) = st.player_mut(actor) {
        if let Some(RoleCaps::Witch { heal, .. }) = &mut w.caps {
            *heal = false;
        }
    }
}

fn guard_protect(
    st: &mut RoomState,
    setting: &RoomSetting,
    actor: &str,
    target: &str,
) -> ActionOutcome {
    if st
        .player(actor)
        .is_some_and(|p| p.last_protect() == Some(target))
    {
        return ActionOutcome::Rejected(
            "you cannot protect the same player two nights running".into(),
        );
    }
    let Some(p) = st.player_mut(target) else {
        return no_such_player(target);
    };
    match p.status {
        // Protect and heal cancel out under the conflict rule.
        Some(PlayerStatus::PendingHeal) if setting.guard_rule == GuardRule::MedConflict => {
            p.status = Some(PlayerStatus::PendingDead);
        }
        // The guard cannot counter the witch's poison.
        Some(PlayerStatus::PendingPoison) => {}
        _ => p.status = Some(PlayerStatus::PendingGuard),
    }
    if let Some(g) = st.player_mut(actor) {
        if let Some(RoleCaps::Guard { last_protect }) = &mut g.caps {
            *last_protect = Some(target.to_string());
        }
    }
    ActionOutcome::Accepted
}

fn hunter_gun_status(st: &mut RoomState, actor: &str) -> ActionOutcome {
    let poisoned = st
        .player(actor)
        .is_some_and(|p| p.status == Some(PlayerStatus::PendingPoison));
    let text = if poisoned {
        "you are poisoned and cannot fire your gun"
    } else {
        "your gun is ready: if you go down tonight you may fire"
    };
    st.send_private(actor, text);
    ActionOutcome::Accepted
}
