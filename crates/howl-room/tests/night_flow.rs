//! Integration tests for the night coordinator and the gate protocol.
//!
//! All tests run under a paused tokio clock, so the human-facing pacing
//! delays auto-advance and the tests finish in milliseconds.

use std::time::Duration;

use howl_protocol::{GameStage, Role, RoomId, RoomSetting};
use howl_room::{ActionOutcome, PlayerAction, PlayerReceiver, PlayerSender, Room, RoomConfig};
use tokio::sync::mpsc;

// =========================================================================
// Helpers
// =========================================================================

fn sender() -> PlayerSender {
    mpsc::unbounded_channel().0
}

/// Creates a room and fills every seat with players p0..pN. Returns the
/// per-player receivers keyed by join order.
async fn filled_room(setting: RoomSetting) -> (Room, Vec<PlayerReceiver>) {
    let room = Room::new(RoomId(1), setting, RoomConfig::default());
    let mut receivers = Vec::new();
    for i in 0..room.required_players() {
        let (tx, rx) = mpsc::unbounded_channel();
        room.add_player(&format!("p{i}"), tx).await.unwrap();
        receivers.push(rx);
    }
    (room, receivers)
}

async fn wait_for_stage(room: &Room, stage: GameStage) {
    for _ in 0..10_000 {
        if room.overview().await.stage == Some(stage) {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("room never reached stage {stage:?}");
}

/// Finds the nick of the first member holding the given role.
async fn find_role(room: &Room, role: Role) -> String {
    for i in 0..room.required_players() {
        let nick = format!("p{i}");
        if let Some(view) = room.player_view(&nick).await {
            if view.role == Some(role) {
                return nick;
            }
        }
    }
    panic!("no member holds {role:?}");
}

async fn broadcast_log_contains(room: &Room, needle: &str) -> bool {
    let (_, entries) = room.log_since(0).await;
    entries
        .iter()
        .any(|e| e.text().is_some_and(|t| t.contains(needle)))
}

/// Drains a player's private channel until an entry containing `needle`
/// shows up, or gives up.
async fn received(rx: &mut PlayerReceiver, needle: &str) -> bool {
    for _ in 0..1_000 {
        while let Ok(entry) = rx.try_recv() {
            if entry.text().is_some_and(|t| t.contains(needle)) {
                return true;
            }
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    false
}

fn with_gods(wolves: usize, citizens: usize, gods: &[Role]) -> RoomSetting {
    RoomSetting {
        wolves,
        citizens,
        god_citizens: gods.to_vec(),
        ..RoomSetting::default()
    }
}

// =========================================================================
// The no-god baseline scenario
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_no_god_game_wolf_kill_goes_straight_to_day() {
    // 3 wolves vs 4 citizens, no god roles configured.
    let (room, _rx) = filled_room(RoomSetting::default()).await;
    room.start().await.unwrap();

    wait_for_stage(&room, GameStage::Wolf).await;
    assert_eq!(room.overview().await.round, 1);

    let wolves = room.wolf_players().await;
    assert_eq!(wolves.len(), 3);
    let victim = {
        // Any non-wolf member.
        let alive = room.alive_players().await;
        alive.into_iter().find(|n| !wolves.contains(n)).unwrap()
    };

    let outcome = room
        .submit(&wolves[0], PlayerAction::WolfKill { target: victim.clone() })
        .await;
    assert_eq!(outcome, Some(ActionOutcome::Accepted));

    // No god sub-phase opens: evaluation runs right after the wolves.
    wait_for_stage(&room, GameStage::Day).await;
    assert!(room.overview().await.started);
    assert_eq!(room.dead_players().await, vec![victim.clone()]);
    assert!(broadcast_log_contains(&room, &format!("last night {victim} left the game")).await);
}

#[tokio::test(start_paused = true)]
async fn test_skip_closes_the_gate_without_a_kill() {
    let (room, _rx) = filled_room(RoomSetting::default()).await;
    room.start().await.unwrap();

    wait_for_stage(&room, GameStage::Wolf).await;
    let wolves = room.wolf_players().await;
    let outcome = room.submit(&wolves[0], PlayerAction::Skip).await;
    assert_eq!(outcome, Some(ActionOutcome::Accepted));

    wait_for_stage(&room, GameStage::Day).await;
    assert!(room.dead_players().await.is_empty());
    assert!(broadcast_log_contains(&room, "last night nobody left the game").await);
}

// =========================================================================
// Gate semantics
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_first_valid_action_closes_the_gate() {
    let (room, _rx) = filled_room(with_gods(2, 3, &[])).await;
    room.start().await.unwrap();

    wait_for_stage(&room, GameStage::Wolf).await;
    let wolves = room.wolf_players().await;
    assert_eq!(wolves.len(), 2);
    let alive = room.alive_players().await;
    let mut citizens = alive.iter().filter(|n| !wolves.contains(n));
    let first_target = citizens.next().unwrap().clone();
    let second_target = citizens.next().unwrap().clone();

    let first = room
        .submit(&wolves[0], PlayerAction::WolfKill { target: first_target.clone() })
        .await;
    assert_eq!(first, Some(ActionOutcome::Accepted));

    // The packmate's submission arrives after the gate closed: dropped
    // silently, no reconciliation.
    let second = room
        .submit(&wolves[1], PlayerAction::WolfKill { target: second_target.clone() })
        .await;
    assert_eq!(second, None);

    wait_for_stage(&room, GameStage::Day).await;
    assert_eq!(room.dead_players().await, vec![first_target]);
}

#[tokio::test(start_paused = true)]
async fn test_ineligible_actor_is_dropped_silently() {
    let (room, _rx) = filled_room(RoomSetting::default()).await;
    room.start().await.unwrap();

    wait_for_stage(&room, GameStage::Wolf).await;
    let wolves = room.wolf_players().await;
    let citizen = room
        .alive_players()
        .await
        .into_iter()
        .find(|n| !wolves.contains(n))
        .unwrap();

    // A citizen poking at the wolves' gate: no effect, no reply.
    let outcome = room
        .submit(&citizen, PlayerAction::WolfKill { target: wolves[0].clone() })
        .await;
    assert_eq!(outcome, None);
    assert_eq!(room.overview().await.stage, Some(GameStage::Wolf));
    assert!(room.dead_players().await.is_empty());
}

// =========================================================================
// Sub-phase sequencing
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_detective_phase_follows_the_wolves() {
    let (room, mut receivers) = filled_room(with_gods(1, 1, &[Role::Detective])).await;
    room.start().await.unwrap();

    wait_for_stage(&room, GameStage::Wolf).await;
    let wolf = find_role(&room, Role::Wolf).await;
    room.submit(&wolf, PlayerAction::Skip).await.unwrap();

    wait_for_stage(&room, GameStage::Detective).await;
    let detective = find_role(&room, Role::Detective).await;
    let outcome = room
        .submit(&detective, PlayerAction::DetectiveReveal { target: wolf.clone() })
        .await;
    assert_eq!(outcome, Some(ActionOutcome::Accepted));

    wait_for_stage(&room, GameStage::Day).await;

    // The reveal reached the detective privately.
    let idx: usize = detective.trim_start_matches('p').parse().unwrap();
    assert!(received(&mut receivers[idx], "is the werewolf").await);
}

#[tokio::test(start_paused = true)]
async fn test_unconfigured_phases_are_skipped_entirely() {
    // Witch configured, detective/guard/hunter absent: after the wolves the
    // very next gate belongs to the witch.
    let (room, mut receivers) = filled_room(with_gods(1, 2, &[Role::Witch])).await;
    room.start().await.unwrap();

    wait_for_stage(&room, GameStage::Wolf).await;
    let wolf = find_role(&room, Role::Wolf).await;
    let witch = find_role(&room, Role::Witch).await;
    let victim = room
        .alive_players()
        .await
        .into_iter()
        .find(|n| *n != wolf && *n != witch)
        .unwrap();
    room.submit(&wolf, PlayerAction::WolfKill { target: victim.clone() })
        .await
        .unwrap();

    wait_for_stage(&room, GameStage::Witch).await;

    // The witch is briefed on tonight's victim before she chooses.
    let idx: usize = witch.trim_start_matches('p').parse().unwrap();
    assert!(received(&mut receivers[idx], &format!("victim is {victim}")).await);

    let outcome = room
        .submit(&witch, PlayerAction::WitchHeal { target: victim.clone() })
        .await;
    assert_eq!(outcome, Some(ActionOutcome::Accepted));

    wait_for_stage(&room, GameStage::Day).await;
    assert!(room.dead_players().await.is_empty());
    assert!(broadcast_log_contains(&room, "nobody left the game").await);
}

#[tokio::test(start_paused = true)]
async fn test_round_increments_each_night() {
    let (room, _rx) = filled_room(with_gods(1, 2, &[])).await;
    room.start().await.unwrap();

    wait_for_stage(&room, GameStage::Wolf).await;
    assert_eq!(room.overview().await.round, 1);
    let wolf = find_role(&room, Role::Wolf).await;
    room.submit(&wolf, PlayerAction::Skip).await.unwrap();

    wait_for_stage(&room, GameStage::Day).await;
    // Vote out a citizen: one citizen remains, the game goes on.
    let citizen = room
        .alive_players()
        .await
        .into_iter()
        .find(|n| *n != wolf)
        .unwrap();
    room.vote_kill(&citizen).await.unwrap();

    wait_for_stage(&room, GameStage::Wolf).await;
    assert_eq!(room.overview().await.round, 2);
}

// =========================================================================
// Stop behavior
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_force_stop_returns_the_room_to_lobby() {
    let (room, _rx) = filled_room(RoomSetting::default()).await;
    room.start().await.unwrap();
    wait_for_stage(&room, GameStage::Wolf).await;

    room.force_stop("host called it off").await;

    let overview = room.overview().await;
    assert!(!overview.started);
    assert_eq!(overview.round, 0);
    assert_eq!(overview.stage, None);
    assert!(broadcast_log_contains(&room, "host called it off").await);
    // Roles are cleared back to lobby state.
    let view = room.player_view("p0").await.unwrap();
    assert_eq!(view.role, None);
    assert_eq!(view.status, None);
}

#[tokio::test(start_paused = true)]
async fn test_room_can_start_again_after_a_stop() {
    let (room, _rx) = filled_room(RoomSetting::default()).await;
    room.start().await.unwrap();
    wait_for_stage(&room, GameStage::Wolf).await;
    room.force_stop("host called it off").await;

    // The old coordinator exits cooperatively; retry until it has.
    let mut restarted = false;
    for _ in 0..1_000 {
        tokio::time::sleep(Duration::from_millis(10)).await;
        if room.start().await.is_ok() {
            restarted = true;
            break;
        }
    }
    assert!(restarted, "room should accept a fresh start after stopping");

    wait_for_stage(&room, GameStage::Wolf).await;
    assert_eq!(room.overview().await.round, 1);
}

#[tokio::test(start_paused = true)]
async fn test_actions_after_stop_are_dropped() {
    let (room, _rx) = filled_room(RoomSetting::default()).await;
    room.start().await.unwrap();
    wait_for_stage(&room, GameStage::Wolf).await;
    let wolves = room.wolf_players().await;

    room.force_stop("host called it off").await;

    let outcome = room
        .submit(&wolves[0], PlayerAction::WolfKill { target: "p0".into() })
        .await;
    assert_eq!(outcome, None);
}
