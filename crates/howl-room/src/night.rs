//! The night coordinator: one task per running game.
//!
//! Drives the fixed sub-phase sequence WOLF → DETECTIVE → WITCH → GUARD →
//! HUNTER, skipping phases whose role is not configured, then evaluates the
//! night and (when a wolf-slain hunter is owed a shot) runs the retaliation
//! gate before handing the room to the day vote.
//!
//! The coordinator is the only writer of `stage` and `round` outside the
//! action guard's gate close. Stopping is cooperative: every lock scope
//! checks `started` and bails, and a stop wakes the gate, so the task exits
//! within one pacing sleep of the stop.

use howl_protocol::{ControlSignal, GameStage, PlayerStatus, Role};
use tokio::time::sleep;

use crate::room::{Room, RoomState};

const NIGHT_ORDER: [GameStage; 5] = [
    GameStage::Wolf,
    GameStage::Detective,
    GameStage::Witch,
    GameStage::Guard,
    GameStage::Hunter,
];

pub(crate) async fn run(room: Room, fresh: bool) {
    if fresh {
        // Give players time to read their private role assignment.
        sleep(room.config().deal_delay).await;
    }
    let pacing = room.config().phase_pacing;

    {
        let mut st = room.state().lock().await;
        if !st.started {
            return;
        }
        st.round += 1;
        st.broadcast("night falls, everyone close your eyes");
        tracing::debug!(room_id = %room.id(), round = st.round, "night begins");
    }
    sleep(pacing).await;

    for stage in NIGHT_ORDER {
        let opened = {
            let mut st = room.state().lock().await;
            if !st.started {
                return;
            }
            // The wolf phase always runs; a phase for an absent role is
            // skipped outright: no gate, no delay.
            let configured = stage == GameStage::Wolf
                || stage
                    .eligible_roles()
                    .iter()
                    .any(|role| st.roles.contains(role));
            if configured {
                st.stage = Some(stage);
                st.broadcast(open_line(stage));
                if stage == GameStage::Witch {
                    brief_witches(&mut st);
                }
                st.waiting = true;
            }
            configured
        };
        if !opened {
            continue;
        }

        wait_gate(&room).await;

        {
            let mut st = room.state().lock().await;
            st.push_control(ControlSignal::DismissPrompt);
            if !st.started {
                return;
            }
            st.broadcast(close_line(stage));
        }
        sleep(pacing).await;
    }

    // Night is over: collapse pendings, check the win rule, open the day.
    let shot_pending = {
        let mut st = room.state().lock().await;
        if !st.started {
            return;
        }
        st.evaluate(false);
        let armed = if st.started { st.armed_hunter.take() } else { None };
        match armed {
            Some(hunter) => {
                st.stage = Some(GameStage::HunterShoot);
                st.broadcast(format!(
                    "{hunter} was a hunter and may take one player down. Host, resolve the shot"
                ));
                st.waiting = true;
                true
            }
            None => false,
        }
    };
    if !shot_pending {
        return;
    }

    wait_gate(&room).await;

    let mut st = room.state().lock().await;
    st.push_control(ControlSignal::DismissPrompt);
    if st.started {
        // Back to the day so the vote can proceed.
        st.stage = Some(GameStage::Day);
    }
}

/// Blocks until the gate closes (an accepted action or a stop).
async fn wait_gate(room: &Room) {
    loop {
        let gate = room.inner.gate.notified();
        tokio::pin!(gate);
        gate.as_mut().enable();
        {
            let st = room.state().lock().await;
            if !st.waiting || !st.started {
                return;
            }
        }
        gate.await;
    }
}

/// Tells each living witch who the wolves marked tonight, or that her heal
/// potion is gone.
fn brief_witches(st: &mut RoomState) {
    let victims: Vec<String> = st
        .players
        .iter()
        .filter(|p| p.status == Some(PlayerStatus::PendingDead))
        .map(|p| p.nick.clone())
        .collect();
    let witches: Vec<(String, bool)> = st
        .players
        .iter()
        .filter(|p| p.role == Some(Role::Witch) && p.status != Some(PlayerStatus::Dead))
        .map(|p| (p.nick.clone(), p.witch_has_heal()))
        .collect();

    for (nick, has_heal) in witches {
        if has_heal {
            let line = if victims.is_empty() {
                "nobody was attacked tonight".to_string()
            } else {
                format!("tonight the wolves' victim is {}", victims.join(", "))
            };
            st.send_private(&nick, line);
        } else {
            st.send_private(&nick, "you have no heal potion left");
        }
    }
}

fn open_line(stage: GameStage) -> &'static str {
    match stage {
        GameStage::Wolf => "wolves, open your eyes",
        GameStage::Detective => "detective, open your eyes",
        GameStage::Witch => "witch, open your eyes",
        GameStage::Guard => "guard, open your eyes",
        GameStage::Hunter => "hunter, open your eyes",
        GameStage::Day => "day breaks",
        GameStage::HunterShoot => "host, resolve the hunter's shot",
    }
}

fn close_line(stage: GameStage) -> &'static str {
    match stage {
        GameStage::Wolf => "wolves, close your eyes",
        GameStage::Detective => "detective, close your eyes",
        GameStage::Witch => "witch, close your eyes",
        GameStage::Guard => "guard, close your eyes",
        GameStage::Hunter => "hunter, close your eyes",
        GameStage::Day => "night falls",
        GameStage::HunterShoot => "the shot is resolved",
    }
}
