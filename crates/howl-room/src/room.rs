//! The room: membership, the game state machine, and win evaluation.
//!
//! A [`Room`] is a cheap-clone handle over shared state. The state sits
//! behind one async mutex; the per-room night coordinator task and every
//! player-submitted action go through it, which is what serializes gate
//! resolution: the first accepted action closes the gate, later submissions
//! observe the closed gate and are dropped silently.

use std::collections::BTreeMap;
use std::sync::Arc;

use howl_protocol::{
    ControlSignal, Faction, GameStage, LogEntry, PlayerStatus, Role, RoomId, RoomSetting,
};
use rand::seq::SliceRandom;
use serde::Serialize;
use tokio::sync::{Mutex, Notify};

use crate::action::{self, ActionOutcome, PlayerAction};
use crate::log::GameLog;
use crate::night;
use crate::player::{Player, PlayerSender, PlayerView, RoleCaps};
use crate::{RoomConfig, RoomError};

// ---------------------------------------------------------------------------
// Room state
// ---------------------------------------------------------------------------

/// The mutable heart of a room. Only the night coordinator mutates `stage`,
/// `round`, and `waiting` at phase boundaries; player tasks reach the state
/// exclusively through [`Room::submit`] and the host operations.
pub(crate) struct RoomState {
    pub(crate) started: bool,
    /// The configured role multiset. Immutable after creation.
    pub(crate) roles: Vec<Role>,
    /// Shuffle-and-deal copy of `roles`. Restored on every stop, so it is
    /// multiset-equal to `roles` whenever no game is running.
    pub(crate) roles_pool: Vec<Role>,
    /// Members in join order. The first member is the host.
    pub(crate) players: Vec<Player>,
    /// Night counter, 0 while no game is running.
    pub(crate) round: u32,
    pub(crate) stage: Option<GameStage>,
    /// The wait-gate: true while a sub-phase is waiting for one valid action.
    pub(crate) waiting: bool,
    pub(crate) log: GameLog,
    /// Hunter slain by the wolves this night, owed a retaliation shot.
    pub(crate) armed_hunter: Option<String>,
    night_task: Option<tokio::task::JoinHandle<()>>,
    gate: Arc<Notify>,
    log_wake: Arc<Notify>,
}

impl RoomState {
    pub(crate) fn new(
        roles: Vec<Role>,
        config: &RoomConfig,
        gate: Arc<Notify>,
        log_wake: Arc<Notify>,
    ) -> Self {
        Self {
            started: false,
            roles_pool: roles.clone(),
            roles,
            players: Vec::new(),
            round: 0,
            stage: None,
            waiting: false,
            log: GameLog::new(config.log_cap),
            armed_hunter: None,
            night_task: None,
            gate,
            log_wake,
        }
    }

    pub(crate) fn player(&self, nick: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.nick == nick)
    }

    pub(crate) fn player_mut(&mut self, nick: &str) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.nick == nick)
    }

    pub(crate) fn host(&self) -> Option<&Player> {
        self.players.first()
    }

    fn push(&mut self, entry: LogEntry) {
        self.log.push(entry);
        self.log_wake.notify_waiters();
    }

    /// Appends a broadcast visible to the whole room.
    pub(crate) fn broadcast(&mut self, text: impl Into<String>) {
        self.push(LogEntry::Broadcast { text: text.into() });
    }

    /// Appends an entry visible only to `to`.
    pub(crate) fn send_private(&mut self, to: &str, text: impl Into<String>) {
        self.push(LogEntry::Private { to: to.to_string(), text: text.into() });
    }

    pub(crate) fn push_control(&mut self, signal: ControlSignal) {
        self.push(LogEntry::Control(signal));
    }

    /// Closes the wait-gate and wakes the night coordinator.
    pub(crate) fn close_gate(&mut self) {
        self.waiting = false;
        self.stage = None;
        self.gate.notify_one();
    }

    /// Collapses pending statuses, tallies factions, and applies the win
    /// rule. Run once per completed night (`vote_trigger == false`) and
    /// once per resolved vote or hunter shot (`vote_trigger == true`).
    pub(crate) fn evaluate(&mut self, vote_trigger: bool) {
        let mut eliminated: Vec<String> = Vec::new();
        let (mut wolves, mut citizens, mut gods) = (0usize, 0usize, 0usize);
        let mut armed = None;

        for p in &mut self.players {
            match p.status {
                Some(s) if s.counts_as_alive() => {
                    match p.role.map(Role::faction) {
                        Some(Faction::Wolf) => wolves += 1,
                        Some(Faction::Citizen) => citizens += 1,
                        Some(Faction::God) => gods += 1,
                        None => {}
                    }
                    p.status = Some(PlayerStatus::Alive);
                }
                Some(s) if s.is_doomed() => {
                    // Only a wolf kill arms the hunter; poison does not.
                    if s == PlayerStatus::PendingDead && p.role == Some(Role::Hunter) {
                        armed = Some(p.nick.clone());
                    }
                    p.status = Some(PlayerStatus::Dead);
                    eliminated.push(p.nick.clone());
                }
                _ => {}
            }
        }

        let gods_configured = self.roles.iter().any(|r| r.is_god());
        if citizens == 0 || (gods_configured && gods == 0) {
            self.stop_game("the wolves win");
            return;
        }
        if wolves == 0 {
            self.stop_game("the good folk win");
            return;
        }

        if !vote_trigger {
            self.armed_hunter = armed;
            self.stage = Some(GameStage::Day);
            let fallen = if eliminated.is_empty() {
                "nobody".to_string()
            } else {
                eliminated.join(", ")
            };
            self.broadcast(format!("day breaks. Last night {fallen} left the game"));
            self.broadcast("awaiting the town's vote");
        }
    }

    /// Resets the room to its lobby state, announces the outcome, and
    /// reveals every player's final role before clearing it.
    pub(crate) fn stop_game(&mut self, reason: &str) {
        self.started = false;
        self.roles_pool = self.roles.clone();
        self.round = 0;
        self.stage = None;
        self.waiting = false;
        self.armed_hunter = None;

        self.broadcast(format!("game over, {reason}"));
        for i in 0..self.players.len() {
            let line = {
                let p = &self.players[i];
                match (p.role, p.status) {
                    (Some(role), Some(status)) => {
                        format!("{}: {} ({})", p.nick, role, status)
                    }
                    _ => format!("{}: no role assigned", p.nick),
                }
            };
            self.broadcast(line);
            let p = &mut self.players[i];
            p.role = None;
            p.status = None;
            p.caps = None;
        }

        // Wake a coordinator blocked on the gate so it can observe the stop.
        self.gate.notify_one();
    }
}

// ---------------------------------------------------------------------------
// Room handle
// ---------------------------------------------------------------------------

pub(crate) struct RoomInner {
    pub(crate) id: RoomId,
    pub(crate) setting: RoomSetting,
    pub(crate) config: RoomConfig,
    pub(crate) state: Mutex<RoomState>,
    pub(crate) gate: Arc<Notify>,
    log_wake: Arc<Notify>,
}

/// Handle to one game room. Cheap to clone; all clones share the same state.
#[derive(Clone)]
pub struct Room {
    pub(crate) inner: Arc<RoomInner>,
}

impl Room {
    /// Creates a room with the given immutable setting and timing config.
    pub fn new(id: RoomId, setting: RoomSetting, config: RoomConfig) -> Self {
        let gate = Arc::new(Notify::new());
        let log_wake = Arc::new(Notify::new());
        let state = RoomState::new(
            setting.roles(),
            &config,
            Arc::clone(&gate),
            Arc::clone(&log_wake),
        );
        Self {
            inner: Arc::new(RoomInner {
                id,
                setting,
                config,
                state: Mutex::new(state),
                gate,
                log_wake,
            }),
        }
    }

    pub fn id(&self) -> RoomId {
        self.inner.id
    }

    pub fn setting(&self) -> &RoomSetting {
        &self.inner.setting
    }

    pub fn required_players(&self) -> usize {
        self.inner.setting.required_players()
    }

    /// Human-readable room summary: id, headcount, role composition.
    pub fn desc(&self) -> String {
        let mut tally: BTreeMap<Role, usize> = BTreeMap::new();
        for role in self.inner.setting.roles() {
            *tally.entry(role).or_insert(0) += 1;
        }
        let lineup: Vec<String> = tally
            .iter()
            .map(|(role, n)| format!("{n} x {role}"))
            .collect();
        format!(
            "room {}: {} players, {}",
            self.inner.id,
            self.required_players(),
            lineup.join(", ")
        )
    }

    pub(crate) fn state(&self) -> &Mutex<RoomState> {
        &self.inner.state
    }

    pub(crate) fn config(&self) -> &RoomConfig {
        &self.inner.config
    }

    // -- membership ---------------------------------------------------------

    /// Adds a member and starts their log syncer. The first member to join
    /// becomes the host.
    pub async fn add_player(&self, nick: &str, sender: PlayerSender) -> Result<(), RoomError> {
        let mut st = self.inner.state.lock().await;
        if st.player(nick).is_some() {
            return Err(RoomError::AlreadyInRoom(nick.to_string()));
        }
        if st.players.len() >= st.roles.len() {
            return Err(RoomError::RoomFull(self.inner.id));
        }

        let mut player = Player::new(nick, sender.clone());
        // The syncer picks up entries from the join point onward.
        let cursor = st.log.end();
        let task = tokio::spawn(sync_player_log(
            self.clone(),
            nick.to_string(),
            sender,
            cursor,
        ));
        if let Err(err) = player.start_syncer(task) {
            tracing::error!(room_id = %self.inner.id, nick, "log syncer started twice");
            return Err(err);
        }
        st.players.push(player);

        let line = format!(
            "players {}/{}, host is {}",
            st.players.len(),
            st.roles.len(),
            st.host().map(|p| p.nick.clone()).unwrap_or_default(),
        );
        st.broadcast(line);
        tracing::info!(
            room_id = %self.inner.id,
            nick,
            players = st.players.len(),
            "player joined"
        );
        Ok(())
    }

    /// Removes a member and stops their log syncer. Returns `true` when the
    /// room is now empty, so the registry can deregister it.
    pub async fn remove_player(&self, nick: &str) -> Result<bool, RoomError> {
        let mut st = self.inner.state.lock().await;
        let idx = st
            .players
            .iter()
            .position(|p| p.nick == nick)
            .ok_or_else(|| RoomError::NotInRoom(nick.to_string()))?;

        if let Err(err) = st.players[idx].stop_syncer() {
            tracing::error!(room_id = %self.inner.id, nick, "log syncer was not running on leave");
            return Err(err);
        }
        st.players.remove(idx);

        if st.players.is_empty() {
            tracing::info!(room_id = %self.inner.id, nick, "last player left");
            return Ok(true);
        }
        let line = format!(
            "players {}/{}, host is {}",
            st.players.len(),
            st.roles.len(),
            st.host().map(|p| p.nick.clone()).unwrap_or_default(),
        );
        st.broadcast(line);
        tracing::info!(
            room_id = %self.inner.id,
            nick,
            players = st.players.len(),
            "player left"
        );
        Ok(false)
    }

    // -- game lifecycle -----------------------------------------------------

    /// Starts a fresh game, or advances a running one into its next night.
    ///
    /// A fresh start requires every seat taken; it shuffles the role pool,
    /// deals one role per member in join order, and announces each
    /// assignment privately before the first night.
    pub async fn start(&self) -> Result<(), RoomError> {
        let mut st = self.inner.state.lock().await;
        if let Some(task) = &st.night_task {
            if !task.is_finished() {
                tracing::error!(
                    room_id = %self.inner.id,
                    "start requested while a night task is still running"
                );
                return Err(RoomError::NightTaskActive);
            }
        }

        let fresh = !st.started;
        if fresh {
            let (need, have) = (st.roles.len(), st.players.len());
            if have != need {
                st.broadcast("not enough players to start the game");
                return Err(RoomError::InsufficientPlayers { need, have });
            }

            st.started = true;
            st.broadcast("the game begins, check your role");
            st.roles_pool.shuffle(&mut rand::rng());
            for i in 0..st.players.len() {
                let role = st.roles_pool.pop().expect("pool holds one role per seat");
                let nick = {
                    let p = &mut st.players[i];
                    p.role = Some(role);
                    p.status = Some(PlayerStatus::Alive);
                    p.caps = RoleCaps::for_role(role);
                    p.nick.clone()
                };
                st.send_private(&nick, format!("your role is \"{role}\""));
            }
            tracing::info!(
                room_id = %self.inner.id,
                players = st.players.len(),
                "game started, roles dealt"
            );
        }

        st.night_task = Some(tokio::spawn(night::run(self.clone(), fresh)));
        Ok(())
    }

    /// Host-issued force stop. Also invoked internally when a win condition
    /// is met. The blocked coordinator observes it within one pacing sleep.
    pub async fn force_stop(&self, reason: &str) {
        let mut st = self.inner.state.lock().await;
        st.stop_game(reason);
        tracing::info!(room_id = %self.inner.id, reason, "game stopped");
    }

    /// Resolves the day vote: the target dies unconditionally, the win rule
    /// is re-checked, and if the game survives, the next night begins.
    pub async fn vote_kill(&self, target: &str) -> Result<(), RoomError> {
        let mut st = self.inner.state.lock().await;
        if !st.started || st.stage != Some(GameStage::Day) {
            return Err(RoomError::NoVoteOpen);
        }
        let Some(p) = st.player_mut(target) else {
            return Err(RoomError::NotInRoom(target.to_string()));
        };
        p.status = Some(PlayerStatus::Dead);
        st.broadcast(format!("the town has voted {target} out"));
        st.evaluate(true);

        if st.started {
            st.stage = None;
            st.night_task = Some(tokio::spawn(night::run(self.clone(), false)));
        }
        Ok(())
    }

    /// Resolves the slain hunter's retaliation. `Some(target)` eliminates
    /// the target immediately and re-checks the win rule; `None` holds fire.
    /// Either way the gate closes and the day vote proceeds.
    pub async fn hunter_shoot(&self, target: Option<&str>) -> Result<(), RoomError> {
        let mut st = self.inner.state.lock().await;
        if !st.waiting || st.stage != Some(GameStage::HunterShoot) {
            return Err(RoomError::NoShotPending);
        }
        match target {
            Some(t) => {
                let Some(p) = st.player_mut(t) else {
                    return Err(RoomError::NotInRoom(t.to_string()));
                };
                p.status = Some(PlayerStatus::Dead);
                st.broadcast(format!("the hunter's shot takes {t} down"));
                st.evaluate(true);
            }
            None => st.broadcast("the hunter holds fire"),
        }
        st.close_gate();
        Ok(())
    }

    // -- player actions -----------------------------------------------------

    /// Submits a player action against the current gate.
    ///
    /// Returns `None` without touching any state when the gate is closed or
    /// the actor may not act in the current stage. Otherwise the action body
    /// runs: `Accepted` closes the gate (exactly one acceptance per gate
    /// opening; no reconciliation between same-role actors), `Rejected`
    /// leaves the gate open and tells the actor why, so they may retry.
    pub async fn submit(&self, actor: &str, action: PlayerAction) -> Option<ActionOutcome> {
        let mut st = self.inner.state.lock().await;
        if !st.waiting {
            return None;
        }
        let eligible = st
            .player(actor)
            .is_some_and(|p| p.should_act(st.stage));
        if !eligible {
            return None;
        }

        let outcome = action::apply(&mut st, &self.inner.setting, actor, &action);
        match &outcome {
            ActionOutcome::Accepted => {
                tracing::debug!(room_id = %self.inner.id, actor, ?action, "action accepted");
                st.close_gate();
            }
            ActionOutcome::Rejected(reason) => {
                tracing::debug!(room_id = %self.inner.id, actor, ?action, reason = %reason, "action rejected");
                st.send_private(actor, reason.clone());
            }
        }
        Some(outcome)
    }

    // -- read-only queries --------------------------------------------------

    /// Room metadata snapshot for the UI layer's poll.
    pub async fn overview(&self) -> RoomOverview {
        let st = self.inner.state.lock().await;
        RoomOverview {
            id: self.inner.id,
            started: st.started,
            round: st.round,
            stage: st.stage,
            player_count: st.players.len(),
            required_players: st.roles.len(),
            host: st.host().map(|p| p.nick.clone()),
        }
    }

    /// Snapshot of one member, or `None` if they are not in the room.
    pub async fn player_view(&self, nick: &str) -> Option<PlayerView> {
        let st = self.inner.state.lock().await;
        st.player(nick).map(|p| PlayerView {
            nick: p.nick.clone(),
            role: p.role,
            status: p.status,
            should_act: p.should_act(st.stage),
        })
    }

    /// Members not yet out, in join order. Includes pending-elimination
    /// players: they are not out until evaluation says so.
    pub async fn alive_players(&self) -> Vec<String> {
        let st = self.inner.state.lock().await;
        st.players
            .iter()
            .filter(|p| p.status != Some(PlayerStatus::Dead))
            .map(|p| p.nick.clone())
            .collect()
    }

    /// Members who are out.
    pub async fn dead_players(&self) -> Vec<String> {
        let st = self.inner.state.lock().await;
        st.players
            .iter()
            .filter(|p| p.status == Some(PlayerStatus::Dead))
            .map(|p| p.nick.clone())
            .collect()
    }

    /// Members holding a wolf-faction role, for in-faction display.
    pub async fn wolf_players(&self) -> Vec<String> {
        let st = self.inner.state.lock().await;
        st.players
            .iter()
            .filter(|p| p.role.is_some_and(|r| r.faction() == Faction::Wolf))
            .map(|p| p.nick.clone())
            .collect()
    }

    /// Members currently marked for elimination by the wolves.
    pub async fn pending_kills(&self) -> Vec<String> {
        let st = self.inner.state.lock().await;
        st.players
            .iter()
            .filter(|p| p.status == Some(PlayerStatus::PendingDead))
            .map(|p| p.nick.clone())
            .collect()
    }

    pub async fn is_full(&self) -> bool {
        let st = self.inner.state.lock().await;
        st.players.len() >= st.roles.len()
    }

    pub async fn host(&self) -> Option<String> {
        let st = self.inner.state.lock().await;
        st.host().map(|p| p.nick.clone())
    }

    /// Log entries at or after `from` and the offset to resume from, for
    /// transports that render the log themselves rather than consuming the
    /// per-player channel.
    pub async fn log_since(&self, from: u64) -> (u64, Vec<LogEntry>) {
        let st = self.inner.state.lock().await;
        let (next, entries) = st.log.since(from);
        (next, entries.to_vec())
    }
}

/// Room metadata snapshot (not the per-player state).
#[derive(Debug, Clone, Serialize)]
pub struct RoomOverview {
    pub id: RoomId,
    pub started: bool,
    pub round: u32,
    pub stage: Option<GameStage>,
    pub player_count: usize,
    pub required_players: usize,
    pub host: Option<String>,
}

// ---------------------------------------------------------------------------
// Log syncer
// ---------------------------------------------------------------------------

/// Forwards log entries visible to one player into their private channel.
///
/// One task per member, started on join and aborted on leave. Event-driven:
/// it sleeps on the room's log-wake signal rather than polling.
async fn sync_player_log(room: Room, nick: String, sender: PlayerSender, mut cursor: u64) {
    loop {
        let wake = room.inner.log_wake.notified();
        tokio::pin!(wake);
        wake.as_mut().enable();

        let batch: Vec<LogEntry> = {
            let st = room.inner.state.lock().await;
            let (next, entries) = st.log.since(cursor);
            cursor = next;
            entries
                .iter()
                .filter(|e| e.visible_to(&nick))
                .cloned()
                .collect()
        };
        for entry in batch {
            if sender.send(entry).is_err() {
                // Receiver dropped: the transport let go of this player.
                return;
            }
        }

        wake.await;
    }
}
