//! Orchestrates every player's state machine: the active-player set, the
//! shared event timer, weighted player selection with a selection penalty,
//! and per-player JSON persistence. Grounded on the teacher's split between
//! a cheaply-clonable handle (`Arc`-backed fields, as in `engine/server.rs`'s
//! `GameServer`) and the background task it drives (`queue.rs`'s
//! `spawn_queue_worker` loop).
//!
//! Response-line prefixing (`@{player}: `) happens here, not in
//! `StateMachine::on_action` — the state machine doesn't know it's talking
//! to a multi-player chat surface at all.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::engine::commands::{self, StateMachineAction};
use crate::engine::config::GameConfig;
use crate::engine::context::RESPONSE_LINE_BREAK;
use crate::engine::state_machine::StateMachine;
use crate::frontend::{self, ResponseSink};

struct ControllerState {
    players: HashMap<String, StateMachine>,
    active: HashSet<String>,
    selection_rng: StdRng,
    player_locks: HashMap<String, Arc<Mutex<()>>>,
}

/// The multi-player orchestrator. Cheaply cloneable — every clone shares the
/// same locked state and the same event timer.
#[derive(Clone)]
pub struct Controller {
    state: Arc<Mutex<ControllerState>>,
    config: Arc<GameConfig>,
    state_files_directory: PathBuf,
    sink: Arc<dyn ResponseSink>,
    timer_handle: Arc<std::sync::Mutex<Option<JoinHandle<()>>>>,
}

impl Controller {
    /// Loads every `*.json` file in `state_files_directory` as a registered
    /// (but inactive) player, matching the reference controller's startup
    /// scan. Non-json files are skipped, not errors.
    pub fn new(
        config: Arc<GameConfig>,
        state_files_directory: impl Into<PathBuf>,
        sink: Arc<dyn ResponseSink>,
    ) -> Self {
        let state_files_directory = state_files_directory.into();
        let players = Self::load_state_files(&config, &state_files_directory);
        Controller {
            state: Arc::new(Mutex::new(ControllerState {
                players,
                active: HashSet::new(),
                selection_rng: StdRng::from_entropy(),
                player_locks: HashMap::new(),
            })),
            config,
            state_files_directory,
            sink,
            timer_handle: Arc::new(std::sync::Mutex::new(None)),
        }
    }

    fn load_state_files(
        config: &Arc<GameConfig>,
        dir: &std::path::Path,
    ) -> HashMap<String, StateMachine> {
        let mut players = HashMap::new();
        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(err) => {
                warn!(dir = %dir.display(), error = %err, "could not read state files directory");
                return players;
            }
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if !path.is_file() || path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                debug!(path = %path.display(), "skipping non-json entry in state directory");
                continue;
            }
            let Some(player_name) = path.file_stem().and_then(|stem| stem.to_str()) else {
                continue;
            };
            match std::fs::read_to_string(&path) {
                Ok(contents) => match StateMachine::load(config.clone(), &contents) {
                    Ok(state_machine) => {
                        info!(player = player_name, "loaded saved state");
                        players.insert(player_name.to_string(), state_machine);
                    }
                    Err(err) => {
                        error!(player = player_name, error = %err, "failed to parse saved state");
                    }
                },
                Err(err) => error!(path = %path.display(), error = %err, "failed to read state file"),
            }
        }
        players
    }

    pub async fn does_player_exist(&self, player: &str) -> bool {
        self.state.lock().await.players.contains_key(player)
    }

    /// Idempotent. Creates a state machine on first appearance; if this is
    /// the first player to become active at all, fires an immediate event
    /// tick and starts the recurring timer.
    pub async fn add_active_player(&self, player: &str) {
        let is_first_active_player = {
            let mut state = self.state.lock().await;
            if state.active.contains(player) {
                return;
            }
            let was_any_active = !state.active.is_empty();
            state.active.insert(player.to_string());
            state
                .players
                .entry(player.to_string())
                .or_insert_with(|| StateMachine::new(self.config.clone(), player.to_string()));
            !was_any_active
        };
        if is_first_active_player {
            info!("first player became active, starting event timer");
            self.tick_event_timer().await;
            self.ensure_timer_running();
        }
    }

    /// Idempotent. Cancels the event timer once the active set empties.
    pub async fn remove_active_player(&self, player: &str) {
        let now_empty = {
            let mut state = self.state.lock().await;
            if !state.active.remove(player) {
                return;
            }
            state.active.is_empty()
        };
        if now_empty {
            info!("all players became inactive, stopping event timer");
            self.cancel_timer();
        }
    }

    pub async fn handle_user_action(&self, player: &str, command: &str, args: Vec<String>) {
        self.dispatch(player, StateMachineAction::user(command, args)).await;
    }

    pub async fn handle_admin_action(&self, player: &str, command: &str, args: Vec<String>) {
        self.dispatch(player, StateMachineAction::admin(command, args)).await;
    }

    async fn dispatch(&self, player: &str, action: StateMachineAction) {
        self.add_active_player(player).await;
        let lock = self.player_lock(player).await;
        let _guard = lock.lock().await;
        let responses = self.dispatch_raw(player, action).await;
        self.finish_dispatch(player, responses).await;
    }

    async fn dispatch_raw(&self, player: &str, action: StateMachineAction) -> Vec<String> {
        let mut state = self.state.lock().await;
        match state.players.get_mut(player) {
            Some(state_machine) => state_machine.on_action(action),
            None => {
                error!(player, "action dispatched for an unregistered player");
                Vec::new()
            }
        }
    }

    /// Sends responses, restarts on game-over, and persists. Must run under
    /// the caller's per-player lock so a restart's own save can't interleave
    /// with a subsequent action's.
    fn finish_dispatch<'a>(
        &'a self,
        player: &'a str,
        responses: Vec<String>,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = ()> + Send + 'a>> {
        Box::pin(async move {
            if !responses.is_empty() {
                self.send_response(player, &responses).await;
            }
            let finished = {
                let state = self.state.lock().await;
                state.players.get(player).map(|sm| sm.is_finished()).unwrap_or(false)
            };
            if finished {
                let restart_responses = self
                    .dispatch_raw(player, StateMachineAction::admin(commands::RESTART, Vec::new()))
                    .await;
                self.finish_dispatch(player, restart_responses).await;
                return;
            }
            self.save_player_state(player).await;
        })
    }

    async fn player_lock(&self, player: &str) -> Arc<Mutex<()>> {
        self.state
            .lock()
            .await
            .player_locks
            .entry(player.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    async fn send_response(&self, player: &str, responses: &[String]) {
        for group in group_responses(responses) {
            let line = format!("@{player}: {group}");
            if !self.sink.send(&line) {
                frontend::log_undelivered(&line);
            }
        }
    }

    async fn save_player_state(&self, player: &str) {
        let saved = {
            let state = self.state.lock().await;
            match state.players.get(player) {
                Some(state_machine) => match state_machine.save() {
                    Ok(json) => json,
                    Err(err) => {
                        error!(player, error = %err, "failed to serialize state");
                        return;
                    }
                },
                None => return,
            }
        };
        let path = self.player_state_file_path(player);
        let tmp_path = PathBuf::from(format!("{}.tmp", path.display()));
        let write_result = tokio::task::spawn_blocking(move || {
            std::fs::write(&tmp_path, saved)?;
            std::fs::rename(&tmp_path, &path)
        })
        .await;
        match write_result {
            Ok(Ok(())) => debug!(player, "saved state"),
            Ok(Err(err)) => error!(player, error = %err, "failed to write state file"),
            Err(err) => error!(player, error = %err, "state save task panicked"),
        }
    }

    fn player_state_file_path(&self, player: &str) -> PathBuf {
        self.state_files_directory.join(format!("{player}.json"))
    }

    fn ensure_timer_running(&self) {
        let mut handle = self.timer_handle.lock().expect("timer handle mutex poisoned");
        if handle.as_ref().is_some_and(|h| !h.is_finished()) {
            return;
        }
        let controller = self.clone();
        let interval = Duration::from_secs(self.config.timers.event_interval_secs);
        *handle = Some(tokio::spawn(async move {
            loop {
                tokio::time::sleep(interval).await;
                controller.tick_event_timer().await;
            }
        }));
    }

    fn cancel_timer(&self) {
        if let Some(handle) = self
            .timer_handle
            .lock()
            .expect("timer handle mutex poisoned")
            .take()
        {
            handle.abort();
        }
    }

    /// One event-timer expiry: pick an eligible player and push them
    /// forward, then re-arm their selection penalty. A no-op if nobody is
    /// active or eligible.
    async fn tick_event_timer(&self) {
        let Some(player) = self.select_player_for_event().await else {
            debug!("event tick: no eligible players");
            return;
        };
        let is_started = {
            let state = self.state.lock().await;
            state.players.get(&player).map(|sm| sm.is_started()).unwrap_or(false)
        };
        // Chosen player receives `started` if not started, else
        // `generate_event`; both as admin actions dispatched the ordinary
        // way, so nothing here bypasses the ordinary transition table.
        let command = if is_started {
            commands::GENERATE_EVENT
        } else {
            commands::STARTED
        };
        Box::pin(self.dispatch(&player, StateMachineAction::admin(command, Vec::new()))).await;
        let mut state = self.state.lock().await;
        if let Some(state_machine) = state.players.get_mut(&player) {
            state_machine.set_event_selection_penalty(self.config.timers.event_interval_secs as i64);
        }
    }

    /// Eligible players = active and (not started, or waiting for event).
    /// Weight = `with_penalty`/`without_penalty` depending on whether the
    /// player currently carries an event-selection penalty.
    async fn select_player_for_event(&self) -> Option<String> {
        let mut state = self.state.lock().await;
        let ControllerState {
            players,
            active,
            selection_rng,
            ..
        } = &mut *state;
        let weights_config = &self.config.player_selection_weights;
        let eligible: Vec<String> = active
            .iter()
            .filter(|name| {
                players
                    .get(*name)
                    .map(|sm| !sm.is_started() || sm.is_waiting_for_event())
                    .unwrap_or(false)
            })
            .cloned()
            .collect();
        if eligible.is_empty() {
            return None;
        }
        let weights: Vec<u32> = eligible
            .iter()
            .map(|name| {
                let state_machine = players.get_mut(name).expect("eligible player is registered");
                if state_machine.has_event_selection_penalty() {
                    weights_config.without_penalty
                } else {
                    weights_config.with_penalty
                }
            })
            .collect();
        Some(weighted_pick(&eligible, &weights, selection_rng))
    }
}

fn weighted_pick(items: &[String], weights: &[u32], rng: &mut StdRng) -> String {
    use rand::Rng;
    let total: u32 = weights.iter().sum();
    let mut pick = rng.gen_range(0..total.max(1));
    for (item, weight) in items.iter().zip(weights.iter()) {
        if pick < *weight {
            return item.clone();
        }
        pick = pick.saturating_sub(*weight);
    }
    items.last().expect("at least one eligible player").clone()
}

/// Slices a response sequence at `RESPONSE_LINE_BREAK` markers into chat
/// messages, dropping empty groups.
fn group_responses(responses: &[String]) -> Vec<String> {
    let mut groups = Vec::new();
    let mut current = Vec::new();
    for response in responses {
        if response == RESPONSE_LINE_BREAK {
            if !current.is_empty() {
                groups.push(current.join("\n"));
                current = Vec::new();
            }
        } else {
            current.push(response.clone());
        }
    }
    if !current.is_empty() {
        groups.push(current.join("\n"));
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::RecordingSink;

    fn test_config() -> Arc<GameConfig> {
        let json = r#"{
            "probabilities": {"flee": 0.5},
            "experience_per_level": [10, 20, 30],
            "monsters": [
                {"name": "Dunop", "base_hp": 100, "hp_growth": 10, "base_mp": 20, "mp_growth": 2,
                 "base_attack": 15, "attack_growth": 3, "base_defense": 5, "defense_growth": 1,
                 "base_luck": 4, "luck_growth": 1, "base_exp": 10, "exp_growth": 2, "element": "None"}
            ],
            "special_units": {
                "ghosh": {"name": "Ghosh", "base_hp": 500, "hp_growth": 0, "base_mp": 0, "mp_growth": 0,
                          "base_attack": 50, "attack_growth": 0, "base_defense": 50, "defense_growth": 0,
                          "base_luck": 10, "luck_growth": 0, "base_exp": 0, "exp_growth": 0, "element": "None"}
            },
            "floors": [[{"monster": "Dunop", "level": 1, "weight": 1}]],
            "timers": {"event_interval": 30},
            "player_selection_weights": {"with_penalty": 1, "without_penalty": 3},
            "events_weights": {"battle": 1, "character": 0, "elevator": 0, "item": 0, "trap": 0, "familiar": 0},
            "found_items_weights": {"Pita": 1}
        }"#;
        Arc::new(GameConfig::from_json_str(json).expect("fixture config parses"))
    }

    #[tokio::test]
    async fn add_active_player_starts_a_new_player_and_persists_state() {
        let dir = tempfile::tempdir().unwrap();
        let sink: Arc<dyn ResponseSink> = Arc::new(RecordingSink::new());
        let controller = Controller::new(test_config(), dir.path(), sink.clone());

        controller.add_active_player("alice").await;
        // first-active-player tick dispatches `started` immediately.
        assert!(controller.does_player_exist("alice").await);
        assert!(dir.path().join("alice.json").exists());
        controller.cancel_timer();
    }

    #[tokio::test]
    async fn handle_user_action_routes_through_to_the_state_machine_and_saves() {
        let dir = tempfile::tempdir().unwrap();
        let sink: Arc<dyn ResponseSink> = Arc::new(RecordingSink::new());
        let controller = Controller::new(test_config(), dir.path(), sink.clone());

        controller.handle_admin_action("alice", commands::STARTED, Vec::new()).await;
        let saved = std::fs::read_to_string(dir.path().join("alice.json")).unwrap();
        assert!(saved.contains("\"player\":\"alice\""));
        controller.cancel_timer();
    }

    fn skewed_penalty_config() -> Arc<GameConfig> {
        let json = r#"{
            "probabilities": {"flee": 0.5},
            "experience_per_level": [10, 20, 30],
            "monsters": [
                {"name": "Dunop", "base_hp": 100, "hp_growth": 10, "base_mp": 20, "mp_growth": 2,
                 "base_attack": 15, "attack_growth": 3, "base_defense": 5, "defense_growth": 1,
                 "base_luck": 4, "luck_growth": 1, "base_exp": 10, "exp_growth": 2, "element": "None"}
            ],
            "special_units": {
                "ghosh": {"name": "Ghosh", "base_hp": 500, "hp_growth": 0, "base_mp": 0, "mp_growth": 0,
                          "base_attack": 50, "attack_growth": 0, "base_defense": 50, "defense_growth": 0,
                          "base_luck": 10, "luck_growth": 0, "base_exp": 0, "exp_growth": 0, "element": "None"}
            },
            "floors": [[{"monster": "Dunop", "level": 1, "weight": 1}]],
            "timers": {"event_interval": 30},
            "player_selection_weights": {"with_penalty": 1, "without_penalty": 0},
            "events_weights": {"battle": 1, "character": 0, "elevator": 0, "item": 0, "trap": 0, "familiar": 0},
            "found_items_weights": {"Pita": 1}
        }"#;
        Arc::new(GameConfig::from_json_str(json).expect("fixture config parses"))
    }

    /// With `without_penalty` zeroed out, a penalized player can never be
    /// picked over an eligible unpenalized one — the selection weight
    /// mapping is exercised, not just its existence.
    #[tokio::test]
    async fn select_player_for_event_skips_a_penalized_player() {
        let dir = tempfile::tempdir().unwrap();
        let sink: Arc<dyn ResponseSink> = Arc::new(RecordingSink::new());
        let controller = Controller::new(skewed_penalty_config(), dir.path(), sink);

        // First active player: the immediate tick selects and penalizes alice.
        controller.add_active_player("alice").await;
        controller.add_active_player("bob").await;

        assert_eq!(controller.select_player_for_event().await, Some("bob".to_string()));
        controller.cancel_timer();
    }

    #[test]
    fn group_responses_splits_on_line_break_and_drops_empty_groups() {
        let responses = vec![
            "a".to_string(),
            "b".to_string(),
            RESPONSE_LINE_BREAK.to_string(),
            RESPONSE_LINE_BREAK.to_string(),
            "c".to_string(),
        ];
        let groups = group_responses(&responses);
        assert_eq!(groups, vec!["a\nb".to_string(), "c".to_string()]);
    }
}
