//! Local interactive commander: reads whitespace-tokenized lines from
//! standard input and injects them into the `Controller`. Grounded on
//! `Commander`'s read-parse-dispatch loop, extended with the
//! `@player`/`join`/`part`/`exit` vocabulary a multi-player console needs.
//!
//! Console input is blocking, so this runs on its own OS thread rather than
//! inside the tokio runtime, the same split `engine/server.rs` uses for its
//! own blocking game loop. Each parsed line is dispatched back onto the
//! runtime with `Handle::block_on`.

use std::io::{self, BufRead};

use tracing::warn;

use crate::controller::Controller;

pub fn spawn(controller: Controller) -> std::thread::JoinHandle<()> {
    let handle = tokio::runtime::Handle::current();
    std::thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let line = match line {
                Ok(line) => line,
                Err(err) => {
                    warn!(error = %err, "failed to read a line from stdin");
                    break;
                }
            };
            handle.block_on(handle_line(&controller, &line));
        }
    })
}

async fn handle_line(controller: &Controller, line: &str) {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let Some(&first) = tokens.first() else {
        return;
    };
    match first {
        "exit" => std::process::exit(0),
        "join" => match tokens.get(1) {
            Some(player) => controller.add_active_player(player).await,
            None => warn!("join requires a player name"),
        },
        "part" => match tokens.get(1) {
            Some(player) => controller.remove_active_player(player).await,
            None => warn!("part requires a player name"),
        },
        token if token.starts_with('@') => dispatch(controller, token, &tokens[1..]).await,
        _ => warn!(line, "unrecognized command line"),
    }
}

async fn dispatch(controller: &Controller, player_token: &str, rest: &[&str]) {
    let player = &player_token[1..];
    if player.is_empty() {
        warn!("'@' with no player name");
        return;
    }
    let (is_admin, rest) = match rest.first() {
        Some(&"admin") => (true, &rest[1..]),
        _ => (false, rest),
    };
    let Some((&command, args)) = rest.split_first() else {
        warn!(player, "command line missing a command");
        return;
    };
    let args: Vec<String> = args.iter().map(|s| s.to_string()).collect();
    if is_admin {
        controller.handle_admin_action(player, command, args).await;
    } else {
        controller.handle_user_action(player, command, args).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::config::GameConfig;
    use crate::frontend::RecordingSink;
    use std::sync::Arc;

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
    async fn admin_qualifier_routes_to_handle_admin_action() {
        let dir = tempfile::tempdir().unwrap();
        let sink: Arc<dyn crate::frontend::ResponseSink> = Arc::new(RecordingSink::new());
        let controller = Controller::new(test_config(), dir.path(), sink);
        handle_line(&controller, "@alice admin started").await;
        assert!(controller.does_player_exist("alice").await);
    }

    #[tokio::test]
    async fn join_activates_a_player_without_a_command() {
        let dir = tempfile::tempdir().unwrap();
        let sink: Arc<dyn crate::frontend::ResponseSink> = Arc::new(RecordingSink::new());
        let controller = Controller::new(test_config(), dir.path(), sink);
        handle_line(&controller, "join bob").await;
        assert!(controller.does_player_exist("bob").await);
    }
}
