//! UDP ingress for remote admin tooling. Grounded on
//! `RemoteCommanderServer`: bind one socket, decode each datagram as a
//! single command line, hand it off. Every command arriving on this
//! channel is admin-qualified — there is no user-level remote access and
//! no response channel back to the sender.

use std::io;
use std::net::Ipv4Addr;

use tokio::net::UdpSocket;
use tracing::{info, warn};

use crate::controller::Controller;

pub async fn run(controller: Controller, port: u16) -> io::Result<()> {
    let socket = UdpSocket::bind((Ipv4Addr::LOCALHOST, port)).await?;
    info!(port, "remote commander listening");
    let mut buf = [0u8; 4096];
    loop {
        let (len, sender) = socket.recv_from(&mut buf).await?;
        let line = String::from_utf8_lossy(&buf[..len]).trim().to_string();
        if let Err(reason) = handle_line(&controller, &line).await {
            warn!(%sender, line, reason, "dropping remote command");
        }
    }
}

async fn handle_line(controller: &Controller, line: &str) -> Result<(), &'static str> {
    let Some(rest) = line.strip_prefix('@') else {
        return Err("line does not start with '@'");
    };
    let mut tokens = rest.split_whitespace();
    let player = tokens.next().ok_or("missing player name")?;
    let command = tokens.next().ok_or("missing command")?;
    if !controller.does_player_exist(player).await {
        return Err("unknown player");
    }
    let args: Vec<String> = tokens.map(str::to_string).collect();
    controller.handle_admin_action(player, command, args).await;
    Ok(())
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
    async fn unknown_player_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let sink: Arc<dyn crate::frontend::ResponseSink> = Arc::new(RecordingSink::new());
        let controller = Controller::new(test_config(), dir.path(), sink);
        assert_eq!(handle_line(&controller, "@alice started").await, Err("unknown player"));
    }

    #[tokio::test]
    async fn known_player_dispatches_as_admin() {
        let dir = tempfile::tempdir().unwrap();
        let sink: Arc<dyn crate::frontend::ResponseSink> = Arc::new(RecordingSink::new());
        let controller = Controller::new(test_config(), dir.path(), sink);
        controller.add_active_player("alice").await;
        assert!(handle_line(&controller, "@alice started").await.is_ok());
    }

    #[tokio::test]
    async fn malformed_line_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let sink: Arc<dyn crate::frontend::ResponseSink> = Arc::new(RecordingSink::new());
        let controller = Controller::new(test_config(), dir.path(), sink);
        assert!(handle_line(&controller, "started").await.is_err());
    }
}
