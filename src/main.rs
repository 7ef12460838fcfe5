#![allow(dead_code)]

use std::sync::Arc;

use tower_dungeon::config::AppConfig;
use tower_dungeon::engine::config::GameConfig;
use tower_dungeon::frontend::{self, StdoutSink};
use tower_dungeon::{cli, remote, Controller};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let app_config = AppConfig::load();

    let game_config = GameConfig::from_file(&app_config.game_config_path).unwrap_or_else(|err| {
        panic!(
            "failed to load game config from {}: {err}",
            app_config.game_config_path.display()
        )
    });
    let game_config = Arc::new(game_config);

    if let Err(err) = std::fs::create_dir_all(&app_config.state_files_dir) {
        tracing::warn!(
            dir = %app_config.state_files_dir.display(),
            error = %err,
            "failed to create state files directory"
        );
    }

    let sink: Arc<dyn frontend::ResponseSink> = Arc::new(StdoutSink);
    let controller = Controller::new(
        game_config,
        app_config.state_files_dir.clone(),
        sink,
    );

    if app_config.local_mode {
        tracing::info!("local stdin commander enabled");
        cli::spawn(controller.clone());
    }

    tracing::info!(port = app_config.remote_port, "starting remote commander");
    remote::run(controller, app_config.remote_port)
        .await
        .expect("remote commander failed");
}
