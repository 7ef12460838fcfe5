// Process-level configuration, loaded from environment variables and CLI flags.
// Domain config (monsters, floors, weights) lives in `engine::config::GameConfig`.

use std::path::PathBuf;

/// Process configuration: where to find the game config and player state
/// files, and which ports the commanders bind to.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Path to the game config JSON file.
    pub game_config_path: PathBuf,
    /// Directory holding one `<player>.json` per registered player.
    pub state_files_dir: PathBuf,
    /// UDP port the remote commander listens on.
    pub remote_port: u16,
    /// Whether to also run the interactive stdin commander.
    pub local_mode: bool,
}

impl AppConfig {
    /// Load configuration from environment variables and CLI arguments.
    ///
    /// Environment variables:
    /// - `GAME_CONFIG_PATH` - path to the game config JSON (default: `game_config.json`)
    /// - `STATE_FILES_DIR` - directory for per-player save files (default: `state_files`)
    /// - `REMOTE_PORT` - UDP commander port (default: 9999)
    /// - `INFON_LOCAL_MODE` - set to `true` to also start the stdin commander
    ///
    /// CLI flags:
    /// - `--local` - enable the stdin commander (same as `INFON_LOCAL_MODE=true`)
    /// - `--port <PORT>` - override the UDP commander port
    /// - `--config <PATH>` - override the game config path
    pub fn load() -> Self {
        let args: Vec<String> = std::env::args().collect();

        let game_config_path = Self::parse_cli_value(&args, "--config")
            .map(PathBuf::from)
            .or_else(|| std::env::var("GAME_CONFIG_PATH").ok().map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from("game_config.json"));

        let state_files_dir = std::env::var("STATE_FILES_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("state_files"));

        let remote_port = Self::parse_cli_value(&args, "--port")
            .and_then(|v| v.parse().ok())
            .or_else(|| std::env::var("REMOTE_PORT").ok().and_then(|v| v.parse().ok()))
            .unwrap_or(9999);

        let local_mode = args.contains(&"--local".to_string())
            || std::env::var("INFON_LOCAL_MODE")
                .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
                .unwrap_or(false);

        AppConfig {
            game_config_path,
            state_files_dir,
            remote_port,
            local_mode,
        }
    }

    /// Parse a CLI flag value like `--port 8080`.
    fn parse_cli_value(args: &[String], flag: &str) -> Option<String> {
        args.windows(2).find_map(|pair| {
            if pair[0] == flag {
                Some(pair[1].clone())
            } else {
                None
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_cli_value_finds_flag_pair() {
        let args = vec!["bin".to_string(), "--port".to_string(), "4242".to_string()];
        assert_eq!(AppConfig::parse_cli_value(&args, "--port"), Some("4242".to_string()));
    }

    #[test]
    fn parse_cli_value_missing_flag_is_none() {
        let args = vec!["bin".to_string()];
        assert_eq!(AppConfig::parse_cli_value(&args, "--port"), None);
    }
}
