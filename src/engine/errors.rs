use thiserror::Error;

/// Errors surfaced by the engine. `InvalidOperation` and `ArgsParseError` are
/// caught at the `on_action` boundary and converted into a single response
/// line; `InvalidConfig` aborts process startup; the rest are controller-level.
#[derive(Debug, Error)]
pub enum GameError {
    #[error("{0}")]
    InvalidOperation(String),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("could not parse arguments: {0}")]
    ArgsParseError(String),

    #[error("player '{0}' does not exist")]
    PlayerDoesNotExist(String),

    #[error("no eligible player for event")]
    NoPlayerForEvent,
}

pub type GameResult<T> = Result<T, GameError>;
