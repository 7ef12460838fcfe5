pub mod cli;
pub mod config;
pub mod controller;
pub mod engine;
pub mod frontend;
pub mod remote;

pub use controller::Controller;
pub use engine::config::GameConfig;
pub use engine::errors::GameError;
