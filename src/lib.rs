pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::TomlConfig;

pub use adapters::jservice::JServiceSource;
pub use adapters::terminal::TerminalRenderer;
pub use crate::core::{board::Board, controller::BoardController, controller::SetupPolicy};
pub use utils::error::{Result, TriviaError};
