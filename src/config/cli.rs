use crate::config::toml_config::TomlConfig;
use crate::utils::error::Result;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "trivia-board")]
#[command(about = "Play a trivia board in the terminal")]
pub struct CliConfig {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Base URL of the trivia API
    #[arg(long)]
    pub base_url: Option<String>,

    /// Number of categories (columns)
    #[arg(long)]
    pub categories: Option<usize>,

    /// Number of clues per category (rows)
    #[arg(long)]
    pub clues: Option<usize>,

    /// Seed for reproducible category and clue draws
    #[arg(long)]
    pub seed: Option<u64>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,
}

impl CliConfig {
    /// File settings (or defaults) with command line values on top.
    pub fn resolve(&self) -> Result<TomlConfig> {
        let mut config = match &self.config {
            Some(path) => {
                tracing::info!("📁 Loading configuration from: {}", path.display());
                TomlConfig::from_file(path)?
            }
            None => TomlConfig::default(),
        };

        if let Some(base_url) = &self.base_url {
            config.source.base_url = base_url.clone();
        }
        if let Some(categories) = self.categories {
            config.board.categories = categories;
        }
        if let Some(clues) = self.clues {
            config.board.clues = clues;
        }

        Ok(config)
    }
}
