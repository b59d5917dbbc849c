use crate::adapters::jservice::{DEFAULT_BASE_URL, MAX_POOL_SIZE};
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{Result, TriviaError};
use crate::utils::validation::{validate_positive_number, validate_range, validate_url, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const MAX_CATEGORIES: usize = 20;
pub const MAX_CLUES: usize = 20;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub source: SourceConfig,
    pub board: BoardConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub base_url: String,
    pub pool_size: usize,
    pub timeout_seconds: u64,
    pub retry_attempts: u32,
    pub retry_delay_ms: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            pool_size: MAX_POOL_SIZE,
            timeout_seconds: 10,
            retry_attempts: 0,
            retry_delay_ms: 500,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    pub categories: usize,
    pub clues: usize,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            categories: 6,
            clues: 5,
        }
    }
}

impl TomlConfig {
    /// Reads and parses a TOML config file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| TriviaError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value; unset variables are
    /// left as written.
    fn substitute_env_vars(content: &str) -> String {
        use regex::Regex;
        use std::sync::OnceLock;

        static PATTERN: OnceLock<Regex> = OnceLock::new();
        let re = PATTERN
            .get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("env pattern is a valid regex"));

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .into_owned()
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_url("source.base_url", &self.source.base_url)?;
        validate_range("source.pool_size", self.source.pool_size, 1, MAX_POOL_SIZE)?;
        validate_positive_number("source.timeout_seconds", self.source.timeout_seconds as usize, 1)?;
        validate_range("board.categories", self.board.categories, 1, MAX_CATEGORIES)?;
        validate_range("board.clues", self.board.clues, 1, MAX_CLUES)?;

        if self.source.pool_size < self.board.categories {
            return Err(TriviaError::ConfigValidationError {
                field: "source.pool_size".to_string(),
                message: format!(
                    "pool of {} cannot supply {} distinct categories",
                    self.source.pool_size, self.board.categories
                ),
            });
        }

        Ok(())
    }
}

impl ConfigProvider for TomlConfig {
    fn base_url(&self) -> &str {
        &self.source.base_url
    }

    fn pool_size(&self) -> usize {
        self.source.pool_size
    }

    fn category_count(&self) -> usize {
        self.board.categories
    }

    fn clue_count(&self) -> usize {
        self.board.clues
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.source.timeout_seconds)
    }

    fn retry_attempts(&self) -> u32 {
        self.source.retry_attempts
    }

    fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.source.retry_delay_ms)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
