use thiserror::Error;

#[derive(Error, Debug)]
pub enum TriviaError {
    #[error("Trivia source unavailable at {endpoint}: {message}")]
    SourceUnavailable { endpoint: String, message: String },

    #[error("Category pool too small: requested {requested}, available {available}")]
    InsufficientPool { requested: usize, available: usize },

    #[error("Category {category} has too few clues: requested {requested}, available {available}")]
    InsufficientClues {
        category: u64,
        requested: usize,
        available: usize,
    },

    #[error("Cell ({row}, {column}) is outside the {rows}x{columns} board")]
    OutOfRange {
        row: usize,
        column: usize,
        rows: usize,
        columns: usize,
    },

    #[error("Malformed category: {message}")]
    MalformedCategory { message: String },

    #[error("Configuration error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<reqwest::Error> for TriviaError {
    fn from(err: reqwest::Error) -> Self {
        let endpoint = err
            .url()
            .map(|url| url.to_string())
            .unwrap_or_else(|| "<unknown>".to_string());
        TriviaError::SourceUnavailable {
            endpoint,
            message: err.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Data,
    Input,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl TriviaError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            TriviaError::SourceUnavailable { .. } => ErrorCategory::Network,
            TriviaError::InsufficientPool { .. }
            | TriviaError::InsufficientClues { .. }
            | TriviaError::MalformedCategory { .. } => ErrorCategory::Data,
            TriviaError::OutOfRange { .. } => ErrorCategory::Input,
            TriviaError::ConfigValidationError { .. }
            | TriviaError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            TriviaError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            TriviaError::OutOfRange { .. } => ErrorSeverity::Low,
            TriviaError::SourceUnavailable { .. }
            | TriviaError::InsufficientPool { .. }
            | TriviaError::InsufficientClues { .. } => ErrorSeverity::Medium,
            TriviaError::MalformedCategory { .. }
            | TriviaError::ConfigValidationError { .. }
            | TriviaError::InvalidConfigValueError { .. } => ErrorSeverity::High,
            TriviaError::IoError(_) => ErrorSeverity::Critical,
        }
    }

    /// Only transport failures are worth another attempt; short pools and
    /// clue lists come back the same way on retry.
    pub fn is_retryable(&self) -> bool {
        matches!(self, TriviaError::SourceUnavailable { .. })
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            TriviaError::SourceUnavailable { .. } => {
                "Could not reach the trivia service. Setup failed, try again.".to_string()
            }
            TriviaError::InsufficientPool {
                requested,
                available,
            } => format!(
                "The trivia service only offered {} categories but {} are needed.",
                available, requested
            ),
            TriviaError::InsufficientClues {
                category,
                requested,
                available,
            } => format!(
                "Category {} only has {} usable clues, {} are needed. Setup failed, try again.",
                category, available, requested
            ),
            TriviaError::OutOfRange { row, column, .. } => {
                format!("There is no clue at row {}, column {}.", row + 1, column + 1)
            }
            TriviaError::MalformedCategory { message } => {
                format!("The trivia service returned a broken category: {}", message)
            }
            TriviaError::ConfigValidationError { field, message } => {
                format!("Configuration problem in '{}': {}", field, message)
            }
            TriviaError::InvalidConfigValueError {
                field,
                value,
                reason,
            } => format!("'{}' is not a valid value for '{}': {}", value, field, reason),
            TriviaError::IoError(e) => format!("File system error: {}", e),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Network => "Check your network connection and the source base_url, then restart the game",
            ErrorCategory::Data => "Restart the game to draw different categories, or lower the clue count",
            ErrorCategory::Input => "Pick a cell inside the board",
            ErrorCategory::Configuration => "Fix the configuration file or command line flags",
            ErrorCategory::System => "Check file permissions and paths",
        }
    }
}

pub type Result<T> = std::result::Result<T, TriviaError>;
