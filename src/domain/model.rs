use serde::{Deserialize, Serialize};
use std::fmt;

/// Upstream category identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryId(pub u64);

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Zero-based board coordinate. Rows index clues, columns index categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub row: usize,
    pub column: usize,
}

impl Cell {
    pub fn new(row: usize, column: usize) -> Self {
        Self { row, column }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RevealState {
    #[default]
    Hidden,
    Question,
    Answer,
}

impl RevealState {
    /// Forward-only step. `Answer` is terminal and maps to itself.
    pub fn next(self) -> Self {
        match self {
            RevealState::Hidden => RevealState::Question,
            RevealState::Question | RevealState::Answer => RevealState::Answer,
        }
    }

    pub fn is_terminal(self) -> bool {
        self == RevealState::Answer
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clue {
    pub question: String,
    pub answer: String,
    reveal_state: RevealState,
}

impl Clue {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
            reveal_state: RevealState::Hidden,
        }
    }

    pub fn reveal_state(&self) -> RevealState {
        self.reveal_state
    }

    pub fn advance(&mut self) -> RevealState {
        self.reveal_state = self.reveal_state.next();
        self.reveal_state
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub title: String,
    pub clues: Vec<Clue>,
}

impl Category {
    pub fn new(title: impl Into<String>, clues: Vec<Clue>) -> Self {
        Self {
            title: title.into(),
            clues,
        }
    }
}

/// What the controller asks a renderer to draw.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RenderEvent {
    SetupStarted,
    SetupFailed { message: String },
    RenderEmptyGrid { titles: Vec<String>, row_count: usize },
    ShowQuestion { cell: Cell, text: String },
    ShowAnswer { cell: Cell, text: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SetupStatus {
    #[default]
    Idle,
    Loading,
    Ready,
    Failed { message: String },
}
