use crate::domain::model::{Category, Cell, Clue, RevealState};
use crate::utils::error::{Result, TriviaError};

/// Columns are categories, rows are clue positions. Either empty or a full
/// `column_count x row_count` grid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Board {
    categories: Vec<Category>,
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.categories.clear();
    }

    /// Replaces the whole board. On error the current board is kept.
    pub fn populate(&mut self, categories: Vec<Category>) -> Result<()> {
        let Some(first) = categories.first() else {
            return Err(TriviaError::MalformedCategory {
                message: "a board needs at least one category".to_string(),
            });
        };

        let row_count = first.clues.len();
        if row_count == 0 {
            return Err(TriviaError::MalformedCategory {
                message: format!("category '{}' has no clues", first.title),
            });
        }

        if let Some(odd) = categories.iter().find(|c| c.clues.len() != row_count) {
            return Err(TriviaError::MalformedCategory {
                message: format!(
                    "category '{}' has {} clues, expected {}",
                    odd.title,
                    odd.clues.len(),
                    row_count
                ),
            });
        }

        self.categories = categories;
        Ok(())
    }

    pub fn advance(&mut self, cell: Cell) -> Result<RevealState> {
        self.check_range(cell)?;
        Ok(self.categories[cell.column].clues[cell.row].advance())
    }

    pub fn clue_at(&self, cell: Cell) -> Result<&Clue> {
        self.check_range(cell)?;
        Ok(&self.categories[cell.column].clues[cell.row])
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn column_count(&self) -> usize {
        self.categories.len()
    }

    pub fn row_count(&self) -> usize {
        self.categories.first().map_or(0, |c| c.clues.len())
    }

    pub fn titles(&self) -> Vec<String> {
        self.categories.iter().map(|c| c.title.clone()).collect()
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    fn check_range(&self, cell: Cell) -> Result<()> {
        let (rows, columns) = (self.row_count(), self.column_count());
        if cell.row >= rows || cell.column >= columns {
            return Err(TriviaError::OutOfRange {
                row: cell.row,
                column: cell.column,
                rows,
                columns,
            });
        }
        Ok(())
    }
}
