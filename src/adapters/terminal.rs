use crate::domain::model::{Cell, RenderEvent};
use crate::domain::ports::Renderer;
use std::io::Write;
use std::sync::{Mutex, PoisonError};

const COLUMN_WIDTH: usize = 18;

#[derive(Debug, Clone, PartialEq, Eq)]
enum CellView {
    Hidden,
    Question(String),
    Answer(String),
}

#[derive(Debug, Default)]
struct GridView {
    titles: Vec<String>,
    // rows[row][column]
    rows: Vec<Vec<CellView>>,
}

impl GridView {
    fn set(&mut self, cell: Cell, view: CellView) {
        if let Some(slot) = self
            .rows
            .get_mut(cell.row)
            .and_then(|row| row.get_mut(cell.column))
        {
            *slot = view;
        }
    }
}

/// Draws the board as a text table and redraws it after every change.
pub struct TerminalRenderer<W: Write + Send> {
    out: Mutex<W>,
    view: Mutex<GridView>,
}

impl<W: Write + Send> TerminalRenderer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
            view: Mutex::new(GridView::default()),
        }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(PoisonError::into_inner)
    }

    fn draw(&self, view: &GridView) -> String {
        let mut text = String::new();
        let rule = format!(
            "+{}\n",
            format!("{}+", "-".repeat(COLUMN_WIDTH + 2)).repeat(view.titles.len())
        );

        text.push_str(&rule);
        text.push('|');
        for (column, title) in view.titles.iter().enumerate() {
            text.push_str(&format!(" {} |", fit(&format!("{}. {}", column + 1, title))));
        }
        text.push('\n');
        text.push_str(&rule);

        for (row, cells) in view.rows.iter().enumerate() {
            text.push('|');
            for cell in cells {
                let shown = match cell {
                    CellView::Hidden => format!("{}?", row + 1),
                    CellView::Question(q) => q.clone(),
                    CellView::Answer(a) => format!("= {}", a),
                };
                text.push_str(&format!(" {} |", fit(&shown)));
            }
            text.push('\n');
        }
        text.push_str(&rule);
        text
    }

    fn write(&self, text: &str) {
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = out.write_all(text.as_bytes()).and_then(|_| out.flush()) {
            tracing::warn!("Failed to write to terminal: {}", e);
        }
    }
}

impl<W: Write + Send> Renderer for TerminalRenderer<W> {
    fn render(&self, event: &RenderEvent) {
        let text = {
            let mut view = self.view.lock().unwrap_or_else(PoisonError::into_inner);
            match event {
                RenderEvent::SetupStarted => "Loading...\n".to_string(),
                RenderEvent::SetupFailed { message } => format!("❌ {}\n", message),
                RenderEvent::RenderEmptyGrid { titles, row_count } => {
                    *view = GridView {
                        titles: titles.clone(),
                        rows: vec![vec![CellView::Hidden; titles.len()]; *row_count],
                    };
                    self.draw(&view)
                }
                RenderEvent::ShowQuestion { cell, text } => {
                    view.set(*cell, CellView::Question(text.clone()));
                    format!("{}Q: {}\n", self.draw(&view), text)
                }
                RenderEvent::ShowAnswer { cell, text } => {
                    view.set(*cell, CellView::Answer(text.clone()));
                    format!("{}A: {}\n", self.draw(&view), text)
                }
            }
        };
        self.write(&text);
    }
}

fn fit(text: &str) -> String {
    let count = text.chars().count();
    if count > COLUMN_WIDTH {
        let head: String = text.chars().take(COLUMN_WIDTH - 1).collect();
        format!("{}…", head)
    } else {
        format!("{:<width$}", text, width = COLUMN_WIDTH)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Activate(Cell),
    Restart,
    Quit,
    Help,
}

/// Parses one line of player input. Cells are typed 1-based as `row col`.
pub fn parse_command(line: &str) -> Result<Command, String> {
    let words: Vec<&str> = line.split_whitespace().collect();
    match words.as_slice() {
        ["q"] | ["quit"] | ["exit"] => Ok(Command::Quit),
        ["r"] | ["restart"] => Ok(Command::Restart),
        ["h"] | ["help"] | ["?"] => Ok(Command::Help),
        [row, column] => {
            let row: usize = row
                .parse()
                .map_err(|_| format!("'{}' is not a row number", row))?;
            let column: usize = column
                .parse()
                .map_err(|_| format!("'{}' is not a column number", column))?;
            if row == 0 || column == 0 {
                return Err("rows and columns start at 1".to_string());
            }
            Ok(Command::Activate(Cell::new(row - 1, column - 1)))
        }
        [] => Err("type `row col`, `r` to restart or `q` to quit".to_string()),
        _ => Err(format!("unknown command '{}'", line.trim())),
    }
}
