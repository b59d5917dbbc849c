pub mod board;
pub mod controller;
pub mod sampling;

pub use crate::domain::model::{Category, CategoryId, Cell, Clue, RenderEvent, RevealState};
pub use crate::domain::ports::{CategorySource, ConfigProvider, Renderer};
pub use crate::utils::error::Result;
