// Adapters layer: concrete implementations of the domain ports (trivia API, terminal).

pub mod jservice;
pub mod terminal;
