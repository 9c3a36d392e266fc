pub mod config;
pub mod error;
pub mod geo;
pub mod inquiry;
pub mod llm;
pub mod terminal;
