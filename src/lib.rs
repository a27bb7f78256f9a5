#![forbid(unsafe_code)]

pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod extract;
pub mod generate;
pub mod logging;
pub mod normalize;
pub mod openai;

pub use error::QuizError;
