pub mod cli;
pub mod config;
pub mod error;
pub mod git;
pub mod publish;
pub mod runner;
pub mod ui;

pub use error::{PublishError, Result};
