pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod fetch;
pub mod portfolio;
pub mod share;
pub mod ui;

pub use error::{AppError, Result};
