pub mod commands;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;

pub use error::{AppError, Result};
pub use models::{Difficulty, NewSolveRecord, SolveRecord, UserIdentity};
pub use services::statistics::{compute_statistics, Statistics};
