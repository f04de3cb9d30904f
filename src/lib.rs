// src/lib.rs

pub mod api;
pub mod auth;
pub mod config;
pub mod engine;
pub mod error;
pub mod models;
pub mod state;
pub mod storage;

pub use api::{ApiClient, QuizBackend};
pub use engine::{QuizRunner, parse_settings};
pub use error::AppError;
pub use state::AppState;
