// src/config.rs

use std::env;
use dotenvy::dotenv;
use url::Url;

use crate::error::AppError;

/// Maximum number of hints a single quiz may consume.
pub const MAX_HINTS: u32 = 3;

/// Score penalty (percentage points of one question) per hint level.
pub const HINT_PENALTIES: [(u8, u32); 3] = [(1, 15), (2, 25), (3, 50)];

pub const STORAGE_PREFIX: &str = "quizstate";
pub const RESULTS_PREFIX: &str = "quizresults";
pub const TIMER_PREFIX: &str = "quiztimer";
pub const SUBMITTED_PREFIX: &str = "attempt_saved_";

pub const API_PREFIX: &str = "/api/v1";

/// Looks up the penalty for a hint level. Unknown levels cost nothing.
pub fn hint_penalty(level: u8) -> u32 {
    HINT_PENALTIES
        .iter()
        .find(|(l, _)| *l == level)
        .map(|(_, p)| *p)
        .unwrap_or(0)
}

/// Exam time limit in seconds for a quiz of `size` questions.
pub fn exam_time_limit(size: u32) -> u32 {
    if size <= 5 {
        4 * 60
    } else if size <= 10 {
        8 * 60
    } else {
        12 * 60
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub store_url: String,
    pub rust_log: String,
    pub access_token: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        dotenv().ok();

        let api_url = env::var("API_URL")
            .unwrap_or_else(|_| "http://localhost:8000".to_string());

        Url::parse(&api_url)
            .map_err(|e| AppError::Validation(format!("API_URL is not a valid url: {}", e)))?;

        let store_url = env::var("STORE_URL")
            .unwrap_or_else(|_| "sqlite://prepquiz.db?mode=rwc".to_string());

        let rust_log = env::var("RUST_LOG")
            .unwrap_or_else(|_| "info".to_string());

        let access_token = env::var("ACCESS_TOKEN").ok().filter(|t| !t.is_empty());

        Ok(Self {
            api_url,
            store_url,
            rust_log,
            access_token,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exam_time_limit_buckets() {
        assert_eq!(exam_time_limit(1), 240);
        assert_eq!(exam_time_limit(5), 240);
        assert_eq!(exam_time_limit(6), 480);
        assert_eq!(exam_time_limit(10), 480);
        assert_eq!(exam_time_limit(11), 720);
        assert_eq!(exam_time_limit(40), 720);
    }

    #[test]
    fn test_hint_penalty_table() {
        assert_eq!(hint_penalty(1), 15);
        assert_eq!(hint_penalty(2), 25);
        assert_eq!(hint_penalty(3), 50);
        assert_eq!(hint_penalty(4), 0);
    }
}
