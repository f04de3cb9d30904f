// src/models/attempt.rs

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{
    quiz::QuestionId,
    session::PracticeResult,
    settings::QuizConfiguration,
};

/// Score summary shown on the results view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizSummary {
    pub total: u32,
    pub correct: u32,
    /// 0..=100, adjusted for hint penalties.
    pub percent: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_used_sec: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_limit_sec: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttemptAnswer {
    pub question_id: QuestionId,
    pub user_answer: String,
    pub is_correct: bool,
}

/// Hint aggregates carried in the attempt's `meta` object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttemptMeta {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub topics: Vec<String>,
    pub used_hints_count: u32,
    pub penalty_total: u32,
    #[serde(default)]
    pub penalty_by_question: HashMap<QuestionId, u32>,
    pub raw_score_percent: u32,
}

/// Body of `POST /attempts`. Built exactly once per completed quiz.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttemptPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attempt_id: Option<String>,
    pub topic: String,
    pub difficulty: String,
    pub mode: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
    pub correct_count: u32,
    pub total_count: u32,
    pub answers: Vec<AttemptAnswer>,
    pub meta: AttemptMeta,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: DateTime<Utc>,
    pub time_limit_seconds: Option<u32>,
    pub time_spent_seconds: Option<u32>,
    pub timed_out: bool,
}

/// Attempt as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttemptOut {
    pub id: String,
    pub topic: String,
    pub difficulty: String,
    pub mode: String,
    #[serde(default)]
    pub size: Option<u32>,
    pub correct_count: u32,
    pub total_count: u32,
    #[serde(default)]
    pub answers: Vec<AttemptAnswer>,
    #[serde(default)]
    pub meta: Option<serde_json::Value>,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub finished_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub time_limit_seconds: Option<u32>,
    #[serde(default)]
    pub time_spent_seconds: Option<u32>,
    #[serde(default)]
    pub timed_out: Option<bool>,
    pub created_at: DateTime<Utc>,
    pub score_percent: u32,
}

impl AttemptOut {
    pub fn summary(&self) -> QuizSummary {
        QuizSummary {
            total: self.total_count,
            correct: self.correct_count,
            percent: self.score_percent,
            time_used_sec: self.time_spent_seconds,
            time_limit_sec: self.time_limit_seconds,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttemptTopicStats {
    pub topic: String,
    pub attempts: u32,
    pub avg_score_percent: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttemptRecentScore {
    pub score_percent: u32,
    pub created_at: DateTime<Utc>,
}

/// Response of `GET /attempts/stats`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttemptStats {
    pub total_attempts: u32,
    pub avg_score_percent: u32,
    pub best_score_percent: u32,
    pub last_attempt_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub by_topic: Vec<AttemptTopicStats>,
    #[serde(default)]
    pub current_streak_days: u32,
    #[serde(default)]
    pub strongest_topic: Option<String>,
    #[serde(default)]
    pub weakest_topic: Option<String>,
    #[serde(default)]
    pub recent_scores: Vec<u32>,
    #[serde(default)]
    pub recent_attempts: Vec<AttemptRecentScore>,
}

/// Finished quiz as kept locally for the results view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizResult {
    pub settings: QuizConfiguration,
    pub quiz_id: String,
    pub attempt_id: Option<String>,
    pub summary: QuizSummary,
    /// Per-question feedback; practice mode only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub practice_results: Option<HashMap<QuestionId, PracticeResult>>,
    pub payload: AttemptPayload,
}
