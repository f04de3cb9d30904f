// src/models/question.rs

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::quiz::{Difficulty, QuestionType, Topic};

/// A bookmarked question, returned by `GET /questions/favorites`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FavoriteQuestion {
    pub id: String,
    pub topic: Topic,
    pub difficulty: Difficulty,

    #[serde(rename = "type")]
    pub question_type: QuestionType,

    pub prompt: String,

    #[serde(default)]
    pub choices: Option<BTreeMap<String, String>>,

    pub correct_answer: String,

    /// Text of the correct choice for MCQ questions.
    #[serde(default)]
    pub correct_answer_text: Option<String>,

    #[serde(default)]
    pub explanation: Option<String>,

    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}
