// src/models/session.rs

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::quiz::{QuestionId, QuizGenerateResponse, QuizQuestion};

/// Feedback recorded when a question is submitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PracticeResult {
    pub correct: bool,
    pub correct_answer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

/// Hint usage of one quiz.
///
/// `penalty_total` always equals the sum of `penalty_by_question`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HintState {
    pub used_count: u32,
    pub penalty_total: u32,
    pub penalty_by_question: HashMap<QuestionId, u32>,
    pub hints_used_by_question: HashMap<QuestionId, u32>,

    /// Hint text keyed by "<question_id>:<level>".
    pub hint_text: HashMap<String, String>,
}

impl HintState {
    fn text_key(question_id: &str, level: u8) -> String {
        format!("{}:{}", question_id, level)
    }

    pub fn cached(&self, question_id: &str, level: u8) -> Option<&str> {
        self.hint_text
            .get(&Self::text_key(question_id, level))
            .map(String::as_str)
    }

    pub fn penalty_for(&self, question_id: &str) -> u32 {
        self.penalty_by_question.get(question_id).copied().unwrap_or(0)
    }

    /// Bills one granted hint.
    pub fn record(&mut self, question_id: &str, level: u8, text: String, penalty: u32) {
        self.used_count += 1;
        self.penalty_total += penalty;
        *self
            .penalty_by_question
            .entry(question_id.to_string())
            .or_insert(0) += penalty;
        *self
            .hints_used_by_question
            .entry(question_id.to_string())
            .or_insert(0) += 1;
        self.hint_text.insert(Self::text_key(question_id, level), text);
    }
}

/// Persisted countdown state of an exam.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerSnapshot {
    pub remaining: u32,
    pub updated_at: DateTime<Utc>,
}

/// Complete in-progress quiz state, written through to the session store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizSession {
    pub quiz_id: String,
    #[serde(default)]
    pub attempt_id: Option<String>,
    pub questions: Vec<QuizQuestion>,
    #[serde(default)]
    pub answers: HashMap<QuestionId, String>,
    #[serde(default)]
    pub submitted: HashMap<QuestionId, bool>,
    #[serde(default)]
    pub results: HashMap<QuestionId, PracticeResult>,
    #[serde(default)]
    pub current_index: usize,
    #[serde(default)]
    pub hints: HintState,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub time_limit_seconds: Option<u32>,
}

impl QuizSession {
    pub fn from_generated(response: QuizGenerateResponse) -> Self {
        Self {
            quiz_id: response.quiz_id,
            attempt_id: response.attempt_id,
            questions: response.questions,
            answers: HashMap::new(),
            submitted: HashMap::new(),
            results: HashMap::new(),
            current_index: 0,
            hints: HintState::default(),
            started_at: None,
            time_limit_seconds: None,
        }
    }

    pub fn current_question(&self) -> Option<&QuizQuestion> {
        self.questions.get(self.current_index)
    }

    pub fn question(&self, question_id: &str) -> Option<&QuizQuestion> {
        self.questions.iter().find(|q| q.id == question_id)
    }

    pub fn answer(&self, question_id: &str) -> &str {
        self.answers.get(question_id).map(String::as_str).unwrap_or("")
    }

    pub fn is_submitted(&self, question_id: &str) -> bool {
        self.submitted.get(question_id).copied().unwrap_or(false)
    }

    pub fn is_last_question(&self) -> bool {
        self.current_index + 1 >= self.questions.len()
    }

    /// Identifier the timer snapshot and submission marker are keyed by.
    pub fn tracking_id(&self) -> &str {
        self.attempt_id.as_deref().unwrap_or(&self.quiz_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hint_record_keeps_totals_consistent() {
        let mut hints = HintState::default();
        hints.record("q1", 1, "look at the loop".into(), 15);
        hints.record("q1", 2, "count the iterations".into(), 25);
        hints.record("q2", 3, "it is O(n log n)".into(), 50);

        assert_eq!(hints.used_count, 3);
        assert_eq!(hints.penalty_total, 90);
        assert_eq!(hints.penalty_for("q1"), 40);
        assert_eq!(hints.penalty_for("q2"), 50);
        assert_eq!(
            hints.penalty_by_question.values().sum::<u32>(),
            hints.penalty_total
        );
        assert_eq!(hints.cached("q1", 2), Some("count the iterations"));
        assert_eq!(hints.cached("q2", 1), None);
    }

    #[test]
    fn test_session_deserializes_with_missing_optional_state() {
        let raw = r#"{
            "quizId": "quiz-1",
            "questions": []
        }"#;
        let session: QuizSession = serde_json::from_str(raw).unwrap();
        assert_eq!(session.quiz_id, "quiz-1");
        assert_eq!(session.current_index, 0);
        assert_eq!(session.hints.used_count, 0);
        assert_eq!(session.tracking_id(), "quiz-1");
    }
}
