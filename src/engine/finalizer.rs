// src/engine/finalizer.rs

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::{
    api::QuizBackend,
    config::{RESULTS_PREFIX, SUBMITTED_PREFIX},
    engine::scoring::{final_results, summarize},
    error::AppError,
    models::{
        attempt::{AttemptAnswer, AttemptMeta, AttemptOut, AttemptPayload, QuizResult},
        session::QuizSession,
        settings::{QuizConfiguration, TopicSelection},
    },
    storage::{KeyValueStore, read_json, write_json},
};

/// Timing of a finished quiz, exam mode only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    pub used_seconds: u32,
    pub limit_seconds: u32,
}

pub fn submitted_marker_key(quiz_id: &str) -> String {
    format!("{}{}", SUBMITTED_PREFIX, quiz_id)
}

pub fn result_key(quiz_id: &str) -> String {
    format!("{}:{}", RESULTS_PREFIX, quiz_id)
}

pub fn last_result_key() -> String {
    format!("{}:last", RESULTS_PREFIX)
}

/// Builds the attempt record once and submits it at most once.
///
/// * `finalize` is latched in memory for the lifetime of this value.
/// * `submit` is guarded by a marker in the durable store, written only after
///   the backend acknowledged the attempt, so a failed call can be retried.
pub struct AttemptFinalizer {
    backend: Arc<dyn QuizBackend>,
    store: Arc<dyn KeyValueStore>,
    finalized: bool,
    submitted: bool,
}

impl AttemptFinalizer {
    pub fn new(backend: Arc<dyn QuizBackend>, store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            backend,
            store,
            finalized: false,
            submitted: false,
        }
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// Scores the session and builds the payload.
    /// Returns `AlreadyFinalized` on every call after the first.
    pub fn finalize(
        &mut self,
        session: &QuizSession,
        config: &QuizConfiguration,
        timed_out: bool,
        timing: Option<Timing>,
        now: DateTime<Utc>,
    ) -> Result<QuizResult, AppError> {
        if self.finalized {
            return Err(AppError::AlreadyFinalized);
        }
        self.finalized = true;

        let practice = !config.is_exam();
        let results = final_results(session, practice);
        let summary = summarize(
            session,
            &results,
            timing.map(|t| t.used_seconds),
            timing.map(|t| t.limit_seconds).or(session.time_limit_seconds),
        );

        let answers = session
            .questions
            .iter()
            .map(|q| AttemptAnswer {
                question_id: q.id.clone(),
                user_answer: session.answer(&q.id).to_string(),
                is_correct: results.get(&q.id).is_some_and(|r| r.correct),
            })
            .collect();

        let topics = match &config.topics {
            TopicSelection::Topics(topics) if topics.len() > 1 => {
                topics.iter().map(|t| t.as_str().to_string()).collect()
            }
            _ => Vec::new(),
        };

        let payload = AttemptPayload {
            attempt_id: session.attempt_id.clone(),
            topic: config.attempt_topic(),
            difficulty: config.difficulty.to_string(),
            mode: config.mode.to_string(),
            size: config.size,
            correct_count: summary.correct,
            total_count: summary.total,
            answers,
            meta: AttemptMeta {
                topics,
                used_hints_count: session.hints.used_count,
                penalty_total: session.hints.penalty_total,
                penalty_by_question: session.hints.penalty_by_question.clone(),
                raw_score_percent: summary.percent,
            },
            started_at: session.started_at,
            finished_at: now,
            time_limit_seconds: summary.time_limit_sec,
            time_spent_seconds: summary.time_used_sec,
            timed_out,
        };

        tracing::info!(
            "Quiz {} finished: {}/{} correct, {}%{}",
            session.quiz_id,
            summary.correct,
            summary.total,
            summary.percent,
            if timed_out { " (timed out)" } else { "" }
        );

        Ok(QuizResult {
            settings: config.clone(),
            quiz_id: session.quiz_id.clone(),
            attempt_id: session.attempt_id.clone(),
            summary,
            practice_results: practice.then_some(results),
            payload,
        })
    }

    /// Keeps the finished result for the results view, also as the "last" one.
    pub async fn store_result(&self, result: &QuizResult) -> Result<(), AppError> {
        write_json(self.store.as_ref(), &result_key(&result.quiz_id), result).await?;
        write_json(self.store.as_ref(), &last_result_key(), result).await
    }

    /// Sends the attempt to the backend unless it was already acknowledged.
    pub async fn submit(&mut self, result: &QuizResult) -> Result<AttemptOut, AppError> {
        let marker = submitted_marker_key(&result.quiz_id);

        if self.submitted || self.store.get(&marker).await?.is_some() {
            self.submitted = true;
            return Err(AppError::AlreadySubmitted(result.quiz_id.clone()));
        }

        let created = self
            .backend
            .submit_attempt(&result.payload)
            .await
            .map_err(|e| {
                tracing::warn!("Attempt submission for quiz {} failed: {}", result.quiz_id, e);
                e
            })?;

        self.submitted = true;
        tracing::info!("Attempt {} saved for quiz {}", created.id, result.quiz_id);

        // The backend has the attempt; local bookkeeping failures are not fatal.
        if let Err(e) = self.store.set(&marker, "1").await {
            tracing::warn!("Could not record submission marker {}: {}", marker, e);
        }

        let mut stored = result.clone();
        stored.attempt_id = Some(created.id.clone());
        if let Err(e) = self.store_result(&stored).await {
            tracing::warn!("Could not keep result of quiz {}: {}", result.quiz_id, e);
        }

        Ok(created)
    }
}

pub async fn load_result(
    store: &dyn KeyValueStore,
    quiz_id: &str,
) -> Result<Option<QuizResult>, AppError> {
    read_json(store, &result_key(quiz_id)).await
}

pub async fn load_last_result(store: &dyn KeyValueStore) -> Result<Option<QuizResult>, AppError> {
    read_json(store, &last_result_key()).await
}
