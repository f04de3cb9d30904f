// src/engine/hints.rs

use std::sync::Arc;

use crate::{
    api::{HintRequest, QuizBackend},
    config::{MAX_HINTS, hint_penalty},
    error::AppError,
    models::{quiz::QuestionType, session::QuizSession},
};

/// Requests tiered hints and bills them against the session.
///
/// * Level 1-3; each level carries a score penalty for its question.
/// * At most `MAX_HINTS` hints per quiz; the cap is checked locally.
/// * A hint already fetched at the same level is served from the session.
#[derive(Clone)]
pub struct HintAdapter {
    backend: Arc<dyn QuizBackend>,
}

impl HintAdapter {
    pub fn new(backend: Arc<dyn QuizBackend>) -> Self {
        Self { backend }
    }

    pub fn remaining(session: &QuizSession) -> u32 {
        MAX_HINTS.saturating_sub(session.hints.used_count)
    }

    pub async fn request_hint(
        &self,
        session: &mut QuizSession,
        question_id: &str,
        level: u8,
        draft: &str,
    ) -> Result<String, AppError> {
        if !(1..=3).contains(&level) {
            return Err(AppError::Validation(format!("Invalid hint level: {}", level)));
        }

        let question_type = session
            .question(question_id)
            .map(|q| q.question_type)
            .ok_or_else(|| AppError::Validation(format!("Unknown question: {}", question_id)))?;

        if let Some(text) = session.hints.cached(question_id, level) {
            return Ok(text.to_string());
        }

        if session.hints.used_count >= MAX_HINTS {
            return Err(AppError::HintUnavailable("Hint limit reached".to_string()));
        }

        let request = HintRequest {
            user_answer: draft_for(question_type, draft),
            level,
            attempt_id: session.attempt_id.clone(),
        };

        let text = self
            .backend
            .request_hint(question_id, &request)
            .await
            .map_err(|e| {
                if !matches!(e, AppError::ServiceUnavailable(_)) {
                    tracing::error!("Hint request for {} failed: {}", question_id, e);
                }
                e
            })?;

        let penalty = hint_penalty(level);
        session.hints.record(question_id, level, text.clone(), penalty);
        tracing::info!(
            "Hint level {} granted for {} (-{} pts, {}/{} used)",
            level,
            question_id,
            penalty,
            session.hints.used_count,
            MAX_HINTS
        );

        Ok(text)
    }
}

/// MCQ drafts are forwarded verbatim, free-text drafts trimmed; blanks are dropped.
fn draft_for(question_type: QuestionType, draft: &str) -> Option<String> {
    match question_type {
        QuestionType::Mcq if !draft.is_empty() => Some(draft.to_string()),
        QuestionType::CodeOutput if !draft.trim().is_empty() => Some(draft.trim().to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::testing::{FakeBackend, sample_session};
    use crate::models::session::HintState;

    #[tokio::test]
    async fn test_fourth_hint_is_refused_without_a_call() {
        let backend = Arc::new(FakeBackend::with_questions(5));
        let hints = HintAdapter::new(backend.clone());
        let mut session = sample_session(5);

        hints.request_hint(&mut session, "q1", 1, "").await.unwrap();
        hints.request_hint(&mut session, "q2", 2, "").await.unwrap();
        hints.request_hint(&mut session, "q3", 3, "").await.unwrap();
        assert_eq!(backend.hint_calls(), 3);

        let err = hints.request_hint(&mut session, "q4", 1, "").await.unwrap_err();
        assert!(matches!(err, AppError::HintUnavailable(_)));
        assert_eq!(backend.hint_calls(), 3);
        assert_eq!(session.hints.used_count, 3);
        assert_eq!(session.hints.penalty_total, 90);
    }

    #[tokio::test]
    async fn test_repeated_level_served_from_cache() {
        let backend = Arc::new(FakeBackend::with_questions(2));
        let hints = HintAdapter::new(backend.clone());
        let mut session = sample_session(2);

        let first = hints.request_hint(&mut session, "q1", 2, "B").await.unwrap();
        let second = hints.request_hint(&mut session, "q1", 2, "C").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(backend.hint_calls(), 1);
        assert_eq!(session.hints.used_count, 1);
        assert_eq!(session.hints.penalty_for("q1"), 25);
    }

    #[tokio::test]
    async fn test_cached_hint_still_served_after_cap() {
        let backend = Arc::new(FakeBackend::with_questions(3));
        let hints = HintAdapter::new(backend.clone());
        let mut session = sample_session(3);

        for id in ["q1", "q2", "q3"] {
            hints.request_hint(&mut session, id, 1, "").await.unwrap();
        }
        assert!(hints.request_hint(&mut session, "q2", 1, "").await.is_ok());
        assert_eq!(backend.hint_calls(), 3);
    }

    #[tokio::test]
    async fn test_unavailable_backend_bills_nothing() {
        let backend = Arc::new(FakeBackend::with_questions(2));
        backend.fail_hints_with(503);
        let hints = HintAdapter::new(backend.clone());
        let mut session = sample_session(2);

        let err = hints.request_hint(&mut session, "q1", 1, "").await.unwrap_err();
        assert!(matches!(err, AppError::ServiceUnavailable(_)));
        assert_eq!(session.hints, HintState::default());

        backend.fail_hints_with(500);
        let err = hints.request_hint(&mut session, "q1", 1, "").await.unwrap_err();
        assert!(matches!(err, AppError::Service { status: 500, .. }));
        assert_eq!(session.hints.used_count, 0);
    }

    #[tokio::test]
    async fn test_invalid_level_and_unknown_question() {
        let backend = Arc::new(FakeBackend::with_questions(1));
        let hints = HintAdapter::new(backend.clone());
        let mut session = sample_session(1);

        assert!(matches!(
            hints.request_hint(&mut session, "q1", 4, "").await,
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            hints.request_hint(&mut session, "missing", 1, "").await,
            Err(AppError::Validation(_))
        ));
        assert_eq!(backend.hint_calls(), 0);
    }

    #[test]
    fn test_draft_forwarding() {
        assert_eq!(draft_for(QuestionType::Mcq, "B"), Some("B".to_string()));
        assert_eq!(draft_for(QuestionType::Mcq, ""), None);
        assert_eq!(
            draft_for(QuestionType::CodeOutput, "  [1, 2]\n"),
            Some("[1, 2]".to_string())
        );
        assert_eq!(draft_for(QuestionType::CodeOutput, "   "), None);
    }
}
