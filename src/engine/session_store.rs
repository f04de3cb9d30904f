// src/engine/session_store.rs

use std::sync::Arc;

use crate::{
    api::QuizBackend,
    error::AppError,
    models::{session::QuizSession, settings::QuizConfiguration},
    storage::{KeyValueStore, read_json, write_json},
};

/// Where a loaded session came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOrigin {
    Resumed,
    Generated,
}

/// At most one in-progress session per configuration signature.
#[derive(Clone)]
pub struct SessionStore {
    store: Arc<dyn KeyValueStore>,
}

impl SessionStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Returns a resumable session, dropping entries that cannot be used.
    pub async fn load(&self, signature: &str) -> Result<Option<QuizSession>, AppError> {
        match read_json::<QuizSession>(self.store.as_ref(), signature).await {
            Ok(Some(session)) if !session.questions.is_empty() => Ok(Some(session)),
            Ok(Some(_)) => {
                tracing::warn!("Discarding empty cached session {}", signature);
                self.store.remove(signature).await?;
                Ok(None)
            }
            Ok(None) => Ok(None),
            Err(AppError::Storage(reason)) => {
                tracing::warn!("Discarding corrupt cached session {}: {}", signature, reason);
                self.store.remove(signature).await?;
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Resumes the session stored for `config`, or generates a fresh quiz.
    pub async fn load_or_create(
        &self,
        config: &QuizConfiguration,
        backend: &dyn QuizBackend,
        attempt_id: Option<String>,
    ) -> Result<(QuizSession, SessionOrigin), AppError> {
        let signature = config.signature();

        if let Some(session) = self.load(&signature).await? {
            tracing::info!(
                "Resuming quiz {} at question {}/{}",
                session.quiz_id,
                session.current_index + 1,
                session.questions.len()
            );
            return Ok((session, SessionOrigin::Resumed));
        }

        let response = backend
            .generate_quiz(&config.to_generate_request(attempt_id.clone()))
            .await?;

        if response.questions.is_empty() {
            return Err(AppError::Validation(
                "No questions available for this selection.".to_string(),
            ));
        }

        let mut session = QuizSession::from_generated(response);
        if session.attempt_id.is_none() {
            session.attempt_id = attempt_id;
        }

        self.save(&signature, &session).await?;
        tracing::info!(
            "Started quiz {} with {} questions",
            session.quiz_id,
            session.questions.len()
        );
        Ok((session, SessionOrigin::Generated))
    }

    /// Full-state write-through.
    pub async fn save(&self, signature: &str, session: &QuizSession) -> Result<(), AppError> {
        write_json(self.store.as_ref(), signature, session).await
    }

    pub async fn discard(&self, signature: &str) -> Result<(), AppError> {
        self.store.remove(signature).await
    }
}
