// src/api/mod.rs

pub mod attempts;
pub mod auth;
pub mod client;
pub mod favorites;
pub mod hints;
pub mod quiz;

use async_trait::async_trait;

use crate::{
    error::AppError,
    models::{
        attempt::{AttemptOut, AttemptPayload},
        quiz::{QuizGenerateRequest, QuizGenerateResponse},
    },
};

pub use client::ApiClient;
pub use hints::HintRequest;

/// The backend calls the quiz engine depends on.
///
/// `ApiClient` is the production implementation; tests substitute fakes to
/// count calls or inject failures.
#[async_trait]
pub trait QuizBackend: Send + Sync {
    /// `POST /quiz/generate`
    async fn generate_quiz(
        &self,
        request: &QuizGenerateRequest,
    ) -> Result<QuizGenerateResponse, AppError>;

    /// `POST /questions/{id}/hint`
    async fn request_hint(&self, question_id: &str, request: &HintRequest)
    -> Result<String, AppError>;

    /// `POST /attempts`, or `POST /attempts/{id}/submit` when the server
    /// already assigned an attempt id.
    async fn submit_attempt(&self, payload: &AttemptPayload) -> Result<AttemptOut, AppError>;
}

#[async_trait]
impl QuizBackend for ApiClient {
    async fn generate_quiz(
        &self,
        request: &QuizGenerateRequest,
    ) -> Result<QuizGenerateResponse, AppError> {
        ApiClient::generate_quiz(self, request).await
    }

    async fn request_hint(
        &self,
        question_id: &str,
        request: &HintRequest,
    ) -> Result<String, AppError> {
        self.get_hint(question_id, request).await.map(|r| r.hint)
    }

    async fn submit_attempt(&self, payload: &AttemptPayload) -> Result<AttemptOut, AppError> {
        match payload.attempt_id.as_deref() {
            Some(id) => self.complete_attempt(id, payload).await,
            None => self.create_attempt(payload).await,
        }
    }
}
