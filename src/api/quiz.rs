// src/api/quiz.rs

use crate::{
    api::ApiClient,
    error::AppError,
    models::quiz::{MetaResponse, QuizGenerateRequest, QuizGenerateResponse},
};

impl ApiClient {
    /// Asks the backend for a fresh question set.
    pub async fn generate_quiz(
        &self,
        request: &QuizGenerateRequest,
    ) -> Result<QuizGenerateResponse, AppError> {
        let response: QuizGenerateResponse = self.post("/quiz/generate", request).await?;
        tracing::debug!(
            "Generated quiz {} with {} questions",
            response.quiz_id,
            response.questions.len()
        );
        Ok(response)
    }

    /// Topics, difficulties, modes and size limits the backend accepts.
    pub async fn get_meta(&self) -> Result<MetaResponse, AppError> {
        self.get("/meta").await
    }
}
