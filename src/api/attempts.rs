// src/api/attempts.rs

use crate::{
    api::ApiClient,
    error::AppError,
    models::attempt::{AttemptOut, AttemptPayload, AttemptStats},
};

impl ApiClient {
    pub async fn create_attempt(&self, payload: &AttemptPayload) -> Result<AttemptOut, AppError> {
        self.post("/attempts", payload).await
    }

    /// Completes an attempt the server opened when the quiz was generated.
    pub async fn complete_attempt(
        &self,
        attempt_id: &str,
        payload: &AttemptPayload,
    ) -> Result<AttemptOut, AppError> {
        self.post(&format!("/attempts/{}/submit", attempt_id), payload)
            .await
    }

    pub async fn get_attempt(&self, attempt_id: &str) -> Result<AttemptOut, AppError> {
        self.get(&format!("/attempts/{}", attempt_id)).await
    }

    /// Attempt history, newest first.
    pub async fn list_attempts(&self, limit: u32, offset: u32) -> Result<Vec<AttemptOut>, AppError> {
        self.get(&format!("/attempts?limit={}&offset={}", limit, offset))
            .await
    }

    pub async fn get_attempt_stats(&self) -> Result<AttemptStats, AppError> {
        self.get("/attempts/stats").await
    }
}
