// src/api/hints.rs

use serde::{Deserialize, Serialize};

use crate::{api::ApiClient, error::AppError};

pub const HINTS_UNAVAILABLE_MESSAGE: &str =
    "AI hints are unavailable right now. Please try again later.";

/// Body of `POST /questions/{id}/hint`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HintRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_answer: Option<String>,
    pub level: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attempt_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HintResponse {
    pub hint: String,
}

impl ApiClient {
    /// Requests an AI hint. A 503 is reported with a fixed user-facing message.
    pub async fn get_hint(
        &self,
        question_id: &str,
        request: &HintRequest,
    ) -> Result<HintResponse, AppError> {
        let path = format!("/questions/{}/hint", question_id);

        self.post(&path, request).await.map_err(|e| match e {
            AppError::ServiceUnavailable(detail) => {
                tracing::warn!("Hint backend unavailable: {}", detail);
                AppError::ServiceUnavailable(HINTS_UNAVAILABLE_MESSAGE.to_string())
            }
            other => other,
        })
    }
}
