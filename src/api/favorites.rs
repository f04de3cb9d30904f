// src/api/favorites.rs

use crate::{api::ApiClient, error::AppError, models::question::FavoriteQuestion};

impl ApiClient {
    pub async fn list_favorite_questions(
        &self,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<FavoriteQuestion>, AppError> {
        self.get(&format!(
            "/questions/favorites?limit={}&offset={}",
            limit, offset
        ))
        .await
    }

    pub async fn favorite_question(&self, question_id: &str) -> Result<(), AppError> {
        let _: serde_json::Value = self
            .post_empty(&format!("/questions/{}/favorite", question_id))
            .await?;
        Ok(())
    }

    pub async fn unfavorite_question(&self, question_id: &str) -> Result<(), AppError> {
        let _: serde_json::Value = self
            .delete(&format!("/questions/{}/favorite", question_id))
            .await?;
        Ok(())
    }
}
