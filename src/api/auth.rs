// src/api/auth.rs

use crate::{
    api::ApiClient,
    error::AppError,
    models::user::{Credentials, TokenResponse, User},
};

impl ApiClient {
    pub async fn login(&self, credentials: &Credentials) -> Result<TokenResponse, AppError> {
        self.post("/auth/login", credentials).await
    }

    pub async fn register(&self, credentials: &Credentials) -> Result<TokenResponse, AppError> {
        self.post("/auth/register", credentials).await
    }

    pub async fn logout(&self) -> Result<(), AppError> {
        let _: serde_json::Value = self.post_empty("/auth/logout").await?;
        Ok(())
    }

    pub async fn me(&self) -> Result<User, AppError> {
        self.get("/auth/me").await
    }
}
