// src/auth.rs

use chrono::{DateTime, TimeZone, Utc};
use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::Deserialize;
use validator::Validate;

use crate::{
    api::ApiClient,
    error::AppError,
    models::user::{Credentials, TokenResponse, User},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStatus {
    Loading,
    Authed,
    Guest,
}

/// Claims read from an access token.
#[derive(Debug, Deserialize)]
struct TokenClaims {
    #[serde(default)]
    exp: Option<i64>,
}

/// Reads the expiry of an access token.
///
/// The signature is not checked: the client cannot hold the server secret,
/// and the server verifies every request anyway.
pub fn token_expiry(token: &str) -> Option<DateTime<Utc>> {
    let mut validation = Validation::default();
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    let data = decode::<TokenClaims>(token, &DecodingKey::from_secret(&[]), &validation).ok()?;
    data.claims
        .exp
        .and_then(|exp| Utc.timestamp_opt(exp, 0).single())
}

/// Explicit authentication context. Owns the current user and shares the
/// access token with the `ApiClient` it wraps.
#[derive(Debug, Clone)]
pub struct AuthSession {
    client: ApiClient,
    user: Option<User>,
    loading: bool,
}

impl AuthSession {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            user: None,
            loading: true,
        }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn status(&self) -> AuthStatus {
        if self.loading {
            AuthStatus::Loading
        } else if self.user.is_some() {
            AuthStatus::Authed
        } else {
            AuthStatus::Guest
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn token_expires_at(&self) -> Option<DateTime<Utc>> {
        self.client.access_token().as_deref().and_then(token_expiry)
    }

    /// Resolves the current user on startup.
    ///
    /// A 401 from `/auth/me` gets one silent refresh; any other failure
    /// leaves the session as guest.
    pub async fn bootstrap(&mut self) -> AuthStatus {
        self.user = match self.client.me().await {
            Ok(user) => Some(user),
            Err(AppError::AuthError(_)) => match self.refresh().await {
                Some(_) => self.client.me().await.ok(),
                None => None,
            },
            Err(e) => {
                tracing::warn!("Auth bootstrap failed: {}", e);
                None
            }
        };
        self.loading = false;

        match &self.user {
            Some(user) => tracing::info!("Signed in as {}", user.email),
            None => tracing::info!("Continuing as guest"),
        }
        self.status()
    }

    pub async fn login(&mut self, credentials: &Credentials) -> Result<&User, AppError> {
        credentials
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let tokens = self.client.login(credentials).await?;
        self.accept_tokens(tokens).await
    }

    pub async fn register(&mut self, credentials: &Credentials) -> Result<&User, AppError> {
        credentials
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let tokens = self.client.register(credentials).await?;
        self.accept_tokens(tokens).await
    }

    async fn accept_tokens(&mut self, tokens: TokenResponse) -> Result<&User, AppError> {
        self.client.set_access_token(Some(tokens.access_token));
        let current = self.client.me().await?;
        self.loading = false;
        Ok(self.user.insert(current))
    }

    /// Returns the new access token, or None after clearing the session.
    pub async fn refresh(&mut self) -> Option<String> {
        match self.client.refresh_session().await {
            Ok(tokens) => {
                self.user = Some(tokens.user);
                Some(tokens.access_token)
            }
            Err(e) => {
                tracing::debug!("Refresh rejected: {}", e);
                self.user = None;
                None
            }
        }
    }

    /// Local state is cleared even when the backend call fails.
    pub async fn logout(&mut self) {
        if let Err(e) = self.client.logout().await {
            tracing::warn!("Logout request failed: {}", e);
        }
        self.client.set_access_token(None);
        self.user = None;
    }
}
