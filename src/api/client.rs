// src/api/client.rs

use std::sync::{Arc, RwLock};
use std::time::Duration;

use reqwest::{Method, StatusCode};
use serde::{Serialize, de::DeserializeOwned};
use url::Url;

use crate::{config::API_PREFIX, error::AppError, models::user::TokenResponse};

/// HTTP client for the quiz backend.
///
/// * Attaches `Authorization: Bearer <token>` when a token is held.
/// * On a 401 from a non-auth endpoint, refreshes once and retries once.
/// * Normalizes error bodies into `AppError`.
///
/// Clones share the token and the cookie jar.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    access_token: Arc<RwLock<Option<String>>>,
}

impl ApiClient {
    /// `origin` may or may not already end with `/api/v1`.
    pub fn new(origin: &str) -> Result<Self, AppError> {
        Url::parse(origin)
            .map_err(|e| AppError::Validation(format!("Invalid api url '{}': {}", origin, e)))?;

        let trimmed = origin.trim_end_matches('/');
        let origin = trimmed.strip_suffix(API_PREFIX).unwrap_or(trimmed);

        let http = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| AppError::Network(e.to_string()))?;

        Ok(Self {
            http,
            base_url: format!("{}{}", origin, API_PREFIX),
            access_token: Arc::new(RwLock::new(None)),
        })
    }

    pub fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    pub fn access_token(&self) -> Option<String> {
        self.access_token.read().ok().and_then(|t| t.clone())
    }

    pub fn set_access_token(&self, token: Option<String>) {
        if let Ok(mut guard) = self.access_token.write() {
            *guard = token;
        }
    }

    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, AppError> {
        self.send(Method::GET, path, None).await
    }

    pub(crate) async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, AppError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = serde_json::to_value(body)
            .map_err(|e| AppError::Validation(format!("Unserializable request body: {}", e)))?;
        self.send(Method::POST, path, Some(body)).await
    }

    pub(crate) async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T, AppError> {
        self.send(Method::POST, path, None).await
    }

    pub(crate) async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, AppError> {
        self.send(Method::DELETE, path, None).await
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<T, AppError> {
        let url = self.url(path);
        let mut retried = false;

        loop {
            let mut request = self.http.request(method.clone(), &url);
            if let Some(token) = self.access_token() {
                request = request.bearer_auth(token);
            }
            if let Some(body) = &body {
                request = request.json(body);
            }

            let response = request.send().await?;
            let status = response.status();

            if status == StatusCode::UNAUTHORIZED && !retried && !path.starts_with("/auth/") {
                retried = true;
                match self.refresh_session().await {
                    Ok(_) => continue,
                    Err(e) => tracing::debug!("Token refresh failed for {}: {}", path, e),
                }
            }

            let text = response.text().await?;
            return decode_response(status, &text);
        }
    }

    /// Exchanges the refresh cookie for a new access token.
    ///
    /// Sent directly instead of through `send` so a 401 here never
    /// triggers another refresh.
    pub async fn refresh_session(&self) -> Result<TokenResponse, AppError> {
        let response = self
            .http
            .post(self.url("/auth/refresh"))
            .send()
            .await?;
        let status = response.status();
        let text = response.text().await?;

        match decode_response::<TokenResponse>(status, &text) {
            Ok(tokens) => {
                self.set_access_token(Some(tokens.access_token.clone()));
                Ok(tokens)
            }
            Err(e) => {
                self.set_access_token(None);
                Err(e)
            }
        }
    }
}

/// Maps a response status and body to a decoded value or an `AppError`.
fn decode_response<T: DeserializeOwned>(status: StatusCode, text: &str) -> Result<T, AppError> {
    if !status.is_success() {
        return Err(status_error(status, text));
    }

    let source = if text.trim().is_empty() { "null" } else { text };

    serde_json::from_str(source).map_err(|_| AppError::Service {
        status: status.as_u16(),
        message: "Invalid JSON response".to_string(),
    })
}

fn status_error(status: StatusCode, text: &str) -> AppError {
    let message = error_message(status, text);

    match status {
        StatusCode::UNAUTHORIZED => AppError::AuthError(message),
        StatusCode::SERVICE_UNAVAILABLE => AppError::ServiceUnavailable(message),
        _ => AppError::Service {
            status: status.as_u16(),
            message,
        },
    }
}

/// Prefers the backend's `{"detail": "..."}` text over the raw body.
fn error_message(status: StatusCode, text: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(text) {
        if let Some(detail) = value.get("detail").and_then(|d| d.as_str()) {
            return detail.to_string();
        }
    }

    if !text.trim().is_empty() {
        return text.to_string();
    }

    status
        .canonical_reason()
        .unwrap_or("Request failed")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_normalization() {
        let plain = ApiClient::new("http://localhost:8000").unwrap();
        assert_eq!(plain.url("/meta"), "http://localhost:8000/api/v1/meta");

        let prefixed = ApiClient::new("http://localhost:8000/api/v1/").unwrap();
        assert_eq!(prefixed.url("meta"), "http://localhost:8000/api/v1/meta");
    }

    #[test]
    fn test_invalid_origin_rejected() {
        let err = ApiClient::new("not a url").unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_decode_error_statuses() {
        let err = decode_response::<serde_json::Value>(
            StatusCode::SERVICE_UNAVAILABLE,
            r#"{"detail":"AI hints not configured"}"#,
        )
        .unwrap_err();
        assert!(matches!(err, AppError::ServiceUnavailable(ref m) if m == "AI hints not configured"));

        let err = decode_response::<serde_json::Value>(StatusCode::NOT_FOUND, "").unwrap_err();
        assert!(matches!(err, AppError::Service { status: 404, ref message } if message == "Not Found"));
    }

    #[test]
    fn test_decode_empty_and_invalid_bodies() {
        let unit: () = decode_response(StatusCode::OK, "").unwrap();
        assert_eq!(unit, ());

        let err = decode_response::<serde_json::Value>(StatusCode::OK, "<html>").unwrap_err();
        assert!(matches!(err, AppError::Service { status: 200, ref message } if message == "Invalid JSON response"));
    }
}
