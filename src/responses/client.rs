use std::env;
use std::time::Duration;

use log::debug;
use reqwest::StatusCode;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

#[derive(Debug, Clone, Serialize)]
pub struct CreateResponseRequest<'a> {
    pub model: &'a str,
    pub input: &'a str,
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error(
        "{key_env} not found. Set it in the environment or provide --env-file pointing to a .env"
    )]
    MissingApiKey { key_env: &'static str },
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Request failed: API error {status}: {body}")]
    Api { status: StatusCode, body: String },
    #[error("Request failed: response body is not valid JSON: {0}")]
    InvalidBody(#[from] serde_json::Error),
}

pub fn is_api_key_present() -> bool {
    api_key_from(env::var(API_KEY_ENV).ok()).is_some()
}

/// `POST` target for a base URL such as `https://api.openai.com/v1`.
pub fn endpoint_for(base_url: &str) -> String {
    format!("{}/responses", base_url.trim_end_matches('/'))
}

fn api_key_from(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Client for the Responses API `create` call.
#[derive(Debug, Clone)]
pub struct ResponsesClient {
    api_key: String,
    base_url: String,
    timeout: Option<Duration>,
    client: reqwest::Client,
}

impl ResponsesClient {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: base_url.into(),
            timeout: None,
            client: reqwest::Client::new(),
        }
    }

    /// Builds a client from `OPENAI_API_KEY`.
    pub fn from_env(base_url: impl Into<String>) -> Result<Self, ProviderError> {
        let api_key = api_key_from(env::var(API_KEY_ENV).ok()).ok_or(
            ProviderError::MissingApiKey {
                key_env: API_KEY_ENV,
            },
        )?;
        Ok(Self::new(api_key, base_url))
    }

    pub fn with_timeout(mut self, timeout_secs: Option<u64>) -> Self {
        self.timeout = timeout_secs.map(Duration::from_secs);
        self
    }

    pub fn endpoint(&self) -> String {
        endpoint_for(&self.base_url)
    }

    /// Sends `input` to `model` and returns the raw response body.
    pub async fn create(&self, model: &str, input: &str) -> Result<Value, ProviderError> {
        let payload = CreateResponseRequest { model, input };
        let mut request = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&payload);

        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        debug!("POST {} model={model}", self.endpoint());
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api { status, body });
        }

        let body = response.text().await?;
        debug!("response status={status} bytes={}", body.len());
        Ok(serde_json::from_str(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::{api_key_from, CreateResponseRequest, ProviderError, ResponsesClient};
    use reqwest::StatusCode;
    use serde_json::json;

    #[test]
    fn endpoint_ignores_trailing_slash() {
        let client = ResponsesClient::new("key", "https://example.test/v1/");
        assert_eq!(client.endpoint(), "https://example.test/v1/responses");
    }

    #[test]
    fn request_serializes_model_and_input() {
        let payload = CreateResponseRequest {
            model: "gpt-4.1-nano",
            input: "2+2?",
        };
        assert_eq!(
            serde_json::to_value(payload).unwrap(),
            json!({ "model": "gpt-4.1-nano", "input": "2+2?" })
        );
    }

    #[test]
    fn blank_api_key_counts_as_missing() {
        assert_eq!(api_key_from(None), None);
        assert_eq!(api_key_from(Some("   ".to_string())), None);
        assert_eq!(
            api_key_from(Some(" sk-test \n".to_string())),
            Some("sk-test".to_string())
        );
    }

    #[test]
    fn errors_name_the_failure() {
        let missing = ProviderError::MissingApiKey {
            key_env: "OPENAI_API_KEY",
        };
        assert!(missing.to_string().starts_with("OPENAI_API_KEY not found."));

        let api = ProviderError::Api {
            status: StatusCode::UNAUTHORIZED,
            body: "bad key".to_string(),
        };
        assert_eq!(
            api.to_string(),
            "Request failed: API error 401 Unauthorized: bad key"
        );
    }
}
