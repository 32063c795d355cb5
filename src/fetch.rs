//! HTTP requests with a bounded retry on transient auth failures.
//!
//! The backend answers 401 while a freshly minted session token is not yet
//! valid on its clock. Such a response is retried after a fixed delay; every
//! other outcome is final for the call.

use crate::errors::{FetchFailure, FetchResult, GENERIC_FAILURE};
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{error, warn};

pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(500);

#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub method: Method,
    pub bearer: Option<String>,
    pub query: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
}

impl RequestOptions {
    pub fn get() -> Self {
        Self {
            method: Method::GET,
            bearer: None,
            query: Vec::new(),
            body: None,
        }
    }

    pub fn post(body: serde_json::Value) -> Self {
        Self {
            method: Method::POST,
            body: Some(body),
            ..Self::get()
        }
    }

    pub fn bearer(mut self, token: impl Into<String>) -> Self {
        self.bearer = Some(token.into());
        self
    }

    pub fn query(mut self, pairs: Vec<(String, String)>) -> Self {
        self.query = pairs;
        self
    }
}

#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    max_retries: u32,
    retry_delay: Duration,
}

impl Fetcher {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }

    pub fn with_retry_policy(mut self, max_retries: u32, retry_delay: Duration) -> Self {
        self.max_retries = max_retries;
        self.retry_delay = retry_delay;
        self
    }

    pub async fn request<T: DeserializeOwned>(
        &self,
        url: &str,
        options: &RequestOptions,
    ) -> FetchResult<T> {
        self.request_with(url, options, self.max_retries, self.retry_delay)
            .await
    }

    /// Issues the request, retrying up to `max_retries` times on 401.
    pub async fn request_with<T: DeserializeOwned>(
        &self,
        url: &str,
        options: &RequestOptions,
        max_retries: u32,
        delay: Duration,
    ) -> FetchResult<T> {
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            let response = match self.send(url, options).await {
                Ok(response) => response,
                Err(err) => {
                    error!(url, attempt, "request failed: {err}");
                    return Err(FetchFailure::from(err));
                }
            };

            let status = response.status();
            if status.is_success() {
                return response.json::<T>().await.map_err(|err| {
                    error!(url, "failed to decode response body: {err}");
                    FetchFailure::from(err)
                });
            }

            if status == StatusCode::UNAUTHORIZED && attempt <= max_retries {
                warn!(url, attempt, "token not yet valid, retrying");
                sleep(delay).await;
                continue;
            }

            let message = error_message(&response.text().await.unwrap_or_default());
            error!(url, attempt, status = status.as_u16(), "request failed: {message}");
            return Err(FetchFailure::http(status.as_u16(), message));
        }
    }

    async fn send(
        &self,
        url: &str,
        options: &RequestOptions,
    ) -> Result<reqwest::Response, reqwest::Error> {
        let mut builder = self
            .client
            .request(options.method.clone(), url)
            .header(reqwest::header::CONTENT_TYPE, "application/json");
        if let Some(token) = &options.bearer {
            builder = builder.bearer_auth(token);
        }
        if !options.query.is_empty() {
            builder = builder.query(&options.query);
        }
        if let Some(body) = &options.body {
            builder = builder.json(body);
        }
        builder.send().await
    }
}

impl Default for Fetcher {
    fn default() -> Self {
        Self::new(Client::new())
    }
}

/// Pulls the server's explanation out of an error body.
fn error_message(body: &str) -> String {
    let parsed: Option<serde_json::Value> = serde_json::from_str(body).ok();
    parsed
        .as_ref()
        .and_then(|value| value.get("error").or_else(|| value.get("message")))
        .and_then(|value| value.as_str())
        .filter(|message| !message.trim().is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| GENERIC_FAILURE.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_message_prefers_error_then_message() {
        assert_eq!(error_message(r#"{"error":"bad filter"}"#), "bad filter");
        assert_eq!(error_message(r#"{"message":"Token not yet valid"}"#), "Token not yet valid");
        assert_eq!(
            error_message(r#"{"error":"first","message":"second"}"#),
            "first"
        );
    }

    #[test]
    fn error_message_falls_back_to_generic() {
        assert_eq!(error_message(""), GENERIC_FAILURE);
        assert_eq!(error_message("<html>oops</html>"), GENERIC_FAILURE);
        assert_eq!(error_message(r#"{"error":""}"#), GENERIC_FAILURE);
    }

    #[test]
    fn post_options_carry_body_and_method() {
        let options = RequestOptions::post(serde_json::json!({"a": 1})).bearer("tok");
        assert_eq!(options.method, Method::POST);
        assert_eq!(options.bearer.as_deref(), Some("tok"));
        assert!(options.body.is_some());
    }
}
