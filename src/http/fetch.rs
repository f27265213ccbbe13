use reqwest::header::{CONTENT_TYPE, HeaderMap};
use reqwest::{Client, StatusCode, redirect};
use url::Url;

use super::timer::TimerConfig;
use crate::args::DEFAULT_USER_AGENT;
use crate::error::{AppError, AppResult, HttpError, ValidationError};

/// Status, headers and body text of a one-shot request.
#[derive(Debug, Clone)]
pub struct FetchedResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

/// One-shot GET/POST/HEAD requests over a pooled `reqwest` client.
#[derive(Debug, Clone)]
pub struct FetchClient {
    client: Client,
}

impl FetchClient {
    /// # Errors
    ///
    /// Returns an error when the client cannot be built.
    pub fn new(config: &TimerConfig) -> AppResult<Self> {
        let client = Client::builder()
            .user_agent(DEFAULT_USER_AGENT)
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .danger_accept_invalid_certs(config.insecure)
            .redirect(redirect::Policy::limited(10))
            .build()
            .map_err(|source| AppError::http(HttpError::BuildClientFailed { source }))?;
        Ok(Self { client })
    }

    /// # Errors
    ///
    /// Returns an error when the request or the body read fails.
    pub async fn get(&self, url: &Url) -> AppResult<FetchedResponse> {
        let response = self.client.get(url.clone()).send().await?;
        read_response(response, true).await
    }

    /// Sends `body` as JSON. The body is validated before anything is sent.
    ///
    /// # Errors
    ///
    /// Returns a validation error for malformed JSON, otherwise an error when
    /// the request or the body read fails.
    pub async fn post_json(&self, url: &Url, body: &str) -> AppResult<FetchedResponse> {
        validate_json_body(body)?;
        let response = self
            .client
            .post(url.clone())
            .header(CONTENT_TYPE, "application/json")
            .body(body.to_owned())
            .send()
            .await?;
        read_response(response, true).await
    }

    /// # Errors
    ///
    /// Returns an error when the request fails.
    pub async fn head(&self, url: &Url) -> AppResult<FetchedResponse> {
        let response = self.client.head(url.clone()).send().await?;
        read_response(response, false).await
    }
}

/// Rejects anything that is not a single well-formed JSON value.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidJsonBody`] with the parser's message.
pub fn validate_json_body(body: &str) -> Result<(), ValidationError> {
    serde_json::from_str::<serde_json::Value>(body)
        .map(|_| ())
        .map_err(|source| ValidationError::InvalidJsonBody { source })
}

async fn read_response(response: reqwest::Response, with_body: bool) -> AppResult<FetchedResponse> {
    let status = response.status();
    let headers = response.headers().clone();
    let body = if with_body {
        response.text().await?
    } else {
        String::new()
    };
    Ok(FetchedResponse {
        status,
        headers,
        body,
    })
}
