//! HTTP transport for the VKontakte API.
//!
//! - GET `{base_url}/{method}` with the call parameters, the access token,
//!   and the pinned API version.
//! - Client-side rate limiting via [`governor`]; the API rejects bursts
//!   above a few requests per second.
//! - The `{"error": {...}}` envelope becomes [`Error::Api`]. Nothing is
//!   retried here.

use std::num::NonZeroU32;
use std::time::Duration;

use async_trait::async_trait;
use governor::{Quota, RateLimiter};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;
use vkvideo_common::{Error, Result};

use super::{Params, VkApi};
use crate::config::ApiConfig;

#[derive(Debug, Deserialize)]
struct Envelope {
    response: Option<Value>,
    error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error_code: i64,
    #[serde(default)]
    error_msg: String,
}

/// Unwrap an API response body into its payload.
pub fn decode_envelope(body: Value) -> Result<Value> {
    let envelope: Envelope = serde_json::from_value(body)?;
    if let Some(error) = envelope.error {
        return Err(Error::api(error.error_code, error.error_msg));
    }
    envelope
        .response
        .ok_or_else(|| Error::parse("response envelope has neither `response` nor `error`"))
}

/// [`VkApi`] over HTTPS.
///
/// ```no_run
/// use vkvideo::api::HttpVkApi;
/// use vkvideo::config::ApiConfig;
///
/// let api = HttpVkApi::new(&ApiConfig::default()).unwrap();
/// ```
pub struct HttpVkApi {
    client: reqwest::Client,
    base_url: String,
    access_token: Option<String>,
    version: String,
    lang: Option<String>,
    rate_limiter: governor::RateLimiter<
        governor::state::NotKeyed,
        governor::state::InMemoryState,
        governor::clock::DefaultClock,
    >,
}

impl HttpVkApi {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::transport(format!("failed to build HTTP client: {e}")))?;

        let per_second = NonZeroU32::new(config.requests_per_second)
            .ok_or_else(|| Error::invalid_input("requests_per_second must be positive"))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            access_token: config.access_token.clone().filter(|t| !t.is_empty()),
            version: config.version.clone(),
            lang: config.lang.clone(),
            rate_limiter: RateLimiter::direct(Quota::per_second(per_second)),
        })
    }

    fn query<'a>(&'a self, params: &'a Params) -> Vec<(&'a str, &'a str)> {
        let mut query: Vec<(&str, &str)> = params.iter().collect();
        if let Some(token) = &self.access_token {
            query.push(("access_token", token));
        }
        if let Some(lang) = &self.lang {
            query.push(("lang", lang));
        }
        query.push(("v", &self.version));
        query
    }
}

#[async_trait]
impl VkApi for HttpVkApi {
    async fn call(&self, method: &str, params: &Params) -> Result<Value> {
        self.rate_limiter.until_ready().await;

        let url = format!("{}/{}", self.base_url, method);
        // The token is appended after logging so it never reaches the logs.
        debug!(method, params = %params, "VK API call");

        let body: Value = self
            .client
            .get(&url)
            .query(&self.query(params))
            .send()
            .await
            .map_err(|e| Error::transport(format!("{method}: {e}")))?
            .error_for_status()
            .map_err(|e| Error::transport(format!("{method}: {e}")))?
            .json()
            .await
            .map_err(|e| Error::parse(format!("{method}: {e}")))?;

        decode_envelope(body)
    }
}
