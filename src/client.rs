//! Read-only client for the headless CMS.
//!
//! The [`ContentClient`] trait is the seam between the query layer and the
//! network: [`LiveQuery`](crate::live::LiveQuery) only ever sees an
//! `Arc<dyn ContentClient>`, so tests substitute a recording mock and the
//! binary injects an [`HttpContentClient`] built once from configuration.
//!
//! ## Wire format
//!
//! Queries go to the hosted content API's query endpoint:
//!
//! ```text
//! GET {base}/v{api_version}/data/query/{dataset}?query=<q>&$slug="implants"
//! ```
//!
//! Each parameter is sent as `$name=<json>`. Requests whose URL would exceed
//! [`MAX_GET_URL_LEN`] are sent as `POST` with a `{"query", "params"}` JSON
//! body instead. A successful response wraps the payload as
//! `{"result": ..., "ms": ...}`; only `result` is returned.
//!
//! There is no write path. The configuration has no token field, so this
//! client cannot authenticate for mutations even by accident.

use crate::config::ContentConfig;
use crate::query::{Params, canonical_json};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// URL length above which queries switch from `GET` to `POST`.
pub const MAX_GET_URL_LEN: usize = 11_264;

/// Failure of a content fetch.
///
/// Cloneable so it can sit inside a [`QueryState`](crate::state::QueryState)
/// shared through a watch channel; underlying errors are kept as messages.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContentError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("content API returned {status}: {message}")]
    Remote { status: u16, message: String },
    #[error("unexpected payload: {0}")]
    Decode(String),
}

impl From<serde_json::Error> for ContentError {
    fn from(e: serde_json::Error) -> Self {
        ContentError::Decode(e.to_string())
    }
}

/// A read-only connection to the content store.
///
/// Implementations must be safe to call concurrently; each call is an
/// independent request.
#[async_trait]
pub trait ContentClient: Send + Sync {
    /// Run `query` with `params` and return the raw result payload.
    async fn fetch(&self, query: &str, params: &Params) -> Result<Value, ContentError>;
}

/// [`ContentClient`] over the hosted HTTP query API.
pub struct HttpContentClient {
    http: reqwest::Client,
    endpoint: String,
}

impl HttpContentClient {
    pub fn new(config: &ContentConfig) -> Result<Self, ContentError> {
        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("clinic-content/", env!("CARGO_PKG_VERSION")));
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder
            .build()
            .map_err(|e| ContentError::Transport(e.to_string()))?;

        let endpoint = config.query_endpoint();
        debug!(endpoint = %endpoint, use_cdn = config.use_cdn, "Content client created");
        Ok(Self { http, endpoint })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn build_request(&self, query: &str, params: &Params) -> Result<reqwest::Request, ContentError> {
        let mut pairs: Vec<(String, String)> = Vec::with_capacity(params.len() + 1);
        pairs.push(("query".to_string(), query.to_string()));
        for (name, value) in params {
            pairs.push((format!("${name}"), canonical_json(value)));
        }

        let get = self
            .http
            .get(&self.endpoint)
            .header(reqwest::header::ACCEPT, "application/json")
            .query(&pairs)
            .build()
            .map_err(|e| ContentError::Transport(e.to_string()))?;
        if get.url().as_str().len() <= MAX_GET_URL_LEN {
            return Ok(get);
        }

        debug!(url_len = get.url().as_str().len(), "Query too long for GET, using POST");
        self.http
            .post(&self.endpoint)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&serde_json::json!({ "query": query, "params": params }))
            .build()
            .map_err(|e| ContentError::Transport(e.to_string()))
    }
}

#[async_trait]
impl ContentClient for HttpContentClient {
    async fn fetch(&self, query: &str, params: &Params) -> Result<Value, ContentError> {
        let request = self.build_request(query, params)?;
        debug!(method = %request.method(), params = params.len(), "Querying content API");

        let response = self
            .http
            .execute(request)
            .await
            .map_err(|e| ContentError::Transport(e.to_string()))?;
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| ContentError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(ContentError::Remote {
                status: status.as_u16(),
                message: remote_message(&body, status),
            });
        }

        let mut envelope: Value = serde_json::from_slice(&body)?;
        match envelope.get_mut("result") {
            Some(result) => Ok(result.take()),
            None => Ok(Value::Null),
        }
    }
}

/// Pull a human-readable message out of an error body.
///
/// Query errors carry `error.description`; gateway errors carry `message`.
fn remote_message(body: &[u8], status: StatusCode) -> String {
    let parsed: Option<Value> = serde_json::from_slice(body).ok();
    parsed
        .as_ref()
        .and_then(|v| {
            v.pointer("/error/description")
                .or_else(|| v.get("message"))
                .and_then(Value::as_str)
        })
        .map(str::to_string)
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown error").to_string())
}
