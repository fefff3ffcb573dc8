//! Scoring backend access.
//!
//! [`ScoringBackend`] is the seam the prediction pipeline talks through;
//! [`HttpBackend`] implements it over JSON/HTTPS with `reqwest`.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

pub use reqwest::Url;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

use crate::protocol::{PredictRequest, PredictResponse, ProgressResponse, ResultsResponse};

/// Type alias for a boxed future that can be sent between threads.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Errors talking to the scoring backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The configured base URL cannot carry endpoint paths.
    #[error("invalid backend url {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// Network failure, TLS failure or similar.
    #[error("HTTP request error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("backend returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The body was not the expected JSON.
    #[error("malformed backend response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Trait for scoring backends.
///
/// Methods return boxed futures for dyn-compatibility.
pub trait ScoringBackend: Send + Sync {
    fn submit<'a>(
        &'a self,
        request: &'a PredictRequest,
    ) -> BoxFuture<'a, Result<PredictResponse, BackendError>>;

    fn progress<'a>(
        &'a self,
        session_id: &'a str,
    ) -> BoxFuture<'a, Result<ProgressResponse, BackendError>>;

    fn results<'a>(
        &'a self,
        session_id: &'a str,
    ) -> BoxFuture<'a, Result<ResultsResponse, BackendError>>;
}

#[derive(Debug, Clone)]
pub struct HttpBackend {
    http: reqwest::Client,
    base_url: Url,
}

impl HttpBackend {
    /// `timeout` bounds each request; `None` waits indefinitely.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, BackendError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Self::with_client(builder.build()?, base_url)
    }

    pub fn with_client(http: reqwest::Client, base_url: &str) -> Result<Self, BackendError> {
        let invalid = |reason: String| BackendError::InvalidUrl {
            url: base_url.to_string(),
            reason,
        };
        let base_url = Url::parse(base_url).map_err(|e| invalid(e.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(invalid("cannot be a base".to_string()));
        }
        Ok(Self { http, base_url })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, BackendError> {
        endpoint_url(&self.base_url, segments)
    }

    async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, BackendError> {
        let status = resp.status();
        let text = resp.text().await?;
        if !status.is_success() {
            return Err(BackendError::Status {
                status: status.as_u16(),
                body: text,
            });
        }
        Ok(serde_json::from_str(&text)?)
    }

    async fn get_json<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, BackendError> {
        let url = self.endpoint(segments)?;
        debug!("GET {url}");
        let resp = self.http.get(url).send().await?;
        Self::decode(resp).await
    }
}

/// `base` with `segments` appended, each percent-encoded as one path segment.
pub fn endpoint_url(base: &Url, segments: &[&str]) -> Result<Url, BackendError> {
    let mut url = base.clone();
    {
        let mut path = url.path_segments_mut().map_err(|_| BackendError::InvalidUrl {
            url: base.to_string(),
            reason: "cannot be a base".to_string(),
        })?;
        path.pop_if_empty();
        path.extend(segments);
    }
    Ok(url)
}

/// Imagery link for a tile's detail popup: `{base}/tiles/{tile_id}.png`.
pub fn tile_image_url(base: &Url, tile_id: &str) -> Result<Url, BackendError> {
    endpoint_url(base, &["tiles", &format!("{tile_id}.png")])
}

impl ScoringBackend for HttpBackend {
    fn submit<'a>(
        &'a self,
        request: &'a PredictRequest,
    ) -> BoxFuture<'a, Result<PredictResponse, BackendError>> {
        Box::pin(async move {
            let url = self.endpoint(&["predict"])?;
            debug!("POST {url} {request:?}");
            let resp = self.http.post(url).json(request).send().await?;
            Self::decode(resp).await
        })
    }

    fn progress<'a>(
        &'a self,
        session_id: &'a str,
    ) -> BoxFuture<'a, Result<ProgressResponse, BackendError>> {
        Box::pin(async move { self.get_json(&["progress", session_id]).await })
    }

    fn results<'a>(
        &'a self,
        session_id: &'a str,
    ) -> BoxFuture<'a, Result<ResultsResponse, BackendError>> {
        Box::pin(async move { self.get_json(&["results", session_id]).await })
    }
}
