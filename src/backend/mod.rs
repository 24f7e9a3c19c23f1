//! Backend trait and normalized vision request/reply types.
//!
//! The [`Backend`] trait abstracts over vision-model providers, translating a
//! provider-agnostic [`VisionRequest`] into an HTTP call and returning the
//! completion text as a [`ModelReply`].
//!
//! ## Architecture
//!
//! ```text
//! Recognizer ──► VisionRequest ──► with_backoff ──► Backend::complete() ──► ModelReply
//!                                                        │
//!                                              ┌─────────┴─────────┐
//!                                        QwenVlBackend        MockBackend
//!                                    /v1/chat/completions    canned replies
//! ```

pub mod backoff;
pub mod mock;
pub mod qwen;

pub use backoff::BackoffConfig;
pub use mock::MockBackend;
pub use qwen::QwenVlBackend;

use crate::error::{RecognizeError, Result};
use crate::image::EncodedImage;
use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// Callback invoked before each transport retry.
///
/// Arguments: `(attempt_number, delay_before_retry, reason_for_retry)`.
pub type RetryCallback<'a> = Option<&'a mut (dyn FnMut(u32, Duration, &str) + Send)>;

/// A normalized vision request: one instruction plus one image.
#[derive(Debug, Clone)]
pub struct VisionRequest {
    /// Model identifier (e.g. `"qwen-vl"`).
    pub model: String,
    /// Instruction text sent alongside the image.
    pub prompt: String,
    pub image: EncodedImage,
    pub temperature: f64,
    pub top_p: f64,
    pub max_tokens: u32,
}

/// A normalized model reply.
#[derive(Debug)]
pub struct ModelReply {
    /// The completion text, unparsed.
    pub text: String,

    /// HTTP status code (for diagnostics/logging).
    pub status: u16,

    /// Provider-specific metadata (token usage, model id).
    pub metadata: Option<serde_json::Value>,
}

/// Abstraction over vision-model providers.
///
/// Object-safe; used as `Arc<dyn Backend>`.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Execute one completion against `endpoint`.
    async fn complete(
        &self,
        client: &Client,
        endpoint: &str,
        request: &VisionRequest,
    ) -> Result<ModelReply>;

    /// Human-readable name for logging and diagnostics.
    fn name(&self) -> &'static str;
}

/// Whether an error is worth retrying under `config`.
///
/// Retryable: [`RecognizeError::HttpError`] with a status in
/// `config.retryable_statuses`, and transport-level [`RecognizeError::Request`]
/// failures other than body decoding.
pub fn is_retryable(error: &RecognizeError, config: &BackoffConfig) -> bool {
    match error {
        RecognizeError::HttpError { status, .. } => config.retryable_statuses.contains(status),
        RecognizeError::Request(e) => !e.is_decode(),
        _ => false,
    }
}

/// Execute a backend call with transport-level retry and exponential backoff.
///
/// Returns the first successful reply, or the last error once retries are
/// exhausted or a non-retryable error occurs.
pub async fn with_backoff(
    backend: &Arc<dyn Backend>,
    client: &Client,
    endpoint: &str,
    request: &VisionRequest,
    config: &BackoffConfig,
    mut on_retry: RetryCallback<'_>,
) -> Result<ModelReply> {
    let mut last_error: Option<RecognizeError> = None;

    for attempt in 0..=config.max_retries {
        if attempt > 0 {
            let delay = match &last_error {
                Some(RecognizeError::HttpError {
                    retry_after: Some(ra),
                    ..
                }) if config.respect_retry_after => *ra,
                _ => config.delay_for_attempt(attempt - 1),
            };

            let reason = last_error
                .as_ref()
                .map(|e| e.to_string())
                .unwrap_or_default();
            warn!(backend = backend.name(), attempt, ?delay, %reason, "retrying model call");

            if let Some(ref mut cb) = on_retry {
                cb(attempt, delay, &reason);
            }

            tokio::time::sleep(delay).await;
        }

        match backend.complete(client, endpoint, request).await {
            Ok(reply) => return Ok(reply),
            Err(e) => {
                if attempt < config.max_retries && is_retryable(&e, config) {
                    last_error = Some(e);
                    continue;
                }
                return Err(e);
            }
        }
    }

    Err(last_error.unwrap_or(RecognizeError::Other(
        "backoff loop exited unexpectedly".into(),
    )))
}
