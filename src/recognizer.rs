//! Image recognition: intake, model call, and reply interpretation.
//!
//! [`Recognizer`] ties the collaborators together. It validates and encodes
//! the image, sends it with the extraction prompt through the configured
//! [`Backend`], and runs the reply through [`interpret`].

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use tracing::{info, instrument, warn};

use crate::backend::{self, Backend, QwenVlBackend, VisionRequest};
use crate::config::RecognizerConfig;
use crate::diagnostics::ParseDiagnostics;
use crate::error::{RecognizeError, Result};
use crate::events::{emit, Event, EventHandler};
use crate::image::{self, EncodedImage, ImageFormat};
use crate::pipeline::{interpret, Warning};
use crate::presentation::RecognitionView;
use crate::schema::DocumentRecord;

/// Outcome of recognizing one image.
#[derive(Debug, Clone)]
pub struct Recognition {
    pub records: Vec<DocumentRecord>,
    pub warning: Option<Warning>,
    pub diagnostics: ParseDiagnostics,
    /// The reply text exactly as the model returned it.
    pub raw_reply: String,
    /// Model that produced the reply.
    pub model: String,
}

impl Recognition {
    /// Presentation bundle for the result page.
    pub fn view(&self) -> RecognitionView {
        RecognitionView::new(&self.records, self.warning)
    }

    pub fn is_failure(&self) -> bool {
        self.warning == Some(Warning::Unparseable)
    }
}

/// Recognizes shipping-document images.
///
/// Cheap to share: wrap in an `Arc` and call from concurrent tasks.
///
/// # Example
///
/// ```no_run
/// use shipdoc_recognizer::{Recognizer, RecognizerConfig};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let recognizer = Recognizer::builder(RecognizerConfig::from_env()?).build()?;
///     let result = recognizer.recognize_path("uploads/delivery-note.jpg").await?;
///     for record in &result.records {
///         println!("{} {}", record.product_name, record.batch_number);
///     }
///     Ok(())
/// }
/// ```
pub struct Recognizer {
    client: Client,
    config: RecognizerConfig,
    backend: Arc<dyn Backend>,
    event_handler: Option<Arc<dyn EventHandler>>,
}

impl Recognizer {
    pub fn builder(config: RecognizerConfig) -> RecognizerBuilder {
        RecognizerBuilder {
            config,
            client: None,
            backend: None,
            event_handler: None,
        }
    }

    pub fn config(&self) -> &RecognizerConfig {
        &self.config
    }

    /// Recognize an image file. The extension selects the image format.
    pub async fn recognize_path(&self, path: impl AsRef<Path>) -> Result<Recognition> {
        let path = path.as_ref();
        let format = ImageFormat::from_path(path, &self.config.allowed_extensions)?;
        let size = tokio::fs::metadata(path).await?.len();
        image::check_size(size, self.config.max_image_bytes)?;

        let bytes = tokio::fs::read(path).await?;
        let source = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        self.recognize_bytes(&source, &bytes, format).await
    }

    /// Recognize an in-memory image. `source` labels logs and events.
    #[instrument(skip(self, bytes), fields(bytes = bytes.len()))]
    pub async fn recognize_bytes(
        &self,
        source: &str,
        bytes: &[u8],
        format: ImageFormat,
    ) -> Result<Recognition> {
        image::check_size(bytes.len() as u64, self.config.max_image_bytes)?;
        emit(
            &self.event_handler,
            Event::RecognitionStart {
                source: source.to_string(),
                bytes: bytes.len(),
            },
        );

        let request = VisionRequest {
            model: self.config.model.clone(),
            prompt: self.config.prompt.clone(),
            image: EncodedImage::encode(bytes, format),
            temperature: self.config.temperature,
            top_p: self.config.top_p,
            max_tokens: self.config.max_tokens,
        };

        let (reply, transport_retries, backoff_total_ms) =
            match self.call_backend(source, &request).await {
                Ok(result) => result,
                Err(e) => {
                    warn!(error = %e, "model call failed");
                    emit(
                        &self.event_handler,
                        Event::RecognitionEnd {
                            source: source.to_string(),
                            records: 0,
                            warning: None,
                            ok: false,
                        },
                    );
                    return Err(e);
                }
            };

        let mut interpretation = interpret(&reply.text);
        interpretation.diagnostics.transport_retries = transport_retries;
        interpretation.diagnostics.backoff_total_ms = backoff_total_ms;

        if interpretation.diagnostics.used_fallback() {
            emit(
                &self.event_handler,
                Event::FallbackUsed {
                    source: source.to_string(),
                    reason: interpretation
                        .diagnostics
                        .strict_error
                        .clone()
                        .unwrap_or_default(),
                },
            );
        }

        info!(
            records = interpretation.records.len(),
            warning = interpretation.warning.map(Warning::as_str),
            "recognition finished"
        );
        emit(
            &self.event_handler,
            Event::RecognitionEnd {
                source: source.to_string(),
                records: interpretation.records.len(),
                warning: interpretation.warning,
                ok: !interpretation.is_recognition_failure(),
            },
        );

        Ok(Recognition {
            records: interpretation.records,
            warning: interpretation.warning,
            diagnostics: interpretation.diagnostics,
            raw_reply: reply.text,
            model: self.config.model.clone(),
        })
    }

    /// Call the backend with transport retry, tracking retries and backoff time.
    ///
    /// Returns `(reply, transport_retries, backoff_total_ms)`.
    async fn call_backend(
        &self,
        source: &str,
        request: &VisionRequest,
    ) -> Result<(backend::ModelReply, u32, u64)> {
        let mut transport_retries: u32 = 0;
        let mut backoff_total_ms: u64 = 0;
        let event_handler = &self.event_handler;

        let mut on_retry = |attempt: u32, delay: Duration, reason: &str| {
            transport_retries = attempt;
            backoff_total_ms += delay.as_millis() as u64;
            emit(
                event_handler,
                Event::TransportRetry {
                    source: source.to_string(),
                    attempt,
                    delay_ms: delay.as_millis() as u64,
                    reason: reason.to_string(),
                },
            );
        };

        let reply = backend::with_backoff(
            &self.backend,
            &self.client,
            &self.config.api_url,
            request,
            &self.config.backoff,
            Some(&mut on_retry),
        )
        .await?;

        Ok((reply, transport_retries, backoff_total_ms))
    }
}

impl std::fmt::Debug for Recognizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Recognizer")
            .field("config", &self.config)
            .field("backend", &self.backend.name())
            .field("has_event_handler", &self.event_handler.is_some())
            .finish()
    }
}

/// Builder for [`Recognizer`].
pub struct RecognizerBuilder {
    config: RecognizerConfig,
    client: Option<Client>,
    backend: Option<Arc<dyn Backend>>,
    event_handler: Option<Arc<dyn EventHandler>>,
}

impl RecognizerBuilder {
    /// Set the HTTP client. If not set, one is built with the configured timeout.
    pub fn client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Set the model backend. Default: [`QwenVlBackend`] with the configured key.
    pub fn backend(mut self, backend: Arc<dyn Backend>) -> Self {
        self.backend = Some(backend);
        self
    }

    pub fn event_handler(mut self, handler: Arc<dyn EventHandler>) -> Self {
        self.event_handler = Some(handler);
        self
    }

    pub fn build(self) -> Result<Recognizer> {
        self.config.validate()?;

        let client = match self.client {
            Some(client) => client,
            None => Client::builder()
                .timeout(self.config.timeout)
                .build()
                .map_err(|e| {
                    RecognizeError::InvalidConfig(format!("failed to build HTTP client: {e}"))
                })?,
        };

        let backend = self.backend.unwrap_or_else(|| {
            let mut qwen = QwenVlBackend::new();
            if let Some(ref key) = self.config.api_key {
                qwen = qwen.with_api_key(key.clone());
            }
            Arc::new(qwen)
        });

        Ok(Recognizer {
            client,
            config: self.config,
            backend,
            event_handler: self.event_handler,
        })
    }
}
