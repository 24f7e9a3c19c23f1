//! Mock backend for testing without a live vision model.
//!
//! [`MockBackend`] returns pre-configured replies in order, so recognition
//! flows can be tested deterministically.
//!
//! # Example
//!
//! ```
//! use shipdoc_recognizer::backend::MockBackend;
//!
//! let mock = MockBackend::fixed("产品名称: 钢板");
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use reqwest::Client;

use super::{Backend, ModelReply, VisionRequest};
use crate::error::Result;

/// A test backend that returns canned replies in order.
///
/// Cycles back to the beginning when all replies have been consumed. The
/// prompts it received are kept for inspection.
#[derive(Debug)]
pub struct MockBackend {
    replies: Vec<String>,
    index: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl MockBackend {
    /// Create a mock backend with the given canned replies.
    pub fn new(replies: Vec<String>) -> Self {
        assert!(!replies.is_empty(), "MockBackend requires at least one reply");
        Self {
            replies,
            index: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Create a mock that always returns the same reply.
    pub fn fixed(reply: impl Into<String>) -> Self {
        Self::new(vec![reply.into()])
    }

    /// Prompts received so far, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .map(|p| p.clone())
            .unwrap_or_default()
    }

    fn next_reply(&self) -> String {
        let idx = self.index.fetch_add(1, Ordering::Relaxed) % self.replies.len();
        self.replies[idx].clone()
    }
}

#[async_trait]
impl Backend for MockBackend {
    async fn complete(
        &self,
        _client: &Client,
        _endpoint: &str,
        request: &VisionRequest,
    ) -> Result<ModelReply> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(request.prompt.clone());
        }
        Ok(ModelReply {
            text: self.next_reply(),
            status: 200,
            metadata: None,
        })
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::{EncodedImage, ImageFormat};

    fn request() -> VisionRequest {
        VisionRequest {
            model: "test".to_string(),
            prompt: "识别".to_string(),
            image: EncodedImage::encode(b"x", ImageFormat::Png),
            temperature: 0.2,
            top_p: 0.8,
            max_tokens: 16,
        }
    }

    #[tokio::test]
    async fn test_mock_fixed_reply() {
        let mock = MockBackend::fixed("[]");
        let reply = mock.complete(&Client::new(), "http://unused", &request()).await.unwrap();
        assert_eq!(reply.text, "[]");
        assert_eq!(reply.status, 200);
        assert_eq!(mock.prompts(), vec!["识别".to_string()]);
    }

    #[tokio::test]
    async fn test_mock_cycles_replies() {
        let mock = MockBackend::new(vec!["first".into(), "second".into()]);
        let client = Client::new();
        let r1 = mock.complete(&client, "http://unused", &request()).await.unwrap();
        let r2 = mock.complete(&client, "http://unused", &request()).await.unwrap();
        let r3 = mock.complete(&client, "http://unused", &request()).await.unwrap();
        assert_eq!(r1.text, "first");
        assert_eq!(r2.text, "second");
        assert_eq!(r3.text, "first"); // cycles
    }
}
