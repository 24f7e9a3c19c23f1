//! Backend for Qwen-VL behind an OpenAI-compatible chat endpoint.
//!
//! One user message carries two content parts: the instruction text and the
//! image as a base64 `data:` URL. The reply text is read from
//! `choices[0].message.content`, which some gateways return as a list of
//! text parts instead of a plain string.

use super::{Backend, ModelReply, VisionRequest};
use crate::error::{RecognizeError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

/// Backend for Qwen-VL (and other OpenAI-compatible vision endpoints).
///
/// # Example
///
/// ```
/// use shipdoc_recognizer::backend::QwenVlBackend;
///
/// let backend = QwenVlBackend::new().with_api_key("sk-...");
/// assert!(backend.has_api_key());
/// ```
#[derive(Clone, Default)]
pub struct QwenVlBackend {
    /// Sent as `Authorization: Bearer {key}` when set.
    pub(crate) api_key: Option<String>,
}

impl std::fmt::Debug for QwenVlBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QwenVlBackend")
            .field("api_key", &self.api_key.as_deref().map(redact_key))
            .finish()
    }
}

/// Show a short prefix of a credential for identification.
pub(crate) fn redact_key(key: &str) -> String {
    match key.char_indices().nth(6) {
        Some((idx, _)) => format!("{}***", &key[..idx]),
        None => "***".to_string(),
    }
}

impl QwenVlBackend {
    pub fn new() -> Self {
        Self { api_key: None }
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Build the request body for the chat completions endpoint.
    fn build_body(request: &VisionRequest) -> Value {
        json!({
            "model": request.model,
            "messages": [{
                "role": "user",
                "content": [
                    {"type": "text", "text": request.prompt},
                    {"type": "image_url", "image_url": {"url": request.image.data_url()}},
                ],
            }],
            "temperature": request.temperature,
            "top_p": request.top_p,
            "max_tokens": request.max_tokens,
            "stream": false,
        })
    }

    fn build_http_request(
        &self,
        client: &Client,
        url: &str,
        body: &Value,
    ) -> reqwest::RequestBuilder {
        let mut req = client.post(url).json(body);
        if let Some(ref key) = self.api_key {
            req = req.header("Authorization", format!("Bearer {}", key));
        }
        req
    }

    /// Parse a `Retry-After` header value as seconds.
    fn parse_retry_after(value: &str) -> Option<Duration> {
        value.trim().parse::<u64>().ok().map(Duration::from_secs)
    }

    /// Completion text from a chat response. Array content is joined.
    fn extract_text(json_resp: &Value) -> String {
        let content = json_resp
            .get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"));

        match content {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Array(parts)) => parts
                .iter()
                .filter_map(|p| p.get("text").and_then(|t| t.as_str()))
                .collect::<Vec<_>>()
                .join(""),
            _ => String::new(),
        }
    }

    /// Parse a success body. A body that is not JSON (an HTML error page
    /// from a gateway, say) is a [`RecognizeError::Json`], which is not retried.
    fn parse_body(body: &str) -> Result<Value> {
        Ok(serde_json::from_str(body)?)
    }

    fn extract_metadata(json_resp: &Value) -> Option<Value> {
        let mut meta = serde_json::Map::new();
        for key in ["usage", "model", "id"] {
            if let Some(v) = json_resp.get(key) {
                meta.insert(key.into(), v.clone());
            }
        }
        if meta.is_empty() {
            None
        } else {
            Some(Value::Object(meta))
        }
    }
}

#[async_trait]
impl Backend for QwenVlBackend {
    async fn complete(
        &self,
        client: &Client,
        endpoint: &str,
        request: &VisionRequest,
    ) -> Result<ModelReply> {
        let body = Self::build_body(request);
        debug!(endpoint, model = %request.model, image = ?request.image, "calling vision model");

        let resp = self.build_http_request(client, endpoint, &body).send().await?;
        let status = resp.status().as_u16();

        if !resp.status().is_success() {
            let retry_after = resp
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(Self::parse_retry_after);
            let text = resp.text().await.unwrap_or_default();
            return Err(RecognizeError::HttpError {
                status,
                body: text,
                retry_after,
            });
        }

        let json_resp = Self::parse_body(&resp.text().await?)?;
        Ok(ModelReply {
            text: Self::extract_text(&json_resp),
            status,
            metadata: Self::extract_metadata(&json_resp),
        })
    }

    fn name(&self) -> &'static str {
        "qwen-vl"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::{EncodedImage, ImageFormat};

    fn test_request() -> VisionRequest {
        VisionRequest {
            model: "qwen-vl".into(),
            prompt: "识别这张单据".into(),
            image: EncodedImage::encode(b"abc", ImageFormat::Jpeg),
            temperature: 0.2,
            top_p: 0.8,
            max_tokens: 1024,
        }
    }

    #[test]
    fn test_body_carries_text_and_image_parts() {
        let body = QwenVlBackend::build_body(&test_request());
        assert_eq!(body["model"], "qwen-vl");
        assert_eq!(body["temperature"], 0.2);
        assert_eq!(body["top_p"], 0.8);
        assert_eq!(body["max_tokens"], 1024);

        let content = body["messages"][0]["content"].as_array().expect("content");
        assert_eq!(content.len(), 2);
        assert_eq!(content[0]["type"], "text");
        assert_eq!(content[0]["text"], "识别这张单据");
        assert_eq!(content[1]["image_url"]["url"], "data:image/jpeg;base64,YWJj");
    }

    #[test]
    fn test_extract_text_string_content() {
        let resp = json!({"choices": [{"message": {"content": "[]"}}]});
        assert_eq!(QwenVlBackend::extract_text(&resp), "[]");
    }

    #[test]
    fn test_extract_text_part_list_content() {
        let resp = json!({"choices": [{"message": {"content": [
            {"type": "text", "text": "产品名称: 钢板\n"},
            {"type": "text", "text": "型号: Q235B"},
        ]}}]});
        assert_eq!(QwenVlBackend::extract_text(&resp), "产品名称: 钢板\n型号: Q235B");
    }

    #[test]
    fn test_extract_text_missing_choices() {
        assert_eq!(QwenVlBackend::extract_text(&json!({"error": "x"})), "");
    }

    #[test]
    fn test_non_json_success_body_is_not_retried() {
        let err = QwenVlBackend::parse_body("<html>502 Bad Gateway</html>").unwrap_err();
        assert!(matches!(err, RecognizeError::Json(_)));
        assert!(!crate::backend::is_retryable(
            &err,
            &crate::backend::BackoffConfig::standard()
        ));
        assert!(QwenVlBackend::parse_body(r#"{"choices": []}"#).is_ok());
    }

    #[test]
    fn test_metadata() {
        let resp = json!({"id": "c-1", "usage": {"total_tokens": 12}, "choices": []});
        let meta = QwenVlBackend::extract_metadata(&resp).unwrap();
        assert_eq!(meta["id"], "c-1");
        assert_eq!(meta["usage"]["total_tokens"], 12);
        assert!(QwenVlBackend::extract_metadata(&json!({})).is_none());
    }

    #[test]
    fn test_auth_header() {
        let backend = QwenVlBackend::new().with_api_key("sk-test123");
        let req = backend
            .build_http_request(&Client::new(), "http://localhost/v1/chat/completions", &json!({}))
            .build()
            .expect("build request");
        assert_eq!(req.headers().get("Authorization").unwrap(), "Bearer sk-test123");

        let anon = QwenVlBackend::new()
            .build_http_request(&Client::new(), "http://localhost/v1/chat/completions", &json!({}))
            .build()
            .expect("build request");
        assert!(anon.headers().get("Authorization").is_none());
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let backend = QwenVlBackend::new().with_api_key("sk-1234567890abcdef");
        let out = format!("{:?}", backend);
        assert!(!out.contains("1234567890abcdef"));
        assert!(out.contains("sk-123***"));
    }

    #[test]
    fn test_parse_retry_after() {
        assert_eq!(
            QwenVlBackend::parse_retry_after(" 30 "),
            Some(Duration::from_secs(30))
        );
        assert_eq!(QwenVlBackend::parse_retry_after("soon"), None);
    }
}
