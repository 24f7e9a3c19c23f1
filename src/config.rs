//! Recognizer configuration.
//!
//! Endpoint, credentials, and model parameters are process-wide settings
//! sourced from the environment. They live in [`RecognizerConfig`], which is
//! handed to the [`Recognizer`](crate::recognizer::Recognizer); the parsing
//! core never reads them.

use std::str::FromStr;
use std::time::Duration;

use crate::backend::qwen::redact_key;
use crate::backend::BackoffConfig;
use crate::error::{RecognizeError, Result};
use crate::prompt;

/// Default Qwen-VL chat completions endpoint.
pub const DEFAULT_API_URL: &str = "http://zhenze-huhehaote.cmecloud.cn/v1/chat/completions";

pub const ENV_API_URL: &str = "QWEN_API_URL";
pub const ENV_API_KEY: &str = "QWEN_API_KEY";
pub const ENV_MODEL: &str = "QWEN_MODEL";
pub const ENV_TIMEOUT_SECS: &str = "QWEN_TIMEOUT_SECS";
pub const ENV_MAX_RETRIES: &str = "QWEN_MAX_RETRIES";

/// Settings for recognizing document images.
///
/// # Example
///
/// ```
/// use shipdoc_recognizer::config::RecognizerConfig;
/// use std::str::FromStr;
/// use std::time::Duration;
///
/// let config = RecognizerConfig::default()
///     .with_api_key("sk-demo")
///     .with_timeout(Duration::from_secs(90));
/// assert_eq!(config.model, "qwen-vl");
/// ```
#[derive(Clone)]
pub struct RecognizerConfig {
    /// Full chat completions URL.
    pub api_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: f64,
    pub top_p: f64,
    pub max_tokens: u32,
    /// Per-request HTTP timeout. Recognition of a dense document can be slow.
    pub timeout: Duration,
    pub max_image_bytes: u64,
    /// Lower-case file extensions accepted for upload.
    pub allowed_extensions: Vec<String>,
    pub backoff: BackoffConfig,
    /// Instruction sent with every image.
    pub prompt: String,
}

impl Default for RecognizerConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_key: None,
            model: "qwen-vl".to_string(),
            temperature: 0.2,
            top_p: 0.8,
            max_tokens: 1024,
            timeout: Duration::from_secs(60),
            max_image_bytes: 5 * 1024 * 1024,
            allowed_extensions: vec!["png".into(), "jpg".into(), "jpeg".into()],
            backoff: BackoffConfig::none(),
            prompt: prompt::extraction_prompt(),
        }
    }
}

impl RecognizerConfig {
    /// Load from process environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using `lookup` as the variable source. Unset or blank variables
    /// keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(url) = get(ENV_API_URL) {
            config.api_url = url.trim().to_string();
        }
        config.api_key = get(ENV_API_KEY);
        if let Some(model) = get(ENV_MODEL) {
            config.model = model.trim().to_string();
        }
        if let Some(secs) = get(ENV_TIMEOUT_SECS) {
            config.timeout = Duration::from_secs(parse_number(ENV_TIMEOUT_SECS, &secs)?);
        }
        if let Some(retries) = get(ENV_MAX_RETRIES) {
            let retries: u32 = parse_number(ENV_MAX_RETRIES, &retries)?;
            config.backoff = BackoffConfig::interactive().with_max_retries(retries);
        }

        config.validate()?;
        Ok(config)
    }

    /// Check values that would otherwise fail at request time.
    pub fn validate(&self) -> Result<()> {
        if !(self.api_url.starts_with("http://") || self.api_url.starts_with("https://")) {
            return Err(RecognizeError::InvalidConfig(format!(
                "API URL must be http(s): {}",
                self.api_url
            )));
        }
        if self.model.trim().is_empty() {
            return Err(RecognizeError::InvalidConfig("model must not be empty".into()));
        }
        if self.timeout.is_zero() {
            return Err(RecognizeError::InvalidConfig("timeout must be positive".into()));
        }
        if self.allowed_extensions.is_empty() {
            return Err(RecognizeError::InvalidConfig(
                "at least one image extension must be allowed".into(),
            ));
        }
        Ok(())
    }

    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_image_bytes(mut self, limit: u64) -> Self {
        self.max_image_bytes = limit;
        self
    }

    pub fn with_backoff(mut self, backoff: BackoffConfig) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }
}

impl std::fmt::Debug for RecognizerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecognizerConfig")
            .field("api_url", &self.api_url)
            .field("api_key", &self.api_key.as_deref().map(redact_key))
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("top_p", &self.top_p)
            .field("max_tokens", &self.max_tokens)
            .field("timeout", &self.timeout)
            .field("max_image_bytes", &self.max_image_bytes)
            .field("allowed_extensions", &self.allowed_extensions)
            .field("backoff", &self.backoff)
            .field("prompt_len", &self.prompt.len())
            .finish()
    }
}

fn parse_number<T>(key: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse::<T>()
        .map_err(|e| RecognizeError::InvalidConfig(format!("{key}={value:?}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = RecognizerConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert!(config.api_key.is_none());
        assert_eq!(config.timeout, Duration::from_secs(60));
        assert_eq!(config.max_image_bytes, 5 * 1024 * 1024);
        assert_eq!(config.backoff.max_retries, 0);
        assert!(config.prompt.contains("product_name"));
    }

    #[test]
    fn test_env_overrides() {
        let config = RecognizerConfig::from_lookup(lookup(&[
            (ENV_API_URL, "https://example.test/v1/chat/completions"),
            (ENV_API_KEY, "sk-abc"),
            (ENV_MODEL, "qwen-vl-max"),
            (ENV_TIMEOUT_SECS, "90"),
            (ENV_MAX_RETRIES, "2"),
        ]))
        .unwrap();
        assert_eq!(config.api_url, "https://example.test/v1/chat/completions");
        assert_eq!(config.api_key.as_deref(), Some("sk-abc"));
        assert_eq!(config.model, "qwen-vl-max");
        assert_eq!(config.timeout, Duration::from_secs(90));
        assert_eq!(config.backoff.max_retries, 2);
    }

    #[test]
    fn test_blank_values_keep_defaults() {
        let config = RecognizerConfig::from_lookup(lookup(&[(ENV_API_KEY, "  ")])).unwrap();
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_invalid_timeout() {
        let err = RecognizerConfig::from_lookup(lookup(&[(ENV_TIMEOUT_SECS, "soon")])).unwrap_err();
        assert!(matches!(err, RecognizeError::InvalidConfig(ref m) if m.contains(ENV_TIMEOUT_SECS)));
    }

    #[test]
    fn test_retry_count_out_of_range() {
        let err =
            RecognizerConfig::from_lookup(lookup(&[(ENV_MAX_RETRIES, "4294967297")])).unwrap_err();
        assert!(matches!(err, RecognizeError::InvalidConfig(ref m) if m.contains(ENV_MAX_RETRIES)));
    }

    #[test]
    fn test_invalid_url() {
        let err = RecognizerConfig::from_lookup(lookup(&[(ENV_API_URL, "ftp://x")])).unwrap_err();
        assert!(matches!(err, RecognizeError::InvalidConfig(_)));
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = RecognizerConfig::default().with_api_key("sk-1234567890abcdef");
        let out = format!("{:?}", config);
        assert!(!out.contains("1234567890abcdef"));
        assert!(out.contains("***"));
    }
}
