//! Image intake: format detection, size limits, and base64 encoding.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::path::Path;

use crate::error::{RecognizeError, Result};

/// Image formats the vision endpoint accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
}

impl ImageFormat {
    /// Detect the format from a file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "png" => Some(ImageFormat::Png),
            "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
            _ => None,
        }
    }

    /// Detect the format from a path, checking it against `allowed` extensions.
    pub fn from_path(path: &Path, allowed: &[String]) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        let permitted = ext
            .as_deref()
            .is_some_and(|e| allowed.iter().any(|a| a.eq_ignore_ascii_case(e)));
        match ext.as_deref().and_then(Self::from_extension) {
            Some(format) if permitted => Ok(format),
            _ => Err(RecognizeError::UnsupportedImage { extension: ext }),
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
        }
    }
}

/// A base64-encoded image ready to embed in a request.
#[derive(Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub format: ImageFormat,
    pub base64: String,
}

impl EncodedImage {
    pub fn encode(bytes: &[u8], format: ImageFormat) -> Self {
        Self {
            format,
            base64: STANDARD.encode(bytes),
        }
    }

    /// `data:` URL for OpenAI-compatible `image_url` content parts.
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.format.mime(), self.base64)
    }
}

impl std::fmt::Debug for EncodedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncodedImage")
            .field("format", &self.format)
            .field("base64_len", &self.base64.len())
            .finish()
    }
}

/// Reject images above `limit` bytes.
pub fn check_size(size: u64, limit: u64) -> Result<()> {
    if size > limit {
        return Err(RecognizeError::ImageTooLarge { size, limit });
    }
    Ok(())
}
