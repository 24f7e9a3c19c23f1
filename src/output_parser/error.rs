//! Error types for reply parsers.

/// Errors returned by the strict and fallback parsers.
///
/// These never escape [`interpret`](crate::pipeline::interpret); the pipeline
/// turns them into routing decisions and warnings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// The reply was empty or whitespace-only.
    #[error("empty model reply")]
    EmptyResponse,

    /// The reply is not well-formed JSON.
    #[error("reply is not valid JSON: {reason}")]
    Syntax {
        /// The serde error message.
        reason: String,
    },

    /// The reply is valid JSON but not an array of documents.
    #[error("expected a JSON array of documents, found {found}")]
    NotAnArray {
        /// JSON kind of the top-level value (`"object"`, `"string"`, ...).
        found: &'static str,
    },

    /// The array parsed, but no entry passed validation.
    #[error("no valid records ({discarded} entries discarded)")]
    NoValidRecords {
        /// Number of entries dropped during validation.
        discarded: usize,
    },

    /// No line of the reply carried a `label: value` pair.
    #[error("no labeled lines found in model reply")]
    NoDataExtracted,
}

impl ParseError {
    /// Format errors: the model ignored the requested shape, so the text
    /// should be handed to the fallback parser.
    pub fn routes_to_fallback(&self) -> bool {
        matches!(
            self,
            ParseError::EmptyResponse | ParseError::Syntax { .. } | ParseError::NotAnArray { .. }
        )
    }
}

/// Truncate a string to at most `max_chars` characters, appending "..." if truncated.
pub(crate) fn truncate(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}
