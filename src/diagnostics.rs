//! Parse diagnostics for reply interpretation.
//!
//! [`ParseDiagnostics`] records what happened while a model reply was turned
//! into records: which parser produced them, why strict parsing was
//! abandoned, how many entries were dropped or healed, and how many
//! transport retries the model call needed.

/// Records what happened during interpretation of one model reply.
///
/// Attached to every [`Interpretation`](crate::pipeline::Interpretation).
///
/// # Example
///
/// ```
/// use shipdoc_recognizer::diagnostics::ParseDiagnostics;
///
/// let diag = ParseDiagnostics {
///     strategy: Some("strict"),
///     discarded: 1,
///     ..Default::default()
/// };
/// assert!(diag.ok());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseDiagnostics {
    /// Which parser produced the records: `"strict"` or `"fallback"`.
    /// `None` when nothing was produced.
    pub strategy: Option<&'static str>,

    /// Why the strict parser rejected the reply, if it did.
    pub strict_error: Option<String>,

    /// Strict-mode entries dropped during validation.
    pub discarded: usize,

    /// Required fields replaced by the sentinel.
    pub healed: usize,

    /// Fallback: lines that carried a separator.
    pub qualifying_lines: usize,

    /// Fallback: lines whose label matched a field.
    pub matched_lines: usize,

    /// Transport retries (429, 5xx) before the model call succeeded.
    pub transport_retries: u32,

    /// Total time spent in backoff delays (milliseconds).
    pub backoff_total_ms: u64,
}

impl ParseDiagnostics {
    /// Did the strict parser accept the reply? Discarded entries do not
    /// count against it as long as at least one record was accepted.
    pub fn ok(&self) -> bool {
        self.strategy == Some("strict")
    }

    /// Whether the fallback parser produced the records.
    pub fn used_fallback(&self) -> bool {
        self.strategy == Some("fallback")
    }
}
