//! Reply interpretation: normalize, try strict, fall back to line parsing.
//!
//! ```text
//! TRY_STRICT ──► ACCEPT(records)
//!     │  └─────► NO_VALID_RECORDS          (well-formed array, nothing valid)
//!     ▼
//! FALLBACK ───► ACCEPT([record])           warning: used fallback parser
//!     └───────► FAIL                       warning: unparseable response
//! ```
//!
//! Each transition is an explicit [`Route`] value. Nothing here fails: every
//! path ends in a well-formed [`Interpretation`].

use std::fmt;

use tracing::{debug, info, warn};

use crate::diagnostics::ParseDiagnostics;
use crate::output_parser::{self, error::truncate, ParseError};
use crate::schema::DocumentRecord;

/// Why an interpretation is incomplete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Warning {
    /// The strict format was ignored; the fallback parser produced one record.
    UsedFallback,
    /// Neither parser could extract anything.
    Unparseable,
    /// The reply was a well-formed array but no entry passed validation.
    NoValidRecords,
}

impl Warning {
    pub fn as_str(self) -> &'static str {
        match self {
            Warning::UsedFallback => "used fallback parser",
            Warning::Unparseable => "unparseable response",
            Warning::NoValidRecords => "no valid records",
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of interpreting one model reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interpretation {
    pub records: Vec<DocumentRecord>,
    pub warning: Option<Warning>,
    pub diagnostics: ParseDiagnostics,
}

impl Interpretation {
    /// The only outcome that should be reported as a failed recognition.
    pub fn is_recognition_failure(&self) -> bool {
        self.warning == Some(Warning::Unparseable)
    }

    /// Whether the UI should flag the result as partially recognized.
    pub fn is_partial(&self) -> bool {
        self.warning.is_some()
    }

    /// Split into the `(records, warning)` pair handed to collaborators.
    pub fn into_parts(self) -> (Vec<DocumentRecord>, Option<Warning>) {
        (self.records, self.warning)
    }
}

/// One step of the strict/fallback state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Records accepted; no further parsing.
    Accept(Vec<DocumentRecord>),
    /// Strict parsing hit a format error; try the fallback parser.
    Fallback(ParseError),
    /// Parsing is over and produced nothing.
    Fail(Warning),
}

/// Interpret a raw model reply into document records.
///
/// # Examples
///
/// ```
/// use shipdoc_recognizer::pipeline::{interpret, Warning};
///
/// let result = interpret("型号: Q235B");
/// assert_eq!(result.records[0].model, "Q235B");
/// assert_eq!(result.warning, Some(Warning::UsedFallback));
///
/// let empty = interpret("");
/// assert!(empty.records.is_empty());
/// assert_eq!(empty.warning, Some(Warning::Unparseable));
/// ```
pub fn interpret(raw: &str) -> Interpretation {
    let text = output_parser::normalize(raw);
    let mut diagnostics = ParseDiagnostics::default();

    match try_strict(&text, &mut diagnostics) {
        Route::Accept(records) => {
            diagnostics.strategy = Some("strict");
            info!(records = records.len(), "strict parse accepted reply");
            Interpretation {
                records,
                warning: None,
                diagnostics,
            }
        }
        Route::Fail(warning) => {
            warn!(discarded = diagnostics.discarded, "{}", warning);
            Interpretation {
                records: Vec::new(),
                warning: Some(warning),
                diagnostics,
            }
        }
        Route::Fallback(reason) => {
            debug!(%reason, "strict parse rejected reply, using fallback parser");
            diagnostics.strict_error = Some(reason.to_string());
            match try_fallback(&text, &mut diagnostics) {
                Route::Accept(records) => {
                    diagnostics.strategy = Some("fallback");
                    Interpretation {
                        records,
                        warning: Some(Warning::UsedFallback),
                        diagnostics,
                    }
                }
                _ => {
                    warn!(reply = %truncate(&text, 200), "model reply is unparseable");
                    Interpretation {
                        records: Vec::new(),
                        warning: Some(Warning::Unparseable),
                        diagnostics,
                    }
                }
            }
        }
    }
}

/// Strict step: accept, route to fallback on format errors, or fail when a
/// well-formed array held no valid entries.
pub fn try_strict(text: &str, diagnostics: &mut ParseDiagnostics) -> Route {
    match output_parser::parse_strict_report(text) {
        Ok(report) => {
            diagnostics.discarded = report.discarded;
            diagnostics.healed = report.healed;
            Route::Accept(report.records)
        }
        Err(err @ ParseError::NoValidRecords { discarded }) => {
            diagnostics.discarded = discarded;
            diagnostics.strict_error = Some(err.to_string());
            Route::Fail(Warning::NoValidRecords)
        }
        Err(err) if err.routes_to_fallback() => Route::Fallback(err),
        Err(err) => {
            diagnostics.strict_error = Some(err.to_string());
            Route::Fail(Warning::Unparseable)
        }
    }
}

/// Fallback step: accept the single extracted record or fail.
pub fn try_fallback(text: &str, diagnostics: &mut ParseDiagnostics) -> Route {
    match output_parser::parse_fallback_report(text) {
        Ok(report) => {
            diagnostics.qualifying_lines = report.qualifying_lines;
            diagnostics.matched_lines = report.matched_lines;
            diagnostics.healed = report.record.unresolved().len();
            Route::Accept(vec![report.record])
        }
        Err(_) => Route::Fail(Warning::Unparseable),
    }
}
