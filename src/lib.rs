//! # Shipping Document Recognizer
//!
//! Extracts product fields from photographed shipping documents (delivery
//! notes, certificates of conformity) by sending the image to a vision model
//! and interpreting whatever text comes back.
//!
//! Vision models rarely follow output instructions exactly. Replies arrive
//! wrapped in code fences, prefixed with reasoning blocks, as bare
//! `label: value` lines, or with fields missing. The interpreter handles all
//! of these and always returns a usable result:
//!
//! 1. **Normalize**: strip `<think>` blocks and code fences.
//! 2. **Strict**: parse a JSON array of records, heal missing values to `"-"`.
//! 3. **Fallback**: scan `label: value` lines against a keyword table.
//!
//! ## Core Concepts
//!
//! - **[`interpret`]**: pure, total reply interpretation. Never fails; the
//!   outcome is carried by [`Interpretation::warning`].
//! - **[`DocumentRecord`]**: the seven fields of one document.
//! - **[`Recognizer`]**: image intake, model call with retry, interpretation.
//! - **[`Backend`]**: the seam for vision-model providers. [`QwenVlBackend`]
//!   talks to an OpenAI-compatible endpoint; [`MockBackend`] serves tests.
//! - **[`RecognitionView`]**: the form-shaped bundle a result page renders.
//!
//! ## Quick Start
//!
//! ```
//! use shipdoc_recognizer::{interpret, Warning};
//!
//! let reply = "```json\n[{\"product_name\": \"热轧钢板\", \"model\": \"Q235B\", \
//!     \"specification\": \"10*1500\", \"manufacturer\": \"\", \
//!     \"production_date\": \"2024-03-01\", \"shipment_date\": null, \
//!     \"batch_number\": \"A1\"}]\n```";
//!
//! let result = interpret(reply);
//! assert_eq!(result.warning, None);
//! assert_eq!(result.records[0].manufacturer, "-");
//!
//! let loose = interpret("品名：钢板\n批号：B7");
//! assert_eq!(loose.warning, Some(Warning::UsedFallback));
//! assert_eq!(loose.records[0].batch_number, "B7");
//! ```

pub mod backend;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod events;
pub mod image;
pub mod keywords;
pub mod output_parser;
pub mod pipeline;
pub mod presentation;
pub mod prompt;
pub mod recognizer;
pub mod schema;

pub use backend::{Backend, BackoffConfig, MockBackend, QwenVlBackend};
pub use config::RecognizerConfig;
pub use diagnostics::ParseDiagnostics;
pub use error::{RecognizeError, Result};
pub use events::{Event, EventHandler, FnEventHandler};
pub use image::ImageFormat;
pub use output_parser::ParseError;
pub use pipeline::{interpret, Interpretation, Warning};
pub use presentation::{FormResult, RecognitionView};
pub use recognizer::{Recognition, Recognizer, RecognizerBuilder};
pub use schema::{DocumentRecord, Field, SENTINEL};
