//! # Model Reply Parsers
//!
//! Turns the free-form text a vision model returns into
//! [`DocumentRecord`](crate::schema::DocumentRecord)s.
//!
//! | Parser | Use Case |
//! |--------|----------|
//! | [`normalize`] | Strip code fences and `<think>` blocks, trim |
//! | [`parse_strict`] | JSON array of per-document objects, validated and healed |
//! | [`parse_fallback`] | `label: value` lines matched against synonym labels |
//!
//! The strict parser signals format problems through [`ParseError`];
//! [`interpret`](crate::pipeline::interpret) decides what to do with them.

pub mod error;
pub mod extract;
pub mod fallback;
pub mod strict;

pub use error::ParseError;
pub use extract::{extract_code_block, normalize, strip_fences, strip_think_tags};
pub use fallback::{parse_fallback, parse_fallback_report, FallbackReport};
pub use strict::{parse_strict, parse_strict_report, StrictReport};
