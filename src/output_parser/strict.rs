//! Strict-mode parsing: the reply is a JSON array of per-document objects.
//!
//! Each element is validated against the field schema. Elements that are not
//! objects, or that lack any required key, are discarded whole. Required
//! fields that are present but `null`/empty are healed to the sentinel.

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::output_parser::error::ParseError;
use crate::schema::{DocumentRecord, Field};

/// Outcome of a successful strict parse, with validation counters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrictReport {
    /// Accepted records, in input order.
    pub records: Vec<DocumentRecord>,
    /// Array elements dropped during validation.
    pub discarded: usize,
    /// Required fields replaced by the sentinel across all accepted records.
    pub healed: usize,
    /// Keys outside the field schema on accepted records. They are ignored.
    pub unknown_keys: usize,
}

/// Parse a normalized reply as a JSON array of documents.
///
/// # Errors
///
/// - [`ParseError::EmptyResponse`] / [`ParseError::Syntax`] when the text is
///   not JSON, and [`ParseError::NotAnArray`] when it is JSON of another
///   shape. These route to the fallback parser.
/// - [`ParseError::NoValidRecords`] when the array is well formed but no
///   element survives validation.
///
/// # Examples
///
/// ```
/// use shipdoc_recognizer::output_parser::parse_strict;
///
/// let reply = r#"[{"product_name": "钢板", "model": "Q235B", "specification": "10mm",
///                 "manufacturer": "甲钢厂", "batch_number": ""}]"#;
/// let records = parse_strict(reply).unwrap();
/// assert_eq!(records[0].batch_number, "-");
/// assert_eq!(records[0].production_date, "");
/// ```
pub fn parse_strict(text: &str) -> Result<Vec<DocumentRecord>, ParseError> {
    parse_strict_report(text).map(|report| report.records)
}

/// Like [`parse_strict`], but also reports discard and heal counts.
pub fn parse_strict_report(text: &str) -> Result<StrictReport, ParseError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ParseError::EmptyResponse);
    }

    let value: Value = serde_json::from_str(trimmed).map_err(|e| ParseError::Syntax {
        reason: e.to_string(),
    })?;

    let items = match value {
        Value::Array(items) => items,
        other => {
            return Err(ParseError::NotAnArray {
                found: json_kind(&other),
            })
        }
    };

    let mut report = StrictReport {
        records: Vec::with_capacity(items.len()),
        discarded: 0,
        healed: 0,
        unknown_keys: 0,
    };

    for (index, item) in items.into_iter().enumerate() {
        let map = match item {
            Value::Object(map) => map,
            other => {
                warn!(index, kind = json_kind(&other), "discarding non-object array entry");
                report.discarded += 1;
                continue;
            }
        };

        let missing: Vec<&str> = Field::REQUIRED
            .iter()
            .filter(|f| !map.contains_key(f.key()))
            .map(|f| f.key())
            .collect();
        if !missing.is_empty() {
            warn!(index, ?missing, "discarding entry missing required fields");
            report.discarded += 1;
            continue;
        }

        let unknown: Vec<&str> = map
            .keys()
            .filter(|k| Field::from_key(k).is_none())
            .map(String::as_str)
            .collect();
        if !unknown.is_empty() {
            debug!(index, ?unknown, "ignoring keys outside the field schema");
        }

        let (record, healed) = build_record(&map);
        if healed > 0 {
            debug!(index, healed, "filled empty required fields with sentinel");
        }
        report.healed += healed;
        report.unknown_keys += unknown.len();
        report.records.push(record);
    }

    if report.records.is_empty() {
        return Err(ParseError::NoValidRecords {
            discarded: report.discarded,
        });
    }

    Ok(report)
}

/// Build a record from a validated object. Returns the record and the number
/// of required fields that had to be defaulted.
fn build_record(map: &Map<String, Value>) -> (DocumentRecord, usize) {
    let mut record = DocumentRecord::defaults();
    let mut healed = 0;

    for field in Field::ALL {
        match map.get(field.key()).and_then(scalar_text) {
            Some(text) => record.set(field, text),
            None if field.is_required() => healed += 1,
            None => {}
        }
    }

    (record, healed)
}

/// Text of a JSON value; `None` for `null` and the empty string.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry(name: &str, batch: &str) -> Value {
        json!({
            "product_name": name,
            "model": "Q235B",
            "specification": "10mm*1500mm",
            "manufacturer": "甲钢厂",
            "production_date": "2024-03-01",
            "shipment_date": "2024-03-05",
            "batch_number": batch,
        })
    }

    #[test]
    fn accepts_complete_entries_in_order() {
        let text = json!([entry("钢板", "B1"), entry("钢管", "B2")]).to_string();
        let report = parse_strict_report(&text).unwrap();
        assert_eq!(report.records.len(), 2);
        assert_eq!(report.records[0].product_name, "钢板");
        assert_eq!(report.records[1].product_name, "钢管");
        assert_eq!(report.records[1].shipment_date, "2024-03-05");
        assert_eq!(report.discarded, 0);
        assert_eq!(report.healed, 0);
        assert_eq!(report.unknown_keys, 0);
    }

    #[test]
    fn counts_keys_outside_schema() {
        let mut e = entry("钢板", "B1");
        e["remark"] = json!("加急");
        e["备注"] = json!("");
        let report = parse_strict_report(&json!([e]).to_string()).unwrap();
        assert_eq!(report.records.len(), 1);
        assert_eq!(report.unknown_keys, 2);
    }

    #[test]
    fn drops_entry_missing_required_key() {
        let mut broken = entry("钢管", "B2");
        broken.as_object_mut().unwrap().remove("manufacturer");
        let text = json!([entry("钢板", "B1"), broken, entry("角钢", "B3")]).to_string();
        let report = parse_strict_report(&text).unwrap();
        assert_eq!(report.records.len(), 2);
        assert_eq!(report.discarded, 1);
        assert_eq!(report.records[1].product_name, "角钢");
    }

    #[test]
    fn heals_empty_and_null_required_values() {
        let mut e = entry("钢板", "");
        e["model"] = Value::Null;
        let text = json!([e]).to_string();
        let report = parse_strict_report(&text).unwrap();
        assert_eq!(report.records[0].batch_number, "-");
        assert_eq!(report.records[0].model, "-");
        assert_eq!(report.healed, 2);
    }

    #[test]
    fn missing_dates_default_to_empty() {
        let text = r#"[{"product_name": "钢板", "model": "Q235B", "specification": "10mm",
                        "manufacturer": "甲钢厂", "batch_number": "B1", "shipment_date": null}]"#;
        let records = parse_strict(text).unwrap();
        assert_eq!(records[0].production_date, "");
        assert_eq!(records[0].shipment_date, "");
    }

    #[test]
    fn stringifies_non_string_scalars() {
        let mut e = entry("钢板", "B1");
        e["batch_number"] = json!(20240301);
        let records = parse_strict(&json!([e]).to_string()).unwrap();
        assert_eq!(records[0].batch_number, "20240301");
    }

    #[test]
    fn discards_non_object_elements() {
        let text = json!(["钢板", 42, entry("钢板", "B1")]).to_string();
        let report = parse_strict_report(&text).unwrap();
        assert_eq!(report.records.len(), 1);
        assert_eq!(report.discarded, 2);
    }

    #[test]
    fn bare_object_is_content_error() {
        let text = entry("钢板", "B1").to_string();
        assert_eq!(
            parse_strict(&text),
            Err(ParseError::NotAnArray { found: "object" })
        );
    }

    #[test]
    fn malformed_json_is_syntax_error() {
        let err = parse_strict("[{\"product_name\": ").unwrap_err();
        assert!(matches!(err, ParseError::Syntax { .. }));
        assert!(err.routes_to_fallback());
    }

    #[test]
    fn empty_text_is_empty_response() {
        assert_eq!(parse_strict("   "), Err(ParseError::EmptyResponse));
    }

    #[test]
    fn all_invalid_is_no_valid_records() {
        let text = r#"[{"product_name": "钢板"}, {"model": "X"}]"#;
        assert_eq!(
            parse_strict(text),
            Err(ParseError::NoValidRecords { discarded: 2 })
        );
    }

    #[test]
    fn empty_array_is_no_valid_records() {
        assert_eq!(
            parse_strict("[]"),
            Err(ParseError::NoValidRecords { discarded: 0 })
        );
    }
}
