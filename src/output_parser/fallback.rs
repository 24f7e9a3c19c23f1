//! Line-oriented fallback parser for replies that ignored the JSON format.
//!
//! Each `label: value` line is matched against the synonym labels in
//! [`KEYWORD_MAP`](crate::keywords::KEYWORD_MAP). Free text can only describe
//! one document, so this path yields a single record per reply.

use tracing::{debug, trace};

use crate::keywords;
use crate::output_parser::error::ParseError;
use crate::schema::DocumentRecord;

/// ASCII and full-width colons.
const SEPARATORS: &[char] = &[':', '：'];

const QUOTES: &[char] = &['"', '\'', '“', '”', '‘', '’'];

/// Outcome of a fallback parse, with line counters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackReport {
    pub record: DocumentRecord,
    /// Lines that contained a separator.
    pub qualifying_lines: usize,
    /// Qualifying lines whose label matched a field.
    pub matched_lines: usize,
}

/// Extract a single record from `label: value` lines.
///
/// Unmatched fields keep their defaults. Returns
/// [`ParseError::NoDataExtracted`] when no line carries a separator; a reply
/// with labeled lines that match nothing still yields a record of defaults.
///
/// # Examples
///
/// ```
/// use shipdoc_recognizer::output_parser::parse_fallback;
///
/// let record = parse_fallback("产品名称: 钢板\n型号: Q235B\n").unwrap();
/// assert_eq!(record.product_name, "钢板");
/// assert_eq!(record.model, "Q235B");
/// assert_eq!(record.manufacturer, "-");
/// ```
pub fn parse_fallback(text: &str) -> Result<DocumentRecord, ParseError> {
    parse_fallback_report(text).map(|report| report.record)
}

/// Like [`parse_fallback`], but also reports line counts.
pub fn parse_fallback_report(text: &str) -> Result<FallbackReport, ParseError> {
    let mut record = DocumentRecord::defaults();
    let mut qualifying_lines = 0;
    let mut matched_lines = 0;

    for line in text.lines() {
        let Some((label, value)) = split_line(line) else {
            continue;
        };
        qualifying_lines += 1;

        let Some(field) = keywords::match_label(&label) else {
            trace!(label = %label, "no field matches label");
            continue;
        };
        matched_lines += 1;

        if !value.is_empty() {
            record.set(field, value);
        }
    }

    if qualifying_lines == 0 {
        return Err(ParseError::NoDataExtracted);
    }

    debug!(qualifying_lines, matched_lines, "fallback parse finished");
    Ok(FallbackReport {
        record,
        qualifying_lines,
        matched_lines,
    })
}

/// Split at the first separator. The label is trimmed and lower-cased;
/// the value is trimmed and unquoted.
fn split_line(line: &str) -> Option<(String, String)> {
    let idx = line.find(SEPARATORS)?;
    let sep_len = line[idx..].chars().next().map_or(1, char::len_utf8);
    let label = line[..idx].trim().to_lowercase();
    let value = clean_value(&line[idx + sep_len..]);
    Some((label, value))
}

fn clean_value(raw: &str) -> String {
    let value = raw.trim();
    let value = value.strip_suffix(',').unwrap_or(value).trim_end();
    value.trim_matches(QUOTES).trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Field;

    #[test]
    fn extracts_labeled_lines() {
        let record = parse_fallback("产品名称: 钢板\n型号: Q235B\n").unwrap();
        assert_eq!(record.product_name, "钢板");
        assert_eq!(record.model, "Q235B");
        assert_eq!(record.specification, "-");
        assert_eq!(record.manufacturer, "-");
        assert_eq!(record.batch_number, "-");
        assert_eq!(record.production_date, "");
    }

    #[test]
    fn full_width_separator() {
        let record = parse_fallback("生产厂家：甲钢厂\n出厂日期：2024-03-05").unwrap();
        assert_eq!(record.manufacturer, "甲钢厂");
        assert_eq!(record.shipment_date, "2024-03-05");
    }

    #[test]
    fn splits_at_first_separator_only() {
        let record = parse_fallback("生产日期: 2024-03-01 08:30").unwrap();
        assert_eq!(record.production_date, "2024-03-01 08:30");
    }

    #[test]
    fn strips_quotes_and_trailing_comma() {
        let text = "{\n  \"product_name\": \"钢板\",\n  \"batch_number\": \"B-17\"\n}";
        let record = parse_fallback(text).unwrap();
        assert_eq!(record.product_name, "钢板");
        assert_eq!(record.batch_number, "B-17");
    }

    #[test]
    fn ambiguous_synonyms_assign_once() {
        let report = parse_fallback_report("生产企业/制造商: 甲公司").unwrap();
        assert_eq!(report.record.manufacturer, "甲公司");
        assert_eq!(report.matched_lines, 1);
        let filled: Vec<Field> = Field::ALL
            .into_iter()
            .filter(|f| report.record.get(*f) != f.default_value())
            .collect();
        assert_eq!(filled, vec![Field::Manufacturer]);
    }

    #[test]
    fn empty_value_keeps_default() {
        let record = parse_fallback("批号:\n型号: Q235B").unwrap();
        assert_eq!(record.batch_number, "-");
        assert_eq!(record.model, "Q235B");
    }

    #[test]
    fn lines_without_separator_are_skipped() {
        let text = "以下是识别结果\n品名: 角钢\n谢谢";
        let report = parse_fallback_report(text).unwrap();
        assert_eq!(report.qualifying_lines, 1);
        assert_eq!(report.record.product_name, "角钢");
    }

    #[test]
    fn unmatched_labels_yield_defaults_record() {
        let report = parse_fallback_report("备注: 无\n颜色: 灰").unwrap();
        assert_eq!(report.record, DocumentRecord::defaults());
        assert_eq!(report.qualifying_lines, 2);
        assert_eq!(report.matched_lines, 0);
    }

    #[test]
    fn no_labeled_lines_is_no_data() {
        assert_eq!(parse_fallback(""), Err(ParseError::NoDataExtracted));
        assert_eq!(
            parse_fallback("图片模糊，无法识别"),
            Err(ParseError::NoDataExtracted)
        );
    }

    #[test]
    fn inspection_label_is_not_specification() {
        let report = parse_fallback_report("Inspection Date: 2024-01-01\nSpecs: 10mm").unwrap();
        assert_eq!(report.matched_lines, 1);
        assert_eq!(report.record.specification, "10mm");
    }

    #[test]
    fn english_labels_are_case_insensitive() {
        let record = parse_fallback("Manufacturer: ACME Steel\nBatch Number: 7781").unwrap();
        assert_eq!(record.manufacturer, "ACME Steel");
        assert_eq!(record.batch_number, "7781");
    }
}
