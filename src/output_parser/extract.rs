//! Reply normalization applied before any parsing.
//!
//! Vision models wrap their answer in a markdown fence even when told not
//! to, and reasoning models prepend `<think>` blocks. Both are removed here.

const FENCE: &str = "```";

/// Normalize a raw model reply.
///
/// Strips `<think>`/`<thinking>` blocks, then fence markers (see
/// [`strip_fences`]), then trims. Text without
/// markers passes through trimmed. Normalizing twice is a no-op.
///
/// # Examples
///
/// ```
/// use shipdoc_recognizer::output_parser::normalize;
///
/// assert_eq!(normalize("```json\n[{\"a\": 1}]\n```"), "[{\"a\": 1}]");
/// assert_eq!(normalize("  plain text \n"), "plain text");
/// ```
pub fn normalize(raw: &str) -> String {
    let stripped = strip_think_tags(raw);
    strip_fences(&stripped).to_string()
}

/// Remove fence markers, returning the trimmed body.
///
/// A closed fenced block anywhere in the text wins, so prose before or after
/// it is dropped. Otherwise a leading and a trailing marker are removed. The
/// opening line's language hint (`json`, `JSON`, ...) is dropped with the
/// marker; a first line that holds data rather than a hint is kept.
pub fn strip_fences(text: &str) -> &str {
    if let Some(body) = extract_code_block(text) {
        return body;
    }

    let mut body = text.trim();

    if let Some(rest) = body.strip_prefix(FENCE) {
        body = match rest.find('\n') {
            Some(nl) if is_language_hint(&rest[..nl]) => &rest[nl + 1..],
            Some(_) => rest,
            None => {
                // Single-line reply: ```json[...]```
                let hint_end = rest
                    .find(|c: char| !c.is_ascii_alphanumeric())
                    .unwrap_or(rest.len());
                let after = &rest[hint_end..];
                if after.trim_start().starts_with(&['[', '{'][..]) {
                    after
                } else {
                    rest
                }
            }
        };
    }

    let trimmed = body.trim_end();
    if let Some(rest) = trimmed.strip_suffix(FENCE) {
        body = rest;
    }

    body.trim()
}

/// Find the first closed fenced block and return its trimmed body.
///
/// The opening marker must be followed by an optional language hint and a
/// newline. Returns `None` when no such block is closed.
///
/// # Examples
///
/// ```
/// use shipdoc_recognizer::output_parser::extract_code_block;
///
/// let reply = "识别结果如下：\n```json\n[{\"model\": \"Q235B\"}]\n```\n以上为识别结果。";
/// assert_eq!(extract_code_block(reply), Some("[{\"model\": \"Q235B\"}]"));
/// assert_eq!(extract_code_block("型号: Q235B"), None);
/// ```
pub fn extract_code_block(text: &str) -> Option<&str> {
    let mut search_from = 0;
    while let Some(fence_start) = text[search_from..].find(FENCE) {
        let after_marker = search_from + fence_start + FENCE.len();
        let line_end = text[after_marker..].find('\n')?;

        if is_language_hint(&text[after_marker..after_marker + line_end]) {
            let content_start = after_marker + line_end + 1;
            if let Some(close) = text[content_start..].find(FENCE) {
                return Some(text[content_start..content_start + close].trim());
            }
        }

        search_from = after_marker;
    }
    None
}

fn is_language_hint(line: &str) -> bool {
    line.trim()
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Strip all `<think>...</think>` and `<thinking>...</thinking>` blocks from text.
///
/// An unclosed block swallows the rest of the text.
///
/// ```
/// use shipdoc_recognizer::output_parser::strip_think_tags;
///
/// assert_eq!(strip_think_tags("<think>reading label</think>[]"), "[]");
/// ```
pub fn strip_think_tags(text: &str) -> String {
    let result = strip_tag_variant(text, "<think>", "</think>");
    strip_tag_variant(&result, "<thinking>", "</thinking>")
}

fn strip_tag_variant(text: &str, open: &str, close: &str) -> String {
    let mut result = text.to_string();
    while let Some(start) = result.find(open) {
        match result[start..].find(close) {
            Some(end_offset) => {
                let end = start + end_offset + close.len();
                result.replace_range(start..end, "");
            }
            None => {
                result.truncate(start);
                break;
            }
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── strip_fences ──

    #[test]
    fn strips_json_fence() {
        let input = "```json\n[{\"model\": \"Q235B\"}]\n```";
        assert_eq!(strip_fences(input), "[{\"model\": \"Q235B\"}]");
    }

    #[test]
    fn strips_bare_fence() {
        assert_eq!(strip_fences("```\n[]\n```"), "[]");
    }

    #[test]
    fn strips_single_line_fence() {
        assert_eq!(strip_fences("```json[1]```"), "[1]");
        assert_eq!(strip_fences("```[1]```"), "[1]");
    }

    #[test]
    fn keeps_data_on_first_line() {
        assert_eq!(strip_fences("```[1,\n2]\n```"), "[1,\n2]");
    }

    #[test]
    fn unclosed_fence_is_still_stripped() {
        assert_eq!(strip_fences("```json\n[1]"), "[1]");
    }

    #[test]
    fn no_markers_passes_through() {
        let input = "产品名称: 钢板\n型号: Q235B";
        assert_eq!(strip_fences(input), input);
    }

    #[test]
    fn fenced_block_after_prose() {
        let input = "识别结果如下：\n```json\n[{\"model\": \"Q235B\"}, {\"model\": \"HRB400\"}]\n```";
        assert_eq!(
            strip_fences(input),
            "[{\"model\": \"Q235B\"}, {\"model\": \"HRB400\"}]"
        );
    }

    #[test]
    fn fenced_block_before_prose() {
        let input = "```json\n[1, 2]\n```\n以上为识别结果。";
        assert_eq!(strip_fences(input), "[1, 2]");
    }

    #[test]
    fn extract_code_block_skips_data_on_marker_line() {
        assert_eq!(extract_code_block("```[1,\n2]\n```"), None);
        assert_eq!(extract_code_block("```json\n[1]"), None);
        assert_eq!(extract_code_block("```json[1]```"), None);
    }

    // ── strip_think_tags ──

    #[test]
    fn strip_think_tags_complete() {
        assert_eq!(strip_think_tags("<think>reasoning</think>result"), "result");
    }

    #[test]
    fn strip_think_tags_incomplete() {
        assert_eq!(strip_think_tags("<think>reasoning without close"), "");
    }

    #[test]
    fn strip_mixed_think_and_thinking() {
        let input = "<think>a</think>mid<thinking>b</thinking>end";
        assert_eq!(strip_think_tags(input), "midend");
    }

    // ── normalize ──

    #[test]
    fn normalize_think_then_fence() {
        let input = "<think>hmm</think>\n```json\n[]\n```\n";
        assert_eq!(normalize(input), "[]");
    }

    #[test]
    fn normalize_is_idempotent() {
        let inputs = [
            "```json\n[{\"a\": \"b\"}]\n```",
            "  产品名称：钢板  ",
            "",
            "```\n```",
            "说明：\n```json\n[]\n```\n完毕",
        ];
        for input in inputs {
            let once = normalize(input);
            assert_eq!(normalize(&once), once, "input: {input:?}");
        }
    }
}
