//! Extraction and repair of the JSON object embedded in free model text.
//!
//! Models asked for "JSON only" still wrap the object in prose or code fences,
//! pretty-print it across lines, and quote words inside string values without
//! escaping them. [`extract_and_repair`] cuts the object out and patches those
//! quotes with a lookahead heuristic. The output is not validated; parsing it
//! is the caller's job.
//!
//! # Known limitations
//!
//! - An embedded quote followed by a digit or punctuation (`"the "90s" band"`)
//!   is taken as the end of the string, so the output stays unparseable.
//! - A quote preceded by an escaped backslash (`\\"`) counts as escaped.
//! - Only `\n` is collapsed; a raw `\r` or tab inside a string value survives.
//! - When the first `{` and the last `}` belong to different objects, the
//!   whole span between them is returned.

/// Scanner state while walking the candidate object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    /// Between tokens (keys, values, punctuation).
    OutsideString,
    /// Inside a string value or key.
    InsideString,
    /// Inside a quoted phrase embedded in a string; its closing quote is escaped too.
    EmbeddedQuote,
}

/// Extracts the JSON object from `text` and escapes embedded quotes.
///
/// Returns `None` when there is no `{`, no `}`, or the first `{` comes after
/// the last `}`.
///
/// ```
/// use assistant::json_repair::extract_and_repair;
///
/// let raw = "Sure! {\"intent\": \"say \"hello\" now\"} Hope that helps.";
/// assert_eq!(
///     extract_and_repair(raw).as_deref(),
///     Some(r#"{"intent": "say \"hello\" now"}"#)
/// );
/// assert_eq!(extract_and_repair("no json here"), None);
/// ```
pub fn extract_and_repair(text: &str) -> Option<String> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if start > end {
        return None;
    }
    // Braces are ASCII, so both indices are char boundaries.
    let candidate = text[start..=end].replace('\n', " ");
    Some(escape_embedded_quotes(&candidate))
}

/// Single left-to-right pass; emits `\` in front of quotes that open or close
/// a phrase quoted inside a string value.
fn escape_embedded_quotes(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 8);
    let mut state = ScanState::OutsideString;
    let mut prev: Option<char> = None;

    for (idx, c) in s.char_indices() {
        if c == '"' && prev != Some('\\') {
            state = match state {
                ScanState::OutsideString => ScanState::InsideString,
                ScanState::InsideString => {
                    // `"` is one byte wide.
                    if starts_word(&s[idx + 1..]) {
                        out.push('\\');
                        ScanState::EmbeddedQuote
                    } else {
                        ScanState::OutsideString
                    }
                }
                ScanState::EmbeddedQuote => {
                    out.push('\\');
                    ScanState::InsideString
                }
            };
        }
        out.push(c);
        prev = Some(c);
    }
    out
}

/// `true` if the next non-whitespace character of `rest` is alphabetic.
fn starts_word(rest: &str) -> bool {
    rest.chars()
        .find(|c| !c.is_whitespace())
        .is_some_and(char::is_alphabetic)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn parse(s: &str) -> Value {
        serde_json::from_str(s).unwrap()
    }

    #[test]
    fn missing_open_brace() {
        assert_eq!(extract_and_repair(r#""intent": "other"}"#), None);
        assert_eq!(extract_and_repair(""), None);
    }

    #[test]
    fn missing_close_brace() {
        assert_eq!(extract_and_repair(r#"{"intent": "other""#), None);
    }

    #[test]
    fn close_before_open() {
        assert_eq!(extract_and_repair("}abc{"), None);
    }

    #[test]
    fn strips_prefix_and_suffix() {
        assert_eq!(
            extract_and_repair(r#"prefix {"a": "b"} suffix"#).as_deref(),
            Some(r#"{"a": "b"}"#)
        );
    }

    #[test]
    fn strips_markdown_fence() {
        let raw = "```json\n{\n  \"intent\": \"alphabet\"\n}\n```";
        let out = extract_and_repair(raw).unwrap();
        assert_eq!(parse(&out), json!({"intent": "alphabet"}));
    }

    #[test]
    fn newlines_are_collapsed() {
        let out = extract_and_repair("{\"a\":\n\"b\"}").unwrap();
        assert!(!out.contains('\n'));
        assert_eq!(out, r#"{"a": "b"}"#);
        assert_eq!(parse(&out), json!({"a": "b"}));
    }

    #[test]
    fn newline_inside_value_becomes_space() {
        let out = extract_and_repair("{\"a\": \"line one\nline two\"}").unwrap();
        assert_eq!(parse(&out), json!({"a": "line one line two"}));
    }

    #[test]
    fn escapes_embedded_quotes() {
        let out = extract_and_repair(r#"{"intent": "say "hello" now"}"#).unwrap();
        assert_eq!(out, r#"{"intent": "say \"hello\" now"}"#);
        assert_eq!(parse(&out)["intent"], r#"say "hello" now"#);
    }

    #[test]
    fn lookahead_skips_whitespace() {
        let out = extract_and_repair(r#"{"a": "x "  quoted" y"}"#).unwrap();
        assert_eq!(parse(&out)["a"], r#"x "  quoted" y"#);
    }

    #[test]
    fn several_embedded_phrases() {
        let out = extract_and_repair(r#"{"a": "the "big" and "small" ones", "b": "c"}"#).unwrap();
        assert_eq!(
            parse(&out),
            json!({"a": r#"the "big" and "small" ones"#, "b": "c"})
        );
    }

    #[test]
    fn unicode_alphabetic_lookahead() {
        let out = extract_and_repair(r#"{"a": "sag "über" alles"}"#).unwrap();
        assert_eq!(parse(&out)["a"], r#"sag "über" alles"#);
    }

    #[test]
    fn idempotent_on_clean_output() {
        let clean = r#"{"a": "b"}"#;
        assert_eq!(extract_and_repair(clean).as_deref(), Some(clean));

        let escaped = r#"{"intent": "say \"hello\" now"}"#;
        assert_eq!(extract_and_repair(escaped).as_deref(), Some(escaped));

        let once = extract_and_repair(r#"{"intent": "say "hello" now"}"#).unwrap();
        assert_eq!(extract_and_repair(&once), Some(once));
    }

    #[test]
    fn multiple_keys_untouched() {
        let clean = r#"{"intent": "other", "confidence": 0.9, "tags": ["a", "b"]}"#;
        assert_eq!(extract_and_repair(clean).as_deref(), Some(clean));
    }

    #[test]
    fn digit_after_embedded_quote_is_a_terminator() {
        // Known limitation: not repaired.
        let out = extract_and_repair(r#"{"a": "the "90s" band"}"#).unwrap();
        assert_eq!(out, r#"{"a": "the "90s" band"}"#);
        assert!(serde_json::from_str::<Value>(&out).is_err());
    }

    #[test]
    fn unterminated_embedded_quote_does_not_panic() {
        let out = extract_and_repair(r#"{"a": "say "hello}"#).unwrap();
        assert_eq!(out, r#"{"a": "say \"hello}"#);
    }

    #[test]
    fn spans_first_open_to_last_close() {
        let out = extract_and_repair(r#"{"a": 1} and {"b": 2}"#).unwrap();
        assert_eq!(out, r#"{"a": 1} and {"b": 2}"#);
    }
}
