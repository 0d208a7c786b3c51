use std::borrow::Cow;

use memchr::memchr;

/// Length of the valid JSON escape starting at `bytes[i]` (a backslash), if any.
#[inline]
fn valid_escape_len(bytes: &[u8], i: usize) -> Option<usize> {
    match bytes.get(i + 1)? {
        b'"' | b'\\' | b'/' | b'b' | b'f' | b'n' | b'r' | b't' => Some(2),
        b'u' => {
            let hex = bytes.get(i + 2..i + 6)?;
            hex.iter().all(u8::is_ascii_hexdigit).then_some(6)
        }
        _ => None,
    }
}

/// Double every backslash that does not start a valid JSON escape.
///
/// Escapes are consumed pairwise from the left, so an existing `\\` stays a
/// single escaped backslash and the character after it is scanned afresh.
/// `\u` only counts as valid when four hex digits follow.
///
/// Returns the repaired text and how many backslashes were doubled.
#[must_use]
pub fn double_invalid_backslashes(text: &str) -> (Cow<'_, str>, usize) {
    let bytes = text.as_bytes();
    let Some(first) = memchr(b'\\', bytes) else {
        return (Cow::Borrowed(text), 0);
    };

    let mut out: Option<String> = None;
    let mut copied = 0usize;
    let mut doubled = 0usize;
    let mut i = first;

    while i < bytes.len() {
        if let Some(len) = valid_escape_len(bytes, i) {
            i += len;
        } else {
            let buf = out.get_or_insert_with(|| String::with_capacity(text.len() + 16));
            buf.push_str(&text[copied..=i]);
            buf.push('\\');
            copied = i + 1;
            doubled += 1;
            i += 1;
        }

        match memchr(b'\\', &bytes[i.min(bytes.len())..]) {
            Some(offset) => i += offset,
            None => break,
        }
    }

    match out {
        Some(mut buf) => {
            buf.push_str(&text[copied..]);
            (Cow::Owned(buf), doubled)
        }
        None => (Cow::Borrowed(text), 0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repair(text: &str) -> String {
        double_invalid_backslashes(text).0.into_owned()
    }

    #[test]
    fn test_no_backslash_is_borrowed() {
        let (out, count) = double_invalid_backslashes(r#"{"a":"plain"}"#);
        assert!(matches!(out, Cow::Borrowed(_)));
        assert_eq!(count, 0);
    }

    #[test]
    fn test_valid_escapes_are_untouched() {
        let text = r#"{"a":"quote \" slash \/ back \\ nl \n tab \t uni \u00e9"}"#;
        let (out, count) = double_invalid_backslashes(text);
        assert_eq!(out, text);
        assert_eq!(count, 0);
    }

    #[test]
    fn test_illegal_letters_are_doubled() {
        assert_eq!(repair(r"\alpha"), r"\\alpha");
        assert_eq!(repair(r"\sigma + \pi"), r"\\sigma + \\pi");
        assert_eq!(repair(r"\cdot"), r"\\cdot");
        assert_eq!(repair(r"\mathbb{R}"), r"\\mathbb{R}");
        assert_eq!(repair(r"\{x\}"), r"\\{x\\}");
    }

    #[test]
    fn test_legal_letters_are_left_for_deep_repair() {
        // \b, \f, \n, \r, \t are legal JSON; they are handled after parsing.
        assert_eq!(repair(r"\beta \frac \nabla \rho \theta"), r"\beta \frac \nabla \rho \theta");
    }

    #[test]
    fn test_escaped_backslash_before_letter_is_kept() {
        // `\\alpha` is already a correctly escaped `\alpha`.
        let (out, count) = double_invalid_backslashes(r#""\\alpha""#);
        assert_eq!(out, r#""\\alpha""#);
        assert_eq!(count, 0);
    }

    #[test]
    fn test_unicode_escape_requires_hex() {
        assert_eq!(repair(r"\underline{x}"), r"\\underline{x}");
        assert_eq!(repair(r"\u12"), r"\\u12");
        assert_eq!(repair(r"\u00b0"), r"\u00b0");
    }

    #[test]
    fn test_trailing_backslash_is_doubled() {
        let (out, count) = double_invalid_backslashes(r"end\");
        assert_eq!(out, r"end\\");
        assert_eq!(count, 1);
    }

    #[test]
    fn test_counts_every_doubling() {
        let (_, count) = double_invalid_backslashes(r"\alpha \beta \gamma \delta");
        assert_eq!(count, 3);
    }

    #[test]
    fn test_repaired_text_parses() {
        let raw = r#"{"x": "\alpha + \gamma"}"#;
        assert!(serde_json::from_str::<serde_json::Value>(raw).is_err());
        let fixed = repair(raw);
        let value: serde_json::Value = serde_json::from_str(&fixed).unwrap();
        assert_eq!(value["x"], r"\alpha + \gamma");
    }

    #[test]
    fn test_multibyte_text_survives() {
        assert_eq!(repair("θ = \\theta, ∑ \\sum"), "θ = \\theta, ∑ \\\\sum");
    }
}
