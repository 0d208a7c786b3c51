use memchr::memmem;

const FENCE: &[u8] = b"```";
const JSON_TAG: &str = "json";

/// The JSON shape the caller expects, used to pick a default for empty input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadShape {
    Object,
    Array,
}

impl PayloadShape {
    #[must_use]
    pub fn empty_literal(self) -> &'static str {
        match self {
            PayloadShape::Object => "{}",
            PayloadShape::Array => "[]",
        }
    }
}

/// Which path produced the candidate text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractSource {
    /// No fence; the trimmed input is the candidate.
    Bare,
    /// Content of the first closed code fence.
    Fenced,
    /// An opening fence with no closing fence; everything after the opener.
    UnclosedFence,
    /// Empty or missing input replaced by the shape's default.
    Empty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Extracted<'a> {
    pub json: &'a str,
    pub source: ExtractSource,
}

/// Isolate the JSON payload inside a raw model response.
///
/// Never fails. Text that is already delimited by a matching `{...}` or
/// `[...]` pair is taken as-is so fences quoted inside string values are left
/// alone.
#[must_use]
pub fn extract_json_payload(raw: Option<&str>, shape: PayloadShape) -> Extracted<'_> {
    let trimmed = raw.map_or("", str::trim);
    if trimmed.is_empty() {
        return Extracted {
            json: shape.empty_literal(),
            source: ExtractSource::Empty,
        };
    }

    if is_delimited_json(trimmed) {
        return Extracted {
            json: trimmed,
            source: ExtractSource::Bare,
        };
    }

    let bytes = trimmed.as_bytes();
    let Some(open) = memmem::find(bytes, FENCE) else {
        return Extracted {
            json: trimmed,
            source: ExtractSource::Bare,
        };
    };

    let body_start = open + FENCE.len();
    let body = strip_json_tag(&trimmed[body_start..]);
    let body_offset = trimmed.len() - body.len();

    match memmem::find(&bytes[body_offset..], FENCE) {
        Some(close_rel) => Extracted {
            json: trimmed[body_offset..body_offset + close_rel].trim(),
            source: ExtractSource::Fenced,
        },
        None => Extracted {
            json: body.trim(),
            source: ExtractSource::UnclosedFence,
        },
    }
}

fn is_delimited_json(s: &str) -> bool {
    (s.starts_with('{') && s.ends_with('}')) || (s.starts_with('[') && s.ends_with(']'))
}

fn strip_json_tag(s: &str) -> &str {
    match s.get(..JSON_TAG.len()) {
        Some(tag) if tag.eq_ignore_ascii_case(JSON_TAG) => &s[JSON_TAG.len()..],
        _ => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(raw: &str) -> Extracted<'_> {
        extract_json_payload(Some(raw), PayloadShape::Object)
    }

    #[test]
    fn test_clean_json_is_unchanged() {
        let out = extract("  {\"a\":1}\n");
        assert_eq!(out.json, "{\"a\":1}");
        assert_eq!(out.source, ExtractSource::Bare);
    }

    #[test]
    fn test_fence_with_prose_around() {
        let out = extract("prefix text ```json\n{\"a\":1}\n``` suffix");
        assert_eq!(out.json, "{\"a\":1}");
        assert_eq!(out.source, ExtractSource::Fenced);
    }

    #[test]
    fn test_untagged_fence() {
        let out = extract("```\n[1, 2]\n```");
        assert_eq!(out.json, "[1, 2]");
        assert_eq!(out.source, ExtractSource::Fenced);
    }

    #[test]
    fn test_uppercase_tag() {
        assert_eq!(extract("```JSON\n{}\n```").json, "{}");
    }

    #[test]
    fn test_first_fence_wins() {
        let out = extract("```json\n{\"first\":1}\n```\nand\n```json\n{\"second\":2}\n```");
        assert_eq!(out.json, "{\"first\":1}");
    }

    #[test]
    fn test_unclosed_fence_takes_rest() {
        let out = extract("```json\n{\"a\": [1, 2");
        assert_eq!(out.json, "{\"a\": [1, 2");
        assert_eq!(out.source, ExtractSource::UnclosedFence);
    }

    #[test]
    fn test_fence_inside_json_string_is_ignored() {
        let raw = "{\"body\":\"use ```rust fences```\"}";
        let out = extract(raw);
        assert_eq!(out.json, raw);
        assert_eq!(out.source, ExtractSource::Bare);
    }

    #[test]
    fn test_leading_bracket_prose_still_finds_fence() {
        let out = extract("[Generated quiz]\n```json\n[{\"question\":\"q\"}]\n```");
        assert_eq!(out.json, "[{\"question\":\"q\"}]");
        assert_eq!(out.source, ExtractSource::Fenced);
    }

    #[test]
    fn test_truncated_bare_json_without_fence_is_bare() {
        let out = extract("{\"a\": [1, 2");
        assert_eq!(out.json, "{\"a\": [1, 2");
        assert_eq!(out.source, ExtractSource::Bare);
    }

    #[test]
    fn test_empty_input_defaults_by_shape() {
        assert_eq!(extract_json_payload(None, PayloadShape::Object).json, "{}");
        assert_eq!(
            extract_json_payload(Some("   "), PayloadShape::Array).json,
            "[]"
        );
        assert_eq!(
            extract_json_payload(Some(""), PayloadShape::Array).source,
            ExtractSource::Empty
        );
    }

    #[test]
    fn test_prose_without_fence_is_trimmed_only() {
        let out = extract("  Sorry, I cannot help with that.  ");
        assert_eq!(out.json, "Sorry, I cannot help with that.");
        assert_eq!(out.source, ExtractSource::Bare);
    }
}
