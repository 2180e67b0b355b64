//! Forgiving JSON-in-prose parsing for remote AI replies.
//!
//! Grounded on the teacher's markdown-fence stripping in
//! `GeminiClient::call_gemini_api`, extended with balanced-brace
//! extraction, forgiving repair, and a regex-based keyword fallback.

use regex::Regex;
use serde_json::Value;

/// The result of parsing a raw reply. `degraded` is set whenever the
/// balanced-brace + repair path failed and the regex fallback extractor
/// had to be used.
#[derive(Debug, Clone)]
pub struct ParsedReply {
    pub value: Value,
    pub degraded: bool,
}

/// Parse a raw model reply that may contain JSON wrapped in markdown
/// fences or surrounding prose.
///
/// Order of attempts:
/// 1. Strip markdown code fences, try direct `serde_json::from_str`.
/// 2. Extract the largest balanced `{...}` substring, try parsing it.
/// 3. Apply forgiving repairs (trailing commas, single quotes, missing
///    closing braces) to that substring and retry.
/// 4. Fall back to a regex-based keyword extractor producing a
///    degraded-but-shaped partial result.
pub fn parse_reply(raw: &str) -> ParsedReply {
    let stripped = strip_code_fences(raw);

    if let Ok(value) = serde_json::from_str::<Value>(stripped.trim()) {
        return ParsedReply { value, degraded: false };
    }

    if let Some(candidate) = largest_balanced_braces(stripped) {
        if let Ok(value) = serde_json::from_str::<Value>(&candidate) {
            return ParsedReply { value, degraded: false };
        }

        let repaired = forgiving_repair(&candidate);
        if let Ok(value) = serde_json::from_str::<Value>(&repaired) {
            return ParsedReply { value, degraded: false };
        }
    }

    ParsedReply {
        value: regex_fallback(stripped),
        degraded: true,
    }
}

fn strip_code_fences(text: &str) -> &str {
    let text = text.trim();
    let text = text.strip_prefix("```json").unwrap_or(text);
    let text = text.strip_prefix("```").unwrap_or(text);
    text.strip_suffix("```").unwrap_or(text).trim()
}

/// Scan for the largest substring delimited by balanced `{` / `}`.
fn largest_balanced_braces(text: &str) -> Option<String> {
    let bytes: Vec<char> = text.chars().collect();
    let mut best: Option<(usize, usize)> = None;

    for start in 0..bytes.len() {
        if bytes[start] != '{' {
            continue;
        }
        let mut depth = 0i32;
        for end in start..bytes.len() {
            match bytes[end] {
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        let len = end - start;
                        if best.map(|(s, e)| e - s < len).unwrap_or(true) {
                            best = Some((start, end));
                        }
                        break;
                    }
                }
                _ => {}
            }
        }
    }

    best.map(|(start, end)| bytes[start..=end].iter().collect())
}

/// Strip trailing commas, convert single to double quotes, and balance
/// any unclosed `{`/`[` up to the remaining open count.
fn forgiving_repair(candidate: &str) -> String {
    let trailing_comma = Regex::new(r",\s*([}\]])").unwrap();
    let mut repaired = trailing_comma.replace_all(candidate, "$1").to_string();

    repaired = repaired.replace('\'', "\"");

    let open_braces = repaired.matches('{').count();
    let close_braces = repaired.matches('}').count();
    for _ in 0..open_braces.saturating_sub(close_braces) {
        repaired.push('}');
    }

    let open_brackets = repaired.matches('[').count();
    let close_brackets = repaired.matches(']').count();
    for _ in 0..open_brackets.saturating_sub(close_brackets) {
        repaired.push(']');
    }

    repaired
}

/// Last-resort keyword extractor: pulls `"key": "value"` / `"key": number`
/// pairs out of raw text via regex, ignoring surrounding structure
/// entirely. Always succeeds, possibly with an empty object.
fn regex_fallback(text: &str) -> Value {
    let pair_re = Regex::new(r#""([A-Za-z0-9_]+)"\s*:\s*"((?:[^"\\]|\\.)*)""#).unwrap();
    let number_re = Regex::new(r#""([A-Za-z0-9_]+)"\s*:\s*(-?\d+(?:\.\d+)?)"#).unwrap();

    let mut map = serde_json::Map::new();
    for cap in pair_re.captures_iter(text) {
        map.insert(cap[1].to_string(), Value::String(cap[2].to_string()));
    }
    for cap in number_re.captures_iter(text) {
        if !map.contains_key(&cap[1]) {
            if let Ok(n) = cap[2].parse::<f64>() {
                if let Some(num) = serde_json::Number::from_f64(n) {
                    map.insert(cap[1].to_string(), Value::Number(num));
                }
            }
        }
    }

    Value::Object(map)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_clean_json() {
        let result = parse_reply(r#"{"summary": "hello"}"#);
        assert!(!result.degraded);
        assert_eq!(result.value["summary"], "hello");
    }

    #[test]
    fn strips_markdown_fences() {
        let result = parse_reply("```json\n{\"summary\": \"hi\"}\n```");
        assert!(!result.degraded);
        assert_eq!(result.value["summary"], "hi");
    }

    #[test]
    fn extracts_json_embedded_in_prose() {
        let raw = "Sure, here you go: {\"summary\": \"ok\"} — hope that helps!";
        let result = parse_reply(raw);
        assert!(!result.degraded);
        assert_eq!(result.value["summary"], "ok");
    }

    #[test]
    fn repairs_trailing_comma_and_single_quotes() {
        let raw = "{'summary': 'ok',}";
        let result = parse_reply(raw);
        assert!(!result.degraded);
        assert_eq!(result.value["summary"], "ok");
    }

    #[test]
    fn repairs_missing_closing_brace() {
        let raw = "{\"summary\": \"ok\"";
        let result = parse_reply(raw);
        assert!(!result.degraded);
        assert_eq!(result.value["summary"], "ok");
    }

    #[test]
    fn falls_back_to_regex_extraction_on_unrecoverable_input() {
        let raw = "model said summary is \"great content\" roughly";
        let result = parse_reply(raw);
        assert!(result.degraded);
    }
}
