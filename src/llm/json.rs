//! Normalization of model output that is expected to be JSON.
//!
//! Models are told to answer with a bare JSON object but regularly wrap it in
//! a markdown fence or return it double-encoded as a JSON string literal. This
//! module undoes both and re-serializes the result in a canonical layout.
//! Anything it cannot make sense of is returned unchanged, so normalization
//! never fails.

use std::borrow::Cow;

use serde_json::Value;

const FENCE: &str = "```";

/// Normalize a raw model response.
///
/// Tries, in order:
/// 1. Fence stripping (only when the text starts with ` ``` `): keep the lines
///    from the first one starting with `{` to the last one ending with `}`
/// 2. A quoted literal wrapping escaped JSON (`"{\"a\": 1}"`)
/// 3. A valid JSON string whose value is itself JSON
/// 4. A direct parse
///
/// Only objects and arrays count as a successful parse; they are returned
/// pretty-printed with two-space indentation. Otherwise the trimmed input is
/// returned as is. `normalize(&normalize(x)) == normalize(x)` for every `x`.
pub fn normalize(raw: &str) -> String {
    let trimmed = raw.trim();

    let candidate: Cow<'_, str> = if trimmed.starts_with(FENCE) {
        Cow::Owned(strip_fence(trimmed))
    } else {
        Cow::Borrowed(trimmed)
    };

    parse_structured(candidate.trim())
        .and_then(|value| serde_json::to_string_pretty(&value).ok())
        .unwrap_or_else(|| trimmed.to_string())
}

fn parse_structured(text: &str) -> Option<Value> {
    parse_quoted_literal(text)
        .or_else(|| parse_double_encoded(text))
        .or_else(|| parse_direct(text))
}

/// Cut a fenced response down to the enclosed object.
///
/// The opening line is found scanning forward and the closing line scanning
/// backward, each on its own. When no such span exists the fence lines
/// themselves are dropped instead.
fn strip_fence(text: &str) -> String {
    let lines: Vec<&str> = text.lines().collect();

    let start = lines.iter().position(|line| line.trim_start().starts_with('{'));
    let end = lines.iter().rposition(|line| line.trim_end().ends_with('}'));

    if let (Some(start), Some(end)) = (start, end)
        && start <= end
    {
        return lines[start..=end].join("\n");
    }

    // The first line is always the opening fence.
    let mut body = lines.get(1..).unwrap_or_default();
    if let Some((last, rest)) = body.split_last()
        && last.trim_start().starts_with(FENCE)
    {
        body = rest;
    }
    body.join("\n")
}

/// `"{\"a\": 1}"` where the literal itself need not be valid JSON
/// (raw newlines inside the quotes, for instance).
fn parse_quoted_literal(text: &str) -> Option<Value> {
    let inner = text.strip_prefix('"')?.strip_suffix('"')?;
    if !inner.contains("\\\"") {
        return None;
    }
    structured(serde_json::from_str(&unescape_lenient(inner)).ok()?)
}

fn parse_double_encoded(text: &str) -> Option<Value> {
    match serde_json::from_str::<Value>(text).ok()? {
        Value::String(inner) => structured(serde_json::from_str(inner.trim()).ok()?),
        _ => None,
    }
}

fn parse_direct(text: &str) -> Option<Value> {
    structured(serde_json::from_str(text).ok()?)
}

fn structured(value: Value) -> Option<Value> {
    match value {
        Value::Object(_) | Value::Array(_) => Some(value),
        _ => None,
    }
}

/// Undo one level of string escaping, leaving unknown escapes untouched.
fn unescape_lenient(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();

    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some('/') => out.push('/'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }

    out
}
