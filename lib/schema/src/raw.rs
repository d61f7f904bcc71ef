//! Raw model output before validation
//!
//! The extraction model is asked for a JSON object but in practice returns
//! fenced code blocks, arrays, preambles or plain prose. Everything it can
//! produce is folded into [`RawExtraction`] here and nowhere else.

use serde_json::{Map, Value};

/// Untyped payload from the structured-extraction step
#[derive(Debug, Clone, PartialEq)]
pub enum RawExtraction {
    /// A JSON object
    Object(Map<String, Value>),
    /// The first element of a non-empty JSON array, when it is an object
    ArraySingleton(Map<String, Value>),
    /// Anything else: scalars, empty arrays, arrays of non-objects, prose
    Other(Value),
}

impl RawExtraction {
    /// Empty extraction, used when the source page had no content
    pub fn empty() -> Self {
        RawExtraction::Other(Value::Null)
    }

    /// The candidate object, if the payload has one
    pub fn candidate(&self) -> Option<&Map<String, Value>> {
        match self {
            RawExtraction::Object(map) | RawExtraction::ArraySingleton(map) => Some(map),
            RawExtraction::Other(_) => None,
        }
    }

    /// Short name of the payload shape for diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            RawExtraction::Object(_) => "object",
            RawExtraction::ArraySingleton(_) => "array",
            RawExtraction::Other(Value::Null) => "null",
            RawExtraction::Other(Value::Bool(_)) => "boolean",
            RawExtraction::Other(Value::Number(_)) => "number",
            RawExtraction::Other(Value::String(_)) => "string",
            RawExtraction::Other(Value::Array(_)) => "array",
            RawExtraction::Other(Value::Object(_)) => "object",
        }
    }
}

impl From<Value> for RawExtraction {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => RawExtraction::Object(map),
            Value::Array(items) => {
                let len = items.len();
                match items.into_iter().next() {
                    Some(Value::Object(map)) => {
                        if len > 1 {
                            tracing::debug!(len, "extraction returned several objects, using the first");
                        }
                        RawExtraction::ArraySingleton(map)
                    }
                    Some(first) => RawExtraction::Other(Value::Array(vec![first])),
                    None => RawExtraction::Other(Value::Array(Vec::new())),
                }
            }
            other => RawExtraction::Other(other),
        }
    }
}

/// Parse raw model text into a [`RawExtraction`].
///
/// Accepts bare JSON, JSON wrapped in Markdown fences, and JSON surrounded by
/// prose. Text without any parseable JSON becomes `Other(String)`; blank text
/// becomes [`RawExtraction::empty`].
pub fn parse_model_output(text: &str) -> RawExtraction {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return RawExtraction::empty();
    }

    let unfenced = strip_code_fence(trimmed);
    if let Ok(value) = serde_json::from_str::<Value>(unfenced) {
        return value.into();
    }

    if let Some(value) = embedded_json(unfenced) {
        return value.into();
    }

    tracing::debug!("model output contained no parseable JSON");
    RawExtraction::Other(Value::String(trimmed.to_string()))
}

/// Remove a surrounding ```json ... ``` fence if present
fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // skip the info string (`json`, `JSON`, ...) up to the first newline
    let body = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest,
    };
    body.trim_end()
        .strip_suffix("```")
        .unwrap_or(body)
        .trim()
}

/// First complete JSON object or array embedded in prose.
///
/// Each `{`/`[` is tried as a start; the streaming deserializer stops at the
/// end of the first value, so braces in trailing prose do not matter. A value
/// holding a candidate object wins over earlier unusable ones.
fn embedded_json(text: &str) -> Option<Value> {
    let mut fallback = None;
    for (start, _) in text.match_indices(['{', '[']) {
        let mut stream = serde_json::Deserializer::from_str(&text[start..]).into_iter::<Value>();
        let Some(Ok(value)) = stream.next() else {
            continue;
        };
        if matches!(&value, Value::Object(_))
            || matches!(&value, Value::Array(items) if matches!(items.first(), Some(Value::Object(_))))
        {
            return Some(value);
        }
        fallback.get_or_insert(value);
    }
    fallback
}
