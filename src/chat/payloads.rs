//! Payload classification for `message` and `meta` records.

use serde_json::{Map, Value};

use super::events::{ChatMeta, Source};

/// Literal data of the end-of-stream sentinel.
pub const DONE_SENTINEL: &str = "[DONE]";

/// What a `message` record's data turned out to be.
#[derive(Debug, Clone, PartialEq)]
pub enum MessagePayload {
    /// The `[DONE]` sentinel
    Done,
    /// JSON object with a truthy `error` field
    Error(String),
    /// JSON object with a `content` or `chunk` string
    Text(String),
    /// Data that is not JSON at all, passed through as text
    Raw(String),
    /// Valid JSON carrying nothing we act on
    Ignored,
}

impl MessagePayload {
    /// Classify the data of one `message` record.
    pub fn classify(data: &str) -> Self {
        if data.trim() == DONE_SENTINEL {
            return MessagePayload::Done;
        }

        let value: Value = match serde_json::from_str(data) {
            Ok(value) => value,
            Err(_) => return MessagePayload::Raw(data.to_string()),
        };

        let Value::Object(object) = value else {
            return MessagePayload::Ignored;
        };

        if let Some(message) = error_message(&object) {
            return MessagePayload::Error(message);
        }

        ["content", "chunk"]
            .iter()
            .filter_map(|key| object.get(*key).and_then(Value::as_str))
            .find(|text| !text.is_empty())
            .map(|text| MessagePayload::Text(text.to_string()))
            .unwrap_or(MessagePayload::Ignored)
    }
}

fn error_message(object: &Map<String, Value>) -> Option<String> {
    match object.get("error")? {
        Value::Null | Value::Bool(false) => None,
        Value::String(message) if message.is_empty() => None,
        Value::String(message) => Some(message.clone()),
        Value::Object(inner) => Some(
            inner
                .get("message")
                .and_then(Value::as_str)
                .map(String::from)
                .unwrap_or_else(|| Value::Object(inner.clone()).to_string()),
        ),
        other => Some(other.to_string()),
    }
}

/// Parse the data of a `meta` record.
///
/// Each field is read on its own so one malformed field does not discard the
/// others. Returns `None` for non-JSON data or when no known field is
/// present.
pub fn parse_meta(data: &str) -> Option<ChatMeta> {
    let Value::Object(object) = serde_json::from_str::<Value>(data).ok()? else {
        return None;
    };

    let meta = ChatMeta {
        sources: field(&object, &["sources"]).map(|values: Vec<Value>| {
            values
                .into_iter()
                .filter_map(|v| serde_json::from_value::<Source>(v).ok())
                .collect()
        }),
        sources_truncated: field(&object, &["sources_truncated", "sourcesTruncated"]),
        session_id: field(&object, &["session_id", "sessionId"]),
        intermediate_steps: field(&object, &["intermediate_steps", "intermediateSteps"]),
    };

    (!meta.is_empty()).then_some(meta)
}

fn field<T: serde::de::DeserializeOwned>(object: &Map<String, Value>, keys: &[&str]) -> Option<T> {
    keys.iter()
        .filter_map(|key| object.get(*key))
        .filter(|value| !value.is_null())
        .find_map(|value| serde_json::from_value(value.clone()).ok())
}
