//! SSE line and record types
//!
//! A record is everything between two blank-line terminators. Only the
//! `event:`, `data:` and `id:` fields carry meaning here; `retry:` and unknown
//! field names are accepted and dropped.

/// Event name used when a record has no `event:` line.
pub const DEFAULT_EVENT: &str = "message";

/// Represents a single parsed SSE line
#[derive(Debug, Clone, PartialEq)]
pub enum SseLine {
    /// Event name declaration (e.g., "event: meta")
    Event(String),
    /// Data payload with one leading space removed
    Data(String),
    /// Last-event id
    Id(String),
    /// Comment line (starts with ':'), used by backends as keep-alive
    Comment(String),
    /// Blank line
    Empty,
    /// `retry:` or a field name we don't interpret
    Ignored,
}

/// One complete SSE record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseRecord {
    /// Event name, `"message"` unless the record said otherwise
    pub event: String,
    /// `data:` lines joined with `\n`
    pub data: String,
    /// Value of the last `id:` line, if any
    pub id: Option<String>,
}

impl SseRecord {
    /// Create a record with an explicit event name.
    pub fn new(event: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            event: event.into(),
            data: data.into(),
            id: None,
        }
    }

    /// Create a record with the default `message` event name.
    pub fn message(data: impl Into<String>) -> Self {
        Self::new(DEFAULT_EVENT, data)
    }

    /// True when the record uses the default event name.
    pub fn is_message(&self) -> bool {
        self.event == DEFAULT_EVENT
    }
}

/// Parse a single SSE line (without its line terminator).
pub fn parse_sse_line(line: &str) -> SseLine {
    if line.is_empty() {
        return SseLine::Empty;
    }

    if let Some(stripped) = line.strip_prefix(':') {
        return SseLine::Comment(stripped.trim().to_string());
    }

    // A line without a colon is a field name with an empty value
    let (field, value) = match line.split_once(':') {
        Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
        None => (line, ""),
    };

    match field {
        "event" => SseLine::Event(value.trim().to_string()),
        "data" => SseLine::Data(value.to_string()),
        "id" => SseLine::Id(value.to_string()),
        _ => SseLine::Ignored,
    }
}

/// Assemble one record from the text between two terminators.
///
/// Returns `None` for blocks that carry no `data:` line: keep-alive pings,
/// comment-only blocks and whitespace.
pub fn parse_record(block: &str) -> Option<SseRecord> {
    if block.trim().is_empty() {
        return None;
    }

    let mut event: Option<String> = None;
    let mut data: Vec<String> = Vec::new();
    let mut id = None;

    for line in block.split('\n') {
        match parse_sse_line(line) {
            SseLine::Event(name) => event = Some(name),
            SseLine::Data(value) => data.push(value),
            SseLine::Id(value) => id = Some(value),
            SseLine::Comment(_) | SseLine::Empty | SseLine::Ignored => {}
        }
    }

    if data.is_empty() {
        return None;
    }

    Some(SseRecord {
        event: event
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| DEFAULT_EVENT.to_string()),
        data: data.join("\n"),
        id,
    })
}
