//! Typed chat stream events.
//!
//! One chat call produces an ordered sequence of [`ChatStreamEvent`]s ending in
//! at most one terminal event (`Done` or `Error`).

use serde::{Deserialize, Serialize};

/// A retrieved source backing the answer.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Source {
    #[serde(default)]
    pub content: Option<String>,
    /// Free-form attributes (title, url, score, ...)
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

/// Completion metadata carried by `meta` records.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ChatMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<Source>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources_truncated: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intermediate_steps: Option<Vec<serde_json::Value>>,
}

impl ChatMeta {
    /// True when no field is set.
    pub fn is_empty(&self) -> bool {
        self.sources.is_none()
            && self.sources_truncated.is_none()
            && self.session_id.is_none()
            && self.intermediate_steps.is_none()
    }

    /// Fold a later `meta` record into this one.
    ///
    /// Each field present in `other` replaces the earlier value; absent
    /// fields leave it untouched.
    pub fn merge(&mut self, other: ChatMeta) {
        if other.sources.is_some() {
            self.sources = other.sources;
        }
        if other.intermediate_steps.is_some() {
            self.intermediate_steps = other.intermediate_steps;
        }
        if other.sources_truncated.is_some() {
            self.sources_truncated = other.sources_truncated;
        }
        if other.session_id.is_some() {
            self.session_id = other.session_id;
        }
    }
}

/// One application-level event decoded from the stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ChatStreamEvent {
    /// Text fragment to append to the assistant message
    Delta(String),
    /// Sources, session id and diagnostics
    Meta(ChatMeta),
    /// Backend-reported failure; terminal
    Error(String),
    /// Normal completion; terminal
    Done,
}

impl ChatStreamEvent {
    /// True for events after which nothing else may follow.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ChatStreamEvent::Done | ChatStreamEvent::Error(_))
    }
}
