//! Caller-owned conversation state and retry.
//!
//! Retry never resumes a broken stream. It resends the last user message
//! with the same session id as a brand-new call, and the failed assistant
//! turn stays in the transcript as it was.

use uuid::Uuid;

use super::client::{ChatClient, ChatObserver, ChatReply};
use super::events::ChatMeta;
use super::request::ChatRequest;
use crate::error::{ChatError, ChatResult};
use crate::traits::HttpClient;

/// Correlation state for one conversation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatSession {
    /// Established session id, sent with every call once known
    pub session_id: Option<String>,
    /// Last message the user sent, kept for retry
    pub last_user_message: Option<String>,
    /// Latest request id seen, for display
    pub request_id: Option<String>,
    pub debug: bool,
}

impl ChatSession {
    /// Session with no id yet. The backend may assign one via `meta`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Session with a caller-chosen id.
    pub fn with_session_id(session_id: impl Into<String>) -> Self {
        Self {
            session_id: Some(session_id.into()),
            ..Default::default()
        }
    }

    /// Session with a freshly generated id.
    pub fn with_generated_id() -> Self {
        Self::with_session_id(Uuid::new_v4().to_string())
    }

    /// Build the request for a new user message and remember it for retry.
    pub fn prepare(&mut self, message: impl Into<String>) -> ChatRequest {
        let message = message.into();
        self.last_user_message = Some(message.clone());
        self.request_for(message)
    }

    /// Build a request resending the last user message.
    pub fn retry_request(&self) -> ChatResult<ChatRequest> {
        let message = self
            .last_user_message
            .clone()
            .ok_or(ChatError::NothingToRetry)?;
        Ok(self.request_for(message))
    }

    fn request_for(&self, message: String) -> ChatRequest {
        let mut request = ChatRequest::new(message).with_debug(self.debug);
        request.session_id = self.session_id.clone();
        request
    }

    /// Record what a finished or failed call told us.
    pub fn observe(&mut self, meta: Option<&ChatMeta>, request_id: Option<&str>) {
        if let Some(id) = meta.and_then(|m| m.session_id.as_deref()) {
            if self.session_id.as_deref() != Some(id) {
                tracing::debug!(session_id = id, "adopting session id from backend");
                self.session_id = Some(id.to_string());
            }
        }
        if let Some(id) = request_id {
            self.request_id = Some(id.to_string());
        }
    }
}

/// Who wrote a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

/// Lifecycle of an assistant turn.
#[derive(Debug, Clone, PartialEq)]
pub enum TurnStatus {
    Streaming,
    Complete,
    Failed {
        message: String,
        request_id: Option<String>,
        retryable: bool,
    },
}

/// One entry of the transcript.
#[derive(Debug, Clone, PartialEq)]
pub struct Turn {
    pub role: Role,
    pub text: String,
    pub meta: ChatMeta,
    pub request_id: Option<String>,
    pub status: TurnStatus,
}

impl Turn {
    fn user(text: String) -> Self {
        Self {
            role: Role::User,
            text,
            meta: ChatMeta::default(),
            request_id: None,
            status: TurnStatus::Complete,
        }
    }

    fn assistant() -> Self {
        Self {
            role: Role::Assistant,
            text: String::new(),
            meta: ChatMeta::default(),
            request_id: None,
            status: TurnStatus::Streaming,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.status, TurnStatus::Failed { .. })
    }
}

/// Fills the in-flight assistant turn while forwarding to the caller's
/// observer.
struct TurnWriter<'a> {
    turn: &'a mut Turn,
    inner: &'a mut dyn ChatObserver,
}

impl ChatObserver for TurnWriter<'_> {
    fn on_start(&mut self, request_id: &str) {
        self.turn.request_id = Some(request_id.to_string());
        self.inner.on_start(request_id);
    }

    fn on_delta(&mut self, text: &str) {
        self.turn.text.push_str(text);
        self.inner.on_delta(text);
    }

    fn on_meta(&mut self, meta: &ChatMeta) {
        self.turn.meta = meta.clone();
        self.inner.on_meta(meta);
    }
}

/// A transcript driven through a [`ChatClient`].
///
/// Calls take `&mut self`, so a second message cannot be submitted while
/// one is still streaming.
#[derive(Debug)]
pub struct Conversation<C: HttpClient> {
    client: ChatClient<C>,
    session: ChatSession,
    turns: Vec<Turn>,
}

impl<C: HttpClient> Conversation<C> {
    pub fn new(client: ChatClient<C>, session: ChatSession) -> Self {
        Self {
            client,
            session,
            turns: Vec::new(),
        }
    }

    pub fn session(&self) -> &ChatSession {
        &self.session
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// Send a new user message.
    pub async fn send(
        &mut self,
        message: impl Into<String>,
        observer: &mut dyn ChatObserver,
    ) -> ChatResult<ChatReply> {
        let request = self.session.prepare(message);
        self.turns.push(Turn::user(request.message.clone()));
        self.run(request, observer).await
    }

    /// Resend the last user message as a fresh call.
    ///
    /// A new assistant turn is appended; earlier turns are not touched.
    pub async fn retry(&mut self, observer: &mut dyn ChatObserver) -> ChatResult<ChatReply> {
        let request = self.session.retry_request()?;
        tracing::info!(session_id = ?request.session_id, "retrying last message");
        self.run(request, observer).await
    }

    async fn run(
        &mut self,
        request: ChatRequest,
        observer: &mut dyn ChatObserver,
    ) -> ChatResult<ChatReply> {
        self.turns.push(Turn::assistant());
        let index = self.turns.len() - 1;

        let result = {
            let mut writer = TurnWriter {
                turn: &mut self.turns[index],
                inner: observer,
            };
            self.client.stream_chat(&request, &mut writer).await
        };

        let turn = &mut self.turns[index];
        match &result {
            Ok(reply) => {
                turn.text = reply.text.clone();
                turn.meta = reply.meta.clone();
                turn.request_id = reply.request_id.clone();
                turn.status = TurnStatus::Complete;
                self.session
                    .observe(Some(&reply.meta), reply.request_id.as_deref());
            }
            Err(err) => {
                let request_id = err.request_id().map(String::from).or(turn.request_id.clone());
                turn.status = TurnStatus::Failed {
                    message: err.to_string(),
                    request_id: request_id.clone(),
                    retryable: err.is_retryable(),
                };
                let meta = (!turn.meta.is_empty()).then_some(&turn.meta);
                self.session.observe(meta, request_id.as_deref());
            }
        }
        result
    }
}
