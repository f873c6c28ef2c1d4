//! Chat client: one streaming call per request.
//!
//! [`ChatClient::open`] returns as soon as response headers arrive and hands
//! back a [`ChatStream`] of typed events. [`ChatClient::stream_chat`] drives
//! that stream to completion, reporting progress to a [`ChatObserver`].

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::Stream;
use futures_util::StreamExt;
use once_cell::sync::Lazy;
use regex::Regex;
use uuid::Uuid;

use super::events::{ChatMeta, ChatStreamEvent};
use super::interpreter::interpret_records;
use super::request::ChatRequest;
use crate::error::{ChatError, ChatResult};
use crate::sse::decode_records;
use crate::traits::{Headers, HttpClient, StreamingResponse};

/// Path of the chat streaming endpoint behind the gateway.
pub const CHAT_STREAM_PATH: &str = "/api/proxy/chat/stream";

/// Correlation header, both directions.
pub const REQUEST_ID_HEADER: &str = "X-Request-ID";

static REQUEST_ID_IN_TEXT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"request_id=([A-Za-z0-9_.\-]+)").expect("Invalid request id regex")
});

/// Recover a request id embedded in an error body as `request_id=<token>`.
pub fn extract_request_id(text: &str) -> Option<String> {
    REQUEST_ID_IN_TEXT
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Progress callbacks for [`ChatClient::stream_chat`].
///
/// All methods default to doing nothing.
pub trait ChatObserver: Send {
    /// Response headers arrived carrying a request id. Fires before any
    /// body byte is read, even if the body turns out empty or the status
    /// is an error.
    fn on_start(&mut self, _request_id: &str) {}

    /// A text fragment arrived.
    fn on_delta(&mut self, _text: &str) {}

    /// Metadata arrived. Receives the accumulated view, so fields absent
    /// from the latest record keep their earlier values.
    fn on_meta(&mut self, _meta: &ChatMeta) {}
}

impl ChatObserver for () {}

/// Result of a chat call that ran to the end of its stream.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatReply {
    /// All deltas concatenated in arrival order
    pub text: String,
    /// Every `meta` record merged
    pub meta: ChatMeta,
    /// Request id from the response headers
    pub request_id: Option<String>,
    /// False when the body ended without `[DONE]`
    pub completed: bool,
}

/// Events of one chat call.
///
/// Yields `Ok` events in arrival order and stops after `Done` or `Error`.
/// A body read failure is yielded once as `Err` and ends the stream.
pub struct ChatStream {
    request_id: Option<String>,
    events: Pin<Box<dyn Stream<Item = ChatResult<ChatStreamEvent>> + Send>>,
}

impl ChatStream {
    fn from_response(request_id: Option<String>, response: StreamingResponse) -> Self {
        let records = Box::pin(decode_records(response.body));
        let events = interpret_records(records).map(|item| item.map_err(ChatError::from));
        Self {
            request_id,
            events: Box::pin(events),
        }
    }

    /// Request id reported by the response headers.
    pub fn request_id(&self) -> Option<&str> {
        self.request_id.as_deref()
    }
}

impl Stream for ChatStream {
    type Item = ChatResult<ChatStreamEvent>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.events.as_mut().poll_next(cx)
    }
}

impl std::fmt::Debug for ChatStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatStream")
            .field("request_id", &self.request_id)
            .finish_non_exhaustive()
    }
}

/// Client for the chat streaming endpoint.
///
/// Holds no per-call state: every call gets its own decoder and
/// interpreter, and session state lives with the caller.
#[derive(Debug, Clone)]
pub struct ChatClient<C: HttpClient> {
    http: C,
    base_url: String,
    chat_path: String,
}

impl<C: HttpClient> ChatClient<C> {
    /// Create a client for the gateway at `base_url`.
    pub fn new(http: C, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            chat_path: CHAT_STREAM_PATH.to_string(),
        }
    }

    /// Override the endpoint path.
    pub fn with_chat_path(mut self, path: impl Into<String>) -> Self {
        self.chat_path = path.into();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), self.chat_path)
    }

    /// Send the request and wait for response headers.
    ///
    /// Returns the response request id alongside the unread response.
    async fn send(&self, request: &ChatRequest) -> ChatResult<(Option<String>, StreamingResponse)> {
        let body = serde_json::to_string(request)?;
        let outbound_id = request
            .request_id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        let mut headers = Headers::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        headers.insert("Accept".to_string(), "text/event-stream".to_string());
        headers.insert(REQUEST_ID_HEADER.to_string(), outbound_id.clone());

        tracing::debug!(request_id = %outbound_id, "opening chat stream");
        let response = self.http.post_stream(&self.endpoint(), &body, &headers).await?;
        let request_id = response.header(REQUEST_ID_HEADER).map(String::from);
        Ok((request_id, response))
    }

    /// Turn a non-2xx response into a transport error, reading its body.
    async fn check_status(
        request_id: Option<String>,
        response: StreamingResponse,
    ) -> ChatResult<ChatStream> {
        if response.is_success() {
            return Ok(ChatStream::from_response(request_id, response));
        }

        let status = response.status;
        let message = response.text().await?;
        let request_id = request_id.or_else(|| extract_request_id(&message));
        tracing::warn!(status, request_id = ?request_id, "chat stream rejected");
        Err(ChatError::Transport {
            status,
            message,
            request_id,
        })
    }

    /// Open a chat call and return its event stream.
    pub async fn open(&self, request: &ChatRequest) -> ChatResult<ChatStream> {
        let (request_id, response) = self.send(request).await?;
        Self::check_status(request_id, response).await
    }

    /// Run a chat call to completion.
    ///
    /// Fails with [`ChatError::Transport`] for a non-2xx initial response and
    /// [`ChatError::Application`] when the backend sends an `error` payload.
    /// A body that ends without `[DONE]` resolves with `completed == false`.
    pub async fn stream_chat(
        &self,
        request: &ChatRequest,
        observer: &mut dyn ChatObserver,
    ) -> ChatResult<ChatReply> {
        let (request_id, response) = self.send(request).await?;
        if let Some(id) = &request_id {
            observer.on_start(id);
        }

        let mut stream = Self::check_status(request_id, response).await?;
        let mut reply = ChatReply {
            request_id: stream.request_id().map(String::from),
            ..Default::default()
        };

        while let Some(event) = stream.next().await {
            match event? {
                ChatStreamEvent::Delta(text) => {
                    observer.on_delta(&text);
                    reply.text.push_str(&text);
                }
                ChatStreamEvent::Meta(meta) => {
                    reply.meta.merge(meta);
                    observer.on_meta(&reply.meta);
                }
                ChatStreamEvent::Error(message) => {
                    tracing::warn!(request_id = ?reply.request_id, "backend reported an error mid-stream");
                    return Err(ChatError::Application {
                        message,
                        request_id: reply.request_id,
                    });
                }
                ChatStreamEvent::Done => {
                    reply.completed = true;
                    break;
                }
            }
        }

        if !reply.completed {
            tracing::debug!("chat stream ended without a completion sentinel");
        }
        Ok(reply)
    }

    /// [`stream_chat`](Self::stream_chat), abandoned as soon as `cancel`
    /// resolves. Dropping the call drops the in-flight body read.
    pub async fn stream_chat_until<F>(
        &self,
        request: &ChatRequest,
        observer: &mut dyn ChatObserver,
        cancel: F,
    ) -> ChatResult<ChatReply>
    where
        F: Future<Output = ()>,
    {
        tokio::select! {
            result = self.stream_chat(request, observer) => result,
            _ = cancel => {
                tracing::debug!("chat call cancelled by caller");
                Err(ChatError::Cancelled)
            }
        }
    }
}
