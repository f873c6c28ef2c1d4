//! Errors surfaced by a chat call.
//!
//! Only transport and application failures reach the caller; framing and
//! payload anomalies are absorbed by the decoder and interpreter.

use thiserror::Error;

use super::category::ErrorCategory;
use crate::traits::HttpError;

/// Failure of one chat call.
#[derive(Debug, Error)]
pub enum ChatError {
    /// Non-2xx initial response. `message` is the full response body.
    #[error("{message}")]
    Transport {
        status: u16,
        message: String,
        request_id: Option<String>,
    },

    /// The backend sent an `error` payload mid-stream.
    #[error("{message}")]
    Application {
        message: String,
        request_id: Option<String>,
    },

    /// Request could not be sent or the body read failed.
    #[error(transparent)]
    Http(#[from] HttpError),

    /// Request body could not be serialized.
    #[error("failed to encode chat request: {0}")]
    Encode(#[from] serde_json::Error),

    /// Caller cancelled the call before it finished.
    #[error("chat call cancelled")]
    Cancelled,

    /// `retry` called with no previous user message.
    #[error("nothing to retry")]
    NothingToRetry,
}

/// Result alias for chat operations.
pub type ChatResult<T> = Result<T, ChatError>;

impl ChatError {
    /// HTTP status of a failed initial response.
    pub fn status(&self) -> Option<u16> {
        match self {
            ChatError::Transport { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Correlation id known when the call failed.
    pub fn request_id(&self) -> Option<&str> {
        match self {
            ChatError::Transport { request_id, .. } | ChatError::Application { request_id, .. } => {
                request_id.as_deref()
            }
            _ => None,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            ChatError::Transport { .. } | ChatError::Http(_) => ErrorCategory::Transport,
            ChatError::Application { .. } => ErrorCategory::Application,
            ChatError::Encode(_) | ChatError::NothingToRetry => ErrorCategory::Client,
            ChatError::Cancelled => ErrorCategory::Cancelled,
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.category().is_retryable()
    }

    /// Text for display next to the failed message.
    pub fn user_message(&self) -> String {
        match self.request_id() {
            Some(id) => format!("{} (request id: {})", self, id),
            None => self.to_string(),
        }
    }
}
