//! Error category classification.
//!
//! Every gateway and chat error maps onto one category, which decides
//! whether a retry is offered and whether the error ever reaches the user.

use std::fmt;

/// High-level categorization of errors for handling decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Missing or forbidden backend target, unusable credential.
    /// Fatal at the gateway until the deployment is fixed.
    Configuration,

    /// Request never got a usable response: connection failures, non-2xx
    /// initial status, body read failures. Retryable.
    Transport,

    /// Malformed SSE framing. Absorbed by the decoder, never surfaced.
    Protocol,

    /// Undecodable JSON payload. Degraded locally, never surfaced.
    Payload,

    /// The backend reported an error inside the stream. Ends the call;
    /// retryable as a fresh call.
    Application,

    /// The caller abandoned the call.
    Cancelled,

    /// Misuse of the API, such as retrying with nothing to retry.
    Client,
}

impl ErrorCategory {
    /// Returns true if a retry action should be offered.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorCategory::Transport | ErrorCategory::Application)
    }

    /// Returns true if errors in this category are reported to the caller
    /// rather than recovered internally.
    pub fn is_surfaced(&self) -> bool {
        !matches!(self, ErrorCategory::Protocol | ErrorCategory::Payload)
    }

    /// Returns a short label for the category suitable for logging.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Configuration => "configuration",
            ErrorCategory::Transport => "transport",
            ErrorCategory::Protocol => "protocol",
            ErrorCategory::Payload => "payload",
            ErrorCategory::Application => "application",
            ErrorCategory::Cancelled => "cancelled",
            ErrorCategory::Client => "client",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
