//! Mock HTTP client for testing.
//!
//! Replays canned status, headers and body chunks, so tests can choose
//! exactly where the network splits the SSE stream.

use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use crate::traits::{Headers, HttpClient, HttpError, StreamingResponse};

/// A recorded HTTP request for verification in tests.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// Request URL
    pub url: String,
    /// Request headers
    pub headers: Headers,
    /// Request body
    pub body: String,
}

/// Configuration for a mock response.
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Respond with a status, headers and the body split into these chunks
    Stream {
        status: u16,
        headers: Headers,
        chunks: Vec<Bytes>,
    },
    /// Headers arrive, then the body fails after these chunks
    BrokenStream {
        status: u16,
        chunks: Vec<Bytes>,
        error: HttpError,
    },
    /// Fail before any response arrives
    Error(HttpError),
}

impl MockResponse {
    /// 200 response with an SSE body delivered in the given pieces.
    pub fn sse<I, B>(chunks: I) -> Self
    where
        I: IntoIterator<Item = B>,
        B: Into<Bytes>,
    {
        let mut headers = Headers::new();
        headers.insert("content-type".to_string(), "text/event-stream".to_string());
        MockResponse::Stream {
            status: 200,
            headers,
            chunks: chunks.into_iter().map(Into::into).collect(),
        }
    }

    /// Single-chunk response with the given status.
    pub fn status(status: u16, body: impl Into<Bytes>) -> Self {
        MockResponse::Stream {
            status,
            headers: Headers::new(),
            chunks: vec![body.into()],
        }
    }

    /// Add a response header (no-op for `Error`/`BrokenStream`).
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        if let MockResponse::Stream { headers, .. } = &mut self {
            headers.insert(name.to_string(), value.to_string());
        }
        self
    }
}

/// Mock HTTP client for testing.
///
/// Responses are matched by exact URL first, then by URL prefix, then the
/// default response. Cloned clients share recorded requests.
///
/// # Example
///
/// ```ignore
/// let client = MockHttpClient::new();
/// client.set_default_response(MockResponse::sse([
///     "data: {\"content\":\"Hel",
///     "lo\"}\n\n",
/// ]));
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockHttpClient {
    /// Configured responses by URL pattern
    responses: Arc<Mutex<HashMap<String, MockResponse>>>,
    /// Default response when no specific match
    default_response: Arc<Mutex<Option<MockResponse>>>,
    /// Recorded requests for verification
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockHttpClient {
    /// Create a new mock HTTP client.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a response for a specific URL (or URL prefix).
    pub fn set_response(&self, url: &str, response: MockResponse) {
        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(url.to_string(), response);
    }

    /// Set a default response for URLs without specific matches.
    pub fn set_default_response(&self, response: MockResponse) {
        *self
            .default_response
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(response);
    }

    /// Get all recorded requests.
    pub fn get_requests(&self) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn record_request(&self, url: &str, headers: &Headers, body: &str) {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(RecordedRequest {
                url: url.to_string(),
                headers: headers.clone(),
                body: body.to_string(),
            });
    }

    fn get_response(&self, url: &str) -> Option<MockResponse> {
        let responses = self.responses.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(response) = responses.get(url) {
            return Some(response.clone());
        }

        for (pattern, response) in responses.iter() {
            if url.starts_with(pattern) {
                return Some(response.clone());
            }
        }

        self.default_response
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl HttpClient for MockHttpClient {
    async fn post_stream(
        &self,
        url: &str,
        body: &str,
        headers: &Headers,
    ) -> Result<StreamingResponse, HttpError> {
        self.record_request(url, headers, body);

        match self.get_response(url) {
            Some(MockResponse::Stream {
                status,
                headers,
                chunks,
            }) => {
                let stream = futures::stream::iter(chunks.into_iter().map(Ok));
                Ok(StreamingResponse::new(status, headers, Box::pin(stream)))
            }
            Some(MockResponse::BrokenStream {
                status,
                chunks,
                error,
            }) => {
                let items = chunks
                    .into_iter()
                    .map(Ok)
                    .chain(std::iter::once(Err(error)))
                    .collect::<Vec<_>>();
                let stream = futures::stream::iter(items);
                Ok(StreamingResponse::new(status, Headers::new(), Box::pin(stream)))
            }
            Some(MockResponse::Error(err)) => Err(err),
            None => Err(HttpError::Other(format!("No mock response for URL: {}", url))),
        }
    }
}
