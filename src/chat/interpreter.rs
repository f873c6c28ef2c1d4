//! Record to event classification.

use futures::stream::{self, Stream};
use futures_util::StreamExt;

use super::events::ChatStreamEvent;
use super::payloads::{parse_meta, MessagePayload};
use crate::sse::SseRecord;

/// Event name of completion-metadata records.
pub const META_EVENT: &str = "meta";

/// Per-call interpreter. Create a fresh one for every chat call.
#[derive(Debug, Default)]
pub struct ChatInterpreter {
    finished: bool,
}

impl ChatInterpreter {
    pub fn new() -> Self {
        Self::default()
    }

    /// True once `Done` or `Error` has been produced.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Classify one record. Returns `None` for records that produce no
    /// event, and for every record after a terminal event.
    pub fn interpret(&mut self, record: &SseRecord) -> Option<ChatStreamEvent> {
        if self.finished {
            return None;
        }

        let event = match record.event.as_str() {
            META_EVENT => match parse_meta(&record.data) {
                Some(meta) => ChatStreamEvent::Meta(meta),
                None => {
                    tracing::debug!("ignoring unusable meta record");
                    return None;
                }
            },
            name if name == crate::sse::DEFAULT_EVENT => {
                match MessagePayload::classify(&record.data) {
                    MessagePayload::Done => ChatStreamEvent::Done,
                    MessagePayload::Error(message) => ChatStreamEvent::Error(message),
                    MessagePayload::Text(text) => ChatStreamEvent::Delta(text),
                    MessagePayload::Raw(text) => {
                        tracing::debug!(len = text.len(), "passing through non-JSON message data");
                        ChatStreamEvent::Delta(text)
                    }
                    MessagePayload::Ignored => return None,
                }
            }
            other => {
                tracing::trace!(event = other, "ignoring unknown SSE event");
                return None;
            }
        };

        self.finished = event.is_terminal();
        Some(event)
    }
}

/// Map a record stream to chat events, ending right after the terminal
/// event. The record stream is not polled again once a terminal event or a
/// transport error has been yielded.
pub fn interpret_records<S, E>(records: S) -> impl Stream<Item = Result<ChatStreamEvent, E>>
where
    S: Stream<Item = Result<SseRecord, E>> + Unpin,
{
    stream::unfold(
        (records, ChatInterpreter::new(), false),
        |(mut records, mut interpreter, stopped)| async move {
            if stopped || interpreter.is_finished() {
                return None;
            }
            loop {
                match records.next().await? {
                    Ok(record) => {
                        if let Some(event) = interpreter.interpret(&record) {
                            return Some((Ok(event), (records, interpreter, false)));
                        }
                    }
                    Err(e) => return Some((Err(e), (records, interpreter, true))),
                }
            }
        },
    )
}
