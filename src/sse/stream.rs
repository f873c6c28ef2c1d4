//! Async adapter from a byte stream to a record stream.

use std::collections::VecDeque;

use bytes::Bytes;
use futures::stream::{self, Stream};
use futures_util::StreamExt;

use crate::sse::decoder::SseDecoder;
use crate::sse::record::SseRecord;

struct DecodeState<S> {
    bytes: S,
    /// `None` once the body ended or failed
    decoder: Option<SseDecoder>,
    ready: VecDeque<SseRecord>,
}

/// Decode a response body into SSE records.
///
/// The body is only polled when every record from the previous read has
/// been handed out, so decoding advances as fast as the caller pulls. A
/// transport error is yielded once and ends the stream.
pub fn decode_records<S, E>(bytes: S) -> impl Stream<Item = Result<SseRecord, E>>
where
    S: Stream<Item = Result<Bytes, E>> + Unpin,
{
    let state = DecodeState {
        bytes,
        decoder: Some(SseDecoder::new()),
        ready: VecDeque::new(),
    };

    stream::unfold(state, |mut state| async move {
        loop {
            if let Some(record) = state.ready.pop_front() {
                return Some((Ok(record), state));
            }

            let decoder = state.decoder.as_mut()?;

            match state.bytes.next().await {
                Some(Ok(chunk)) => {
                    let records = decoder.push(&chunk);
                    state.ready.extend(records);
                }
                Some(Err(e)) => {
                    state.decoder = None;
                    return Some((Err(e), state));
                }
                None => {
                    if let Some(decoder) = state.decoder.take() {
                        let discarded = decoder.finish();
                        if discarded > 0 {
                            tracing::debug!(
                                discarded,
                                "SSE body ended inside a record; discarding unterminated tail"
                            );
                        }
                    }
                    return None;
                }
            }
        }
    })
}
