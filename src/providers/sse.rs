//! Incremental decoding of upstream server-sent event bodies
//!
//! Chunks from the network can split lines (and UTF-8 sequences) anywhere,
//! so bytes are buffered until a full line is available.

use std::time::Duration;

use futures::{Stream, StreamExt};

use crate::conversation::StreamFragment;

use super::{FragmentStream, ProviderError};

/// What one `data:` payload means to a provider
#[derive(Debug, PartialEq, Eq)]
pub enum SseEvent {
    Fragment(StreamFragment),
    /// The provider's end-of-stream marker
    Done,
    /// Payloads that carry no text, malformed ones included
    Skip,
}

/// Accumulates raw bytes and hands back the payload of each complete
/// `data:` line
#[derive(Debug, Default)]
pub struct SseLineBuffer {
    pending: Vec<u8>,
}

impl SseLineBuffer {
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(chunk);

        let mut payloads = Vec::new();
        while let Some(pos) = self.pending.iter().position(|b| *b == b'\n') {
            let raw: Vec<u8> = self.pending.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&raw);
            let line = line.trim_end_matches(|c: char| c == '\n' || c == '\r');

            // blank separators, comments, and event/id fields carry no text
            if let Some(rest) = line.strip_prefix("data:") {
                payloads.push(rest.trim_start().to_string());
            }
        }
        payloads
    }
}

/// Turn a streaming HTTP response into fragments, parsing each `data:`
/// payload with `parse`.
///
/// The stream ends cleanly only when `parse` reports [`SseEvent::Done`].
/// A body that stops before that, or stays silent longer than
/// `idle_timeout`, ends with an error item instead.
pub fn fragment_stream<F>(
    response: reqwest::Response,
    idle_timeout: Duration,
    parse: F,
) -> FragmentStream
where
    F: Fn(&str) -> Result<SseEvent, ProviderError> + Send + 'static,
{
    Box::pin(decode_body(response, idle_timeout, parse))
}

fn decode_body<F>(
    response: reqwest::Response,
    idle_timeout: Duration,
    parse: F,
) -> impl Stream<Item = Result<StreamFragment, ProviderError>> + Send + 'static
where
    F: Fn(&str) -> Result<SseEvent, ProviderError> + Send + 'static,
{
    async_stream::try_stream! {
        let mut body = Box::pin(response.bytes_stream());
        let mut lines = SseLineBuffer::default();
        let mut finished = false;

        'read: loop {
            let next = tokio::time::timeout(idle_timeout, body.next())
                .await
                .map_err(|_| ProviderError::Timeout(idle_timeout))?;
            let chunk = match next {
                Some(chunk) => chunk?,
                None => break 'read,
            };

            for payload in lines.push(&chunk) {
                match parse(&payload)? {
                    SseEvent::Fragment(fragment) => {
                        yield fragment;
                    }
                    SseEvent::Done => {
                        finished = true;
                        break 'read;
                    }
                    SseEvent::Skip => {}
                }
            }
        }

        if !finished {
            Err::<(), _>(ProviderError::Truncated)?;
        }
    }
}
