//! Stream relay: upstream fragments to client event frames
//!
//! Each fragment becomes one `data: {"text": ...}` frame as soon as it
//! arrives. A clean end is followed by `data: [DONE]`; a failed upstream gets
//! a single generic error frame and no `[DONE]`, so the client can tell the
//! two apart. Dropping the returned stream (client gone) drops the upstream
//! stream with it, which cancels the upstream request.

use std::convert::Infallible;

use axum::body::Bytes;
use futures::{Stream, StreamExt};
use serde_json::json;
use tracing::Span;

use crate::conversation::StreamFragment;
use crate::providers::ProviderError;

/// Final frame of a successful stream
pub const DONE_FRAME: &str = "data: [DONE]\n\n";

/// Client-facing text for a failure after streaming started
pub const STREAM_ERROR_MESSAGE: &str = "The reading was interrupted. Please try again.";

pub fn text_frame(text: &str) -> Bytes {
    data_frame(&json!({ "text": text }).to_string())
}

pub fn error_frame() -> Bytes {
    data_frame(&json!({ "error": STREAM_ERROR_MESSAGE }).to_string())
}

fn data_frame(payload: &str) -> Bytes {
    Bytes::from(format!("data: {}\n\n", payload))
}

/// Logs when the client goes away before the stream finished.
struct DisconnectGuard {
    span: Span,
    finished: bool,
    fragments: usize,
}

impl Drop for DisconnectGuard {
    fn drop(&mut self) {
        if !self.finished {
            tracing::info!(
                parent: &self.span,
                fragments = self.fragments,
                "Client disconnected, cancelling upstream stream"
            );
        }
    }
}

/// Frame `fragments` for the client. Events are logged under `span`, the
/// span of the request that opened the stream.
pub fn relay<S>(
    fragments: S,
    span: Span,
) -> impl Stream<Item = Result<Bytes, Infallible>> + Send + 'static
where
    S: Stream<Item = Result<StreamFragment, ProviderError>> + Send + 'static,
{
    async_stream::stream! {
        let mut guard = DisconnectGuard { span, finished: false, fragments: 0 };
        let mut fragments = Box::pin(fragments);
        let mut failed = false;

        while let Some(item) = fragments.next().await {
            match item {
                Ok(fragment) => {
                    if fragment.text.is_empty() {
                        continue;
                    }
                    guard.fragments += 1;
                    yield Ok(text_frame(&fragment.text));
                }
                Err(e) => {
                    tracing::error!(
                        parent: &guard.span,
                        fragments = guard.fragments,
                        "Upstream stream failed: {}",
                        e
                    );
                    failed = true;
                    break;
                }
            }
        }

        guard.finished = true;
        if failed {
            yield Ok(error_frame());
        } else {
            tracing::debug!(
                parent: &guard.span,
                fragments = guard.fragments,
                "Stream complete"
            );
            yield Ok(Bytes::from_static(DONE_FRAME.as_bytes()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    async fn collect_frames<S>(fragments: S) -> Vec<String>
    where
        S: Stream<Item = Result<StreamFragment, ProviderError>> + Send + 'static,
    {
        relay(fragments, Span::none())
            .map(|frame| String::from_utf8(frame.unwrap().to_vec()).unwrap())
            .collect()
            .await
    }

    #[tokio::test]
    async fn test_order_preserved_then_done() {
        let input = stream::iter(
            ["a", "b", "c"]
                .into_iter()
                .map(|t| Ok(StreamFragment::new(t))),
        );

        let frames = collect_frames(input).await;

        assert_eq!(
            frames,
            vec![
                "data: {\"text\":\"a\"}\n\n",
                "data: {\"text\":\"b\"}\n\n",
                "data: {\"text\":\"c\"}\n\n",
                "data: [DONE]\n\n",
            ]
        );
    }

    #[tokio::test]
    async fn test_empty_upstream_still_done() {
        let input = stream::iter(Vec::<Result<StreamFragment, ProviderError>>::new());
        assert_eq!(collect_frames(input).await, vec![DONE_FRAME]);
    }

    #[tokio::test]
    async fn test_failure_ends_with_error_frame() {
        let input = stream::iter(vec![
            Ok(StreamFragment::new("Right,")),
            Err(ProviderError::Truncated),
            Ok(StreamFragment::new("never sent")),
        ]);

        let frames = collect_frames(input).await;

        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0], "data: {\"text\":\"Right,\"}\n\n");
        assert!(frames[1].contains(STREAM_ERROR_MESSAGE));
        assert!(!frames.iter().any(|f| f == DONE_FRAME));
    }

    #[tokio::test]
    async fn test_error_detail_not_leaked() {
        let input = stream::iter(vec![Err(ProviderError::Upstream(
            "overloaded_error: secret detail".into(),
        ))]);
        let frames = collect_frames(input).await;
        assert!(!frames[0].contains("secret detail"));
    }

    #[tokio::test]
    async fn test_empty_fragments_skipped() {
        let input = stream::iter(vec![
            Ok(StreamFragment::new("")),
            Ok(StreamFragment::new("hi")),
        ]);
        let frames = collect_frames(input).await;
        assert_eq!(frames, vec!["data: {\"text\":\"hi\"}\n\n", DONE_FRAME]);
    }

    #[test]
    fn test_text_frame_escapes() {
        let frame = text_frame("line one\n\"quoted\"");
        assert_eq!(
            &frame[..],
            b"data: {\"text\":\"line one\\n\\\"quoted\\\"\"}\n\n"
        );
    }

    /// Sets its flag when dropped
    struct DropFlag(Arc<AtomicBool>);

    impl Drop for DropFlag {
        fn drop(&mut self) {
            self.0.store(true, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn test_dropping_relay_drops_upstream() {
        let dropped = Arc::new(AtomicBool::new(false));
        let flag = DropFlag(dropped.clone());
        let input = stream::iter(vec![Ok(StreamFragment::new("Right,"))])
            .chain(stream::pending())
            .map(move |item: Result<StreamFragment, ProviderError>| {
                let _held = &flag;
                item
            });

        let mut frames = Box::pin(relay(input, Span::none()));
        let first = frames.next().await.unwrap().unwrap();
        assert_eq!(&first[..], b"data: {\"text\":\"Right,\"}\n\n");
        assert!(!dropped.load(Ordering::SeqCst));

        // client goes away mid-stream
        drop(frames);
        assert!(dropped.load(Ordering::SeqCst));
    }
}
