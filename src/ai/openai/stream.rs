//! Incremental parser for server-sent chat completion chunks.

use super::types::ChatCompletionChunk;
use crate::{Error, Result};
use bytes::Bytes;
use futures::Stream;
use std::collections::VecDeque;
use std::pin::Pin;
use std::task::{Context, Poll};

/// Adapts a raw SSE byte stream into a stream of delta content fragments.
///
/// The wire format is `data: <json>` lines terminated by a `data: [DONE]`
/// sentinel. Chunks may split lines arbitrarily, so bytes are buffered until
/// a full line is available. Dropping the stream drops the underlying HTTP
/// response and releases the connection.
pub struct SseTokenStream {
    inner: Pin<Box<dyn Stream<Item = reqwest::Result<Bytes>> + Send>>,
    buffer: Vec<u8>,
    pending: VecDeque<String>,
    done: bool,
}

impl SseTokenStream {
    pub fn new(inner: impl Stream<Item = reqwest::Result<Bytes>> + Send + 'static) -> Self {
        Self {
            inner: Box::pin(inner),
            buffer: Vec::new(),
            pending: VecDeque::new(),
            done: false,
        }
    }

    fn drain_lines(&mut self) {
        while let Some(newline) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=newline).collect();
            let line = String::from_utf8_lossy(&line);
            let line = line.trim();

            let Some(data) = line.strip_prefix("data:") else {
                continue;
            };
            let data = data.trim_start();

            if data == "[DONE]" {
                self.done = true;
                continue;
            }

            match serde_json::from_str::<ChatCompletionChunk>(data) {
                Ok(chunk) => {
                    let content = chunk
                        .choices
                        .first()
                        .and_then(|choice| choice.delta.content.clone());
                    if let Some(content) = content {
                        if !content.is_empty() {
                            self.pending.push_back(content);
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!("Skipping malformed stream chunk: {}", e);
                }
            }
        }
    }
}

impl Stream for SseTokenStream {
    type Item = Result<String>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        loop {
            if let Some(token) = this.pending.pop_front() {
                return Poll::Ready(Some(Ok(token)));
            }
            if this.done {
                return Poll::Ready(None);
            }

            match this.inner.as_mut().poll_next(cx) {
                Poll::Ready(Some(Ok(bytes))) => {
                    this.buffer.extend_from_slice(&bytes);
                    this.drain_lines();
                }
                Poll::Ready(Some(Err(e))) => {
                    this.done = true;
                    return Poll::Ready(Some(Err(Error::AiProvider(format!(
                        "Chat stream failed: {}",
                        e
                    )))));
                }
                Poll::Ready(None) => {
                    this.done = true;
                }
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}
