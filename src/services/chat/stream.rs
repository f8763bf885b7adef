//! Incremental decoding of streamed chat replies.
//!
//! The wire format is one JSON object per line, newline-terminated:
//!
//! ```text
//! {"type":"STREAM","content":"partial answer text"}
//! ```
//!
//! Bytes arrive in arbitrary fragments, so the decoder buffers until a
//! complete line is available and only then decodes it. A trailing fragment
//! without a newline is processed when the stream closes. Because decoding
//! happens per complete line, multi-byte UTF-8 sequences split across reads
//! are reassembled before any text handling.

use super::types::{ChatResponse, StreamChunk, STREAM_CHUNK_TYPE};
use crate::errors::{CopilotError, CopilotResult};
use crate::transport::ByteStream;
use bytes::BytesMut;
use futures::{Stream, StreamExt};
use pin_project_lite::pin_project;
use std::collections::VecDeque;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio_util::sync::CancellationToken;

pin_project! {
    /// Stream of decoded chat chunks.
    ///
    /// Yields every well-formed chunk regardless of its type tag; malformed
    /// lines are skipped without failing the stream, so a partially corrupt
    /// stream still delivers its healthy chunks. Cancelling the associated
    /// token makes the next poll yield [`CopilotError::Cancelled`] and ends
    /// the stream.
    pub struct ChatStream {
        #[pin]
        inner: ByteStream,
        cancel: CancellationToken,
        buffer: BytesMut,
        pending: VecDeque<StreamChunk>,
        is_done: bool,
    }
}

impl ChatStream {
    /// Wrap a response body stream in the chunk decoder
    pub fn new(inner: ByteStream, cancel: CancellationToken) -> Self {
        Self {
            inner,
            cancel,
            buffer: BytesMut::new(),
            pending: VecDeque::new(),
            is_done: false,
        }
    }

    /// Adapt an already-complete answer into a single-chunk stream.
    ///
    /// Used when the server replied with buffered JSON but the caller asked
    /// for the streaming shape. An empty answer yields no chunks.
    pub fn from_answer(answer: String) -> Self {
        let mut pending = VecDeque::new();
        if !answer.is_empty() {
            pending.push_back(StreamChunk {
                chunk_type: STREAM_CHUNK_TYPE.to_string(),
                content: answer,
            });
        }

        Self {
            inner: Box::pin(futures::stream::empty()),
            cancel: CancellationToken::new(),
            buffer: BytesMut::new(),
            pending,
            is_done: false,
        }
    }

    /// Collect the stream into a complete answer, invoking `observer` for
    /// each contributing chunk.
    ///
    /// Only chunks tagged `STREAM` with non-empty content are accumulated
    /// and observed; chunks of any other type pass through the stream but
    /// are inert here.
    pub async fn collect_with<F>(mut self, mut observer: F) -> CopilotResult<ChatResponse>
    where
        F: FnMut(&StreamChunk),
    {
        let mut answer = String::new();
        let mut contributed = 0usize;

        while let Some(chunk) = self.next().await {
            let chunk = chunk?;
            if chunk.is_stream() && !chunk.content.is_empty() {
                answer.push_str(&chunk.content);
                contributed += 1;
                observer(&chunk);
            }
        }

        tracing::debug!(chunks = contributed, answer_len = answer.len(), "stream collected");
        Ok(ChatResponse::from_answer(answer))
    }

    /// Collect the stream into a complete answer without observing chunks
    pub async fn collect_response(self) -> CopilotResult<ChatResponse> {
        self.collect_with(|_| {}).await
    }

    /// Split off and decode every complete line currently in the buffer
    fn drain_complete_lines(buffer: &mut BytesMut, pending: &mut VecDeque<StreamChunk>) {
        while let Some(pos) = buffer.iter().position(|&b| b == b'\n') {
            let line = buffer.split_to(pos + 1);
            Self::decode_line(&line[..pos], pending);
        }
    }

    /// Decode whatever remains in the buffer at end of stream
    fn flush_tail(buffer: &mut BytesMut, pending: &mut VecDeque<StreamChunk>) {
        if !buffer.is_empty() {
            let tail = buffer.split();
            Self::decode_line(&tail, pending);
        }
    }

    /// Decode one line into a chunk; malformed lines are skipped silently
    fn decode_line(line: &[u8], pending: &mut VecDeque<StreamChunk>) {
        let text = match std::str::from_utf8(line) {
            Ok(text) => text.trim(),
            Err(error) => {
                tracing::trace!(%error, "skipping non-UTF-8 stream line");
                return;
            }
        };

        if text.is_empty() {
            return;
        }

        match serde_json::from_str::<StreamChunk>(text) {
            Ok(chunk) => pending.push_back(chunk),
            Err(error) => {
                tracing::trace!(%error, "skipping malformed stream line");
            }
        }
    }
}

impl Stream for ChatStream {
    type Item = CopilotResult<StreamChunk>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();

        loop {
            // Cancellation wins over chunks already decoded into the queue.
            if this.cancel.is_cancelled() && !*this.is_done {
                *this.is_done = true;
                this.pending.clear();
                return Poll::Ready(Some(Err(CopilotError::Cancelled)));
            }

            if let Some(chunk) = this.pending.pop_front() {
                return Poll::Ready(Some(Ok(chunk)));
            }

            if *this.is_done {
                return Poll::Ready(None);
            }

            match this.inner.as_mut().poll_next(cx) {
                Poll::Ready(Some(Ok(bytes))) => {
                    this.buffer.extend_from_slice(&bytes);
                    Self::drain_complete_lines(this.buffer, this.pending);
                }
                Poll::Ready(Some(Err(error))) => {
                    *this.is_done = true;
                    return Poll::Ready(Some(Err(error)));
                }
                Poll::Ready(None) => {
                    Self::flush_tail(this.buffer, this.pending);
                    *this.is_done = true;
                }
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}
