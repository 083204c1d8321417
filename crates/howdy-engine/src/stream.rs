//! Decoders that turn raw response bodies into text fragments.
//!
//! Two wire conventions are supported:
//! - a plain text stream, where every body chunk is a slice of UTF-8 text
//! - OpenAI-style server-sent events, where each `data:` line carries a JSON
//!   delta and `data: [DONE]` ends the stream
//!
//! Chunk boundaries are arbitrary, so both decoders carry partial input
//! across calls.

use std::collections::VecDeque;
use std::fmt::Display;
use std::pin::Pin;

use bytes::Bytes;
use futures_util::stream::{self, BoxStream, Stream, StreamExt};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::client::CompletionError;

/// A finite, non-restartable sequence of text fragments in arrival order.
pub type FragmentStream = BoxStream<'static, Result<String, CompletionError>>;

/// Incremental UTF-8 decoder that holds back incomplete trailing sequences.
#[derive(Debug, Default)]
pub struct Utf8Decoder {
    pending: Vec<u8>,
}

impl Utf8Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode as much of `chunk` (plus any held-back bytes) as possible.
    ///
    /// Invalid sequences are replaced with U+FFFD; an incomplete sequence at
    /// the end is kept for the next call.
    pub fn push(&mut self, chunk: &[u8]) -> String {
        self.pending.extend_from_slice(chunk);

        let mut out = String::new();
        let mut rest: &[u8] = &self.pending;
        loop {
            match std::str::from_utf8(rest) {
                Ok(valid) => {
                    out.push_str(valid);
                    rest = &[];
                    break;
                }
                Err(e) => {
                    let (valid, after) = rest.split_at(e.valid_up_to());
                    // valid_up_to guarantees this prefix is UTF-8
                    out.push_str(&String::from_utf8_lossy(valid));
                    match e.error_len() {
                        Some(len) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            rest = &after[len..];
                        }
                        None => {
                            rest = after;
                            break;
                        }
                    }
                }
            }
        }

        self.pending = rest.to_vec();
        out
    }

    /// Flush whatever is left at end of stream.
    pub fn finish(&mut self) -> String {
        let tail = std::mem::take(&mut self.pending);
        String::from_utf8_lossy(&tail).into_owned()
    }
}

/// A server-sent event relevant to completions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SseEvent {
    /// Payload of a `data:` line.
    Data(String),
    /// The `[DONE]` sentinel.
    Done,
}

/// Line-oriented server-sent events decoder.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk and return every complete event it finished.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<SseEvent> {
        self.buffer.extend_from_slice(chunk);

        let mut events = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            if let Some(event) = parse_line(&line) {
                events.push(event);
            }
        }
        events
    }

    /// Parse a final unterminated line, if any.
    pub fn finish(&mut self) -> Option<SseEvent> {
        let line = std::mem::take(&mut self.buffer);
        parse_line(&line)
    }
}

fn parse_line(raw: &[u8]) -> Option<SseEvent> {
    let line = String::from_utf8_lossy(raw);
    let line = line.trim_end_matches(['\n', '\r']);

    // Blank lines separate events; ':' starts a comment (keep-alive)
    if line.is_empty() || line.starts_with(':') {
        return None;
    }

    let data = line.strip_prefix("data:")?;
    let data = data.strip_prefix(' ').unwrap_or(data);
    if data == "[DONE]" {
        Some(SseEvent::Done)
    } else {
        Some(SseEvent::Data(data.to_string()))
    }
}

#[derive(Debug, Deserialize)]
struct ChunkResponse {
    #[serde(default)]
    choices: Vec<ChunkChoice>,
    /// In-band failure; either `{"message": ...}` or a bare string.
    #[serde(default)]
    error: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct ChunkChoice {
    #[serde(default)]
    delta: ChunkDelta,
}

#[derive(Debug, Default, Deserialize)]
struct ChunkDelta {
    #[serde(default)]
    content: Option<String>,
}

/// Extract the content delta from one OpenAI chat-completion chunk.
///
/// Returns `Ok(None)` for chunks without text (role announcements, finish
/// markers) and `Err(CompletionError::Endpoint)` when the chunk carries an
/// error object.
pub fn parse_openai_delta(data: &str) -> Result<Option<String>, CompletionError> {
    let chunk: ChunkResponse =
        serde_json::from_str(data).map_err(|e| CompletionError::Decode(e.to_string()))?;
    if let Some(error) = chunk.error {
        let message = match &error {
            serde_json::Value::String(text) => text.clone(),
            other => other
                .get("message")
                .and_then(serde_json::Value::as_str)
                .map_or_else(|| other.to_string(), str::to_string),
        };
        return Err(CompletionError::Endpoint(message));
    }
    Ok(chunk
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.delta.content)
        .filter(|content| !content.is_empty()))
}

struct BodyState<S, D> {
    body: Pin<Box<S>>,
    decoder: D,
    queue: VecDeque<Result<String, CompletionError>>,
    done: bool,
}

/// Adapt a raw text body into fragments.
pub fn text_fragments<S, E>(body: S) -> FragmentStream
where
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: Display + Send + 'static,
{
    let state = BodyState {
        body: Box::pin(body),
        decoder: Utf8Decoder::new(),
        queue: VecDeque::new(),
        done: false,
    };

    stream::unfold(state, |mut st| async move {
        loop {
            if let Some(item) = st.queue.pop_front() {
                return Some((item, st));
            }
            if st.done {
                return None;
            }
            match st.body.next().await {
                Some(Ok(chunk)) => {
                    let text = st.decoder.push(&chunk);
                    if !text.is_empty() {
                        st.queue.push_back(Ok(text));
                    }
                }
                Some(Err(e)) => {
                    st.done = true;
                    st.queue
                        .push_back(Err(CompletionError::Network(e.to_string())));
                }
                None => {
                    st.done = true;
                    let tail = st.decoder.finish();
                    if !tail.is_empty() {
                        st.queue.push_back(Ok(tail));
                    }
                }
            }
        }
    })
    .boxed()
}

/// Adapt an OpenAI server-sent events body into fragments.
pub fn openai_fragments<S, E>(body: S) -> FragmentStream
where
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: Display + Send + 'static,
{
    let state = BodyState {
        body: Box::pin(body),
        decoder: SseDecoder::new(),
        queue: VecDeque::new(),
        done: false,
    };

    stream::unfold(state, |mut st| async move {
        loop {
            if let Some(item) = st.queue.pop_front() {
                return Some((item, st));
            }
            if st.done {
                return None;
            }
            let events = match st.body.next().await {
                Some(Ok(chunk)) => st.decoder.push(&chunk),
                Some(Err(e)) => {
                    st.done = true;
                    st.queue
                        .push_back(Err(CompletionError::Network(e.to_string())));
                    continue;
                }
                None => {
                    st.done = true;
                    st.decoder.finish().into_iter().collect()
                }
            };

            for event in events {
                match event {
                    SseEvent::Done => {
                        debug!("received [DONE]");
                        st.done = true;
                        break;
                    }
                    SseEvent::Data(data) => match parse_openai_delta(&data) {
                        Ok(Some(text)) => st.queue.push_back(Ok(text)),
                        Ok(None) => {}
                        Err(e @ CompletionError::Endpoint(_)) => {
                            st.done = true;
                            st.queue.push_back(Err(e));
                            break;
                        }
                        Err(e) => warn!(error = %e, "skipping malformed stream chunk"),
                    },
                }
            }
        }
    })
    .boxed()
}
