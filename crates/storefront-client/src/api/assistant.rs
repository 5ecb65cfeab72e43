//! Streaming LLM chat
//!
//! The one endpoint that bypasses the middleware pipeline: the bearer token
//! and content type are set by hand, and a failed call is never retried —
//! a half-consumed generation cannot be transparently resubmitted. A 401
//! still revokes the session so the embedder redirects to sign-in; the call
//! itself fails with the HTTP status text.

use std::collections::VecDeque;
use std::pin::Pin;

use futures_util::{Stream, StreamExt};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::stream::{ChatEvent, EventDecoder};
use crate::transport::StorefrontClient;

pub const CHAT_PATH: &str = "/api/assistant/chat";

#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".into(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".into(),
            content: content.into(),
        }
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    messages: &'a [ChatMessage],
}

/// The decoded chat event stream.
pub type ChatStream = Pin<Box<dyn Stream<Item = Result<ChatEvent>> + Send>>;

impl StorefrontClient {
    /// Start a streaming chat generation.
    ///
    /// Yields [`ChatEvent`]s until the terminal `done` event; a framing or
    /// transport error ends the stream after being yielded once.
    pub async fn chat(&self, messages: &[ChatMessage]) -> Result<ChatStream> {
        let request_id = format!("req_{}", uuid::Uuid::new_v4().as_simple());
        let url = format!("{}{}", self.base_url(), CHAT_PATH);

        let mut builder = self
            .http()
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .header("x-request-id", &request_id);
        if let Some(token) = self.session().access_token()? {
            builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
        }

        let response = builder
            .json(&ChatRequest { messages })
            .send()
            .await
            .map_err(Error::Transport)?;

        let status = response.status();
        if status.as_u16() == 401 {
            warn!(%request_id, "streaming chat unauthorized");
            self.session().revoke("unauthorized streaming request")?;
            return Err(Error::Unauthorized(format!(
                "chat request failed: {}",
                status_text(status)
            )));
        }
        if !status.is_success() {
            return Err(Error::Api {
                status: status.as_u16(),
                message: format!("chat request failed: {}", status_text(status)),
            });
        }

        debug!(%request_id, "chat stream open");
        Ok(decode_stream(response.bytes_stream()))
    }
}

fn status_text(status: reqwest::StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => format!("{} {reason}", status.as_u16()),
        None => status.as_u16().to_string(),
    }
}

struct DecodeState<S> {
    bytes: S,
    decoder: EventDecoder,
    ready: VecDeque<ChatEvent>,
    terminated: bool,
}

/// Turn the raw byte stream into decoded events, one terminal error at most.
fn decode_stream<S, B>(bytes: S) -> ChatStream
where
    S: Stream<Item = reqwest::Result<B>> + Send + Unpin + 'static,
    B: AsRef<[u8]> + Send + 'static,
{
    let state = DecodeState {
        bytes,
        decoder: EventDecoder::new(),
        ready: VecDeque::new(),
        terminated: false,
    };

    Box::pin(futures_util::stream::unfold(state, |mut state| async move {
        loop {
            if let Some(event) = state.ready.pop_front() {
                return Some((Ok(event), state));
            }
            if state.terminated {
                return None;
            }
            match state.bytes.next().await {
                Some(Ok(chunk)) => match state.decoder.feed(chunk.as_ref()) {
                    Ok(events) => state.ready.extend(events),
                    Err(e) => {
                        state.terminated = true;
                        return Some((Err(e), state));
                    }
                },
                Some(Err(e)) => {
                    state.terminated = true;
                    return Some((Err(Error::Transport(e)), state));
                }
                None => {
                    state.terminated = true;
                    match state.decoder.finish() {
                        Ok(Some(event)) => state.ready.push_back(event),
                        Ok(None) => return None,
                        Err(e) => return Some((Err(e), state)),
                    }
                }
            }
        }
    }))
}
