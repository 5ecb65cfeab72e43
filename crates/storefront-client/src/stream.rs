//! Newline-delimited JSON event stream decoding
//!
//! The assistant endpoint streams `{"delta":"..."}` events terminated by
//! `{"done":true}`, one JSON object per line. The network hands us chunks
//! that split anywhere, so the decoder buffers bytes until a newline
//! completes a line. Lines after the terminal event are ignored.

use serde::Deserialize;

use crate::error::{Error, Result};

/// One event from the chat stream.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChatEvent {
    /// Generated text fragment, absent on the terminal event
    #[serde(default)]
    pub delta: Option<String>,
    /// Terminal marker; no events follow once this is true
    #[serde(default)]
    pub done: bool,
}

/// Incremental decoder for the newline-delimited event framing.
#[derive(Default)]
pub struct EventDecoder {
    buffer: Vec<u8>,
    done: bool,
}

impl EventDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the terminal event has been decoded.
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Feed a network chunk, returning every event it completed.
    pub fn feed(&mut self, chunk: &[u8]) -> Result<Vec<ChatEvent>> {
        self.buffer.extend_from_slice(chunk);

        let mut events = Vec::new();
        while let Some(newline) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=newline).collect();
            if self.done {
                continue;
            }
            if let Some(event) = self.decode_line(&line[..line.len() - 1])? {
                events.push(event);
            }
        }
        Ok(events)
    }

    /// Flush at end of stream. A leftover partial line is decoded if it is a
    /// complete JSON object (the server may omit the final newline); an
    /// unterminated stream with no `done` event is a framing error.
    pub fn finish(&mut self) -> Result<Option<ChatEvent>> {
        let rest: Vec<u8> = std::mem::take(&mut self.buffer);
        if self.done {
            return Ok(None);
        }
        if let Some(event) = self.decode_line(&rest)? {
            if event.done {
                return Ok(Some(event));
            }
        }
        Err(Error::Stream("stream ended without a done event".into()))
    }

    fn decode_line(&mut self, line: &[u8]) -> Result<Option<ChatEvent>> {
        let line = line.strip_suffix(b"\r").unwrap_or(line);
        if line.iter().all(|b| b.is_ascii_whitespace()) {
            return Ok(None);
        }
        let event: ChatEvent = serde_json::from_slice(line)
            .map_err(|e| Error::Stream(format!("malformed event: {e}")))?;
        if event.done {
            self.done = true;
        }
        Ok(Some(event))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn delta(text: &str) -> ChatEvent {
        ChatEvent {
            delta: Some(text.into()),
            done: false,
        }
    }

    #[test]
    fn decodes_one_event_per_line() {
        let mut decoder = EventDecoder::new();
        let events = decoder
            .feed(b"{\"delta\":\"Hel\"}\n{\"delta\":\"lo\"}\n{\"done\":true}\n")
            .unwrap();

        assert_eq!(events.len(), 3);
        assert_eq!(events[0], delta("Hel"));
        assert_eq!(events[1], delta("lo"));
        assert!(events[2].done);
        assert!(decoder.is_done());
    }

    #[test]
    fn reassembles_events_split_across_chunks() {
        let mut decoder = EventDecoder::new();

        // Split in the middle of the JSON object and of the utf-8 text
        assert!(decoder.feed(b"{\"delta\":\"ab").unwrap().is_empty());
        let events = decoder.feed(b"c\"}\n{\"del").unwrap();
        assert_eq!(events, vec![delta("abc")]);

        let events = decoder.feed(b"ta\":\"d\"}\n{\"done\":true}\n").unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], delta("d"));
        assert!(events[1].done);
    }

    #[test]
    fn finish_accepts_done_without_trailing_newline() {
        let mut decoder = EventDecoder::new();
        decoder.feed(b"{\"delta\":\"x\"}\n{\"done\":true}").unwrap();

        let last = decoder.finish().unwrap();
        assert!(last.unwrap().done);
    }

    #[test]
    fn finish_rejects_truncated_stream() {
        let mut decoder = EventDecoder::new();
        decoder.feed(b"{\"delta\":\"x\"}\n").unwrap();

        let err = decoder.finish().unwrap_err();
        assert!(matches!(err, Error::Stream(_)), "got {err:?}");
    }

    #[test]
    fn lines_after_done_are_ignored() {
        let mut decoder = EventDecoder::new();
        let events = decoder
            .feed(b"{\"done\":true}\n{\"delta\":\"late\"}\n")
            .unwrap();
        assert_eq!(events.len(), 1);
        assert!(events[0].done);
        assert!(decoder.finish().unwrap().is_none());
    }

    #[test]
    fn blank_lines_are_skipped() {
        let mut decoder = EventDecoder::new();
        let events = decoder.feed(b"\n{\"delta\":\"a\"}\n\r\n{\"done\":true}\n").unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], delta("a"));
    }

    #[test]
    fn malformed_event_is_an_error() {
        let mut decoder = EventDecoder::new();
        let err = decoder.feed(b"not json\n").unwrap_err();
        assert!(matches!(err, Error::Stream(_)), "got {err:?}");
    }

    #[test]
    fn crlf_framing_is_tolerated() {
        let mut decoder = EventDecoder::new();
        let events = decoder.feed(b"{\"delta\":\"a\"}\r\n{\"done\":true}\r\n").unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], delta("a"));
        assert!(events[1].done);
    }
}
