//! Server-sent-events wire decoder.
//!
//! Incremental push parser for the `text/event-stream` format: bytes go in
//! as they arrive from the transport, completed frames come out. The
//! decoder owns reassembly across arbitrary chunk boundaries, so the read
//! loop never has to care where the transport split the stream.

use tracing::trace;

/// Event name used when a frame carries no `event:` field. This is the
/// transport's implicit default channel.
pub const DEFAULT_EVENT: &str = "message";

/// One complete frame from the event stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseFrame {
    /// Event name, when the frame carried an `event:` field
    pub event: Option<String>,
    /// Frame payload; multi-line `data:` fields are joined with `\n`
    pub data: String,
    /// Last seen `id:` field, if any
    pub id: Option<String>,
}

impl SseFrame {
    /// Name this frame dispatches under
    #[must_use]
    pub fn event_name(&self) -> &str {
        self.event.as_deref().unwrap_or(DEFAULT_EVENT)
    }
}

/// Incremental decoder for the event stream wire format.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    buffer: Vec<u8>,
    event: Option<String>,
    data_lines: Vec<String>,
    last_id: Option<String>,
}

impl FrameDecoder {
    /// Create an empty decoder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one chunk of transport bytes; returns every frame the chunk
    /// completed, in wire order.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<SseFrame> {
        self.buffer.extend_from_slice(chunk);

        let mut frames = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let mut line: Vec<u8> = self.buffer.drain(..=pos).collect();
            line.pop(); // \n
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            // Lines are complete here, so lossy decoding only fires on
            // genuinely invalid bytes; one bad line must not kill the
            // connection.
            let line = String::from_utf8_lossy(&line).into_owned();
            if let Some(frame) = self.process_line(&line) {
                frames.push(frame);
            }
        }
        frames
    }

    fn process_line(&mut self, line: &str) -> Option<SseFrame> {
        if line.is_empty() {
            return self.flush();
        }
        if line.starts_with(':') {
            trace!(comment = line, "stream comment");
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };

        match field {
            "event" => self.event = Some(value.to_string()),
            "data" => self.data_lines.push(value.to_string()),
            "id" => self.last_id = Some(value.to_string()),
            "retry" => {} // reconnection is the caller's policy, not ours
            other => trace!(field = other, "unknown stream field"),
        }
        None
    }

    /// Blank line: dispatch the pending frame, if it has any data.
    fn flush(&mut self) -> Option<SseFrame> {
        let event = self.event.take();
        if self.data_lines.is_empty() {
            return None;
        }
        let data = std::mem::take(&mut self.data_lines).join("\n");
        Some(SseFrame {
            event,
            data,
            id: self.last_id.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed_str(decoder: &mut FrameDecoder, chunk: &str) -> Vec<SseFrame> {
        decoder.feed(chunk.as_bytes())
    }

    #[test]
    fn test_named_event() {
        let mut decoder = FrameDecoder::new();
        let frames = feed_str(
            &mut decoder,
            "event: NewMessage\ndata: {\"chatId\":\"c1\"}\n\n",
        );

        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].event_name(), "NewMessage");
        assert_eq!(frames[0].data, "{\"chatId\":\"c1\"}");
    }

    #[test]
    fn test_default_event_name() {
        let mut decoder = FrameDecoder::new();
        let frames = feed_str(&mut decoder, "data: ping\n\n");

        assert_eq!(frames.len(), 1);
        assert!(frames[0].event.is_none());
        assert_eq!(frames[0].event_name(), DEFAULT_EVENT);
    }

    #[test]
    fn test_multi_line_data_joined() {
        let mut decoder = FrameDecoder::new();
        let frames = feed_str(&mut decoder, "data: line one\ndata: line two\n\n");

        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].data, "line one\nline two");
    }

    #[test]
    fn test_frame_split_across_chunks() {
        let mut decoder = FrameDecoder::new();
        assert!(feed_str(&mut decoder, "event: New").is_empty());
        assert!(feed_str(&mut decoder, "Message\ndata: {}").is_empty());

        let frames = feed_str(&mut decoder, "\n\n");
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].event_name(), "NewMessage");
        assert_eq!(frames[0].data, "{}");
    }

    #[test]
    fn test_two_frames_in_one_chunk() {
        let mut decoder = FrameDecoder::new();
        let frames = feed_str(
            &mut decoder,
            "event: A\ndata: 1\n\nevent: B\ndata: 2\n\n",
        );

        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].event_name(), "A");
        assert_eq!(frames[1].event_name(), "B");
    }

    #[test]
    fn test_crlf_line_endings() {
        let mut decoder = FrameDecoder::new();
        let frames = feed_str(&mut decoder, "event: A\r\ndata: 1\r\n\r\n");

        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].event_name(), "A");
        assert_eq!(frames[0].data, "1");
    }

    #[test]
    fn test_comments_ignored() {
        let mut decoder = FrameDecoder::new();
        let frames = feed_str(&mut decoder, ": keep-alive\n\ndata: real\n\n");

        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].data, "real");
    }

    #[test]
    fn test_blank_line_without_data_emits_nothing() {
        let mut decoder = FrameDecoder::new();
        assert!(feed_str(&mut decoder, "event: Lonely\n\n").is_empty());

        // The dangling event name does not bleed into the next frame.
        let frames = feed_str(&mut decoder, "data: x\n\n");
        assert_eq!(frames.len(), 1);
        assert!(frames[0].event.is_none());
    }

    #[test]
    fn test_id_persists_across_frames() {
        let mut decoder = FrameDecoder::new();
        let first = feed_str(&mut decoder, "id: 7\ndata: a\n\n");
        assert_eq!(first[0].id.as_deref(), Some("7"));

        let second = feed_str(&mut decoder, "data: b\n\n");
        assert_eq!(second[0].id.as_deref(), Some("7"));
    }

    #[test]
    fn test_value_without_leading_space() {
        let mut decoder = FrameDecoder::new();
        let frames = feed_str(&mut decoder, "data:tight\n\n");
        assert_eq!(frames[0].data, "tight");
    }
}
