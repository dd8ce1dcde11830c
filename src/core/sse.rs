//! Incremental decoder for the `data: {json}\n\n` event stream.
//!
//! Transport chunks are arbitrary slices of the byte stream: a chunk may end
//! in the middle of a UTF-8 sequence, in the middle of a frame, or between
//! the two newlines of a delimiter. [`FrameDecoder`] carries the unfinished
//! tail of each chunk over to the next one and only hands out complete frames.

use std::collections::VecDeque;

use futures_util::{Stream, StreamExt};
use memchr::memmem;
use tracing::{debug, warn};

use crate::api::StreamEvent;
use crate::core::error::{ClientError, NetworkError, StreamDecodeError};

pub const FRAME_DELIMITER: &[u8] = b"\n\n";
pub const DATA_PREFIX: &str = "data: ";

pub type FrameResult = Result<StreamEvent, StreamDecodeError>;

/// UTF-8 decoding that holds back an incomplete trailing sequence.
#[derive(Debug, Default)]
struct Utf8Carry {
    pending: Vec<u8>,
}

impl Utf8Carry {
    fn decode_into(&mut self, bytes: &[u8], out: &mut String) {
        self.pending.extend_from_slice(bytes);

        let mut offset = 0;
        while offset < self.pending.len() {
            let rest = &self.pending[offset..];
            match std::str::from_utf8(rest) {
                Ok(text) => {
                    out.push_str(text);
                    offset = self.pending.len();
                }
                Err(err) => {
                    let valid = err.valid_up_to();
                    out.push_str(&String::from_utf8_lossy(&rest[..valid]));
                    match err.error_len() {
                        Some(invalid) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            offset += valid + invalid;
                        }
                        // Incomplete sequence at the end: wait for more bytes.
                        None => {
                            offset += valid;
                            break;
                        }
                    }
                }
            }
        }
        self.pending.drain(..offset);
    }

    fn finish_into(&mut self, out: &mut String) {
        if !self.pending.is_empty() {
            out.push_str(&String::from_utf8_lossy(&self.pending));
            self.pending.clear();
        }
    }
}

/// Stateful frame splitter and parser.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    utf8: Utf8Carry,
    buffer: String,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one transport chunk; returns every frame completed by it.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<FrameResult> {
        self.utf8.decode_into(chunk, &mut self.buffer);

        let mut frames = Vec::new();
        let mut start = 0;
        while let Some(pos) = memmem::find(&self.buffer.as_bytes()[start..], FRAME_DELIMITER) {
            let end = start + pos;
            if let Some(frame) = parse_frame(&self.buffer[start..end]) {
                frames.push(frame);
            }
            start = end + FRAME_DELIMITER.len();
        }
        self.buffer.drain(..start);
        frames
    }

    /// Flush at end of transport. A trailing frame without its delimiter is
    /// still parsed, since no more bytes can arrive to complete it.
    pub fn finish(&mut self) -> Vec<FrameResult> {
        self.utf8.finish_into(&mut self.buffer);
        let rest = std::mem::take(&mut self.buffer);
        parse_frame(&rest).into_iter().collect()
    }

    /// Bytes of text held back waiting for a delimiter.
    pub fn buffered_len(&self) -> usize {
        self.buffer.len() + self.utf8.pending.len()
    }
}

/// `None` for frames that carry no `data: ` payload.
pub fn parse_frame(frame: &str) -> Option<FrameResult> {
    let frame = frame.trim_start_matches('\n');
    if frame.trim().is_empty() {
        return None;
    }
    let Some(payload) = frame.strip_prefix(DATA_PREFIX) else {
        debug!(frame, "ignoring frame without data prefix");
        return None;
    };

    match serde_json::from_str::<StreamEvent>(payload) {
        Ok(event) => {
            debug!(?event, "parsed SSE event");
            Some(Ok(event))
        }
        Err(err) => {
            warn!(payload, error = %err, "failed to parse SSE event");
            Some(Err(StreamDecodeError {
                payload: payload.to_string(),
                message: err.to_string(),
            }))
        }
    }
}

struct DecodeState<S> {
    inner: std::pin::Pin<Box<S>>,
    decoder: FrameDecoder,
    ready: VecDeque<Result<StreamEvent, ClientError>>,
    finished: bool,
}

impl<S> DecodeState<S> {
    fn enqueue(&mut self, frames: Vec<FrameResult>) {
        self.ready
            .extend(frames.into_iter().map(|frame| frame.map_err(ClientError::StreamDecode)));
    }
}

/// Lazily decode a byte stream into events.
///
/// Malformed frames come out as `Err(ClientError::StreamDecode)` and decoding
/// continues. A transport error is yielded as `Err(ClientError::Network)` and
/// ends the sequence. The sequence is single-pass.
pub fn decode<S, B, E>(byte_stream: S) -> impl Stream<Item = Result<StreamEvent, ClientError>>
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
    E: Into<NetworkError>,
{
    let state = DecodeState {
        inner: Box::pin(byte_stream),
        decoder: FrameDecoder::new(),
        ready: VecDeque::new(),
        finished: false,
    };

    futures_util::stream::unfold(state, |mut state| async move {
        loop {
            if let Some(item) = state.ready.pop_front() {
                return Some((item, state));
            }
            if state.finished {
                return None;
            }
            match state.inner.next().await {
                Some(Ok(chunk)) => {
                    let frames = state.decoder.push(chunk.as_ref());
                    state.enqueue(frames);
                }
                Some(Err(err)) => {
                    state.finished = true;
                    state.ready.push_back(Err(ClientError::Network(err.into())));
                }
                None => {
                    state.finished = true;
                    let frames = state.decoder.finish();
                    state.enqueue(frames);
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::stream;

    fn results(frames: Vec<FrameResult>) -> Vec<String> {
        frames
            .into_iter()
            .map(|frame| match frame {
                Ok(event) => event.result.or(event.error).unwrap_or_default(),
                Err(err) => format!("ERR:{}", err.payload),
            })
            .collect()
    }

    #[test]
    fn splits_frames_within_one_chunk() {
        let mut decoder = FrameDecoder::new();
        let frames = decoder.push(b"data: {\"result\":\"a\"}\n\ndata: {\"result\":\"ab\"}\n\n");
        assert_eq!(results(frames), vec!["a", "ab"]);
        assert_eq!(decoder.buffered_len(), 0);
    }

    #[test]
    fn reassembles_frame_split_across_many_chunks() {
        let wire = b"data: {\"result\":\"hello world\"}\n\n";
        for split in 1..wire.len() {
            let mut decoder = FrameDecoder::new();
            let mut frames = decoder.push(&wire[..split]);
            frames.extend(decoder.push(&wire[split..]));
            assert_eq!(results(frames), vec!["hello world"], "split at {split}");
        }

        let mut decoder = FrameDecoder::new();
        let mut frames = Vec::new();
        for byte in wire.iter() {
            frames.extend(decoder.push(std::slice::from_ref(byte)));
        }
        assert_eq!(results(frames), vec!["hello world"]);
    }

    #[test]
    fn delimiter_split_between_reads_is_not_lost() {
        let mut decoder = FrameDecoder::new();
        assert!(decoder.push(b"data: {\"result\":\"a\"}\n").is_empty());
        let frames = decoder.push(b"\ndata: {\"result\":\"b\"}\n");
        assert_eq!(results(frames), vec!["a"]);
        let frames = decoder.push(b"\n");
        assert_eq!(results(frames), vec!["b"]);
    }

    #[test]
    fn multibyte_characters_split_across_chunks() {
        let wire = "data: {\"result\":\"héllo → 世界 🎉\"}\n\n".as_bytes();
        for split in 1..wire.len() {
            let mut decoder = FrameDecoder::new();
            let mut frames = decoder.push(&wire[..split]);
            frames.extend(decoder.push(&wire[split..]));
            assert_eq!(results(frames), vec!["héllo → 世界 🎉"], "split at {split}");
        }
    }

    #[test]
    fn malformed_frame_does_not_stop_later_frames() {
        let mut decoder = FrameDecoder::new();
        let frames = decoder.push(
            b"data: {\"result\":\"a\"}\n\ndata: {not json}\n\ndata: {\"result\":\"c\"}\n\n",
        );
        assert_eq!(results(frames), vec!["a", "ERR:{not json}", "c"]);
    }

    #[test]
    fn frames_without_prefix_are_ignored() {
        let mut decoder = FrameDecoder::new();
        let frames = decoder.push(
            b": keep-alive\n\nevent: ping\n\ndata:{\"result\":\"tight\"}\n\ndata: {\"result\":\"ok\"}\n\n",
        );
        assert_eq!(results(frames), vec!["ok"]);
    }

    #[test]
    fn invalid_utf8_is_replaced_not_fatal() {
        let mut decoder = FrameDecoder::new();
        let frames = decoder.push(b"data: {\"result\":\"a\xffb\"}\n\n");
        assert_eq!(results(frames), vec!["a\u{FFFD}b"]);
    }

    #[test]
    fn finish_parses_unterminated_tail() {
        let mut decoder = FrameDecoder::new();
        assert!(decoder.push(b"data: {\"result\":\"tail\"}").is_empty());
        assert_eq!(results(decoder.finish()), vec!["tail"]);
        assert!(decoder.finish().is_empty());
    }

    #[tokio::test]
    async fn decode_yields_events_lazily_across_chunks() {
        let chunks: Vec<Result<Vec<u8>, NetworkError>> = vec![
            Ok(b"data: {\"result\":\"a\"}\n\ndata: {\"res".to_vec()),
            Ok(b"ult\":\"ab\"}\n".to_vec()),
            Ok(b"\ndata: oops\n\ndata: {\"error\":\"boom\"}\n\n".to_vec()),
        ];
        let events: Vec<_> = decode(stream::iter(chunks)).collect().await;

        assert_eq!(events.len(), 4);
        assert_eq!(events[0], Ok(StreamEvent::text("a")));
        assert_eq!(events[1], Ok(StreamEvent::text("ab")));
        assert!(matches!(events[2], Err(ClientError::StreamDecode(_))));
        assert_eq!(events[3], Ok(StreamEvent::failure("boom")));
    }

    #[tokio::test]
    async fn decode_reports_transport_failure_and_stops() {
        let chunks: Vec<Result<&'static [u8], NetworkError>> = vec![
            Ok(b"data: {\"result\":\"a\"}\n\n".as_slice()),
            Err(NetworkError::transport("http://backend", "connection reset")),
            Ok(b"data: {\"result\":\"never\"}\n\n".as_slice()),
        ];
        let events: Vec<_> = decode(stream::iter(chunks)).collect().await;

        assert_eq!(events.len(), 2);
        assert_eq!(events[0], Ok(StreamEvent::text("a")));
        match &events[1] {
            Err(ClientError::Network(err)) => assert_eq!(err.message, "connection reset"),
            other => panic!("expected network error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn empty_transport_is_normal_completion() {
        let chunks: Vec<Result<Vec<u8>, NetworkError>> = Vec::new();
        let events: Vec<_> = decode(stream::iter(chunks)).collect().await;
        assert!(events.is_empty());
    }
}
