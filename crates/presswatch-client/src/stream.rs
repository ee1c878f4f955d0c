// SSE decode layer
//
// Turns a byte stream into `StreamEvent`s. Framing (chunk reassembly,
// `data:` extraction) is eventsource-stream's job; this layer only parses
// the JSON payloads. A frame that fails to parse is logged and skipped so
// one bad frame cannot take down the run; termination is signalled by the
// events themselves, not by the transport.

use eventsource_stream::Eventsource;
use futures::{Stream, StreamExt};
use presswatch_contracts::StreamEvent;
use std::pin::Pin;

/// Decoded research event stream.
pub type EventStream = Pin<Box<dyn Stream<Item = StreamEvent> + Send>>;

/// Decode SSE frames from arbitrary byte chunks. Chunk boundaries carry
/// no meaning; a frame split across chunks decodes the same as one
/// delivered whole.
pub fn decode_events<S, B, E>(bytes: S) -> EventStream
where
    S: Stream<Item = std::result::Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: std::fmt::Display + Send + 'static,
{
    Box::pin(bytes.eventsource().filter_map(|item| async move {
        match item {
            Ok(frame) => {
                if frame.data.trim().is_empty() {
                    return None;
                }
                match serde_json::from_str::<StreamEvent>(&frame.data) {
                    Ok(event) => Some(event),
                    Err(e) => {
                        tracing::warn!(payload = %frame.data, "Skipping malformed frame: {}", e);
                        None
                    }
                }
            }
            Err(e) => {
                tracing::warn!("Event stream transport error: {}", e);
                None
            }
        }
    }))
}

/// Decode the body of a streaming response.
pub(crate) fn decode_response(response: reqwest::Response) -> EventStream {
    decode_events(response.bytes_stream())
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;
    use std::convert::Infallible;

    async fn decode_chunks(chunks: Vec<&'static str>) -> Vec<StreamEvent> {
        let bytes = stream::iter(
            chunks
                .into_iter()
                .map(|c| Ok::<_, Infallible>(c.as_bytes().to_vec())),
        );
        decode_events(bytes).collect().await
    }

    const WIRE: &str = "data: {\"type\":\"status\",\"message\":\"Searching...\"}\n\n\
                        data: {\"type\":\"result\",\"content\":\"REPORT\"}\n\n\
                        data: {\"type\":\"done\"}\n\n";

    #[tokio::test]
    async fn test_decode_whole_body() {
        let events = decode_chunks(vec![WIRE]).await;
        assert_eq!(
            events,
            vec![
                StreamEvent::status("Searching..."),
                StreamEvent::result("REPORT"),
                StreamEvent::Done,
            ]
        );
    }

    #[tokio::test]
    async fn test_decode_is_fragmentation_invariant() {
        let whole = decode_chunks(vec![WIRE]).await;

        // Split mid-frame, mid-JSON, and mid-separator.
        let fragmented = decode_chunks(vec![
            "data: {\"type\":\"st",
            "atus\",\"message\":\"Searching...\"}\n",
            "\ndata: {\"type\":\"result\",\"content\":\"REPORT\"}",
            "\n\ndata: {\"type\":\"done\"}\n\n",
        ])
        .await;

        let byte_at_a_time = decode_chunks(WIRE.split("").filter(|s| !s.is_empty()).collect()).await;

        assert_eq!(whole, fragmented);
        assert_eq!(whole, byte_at_a_time);
    }

    #[tokio::test]
    async fn test_malformed_frame_is_skipped_not_fatal() {
        let events = decode_chunks(vec![
            "data: {\"type\":\"status\",\"message\":\"one\"}\n\n\
             data: {not json at all\n\n\
             data: {\"type\":\"unknown_kind\",\"x\":1}\n\n\
             data: {\"type\":\"done\"}\n\n",
        ])
        .await;

        assert_eq!(events, vec![StreamEvent::status("one"), StreamEvent::Done]);
    }

    #[tokio::test]
    async fn test_empty_frames_are_ignored() {
        let events = decode_chunks(vec!["data: \n\ndata: {\"type\":\"done\"}\n\n"]).await;
        assert_eq!(events, vec![StreamEvent::Done]);
    }
}
