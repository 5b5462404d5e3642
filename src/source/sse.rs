//! Decoding of OpenAI-compatible chat-completion SSE streams.

use futures::{Stream, StreamExt};
use serde::Deserialize;
use tracing::debug;

use crate::error::Result;
use crate::types::Fragment;

use super::FragmentStream;

#[derive(Deserialize)]
struct ChatCompletionChunk {
    #[serde(default)]
    choices: Vec<ChunkChoice>,
    error: Option<ChunkError>,
}

#[derive(Deserialize)]
struct ChunkChoice {
    #[serde(default)]
    delta: ChunkDelta,
}

#[derive(Deserialize, Default)]
struct ChunkDelta {
    content: Option<String>,
    #[serde(alias = "reasoning")]
    reasoning_content: Option<String>,
}

#[derive(Deserialize)]
struct ChunkError {
    #[serde(default)]
    code: Option<serde_json::Value>,
    #[serde(default)]
    message: Option<String>,
}

/// Payload of an SSE `data:` line, or `None` for other lines.
pub fn parse_sse_data(line: &str) -> Option<&str> {
    let data = line.strip_prefix("data:")?;
    Some(data.strip_prefix(' ').unwrap_or(data))
}

/// Map one JSON chunk to a fragment. Returns `None` for unparseable or
/// contentless chunks.
pub fn parse_chunk(data: &str) -> Option<Fragment> {
    let chunk = match serde_json::from_str::<ChatCompletionChunk>(data) {
        Ok(chunk) => chunk,
        Err(e) => {
            debug!(error = %e, data = %data, "skipping unparseable SSE chunk");
            return None;
        }
    };

    if let Some(error) = chunk.error {
        let code = match error.code {
            Some(serde_json::Value::String(code)) => code,
            Some(serde_json::Value::Null) | None => "upstream_error".to_string(),
            Some(other) => other.to_string(),
        };
        return Some(Fragment::error(code, error.message.unwrap_or_default()));
    }

    let delta = chunk.choices.into_iter().next()?.delta;
    let fragment = Fragment::text(delta.content.unwrap_or_default())
        .with_reasoning(delta.reasoning_content.unwrap_or_default());
    (!fragment.is_empty()).then_some(fragment)
}

/// Decode a raw `text/event-stream` body into fragments.
///
/// Byte chunks may split lines (and UTF-8 sequences) anywhere. The stream
/// ends at `data: [DONE]`, at the end of the body, or after yielding the
/// first transport error.
pub fn decode_chat_completion_sse<S, B>(body: S) -> FragmentStream
where
    S: Stream<Item = Result<B>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
{
    let stream = async_stream::stream! {
        let mut buffer: Vec<u8> = Vec::new();
        let mut body = std::pin::pin!(body);

        while let Some(chunk) = body.next().await {
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(e) => {
                    yield Err(e);
                    return;
                }
            };
            buffer.extend_from_slice(chunk.as_ref());

            while let Some(line_end) = buffer.iter().position(|b| *b == b'\n') {
                let line: Vec<u8> = buffer.drain(..=line_end).collect();
                let line = String::from_utf8_lossy(&line);
                let line = line.trim();
                if line.is_empty() || line.starts_with(':') {
                    continue;
                }
                let Some(data) = parse_sse_data(line) else { continue };
                if data == "[DONE]" {
                    return;
                }
                if let Some(fragment) = parse_chunk(data) {
                    yield Ok(fragment);
                }
            }
        }

        let rest = String::from_utf8_lossy(&buffer);
        if let Some(data) = parse_sse_data(rest.trim()) {
            if data != "[DONE]" {
                if let Some(fragment) = parse_chunk(data) {
                    yield Ok(fragment);
                }
            }
        }
    };

    Box::pin(stream)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_content_and_reasoning() {
        let fragment =
            parse_chunk(r#"{"choices":[{"delta":{"content":"Hi","reasoning_content":"hm"}}]}"#)
                .unwrap();
        assert_eq!(fragment, Fragment::text("Hi").with_reasoning("hm"));
    }

    #[test]
    fn accepts_reasoning_alias() {
        let fragment = parse_chunk(r#"{"choices":[{"delta":{"reasoning":"hm"}}]}"#).unwrap();
        assert_eq!(fragment, Fragment::reasoning("hm"));
    }

    #[test]
    fn parses_error_payloads() {
        let fragment = parse_chunk(r#"{"error":{"code":429,"message":"slow down"}}"#).unwrap();
        assert_eq!(fragment, Fragment::error("429", "slow down"));

        let fragment = parse_chunk(r#"{"error":{"message":"oops"}}"#).unwrap();
        assert_eq!(fragment, Fragment::error("upstream_error", "oops"));
    }

    #[test]
    fn skips_empty_and_garbage_chunks() {
        assert_eq!(parse_chunk(r#"{"choices":[{"delta":{"role":"assistant"}}]}"#), None);
        assert_eq!(parse_chunk(r#"{"choices":[]}"#), None);
        assert_eq!(parse_chunk("not json"), None);
    }

    #[test]
    fn data_prefix_with_or_without_space() {
        assert_eq!(parse_sse_data("data: {}"), Some("{}"));
        assert_eq!(parse_sse_data("data:{}"), Some("{}"));
        assert_eq!(parse_sse_data("event: x"), None);
    }
}
