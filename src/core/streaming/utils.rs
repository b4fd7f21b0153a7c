//! Utility functions for streaming

use super::types::Chunk;

/// Parse SSE data line
pub fn parse_sse_line(line: &str) -> Option<String> {
    line.strip_prefix("data:")
        .map(|stripped| stripped.trim_start().to_string())
}

/// Check if SSE line indicates end of stream
pub fn is_done_line(line: &str) -> bool {
    line.trim() == "data: [DONE]" || line.trim() == "[DONE]"
}

/// Split an SSE payload into events.
///
/// Events are separated by blank lines; multiple `data:` lines of one event
/// are joined with newlines. Comments and unknown fields are ignored.
pub fn parse_sse_events(payload: &str) -> Vec<Chunk> {
    let mut chunks = Vec::new();
    let mut event: Option<String> = None;
    let mut data: Vec<String> = Vec::new();

    let mut flush = |event: &mut Option<String>, data: &mut Vec<String>| {
        if !data.is_empty() {
            chunks.push(Chunk::Sse {
                event: event.take(),
                data: data.join("\n"),
            });
        }
        event.take();
        data.clear();
    };

    for line in payload.lines() {
        let line = line.trim_end_matches('\r');
        if line.is_empty() {
            flush(&mut event, &mut data);
        } else if let Some(name) = line.strip_prefix("event:") {
            event = Some(name.trim().to_string());
        } else if let Some(value) = parse_sse_line(line) {
            data.push(value);
        }
    }
    flush(&mut event, &mut data);

    chunks
}
