//! Streaming response reconstruction
//!
//! Chunks from any transport are normalized to one JSON shape, folded by a
//! per-provider [`StreamHandler`] and finally handed to the response
//! processor as a single terminal payload.

mod adapters;
mod handler;
pub mod providers;
mod tracker;
mod types;
pub mod utils;


pub use adapters::{TrackedIter, TrackedStream};
pub use handler::{StreamHandler, StreamSummary, ToolCallDelta};
pub use providers::{
    AnthropicStream, GeminiStream, GenericStream, OpenAIChatStream, OpenAIResponsesStream,
};
pub use tracker::{FinishedStream, STREAM_ERROR, StreamingTracker};
pub use types::Chunk;
pub use utils::{is_done_line, parse_sse_events, parse_sse_line};
