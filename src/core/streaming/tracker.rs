//! Streaming reconstruction
//!
//! A [`StreamingTracker`] consumes one response stream chunk by chunk. The
//! request context is only built when the first chunk arrives, so a model
//! the caller did not know can be sniffed from the stream itself.

use std::collections::{BTreeMap, HashSet};
use std::mem;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use super::handler::{StreamHandler, StreamSummary};
use super::providers::GenericStream;
use super::types::Chunk;
use crate::core::processing::tools::finish_reason_implies_tools;
use crate::core::processing::{ProcessOutcome, ResponseProcessor};
use crate::core::providers::ProviderHandler;
use crate::core::types::{
    Metrics, RequestContext, RequestContextBuilder, ResponseBody, TokenMetrics,
};
use crate::utils::error::{MeterError, Result};

static GENERIC_STREAM: GenericStream = GenericStream;

/// Error type recorded when iterating the source stream fails
pub const STREAM_ERROR: &str = "stream_error";

enum TrackerState {
    /// No chunk seen yet
    Pending(RequestContextBuilder),
    Streaming(RequestContext),
    /// The source raised; waiting for `finish`
    Errored(RequestContext),
    Finished,
}

impl TrackerState {
    fn name(&self) -> &'static str {
        match self {
            TrackerState::Pending(_) => "pending",
            TrackerState::Streaming(_) => "streaming",
            TrackerState::Errored(_) => "errored",
            TrackerState::Finished => "finished",
        }
    }
}

#[derive(Debug, Default)]
struct Accumulator {
    text: String,
    usage: Option<TokenMetrics>,
    model: Option<String>,
    response_id: Option<String>,
    finish_reason: Option<String>,
    tool_calls: BTreeMap<String, u64>,
    tool_keys: HashSet<(&'static str, String)>,
    reasoning_seen: bool,
    media: Vec<Value>,
    terminal: Option<Value>,
    chunks: u64,
}

impl Accumulator {
    fn summary(&self) -> StreamSummary {
        StreamSummary {
            text: self.text.clone(),
            usage: self.usage,
            model: self.model.clone(),
            response_id: self.response_id.clone(),
            finish_reason: self.finish_reason.clone(),
            tool_calls: self.tool_calls.clone(),
            media: self.media.clone(),
        }
    }
}

/// Result of finishing a stream
#[derive(Debug, Clone)]
pub struct FinishedStream {
    pub context: RequestContext,
    /// `None` when the stream errored and only partial state was recorded
    pub outcome: Option<ProcessOutcome>,
}

impl FinishedStream {
    /// Whether the stream errored before finishing
    pub fn is_failed(&self) -> bool {
        self.context.is_failed()
    }
}

/// Incremental reconstructor for one streaming call
pub struct StreamingTracker {
    processor: Arc<ResponseProcessor>,
    state: TrackerState,
    handler: Option<Arc<dyn ProviderHandler>>,
    stream_handler: &'static dyn StreamHandler,
    acc: Accumulator,
}

impl std::fmt::Debug for StreamingTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamingTracker")
            .field("state", &self.state.name())
            .field("handler", &self.handler.as_ref().map(|h| h.name()))
            .field("stream_handler", &self.stream_handler.name())
            .field("chunks", &self.acc.chunks)
            .finish()
    }
}

impl StreamingTracker {
    /// Tracker whose context is built from `builder` on the first chunk
    pub fn new(processor: Arc<ResponseProcessor>, builder: RequestContextBuilder) -> Self {
        Self {
            processor,
            state: TrackerState::Pending(builder),
            handler: None,
            stream_handler: &GENERIC_STREAM,
            acc: Accumulator::default(),
        }
    }

    /// Feed one chunk; returns the text fragment it carried, if any
    pub fn observe(&mut self, chunk: impl Into<Chunk>) -> Option<String> {
        let chunk = chunk.into();
        let value = chunk.normalize()?;

        if matches!(self.state, TrackerState::Errored(_) | TrackerState::Finished) {
            warn!(state = self.state.name(), "Chunk observed after stream ended, ignoring");
            return None;
        }
        if matches!(self.state, TrackerState::Pending(_)) {
            self.initialize(&value);
        }

        self.acc.chunks += 1;
        let handler = self.stream_handler;
        let text = handler.extract_text(&value).filter(|t| !t.is_empty());
        if let Some(fragment) = &text {
            self.acc.text.push_str(fragment);
            if let TrackerState::Streaming(ctx) = &mut self.state {
                ctx.mark_first_token();
            }
        }

        self.acc.usage = handler.merge_usage(&value, self.acc.usage);
        if self.acc.model.is_none() {
            self.acc.model = handler.extract_model(&value);
        }
        if self.acc.response_id.is_none() {
            self.acc.response_id = handler.extract_response_id(&value);
        }
        if let Some(reason) = handler.extract_finish_reason(&value) {
            self.acc.finish_reason = Some(reason);
        }
        for delta in handler.extract_tool_calls(&value) {
            let first_sighting = match delta.key {
                Some(key) => self.acc.tool_keys.insert((delta.kind, key)),
                None => true,
            };
            if first_sighting {
                *self.acc.tool_calls.entry(delta.kind.to_string()).or_insert(0) += 1;
            }
        }
        self.acc.media.extend(handler.extract_media(&value));
        if handler.has_reasoning_content(&value) {
            self.acc.reasoning_seen = true;
        }
        if let Some(payload) = handler.extract_terminal_payload(&value) {
            debug!(handler = handler.name(), "Captured terminal payload");
            self.acc.terminal = Some(payload);
        }

        text
    }

    fn initialize(&mut self, first: &Value) {
        let TrackerState::Pending(builder) = mem::replace(&mut self.state, TrackerState::Finished)
        else {
            return;
        };

        let provider = builder.provider();
        self.handler = self
            .processor
            .registry()
            .resolve_stream(provider, builder.endpoint_ref(), first);
        self.stream_handler = self
            .handler
            .as_ref()
            .and_then(|h| h.stream_handler())
            .unwrap_or(&GENERIC_STREAM);

        let builder = match self.stream_handler.extract_model(first) {
            Some(model) if !builder.has_model() => builder.model(model),
            _ => builder,
        };
        let mut ctx = builder.build();
        ctx.streamed = true;

        debug!(
            request_id = %ctx.id,
            provider = %provider,
            model = %ctx.model,
            stream_handler = self.stream_handler.name(),
            "Stream started"
        );
        self.state = TrackerState::Streaming(ctx);
    }

    /// Record that iterating the source failed. Does not finalize.
    pub fn record_error(&mut self, message: impl Into<String>) {
        let message = message.into();
        self.state = match mem::replace(&mut self.state, TrackerState::Finished) {
            TrackerState::Pending(builder) => {
                let mut ctx = builder.build();
                ctx.streamed = true;
                ctx.record_failure(None, STREAM_ERROR, message);
                TrackerState::Errored(ctx)
            }
            TrackerState::Streaming(mut ctx) => {
                warn!(request_id = %ctx.id, error = %message, "Stream errored");
                ctx.record_failure(None, STREAM_ERROR, message);
                TrackerState::Errored(ctx)
            }
            other => other,
        };
    }

    /// Finalize the stream exactly once.
    ///
    /// A clean stream hands its terminal payload (or a synthesized one) to
    /// the response processor. An errored stream records its partial state
    /// without processing. A second call fails with `StreamFinished`.
    pub fn finish(&mut self) -> Result<FinishedStream> {
        match mem::replace(&mut self.state, TrackerState::Finished) {
            TrackerState::Finished => Err(MeterError::StreamFinished(
                "finish() already handed off this stream".to_string(),
            )),
            TrackerState::Pending(builder) => {
                let mut ctx = builder.build();
                ctx.streamed = true;
                Ok(self.complete(ctx))
            }
            TrackerState::Streaming(ctx) => Ok(self.complete(ctx)),
            TrackerState::Errored(ctx) => Ok(self.fail(ctx)),
        }
    }

    fn apply_partial(&mut self, ctx: &mut RequestContext) {
        if let Some(model) = &self.acc.model {
            ctx.reconcile_model(model);
        }
        if !self.acc.text.is_empty() {
            ctx.response_text = Some(self.acc.text.clone());
        }
        if self.acc.finish_reason.is_some() {
            ctx.finish_reason = self.acc.finish_reason.clone();
        }
        ctx.tool_calls = self.acc.tool_calls.clone();
        ctx.has_tool_calls = !ctx.tool_calls.is_empty()
            || ctx
                .finish_reason
                .as_deref()
                .is_some_and(finish_reason_implies_tools);
        ctx.has_reasoning = self.acc.reasoning_seen
            || self.acc.usage.is_some_and(|u| u.reasoning_tokens > 0);
    }

    fn complete(&mut self, mut ctx: RequestContext) -> FinishedStream {
        self.apply_partial(&mut ctx);
        let body = match self.acc.terminal.take() {
            Some(payload) => payload,
            None => self.stream_handler.synthesize_response(&self.acc.summary()),
        };
        ctx.mark_completed();

        let outcome = self.processor.process(&mut ctx, ResponseBody::Json(body));
        self.fill_model_type(&mut ctx);
        debug!(
            request_id = %ctx.id,
            model = %ctx.model,
            chunks = self.acc.chunks,
            ttft_ms = ?ctx.time_to_first_token_ms,
            "Stream finished"
        );
        FinishedStream {
            context: ctx,
            outcome: Some(outcome),
        }
    }

    /// Model type of the handler the stream started on, when the
    /// reconstructed response did not settle one
    fn fill_model_type(&self, ctx: &mut RequestContext) {
        if ctx.model_type.is_none() {
            ctx.model_type = self.handler.as_ref().map(|h| h.model_type());
        }
    }

    fn fail(&mut self, mut ctx: RequestContext) -> FinishedStream {
        self.apply_partial(&mut ctx);
        self.fill_model_type(&mut ctx);
        if let Some(tokens) = self.acc.usage {
            ctx.usage = Metrics::from_tokens(tokens);
        }
        ctx.mark_completed();
        debug!(
            request_id = %ctx.id,
            chunks = self.acc.chunks,
            "Stream finished after error, recording partial state"
        );
        FinishedStream {
            context: ctx,
            outcome: None,
        }
    }

    /// Context of a started stream
    pub fn context(&self) -> Option<&RequestContext> {
        match &self.state {
            TrackerState::Streaming(ctx) | TrackerState::Errored(ctx) => Some(ctx),
            _ => None,
        }
    }

    /// Text reconstructed so far
    pub fn text(&self) -> &str {
        &self.acc.text
    }

    /// Usage merged so far
    pub fn usage(&self) -> Option<TokenMetrics> {
        self.acc.usage
    }

    /// Chunks observed, including those without text
    pub fn chunk_count(&self) -> u64 {
        self.acc.chunks
    }

    pub fn is_errored(&self) -> bool {
        matches!(self.state, TrackerState::Errored(_))
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.state, TrackerState::Finished)
    }
}
