//! Stream reconstruction integration tests

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::common::fixtures::{AnthropicFixtures, GeminiFixtures, OpenAIFixtures};
    use futures::StreamExt;
    use futures::stream;
    use llm_usage::{
        CostCalculator, HandlerRegistry, MeterError, ModelType, PricingCatalog, Provider,
        RequestContext, ResponseBody, ResponseProcessor, StreamingTracker, TokenMetrics,
        TrackedIter, TrackedStream,
    };
    use serde_json::Value;

    fn processor() -> Arc<ResponseProcessor> {
        Arc::new(ResponseProcessor::new(
            Arc::new(HandlerRegistry::with_defaults().unwrap()),
            Arc::new(CostCalculator::new(Arc::new(PricingCatalog::builtin()))),
        ))
    }

    fn openai_tracker() -> StreamingTracker {
        StreamingTracker::new(
            processor(),
            RequestContext::builder(Provider::OpenAI).endpoint("/v1/chat/completions"),
        )
    }

    // ==================== Completion Deltas ====================

    #[tokio::test]
    async fn test_hello_world_stream() {
        let mut chunks: Vec<Result<Value, std::io::Error>> = ["Hello", ", ", "world", "!"]
            .iter()
            .map(|s| Ok(OpenAIFixtures::chat_chunk(s)))
            .collect();
        chunks.push(Ok(OpenAIFixtures::chat_final_chunk(15, 5)));

        let mut tracked = TrackedStream::new(stream::iter(chunks), openai_tracker());
        let mut fragments = Vec::new();
        while let Some(fragment) = tracked.next().await {
            fragments.push(fragment.unwrap());
        }
        assert_eq!(fragments.first().map(String::as_str), Some("Hello"));
        assert_eq!(fragments.concat(), "Hello, world!");

        let finished = tracked.finish().unwrap();
        let ctx = finished.context;
        assert_eq!(ctx.response_text.as_deref(), Some("Hello, world!"));
        assert_eq!(ctx.usage.tokens, Some(TokenMetrics::new(15, 5)));
        assert!(ctx.time_to_first_token_ms.is_some());
        assert!(ctx.time_to_first_token_ms <= ctx.latency_ms);
        assert!(ctx.streamed);
    }

    #[tokio::test]
    async fn test_transport_error_is_passed_through() {
        let chunks: Vec<Result<Value, String>> = vec![
            Ok(OpenAIFixtures::chat_chunk("partial")),
            Err("connection reset by peer".to_string()),
        ];
        let mut tracked = TrackedStream::new(stream::iter(chunks), openai_tracker());

        assert_eq!(tracked.next().await, Some(Ok("partial".to_string())));
        assert_eq!(
            tracked.next().await,
            Some(Err("connection reset by peer".to_string()))
        );
        assert!(tracked.tracker().is_errored());

        let finished = tracked.finish().unwrap();
        assert!(finished.is_failed());
        assert_eq!(finished.context.response_text.as_deref(), Some("partial"));
        assert!(!finished.context.processed);
        assert!(matches!(tracked.finish(), Err(MeterError::StreamFinished(_))));
    }

    // ==================== Split Usage ====================

    /// Prompt tokens arrive first, completion tokens last
    #[test]
    fn test_anthropic_sse_split_usage() {
        let lines: Vec<Result<&str, String>> =
            AnthropicFixtures::sse_stream().into_iter().map(Ok).collect();
        let tracker = StreamingTracker::new(
            processor(),
            RequestContext::builder(Provider::Anthropic).endpoint("/v1/messages"),
        );
        let mut tracked = TrackedIter::new(lines.into_iter(), tracker);
        let text: String = tracked.by_ref().map(|f| f.unwrap()).collect();
        assert_eq!(text, "Bonjour !");

        let ctx = tracked.finish().unwrap().context;
        let tokens = ctx.usage.tokens_or_default();
        assert_eq!(tokens.prompt_tokens, 25);
        assert_eq!(tokens.completion_tokens, 12);
        assert_eq!(ctx.finish_reason.as_deref(), Some("end_turn"));
        assert_eq!(ctx.model, "claude-sonnet-4-20250514");
    }

    /// Gemini reports cumulative usage on every chunk
    #[tokio::test]
    async fn test_gemini_cumulative_usage() {
        let chunks: Vec<Result<Value, std::io::Error>> = vec![
            Ok(GeminiFixtures::text(10, 3)),
            Ok(GeminiFixtures::text(10, 9)),
        ];
        let tracker = StreamingTracker::new(
            processor(),
            RequestContext::builder(Provider::Google)
                .endpoint("/v1beta/models/gemini-2.5-flash:streamGenerateContent"),
        );
        let mut tracked = TrackedStream::new(stream::iter(chunks), tracker);
        while tracked.next().await.is_some() {}

        let ctx = tracked.finish().unwrap().context;
        assert_eq!(ctx.usage.tokens, Some(TokenMetrics::new(10, 9)));
        assert_eq!(ctx.model, "gemini-2.5-flash");
    }

    // ==================== Transport Parity ====================

    #[test]
    fn test_gemini_streamed_image_matches_direct() {
        let mut tracker = StreamingTracker::new(
            processor(),
            RequestContext::builder(Provider::Google)
                .endpoint("/v1beta/models/gemini-2.5-flash-image:streamGenerateContent"),
        );
        for chunk in GeminiFixtures::image_stream() {
            tracker.observe(chunk);
        }
        let streamed = tracker.finish().unwrap().context;

        let mut direct = RequestContext::builder(Provider::Google)
            .endpoint("/v1beta/models/gemini-2.5-flash-image:generateContent")
            .build();
        processor().process(
            &mut direct,
            ResponseBody::Json(GeminiFixtures::image_with_caption()),
        );

        assert_eq!(direct.usage.image_count(), 1);
        assert_eq!(direct.model_type, Some(ModelType::Image));
        assert_eq!(streamed.usage.image_count(), direct.usage.image_count());
        assert_eq!(streamed.model_type, direct.model_type);
        assert_eq!(streamed.usage.tokens, direct.usage.tokens);
        assert_eq!(streamed.response_text.as_deref(), Some("A red fox"));
    }
}
