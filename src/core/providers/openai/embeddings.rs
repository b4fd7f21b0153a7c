use serde_json::Value;

use crate::core::providers::handler::ProviderHandler;
use crate::core::providers::shared::{array_at, str_at, u64_at};
use crate::core::types::{Metrics, ModelType, ResponseBody, TokenMetrics};

/// `/v1/embeddings`
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddingsHandler;

impl ProviderHandler for EmbeddingsHandler {
    fn name(&self) -> &'static str {
        "openai.embeddings"
    }

    fn endpoints(&self) -> &'static [&'static str] {
        &["/v1/embeddings", "/embeddings"]
    }

    fn model_type(&self) -> ModelType {
        ModelType::Embedding
    }

    fn matches_response(&self, body: &ResponseBody) -> bool {
        array_at(body.json(), "data")
            .first()
            .is_some_and(|item| str_at(item, "object") == Some("embedding"))
    }

    fn extract_metrics(&self, _request: Option<&Value>, body: &ResponseBody) -> Metrics {
        match u64_at(body.json(), "usage.prompt_tokens") {
            Some(prompt) => Metrics::from_tokens(TokenMetrics::new(prompt, 0)),
            None => Metrics::empty(),
        }
    }
}
