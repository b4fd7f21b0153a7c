//! Handler registry integration tests
//!
//! Endpoint resolution, shape disambiguation and host detection through the
//! public registry API.

#[cfg(test)]
mod tests {
    use crate::common::fixtures::{AnthropicFixtures, GeminiFixtures, OpenAIFixtures};
    use llm_usage::{HandlerRegistry, MeterConfig, Provider, ResponseBody};
    use serde_json::json;

    fn registry() -> HandlerRegistry {
        HandlerRegistry::with_defaults().unwrap()
    }

    // ==================== Host Detection ====================

    /// A placeholder host label matches exactly one DNS label
    #[test]
    fn test_azure_resource_host_pattern() {
        let registry = registry();
        assert_eq!(
            registry.detect_provider("myresource.openai.azure.com"),
            Some(Provider::Azure)
        );
        assert_eq!(registry.detect_provider("sub.myresource.openai.azure.com"), None);
        assert_eq!(registry.detect_provider("openai.azure.com"), None);
    }

    #[test]
    fn test_builtin_hosts() {
        let registry = registry();
        assert_eq!(registry.detect_provider("api.openai.com"), Some(Provider::OpenAI));
        assert_eq!(registry.detect_provider("api.anthropic.com"), Some(Provider::Anthropic));
        assert_eq!(
            registry.detect_provider("us-central1-aiplatform.googleapis.com"),
            Some(Provider::Google)
        );
        assert_eq!(registry.detect_provider("api.elevenlabs.io"), Some(Provider::ElevenLabs));
        assert_eq!(registry.detect_provider("example.com"), None);
    }

    /// Operator hosts from configuration are checked before built-in hosts
    #[test]
    fn test_custom_hosts_from_config() {
        let mut config = MeterConfig::default();
        config.custom_hosts.insert(
            "anthropic".to_string(),
            vec!["{team}.llm-gateway.corp.example".to_string()],
        );
        let registry = HandlerRegistry::from_config(&config).unwrap();
        assert_eq!(
            registry.detect_provider("search.llm-gateway.corp.example"),
            Some(Provider::Anthropic)
        );
        assert_eq!(registry.detect_provider("api.openai.com"), Some(Provider::OpenAI));
    }

    // ==================== Resolution ====================

    #[test]
    fn test_resolve_by_endpoint_and_shape() {
        let registry = registry();

        let body = ResponseBody::Json(OpenAIFixtures::chat_completion("gpt-4o", 10, 2));
        let handler = registry
            .resolve(Provider::OpenAI, Some("/v1/chat/completions"), Some(&body))
            .unwrap();
        assert_eq!(handler.name(), "openai.chat_completions");

        let image = ResponseBody::Json(GeminiFixtures::image());
        let handler = registry
            .resolve(Provider::Google, Some(GeminiFixtures::ENDPOINT), Some(&image))
            .unwrap();
        assert_eq!(handler.name(), "google.generate_image");

        let text = ResponseBody::Json(GeminiFixtures::text(5, 5));
        let handler = registry
            .resolve(Provider::Google, Some(GeminiFixtures::ENDPOINT), Some(&text))
            .unwrap();
        assert_eq!(handler.name(), "google.generate_text");
    }

    #[test]
    fn test_resolve_azure_deployment() {
        let registry = registry();
        let handler = registry
            .resolve(
                Provider::Azure,
                Some("https://myresource.openai.azure.com/openai/deployments/prod/chat/completions?api-version=2024-10-21"),
                None,
            )
            .unwrap();
        assert_eq!(handler.name(), "azure.chat_completions");
        assert!(handler.capabilities().model_from_response_only);
    }

    #[test]
    fn test_resolve_without_endpoint() {
        let registry = registry();
        let body = ResponseBody::Json(AnthropicFixtures::message_with_tool_use());
        assert_eq!(
            registry.resolve(Provider::Anthropic, None, Some(&body)).unwrap().name(),
            "anthropic.messages"
        );

        let unrelated = ResponseBody::Json(json!({"data": []}));
        assert!(registry.resolve(Provider::Anthropic, None, Some(&unrelated)).is_none());
    }

    #[test]
    fn test_trackable_endpoints() {
        let registry = registry();
        assert!(registry.is_trackable_endpoint(Provider::OpenAI, "/v1/responses"));
        assert!(registry.is_trackable_endpoint(
            Provider::ElevenLabs,
            "/v1/text-to-speech/21m00Tcm4TlvDq8ikWAM"
        ));
        assert!(!registry.is_trackable_endpoint(Provider::OpenAI, "/v1/models"));
        assert!(!registry.is_trackable_endpoint(Provider::Anthropic, "/v1/chat/completions"));
    }
}
