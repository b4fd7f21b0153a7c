use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::core::providers::handler::{HandlerCapabilities, ProviderHandler};
use crate::core::providers::shared::{f64_at, str_at, u64_at};
use crate::core::types::{Metrics, ModelType, ResponseBody, VideoMetrics};

/// `/v1/videos`: asynchronous jobs, only billed once completed
#[derive(Debug, Clone, Copy, Default)]
pub struct VideosHandler;

impl ProviderHandler for VideosHandler {
    fn name(&self) -> &'static str {
        "openai.videos"
    }

    fn endpoints(&self) -> &'static [&'static str] {
        &["/v1/videos", "/v1/videos/{video_id}"]
    }

    fn model_type(&self) -> ModelType {
        ModelType::Video
    }

    fn capabilities(&self) -> HandlerCapabilities {
        HandlerCapabilities {
            skippable: true,
            expiring_media: true,
            ..HandlerCapabilities::NONE
        }
    }

    fn matches_response(&self, body: &ResponseBody) -> bool {
        str_at(body.json(), "object") == Some("video")
    }

    fn extract_metrics(&self, request: Option<&Value>, body: &ResponseBody) -> Metrics {
        // The job echoes `seconds`; older jobs only carry it on the request.
        let duration = f64_at(body.json(), "seconds")
            .or_else(|| request.and_then(|r| f64_at(r, "seconds")));
        Metrics::empty().with_video(VideoMetrics {
            count: 1,
            duration_seconds: duration,
        })
    }

    fn extract_finish_reason(&self, body: &Value) -> Option<String> {
        str_at(body, "status").map(str::to_string)
    }

    fn should_skip(&self, body: &Value) -> bool {
        str_at(body, "status") != Some("completed")
    }

    fn extract_expiration(&self, body: &Value) -> Option<DateTime<Utc>> {
        let ts = u64_at(body, "expires_at")?;
        DateTime::from_timestamp(i64::try_from(ts).ok()?, 0)
    }
}
