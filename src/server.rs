//! Local HTTP surface for the dashboard front-end.
//!
//! Serves the completeness snapshot and report, homepage statistics, the
//! backend health probe and the chat assistant proxy.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::Serialize;

use crate::chat::AssistantProxy;
use crate::monitor::CompletenessSnapshot;
use crate::report::{build_report, CompletenessReport};
use crate::state::AppState;
use crate::types::{EnrichmentGaps, HealthStatus, HomepageData, MissingDataMap};

pub type SharedState = Arc<AppState>;

pub fn create_router(state: SharedState) -> Router {
    Router::new()
        .route("/api/health", get(api_health))
        .route("/api/data-completeness", get(api_completeness))
        .route("/api/data-completeness/refresh", post(api_completeness_refresh))
        .route(
            "/api/data-completeness/missing-data-map",
            get(api_missing_data_map),
        )
        .route(
            "/api/data-completeness/enrichment-gaps",
            get(api_enrichment_gaps),
        )
        .route("/api/homepage", get(api_homepage))
        .route("/api/chat/assistant", post(api_chat_assistant))
        .with_state(state)
}

/// Monitor snapshot plus the report built from it.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletenessResponse {
    #[serde(flatten)]
    pub snapshot: CompletenessSnapshot,
    pub report: Option<CompletenessReport>,
}

impl From<CompletenessSnapshot> for CompletenessResponse {
    fn from(snapshot: CompletenessSnapshot) -> Self {
        let report = snapshot
            .missing_data_map
            .as_ref()
            .map(|map| build_report(map, snapshot.enrichment_gaps.as_ref()));
        Self { snapshot, report }
    }
}

/// GET /api/health
pub async fn api_health(State(state): State<SharedState>) -> Json<HealthStatus> {
    Json(state.completeness.health_check().await)
}

/// GET /api/data-completeness
pub async fn api_completeness(State(state): State<SharedState>) -> Json<CompletenessResponse> {
    Json(state.monitor.snapshot().into())
}

/// POST /api/data-completeness/refresh
pub async fn api_completeness_refresh(
    State(state): State<SharedState>,
) -> Json<CompletenessResponse> {
    Json(state.monitor.refresh().await.into())
}

/// GET /api/data-completeness/missing-data-map
pub async fn api_missing_data_map(State(state): State<SharedState>) -> Json<MissingDataMap> {
    Json(state.completeness.get_missing_data_map().await)
}

/// GET /api/data-completeness/enrichment-gaps
pub async fn api_enrichment_gaps(State(state): State<SharedState>) -> Json<EnrichmentGaps> {
    Json(state.completeness.get_enrichment_gaps().await)
}

/// GET /api/homepage
pub async fn api_homepage(State(state): State<SharedState>) -> Json<HomepageData> {
    Json(state.homepage.get_homepage_data().await)
}

/// POST /api/chat/assistant
///
/// Always 200 with a chat completion, except for unreadable request bodies.
pub async fn api_chat_assistant(State(state): State<SharedState>, body: Bytes) -> Response {
    match AssistantProxy::parse_request(&body) {
        Ok(request) => Json(state.assistant.respond(&request).await).into_response(),
        Err(e) => {
            log::error!("Chat assistant: rejected request: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({
                    "error": "Failed to process chat request",
                    "message": e.to_string(),
                })),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::ResolvedApi;
    use crate::types::Config;
    use axum::body::to_bytes;

    fn unreachable_state() -> SharedState {
        let config = Config {
            request_timeout_secs: 2,
            ..Default::default()
        };
        let api = ResolvedApi::for_base("http://127.0.0.1:9", "/api").unwrap();
        Arc::new(AppState::new(config, api, false).unwrap())
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_chat_bad_body_is_500() {
        let response =
            api_chat_assistant(State(unreachable_state()), Bytes::from_static(b"nope")).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Failed to process chat request");
        assert!(body["message"].as_str().unwrap().contains("Invalid request body"));
    }

    #[tokio::test]
    async fn test_chat_unreachable_backend_is_200_fallback() {
        let body = Bytes::from_static(br#"{"assistant_name":"Scout","message":"impact?"}"#);
        let response = api_chat_assistant(State(unreachable_state()), body).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["object"], "chat.completion");
    }

    #[tokio::test]
    async fn test_refresh_with_backend_down_reports_error_without_data() {
        let state = unreachable_state();
        let Json(response) = api_completeness_refresh(State(state.clone())).await;
        assert!(response.snapshot.error.is_some());
        assert!(response.report.is_none());

        // The never-failing endpoint still serves fallback data.
        let Json(map) = api_missing_data_map(State(state)).await;
        assert_eq!(map, crate::fixtures::missing_data_map());
    }
}
