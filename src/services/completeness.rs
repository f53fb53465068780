// Data-completeness service: fetch with fixture fallback.
// The dashboard never shows an empty state when the backend is down.

use std::sync::Arc;

use crate::api::CompletenessSource;
use crate::fixtures;
use crate::types::{EnrichmentGaps, HealthStatus, MissingDataMap};

#[derive(Clone)]
pub struct DataCompletenessService {
    source: Arc<dyn CompletenessSource>,
}

impl DataCompletenessService {
    pub fn new(source: Arc<dyn CompletenessSource>) -> Self {
        Self { source }
    }

    /// Missing-data map, or the canonical fixture if the backend is unavailable.
    pub async fn get_missing_data_map(&self) -> MissingDataMap {
        match self.source.fetch_missing_data_map().await {
            Ok(map) => map,
            Err(e) => {
                log::warn!(
                    "Completeness service: missing-data map unavailable, using fallback: {}",
                    e
                );
                fixtures::missing_data_map()
            }
        }
    }

    /// Enrichment-gap analysis, or the canonical fixture if the backend is unavailable.
    pub async fn get_enrichment_gaps(&self) -> EnrichmentGaps {
        match self.source.fetch_enrichment_gaps().await {
            Ok(gaps) => gaps,
            Err(e) => {
                log::warn!(
                    "Completeness service: enrichment gaps unavailable, using fallback: {}",
                    e
                );
                fixtures::enrichment_gaps()
            }
        }
    }

    /// Probe both endpoints concurrently. Both requests always run to completion.
    pub async fn health_check(&self) -> HealthStatus {
        let (map, gaps) = tokio::join!(
            self.source.fetch_missing_data_map(),
            self.source.fetch_enrichment_gaps()
        );

        if let Err(ref e) = map {
            log::info!("Completeness health: missing-data map down: {}", e);
        }
        if let Err(ref e) = gaps {
            log::info!("Completeness health: enrichment gaps down: {}", e);
        }

        HealthStatus {
            missing_data_map_available: map.is_ok(),
            enrichment_gaps_available: gaps.is_ok(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::BackendClient;
    use crate::error::FetchError;
    use crate::state::ResolvedApi;
    use async_trait::async_trait;
    use std::time::Duration;
    use tokio::sync::Notify;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn service_for(server: &MockServer) -> DataCompletenessService {
        let api = ResolvedApi::for_base(&server.uri(), "/api").unwrap();
        DataCompletenessService::new(Arc::new(BackendClient::new(&api, 5).unwrap()))
    }

    fn live_map() -> MissingDataMap {
        let mut map = fixtures::missing_data_map();
        map.analysis_timestamp = "2025-06-30T08:15:00.250000".to_string();
        map.recommendations = vec!["live recommendation".to_string()];
        map
    }

    #[tokio::test]
    async fn test_returns_live_map_when_available() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/intelligence-enrichment/missing-data-map"))
            .respond_with(ResponseTemplate::new(200).set_body_json(live_map()))
            .mount(&server)
            .await;

        let map = service_for(&server).get_missing_data_map().await;
        assert_eq!(map.recommendations, vec!["live recommendation"]);
    }

    #[tokio::test]
    async fn test_falls_back_on_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let service = service_for(&server);
        assert_eq!(service.get_missing_data_map().await, fixtures::missing_data_map());
        assert_eq!(service.get_enrichment_gaps().await, fixtures::enrichment_gaps());
    }

    #[tokio::test]
    async fn test_falls_back_on_shape_mismatch() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/enrichment-gaps/analysis"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "unexpected": true })),
            )
            .mount(&server)
            .await;

        let gaps = service_for(&server).get_enrichment_gaps().await;
        assert_eq!(gaps, fixtures::enrichment_gaps());
    }

    #[tokio::test]
    async fn test_health_check_reports_each_endpoint() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/intelligence-enrichment/missing-data-map"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/enrichment-gaps/analysis"))
            .respond_with(ResponseTemplate::new(200).set_body_json(fixtures::enrichment_gaps()))
            .mount(&server)
            .await;

        let health = service_for(&server).health_check().await;
        assert_eq!(
            health,
            HealthStatus {
                missing_data_map_available: false,
                enrichment_gaps_available: true,
            }
        );
    }

    /// Map fetch completes only once the gaps fetch has started, so a
    /// sequential health check never finishes.
    #[derive(Default)]
    struct InterlockedSource {
        gaps_started: Notify,
    }

    #[async_trait]
    impl CompletenessSource for InterlockedSource {
        async fn fetch_missing_data_map(&self) -> Result<MissingDataMap, FetchError> {
            self.gaps_started.notified().await;
            Err(FetchError::Network("connection reset".into()))
        }

        async fn fetch_enrichment_gaps(&self) -> Result<EnrichmentGaps, FetchError> {
            self.gaps_started.notify_one();
            Ok(fixtures::enrichment_gaps())
        }
    }

    #[tokio::test]
    async fn test_health_check_runs_both_requests_concurrently() {
        let service = DataCompletenessService::new(Arc::new(InterlockedSource::default()));

        let health = tokio::time::timeout(Duration::from_secs(5), service.health_check())
            .await
            .expect("both requests in flight together");
        assert!(!health.missing_data_map_available);
        assert!(health.enrichment_gaps_available);
    }
}
