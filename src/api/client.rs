//! HTTP client for the backend statistics API.
//!
//! Plain JSON GETs relative to the resolved base URL. Payloads are decoded
//! into typed structs and validated before they leave this module.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use super::{
    CompletenessSource, ENRICHMENT_GAPS_PATH, HOMEPAGE_PATH, MISSING_DATA_MAP_PATH,
    RECENT_INNOVATIONS_PATH, STATS_PATH,
};
use crate::error::FetchError;
use crate::state::ResolvedApi;
use crate::types::{
    EnrichmentGaps, HomepageAggregate, InnovationSummary, MissingDataMap, PlatformStats,
};
use crate::validation;

#[derive(Clone)]
pub struct BackendClient {
    client: reqwest::Client,
    base_url: String,
    timeout_secs: u64,
}

impl BackendClient {
    pub fn new(api: &ResolvedApi, timeout_secs: u64) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| FetchError::Configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: api.endpoint_base(),
            timeout_secs,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, FetchError> {
        let url = self.url(path);
        log::debug!("Backend GET {}", url);

        let resp = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(e, self.timeout_secs))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(FetchError::http_status(status, body));
        }

        let bytes = resp
            .bytes()
            .await
            .map_err(|e| FetchError::from_reqwest(e, self.timeout_secs))?;

        serde_json::from_slice(&bytes)
            .map_err(|e| FetchError::Decode(format!("{} from {}", e, path)))
    }

    pub async fn fetch_stats(&self) -> Result<PlatformStats, FetchError> {
        self.get_json(STATS_PATH).await
    }

    pub async fn fetch_homepage(&self) -> Result<HomepageAggregate, FetchError> {
        self.get_json(HOMEPAGE_PATH).await
    }

    pub async fn fetch_recent_innovations(
        &self,
        limit: u32,
    ) -> Result<Vec<InnovationSummary>, FetchError> {
        self.get_json(&format!("{}?limit={}", RECENT_INNOVATIONS_PATH, limit))
            .await
    }
}

#[async_trait]
impl CompletenessSource for BackendClient {
    async fn fetch_missing_data_map(&self) -> Result<MissingDataMap, FetchError> {
        let map: MissingDataMap = self.get_json(MISSING_DATA_MAP_PATH).await?;
        validation::validate_missing_data_map(&map).map_err(FetchError::InvalidPayload)?;
        Ok(map)
    }

    async fn fetch_enrichment_gaps(&self) -> Result<EnrichmentGaps, FetchError> {
        let gaps: EnrichmentGaps = self.get_json(ENRICHMENT_GAPS_PATH).await?;
        validation::validate_enrichment_gaps(&gaps).map_err(FetchError::InvalidPayload)?;
        Ok(gaps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> BackendClient {
        let api = ResolvedApi::for_base(&server.uri(), "/api").unwrap();
        BackendClient::new(&api, 5).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_missing_data_map_decodes_and_validates() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/intelligence-enrichment/missing-data-map"))
            .respond_with(ResponseTemplate::new(200).set_body_json(fixtures::missing_data_map()))
            .mount(&server)
            .await;

        let map = client_for(&server).fetch_missing_data_map().await.unwrap();
        assert_eq!(map, fixtures::missing_data_map());
    }

    #[tokio::test]
    async fn test_non_success_status_is_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/enrichment-gaps/analysis"))
            .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
            .mount(&server)
            .await;

        let err = client_for(&server).fetch_enrichment_gaps().await.unwrap_err();
        match err {
            FetchError::HttpStatus { status, body } => {
                assert_eq!(status, 503);
                assert_eq!(body, "maintenance");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_inconsistent_payload_is_rejected() {
        let mut map = fixtures::missing_data_map();
        map.missing_data_map
            .get_mut("innovations")
            .unwrap()
            .field_completeness
            .get_mut("title")
            .unwrap()
            .missing_records = 40;

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/intelligence-enrichment/missing-data-map"))
            .respond_with(ResponseTemplate::new(200).set_body_json(map))
            .mount(&server)
            .await;

        let err = client_for(&server).fetch_missing_data_map().await.unwrap_err();
        assert!(matches!(err, FetchError::InvalidPayload(_)), "{err:?}");
    }

    #[tokio::test]
    async fn test_malformed_json_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/stats"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let err = client_for(&server).fetch_stats().await.unwrap_err();
        assert!(matches!(err, FetchError::Decode(_)), "{err:?}");
    }

    #[tokio::test]
    async fn test_recent_innovations_passes_limit() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/innovations/recent"))
            .and(query_param("limit", "3"))
            .respond_with(ResponseTemplate::new(200).set_body_json(fixtures::recent_innovations()))
            .mount(&server)
            .await;

        let items = client_for(&server).fetch_recent_innovations(3).await.unwrap();
        assert_eq!(items.len(), 3);
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_network_error() {
        let api = ResolvedApi::for_base("http://127.0.0.1:9", "/api").unwrap();
        let client = BackendClient::new(&api, 2).unwrap();
        let err = client.fetch_missing_data_map().await.unwrap_err();
        assert!(err.is_retryable(), "{err:?}");
    }
}
