// Homepage service: headline statistics from three independent endpoints.
// Falls back to the static payload only when all three are unavailable.

use chrono::Utc;

use crate::api::BackendClient;
use crate::fixtures;
use crate::types::HomepageData;

#[derive(Clone)]
pub struct HomepageService {
    client: BackendClient,
    recent_limit: u32,
}

impl HomepageService {
    pub fn new(client: BackendClient, recent_limit: u32) -> Self {
        Self {
            client,
            recent_limit,
        }
    }

    /// Fetch stats, the homepage aggregate and recent innovations concurrently.
    ///
    /// Any live piece marks the result as real data; failed pieces stay empty.
    /// If nothing is reachable the cached payload is returned with
    /// `is_real_data = false`.
    pub async fn get_homepage_data(&self) -> HomepageData {
        let (stats, homepage, recent) = tokio::join!(
            self.client.fetch_stats(),
            self.client.fetch_homepage(),
            self.client.fetch_recent_innovations(self.recent_limit)
        );

        if stats.is_err() && homepage.is_err() && recent.is_err() {
            log::warn!("Homepage service: all sources unavailable, serving cached data");
            return fixtures::homepage_data();
        }

        let stats = stats
            .map_err(|e| log::warn!("Homepage service: stats unavailable: {}", e))
            .ok();
        let homepage = homepage
            .map_err(|e| log::warn!("Homepage service: homepage aggregate unavailable: {}", e))
            .ok();
        let recent_innovations = recent
            .map_err(|e| log::warn!("Homepage service: recent innovations unavailable: {}", e))
            .unwrap_or_default();

        HomepageData {
            stats,
            homepage,
            recent_innovations,
            is_real_data: true,
            fetched_at: Utc::now().to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::ResolvedApi;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn service_for(server: &MockServer) -> HomepageService {
        let api = ResolvedApi::for_base(&server.uri(), "/api").unwrap();
        HomepageService::new(BackendClient::new(&api, 5).unwrap(), 3)
    }

    #[tokio::test]
    async fn test_total_failure_serves_cached_data() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let data = service_for(&server).get_homepage_data().await;
        assert!(!data.is_real_data);
        assert_eq!(data, fixtures::homepage_data());
    }

    #[tokio::test]
    async fn test_partial_failure_keeps_live_pieces() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/stats"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "total_innovations": 12,
                "countries_covered": 4
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let data = service_for(&server).get_homepage_data().await;
        assert!(data.is_real_data);
        let stats = data.stats.expect("live stats");
        assert_eq!(stats.total_innovations, 12);
        assert_eq!(stats.countries_covered, 4);
        assert!(data.homepage.is_none());
        assert!(data.recent_innovations.is_empty());
    }
}
