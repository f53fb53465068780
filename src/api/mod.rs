//! Backend statistics API.
//!
//! `client` holds the reqwest-backed [`BackendClient`]; [`CompletenessSource`]
//! is the seam the completeness service and monitor depend on, so both can run
//! against a scripted source in tests.

pub mod client;

use async_trait::async_trait;

use crate::error::FetchError;
use crate::types::{EnrichmentGaps, MissingDataMap};

pub use client::BackendClient;

pub const MISSING_DATA_MAP_PATH: &str = "/intelligence-enrichment/missing-data-map";
pub const ENRICHMENT_GAPS_PATH: &str = "/enrichment-gaps/analysis";
pub const STATS_PATH: &str = "/stats";
pub const HOMEPAGE_PATH: &str = "/stats/homepage";
pub const RECENT_INNOVATIONS_PATH: &str = "/innovations/recent";

/// Source of validated data-completeness payloads.
#[async_trait]
pub trait CompletenessSource: Send + Sync {
    async fn fetch_missing_data_map(&self) -> Result<MissingDataMap, FetchError>;
    async fn fetch_enrichment_gaps(&self) -> Result<EnrichmentGaps, FetchError>;
}
