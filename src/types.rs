use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

// =============================================================================
// Configuration
// =============================================================================

/// Service configuration stored in ~/.afriai/config.json.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Backend base URL. `NEXT_PUBLIC_API_URL` takes precedence when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
    #[serde(default = "default_api_prefix")]
    pub api_prefix: String,
    /// Hostnames the dashboard is served from in production.
    #[serde(default)]
    pub production_hosts: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub production_api_url: Option<String>,
    /// Hostname this instance is served under, matched against `production_hosts`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_host: Option<String>,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    #[serde(default = "default_recent_innovations_limit")]
    pub recent_innovations_limit: u32,
    #[serde(default)]
    pub completeness: CompletenessConfig,
    #[serde(default)]
    pub assistant: AssistantConfig,
}

fn default_api_prefix() -> String {
    "/api".to_string()
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_bind_addr() -> String {
    "127.0.0.1:3000".to_string()
}

fn default_recent_innovations_limit() -> u32 {
    6
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: None,
            api_prefix: default_api_prefix(),
            production_hosts: Vec::new(),
            production_api_url: None,
            public_host: None,
            request_timeout_secs: default_request_timeout_secs(),
            bind_addr: default_bind_addr(),
            recent_innovations_limit: default_recent_innovations_limit(),
            completeness: CompletenessConfig::default(),
            assistant: AssistantConfig::default(),
        }
    }
}

/// Data-completeness monitor settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletenessConfig {
    #[serde(default = "default_true")]
    pub auto_fetch: bool,
    /// Polling cadence. `None` or 0 disables polling.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: Option<u64>,
}

fn default_true() -> bool {
    true
}

fn default_poll_interval_secs() -> Option<u64> {
    Some(300)
}

impl Default for CompletenessConfig {
    fn default() -> Self {
        Self {
            auto_fetch: true,
            poll_interval_secs: default_poll_interval_secs(),
        }
    }
}

/// External AI assistant backend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistantConfig {
    /// Full URL of the assistant chat endpoint. Defaults to
    /// `{api base}/ai-assistant/chat`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(default = "default_assistant_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_assistant_timeout_secs() -> u64 {
    30
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            timeout_secs: default_assistant_timeout_secs(),
        }
    }
}

// =============================================================================
// Data completeness
// =============================================================================

/// Whether a field is part of the core record or filled by enrichment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Core,
    Enrichment,
}

/// Per-field completeness statistics for one table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldCompleteness {
    pub completeness_percentage: f64,
    pub complete_records: u64,
    pub missing_records: u64,
    pub field_type: FieldType,
}

/// Completeness analysis of a single backend table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableAnalysis {
    #[serde(default)]
    pub total_records: u64,
    /// One row per sampled record: field name → present.
    #[serde(default)]
    pub completeness_matrix: Vec<BTreeMap<String, bool>>,
    #[serde(default)]
    pub field_completeness: BTreeMap<String, FieldCompleteness>,
    #[serde(default)]
    pub overall_completeness: f64,
    #[serde(default)]
    pub core_fields_completeness: f64,
    #[serde(default)]
    pub enrichment_fields_completeness: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSummary {
    #[serde(default)]
    pub tables_analyzed: u32,
    #[serde(default)]
    pub total_records_analyzed: u64,
    #[serde(default)]
    pub intelligence_table_exists: bool,
}

/// Payload of the missing-data-map endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissingDataMap {
    pub missing_data_map: BTreeMap<String, TableAnalysis>,
    #[serde(default)]
    pub recommendations: Vec<String>,
    pub analysis_timestamp: String,
    #[serde(default)]
    pub summary: AnalysisSummary,
}

/// Severity of a critical data gap. Unknown labels decode as `Low`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
}

impl Severity {
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "critical" => Severity::Critical,
            "high" => Severity::High,
            "medium" => Severity::Medium,
            _ => Severity::Low,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
        }
    }
}

impl<'de> Deserialize<'de> for Severity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Severity::from_label(&raw))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriticalGap {
    #[serde(rename = "type")]
    pub gap_type: String,
    pub severity: Severity,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub impact: String,
    #[serde(default)]
    pub affected_records: u64,
    #[serde(default)]
    pub recommended_action: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichmentPriority {
    pub task: String,
    pub priority_score: f64,
    #[serde(default)]
    pub justification: String,
    #[serde(default)]
    pub estimated_effort: String,
    #[serde(default)]
    pub expected_impact: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GapsAnalysis {
    #[serde(default)]
    pub publications_gaps: BTreeMap<String, u64>,
    #[serde(default)]
    pub innovations_gaps: BTreeMap<String, u64>,
    #[serde(default)]
    pub intelligence_gaps: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    pub critical_missing_data: Vec<CriticalGap>,
    #[serde(default)]
    pub enrichment_priority: Vec<EnrichmentPriority>,
}

/// Payload of the enrichment-gap analysis endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichmentGaps {
    pub gaps_analysis: GapsAnalysis,
    #[serde(default)]
    pub actionable_insights: Vec<String>,
}

/// Per-endpoint availability reported by the health check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthStatus {
    pub missing_data_map_available: bool,
    pub enrichment_gaps_available: bool,
}

// =============================================================================
// Homepage statistics
// =============================================================================

/// Headline platform statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlatformStats {
    #[serde(default)]
    pub total_innovations: u64,
    #[serde(default)]
    pub total_publications: u64,
    #[serde(default)]
    pub total_funding_usd: f64,
    #[serde(default)]
    pub countries_covered: u32,
    #[serde(default)]
    pub verified_innovations: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectorCount {
    pub sector: String,
    pub count: u64,
}

/// Aggregated chart data for the homepage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HomepageAggregate {
    #[serde(default)]
    pub featured_countries: Vec<String>,
    #[serde(default)]
    pub funding_by_country: BTreeMap<String, f64>,
    #[serde(default)]
    pub publications_by_year: BTreeMap<String, u64>,
    #[serde(default)]
    pub top_sectors: Vec<SectorCount>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InnovationSummary {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub innovation_type: Option<String>,
    #[serde(default)]
    pub funding_amount: Option<f64>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Homepage payload. `is_real_data` is false only for the static fallback.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HomepageData {
    pub stats: Option<PlatformStats>,
    pub homepage: Option<HomepageAggregate>,
    pub recent_innovations: Vec<InnovationSummary>,
    pub is_real_data: bool,
    pub fetched_at: String,
}
