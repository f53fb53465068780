use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use url::Url;

use crate::api::{BackendClient, CompletenessSource};
use crate::chat::AssistantProxy;
use crate::monitor::{CompletenessMonitor, MonitorOptions};
use crate::services::completeness::DataCompletenessService;
use crate::services::homepage::HomepageService;
use crate::types::Config;

/// Environment override for the backend base URL.
pub const API_URL_ENV: &str = "NEXT_PUBLIC_API_URL";

/// Local development backend.
pub const DEFAULT_API_URL: &str = "http://localhost:8030";

/// Where the backend base URL came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum BaseUrlSource {
    Environment,
    ConfigFile,
    ProductionHost,
    Default,
}

/// Backend location, resolved once at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedApi {
    pub base_url: String,
    pub api_prefix: String,
    pub source: BaseUrlSource,
}

impl ResolvedApi {
    /// Build from an explicit base URL, validating it.
    pub fn for_base(base_url: &str, api_prefix: &str) -> Result<Self, String> {
        Ok(Self {
            base_url: normalize_base_url(base_url)?,
            api_prefix: normalize_prefix(api_prefix),
            source: BaseUrlSource::ConfigFile,
        })
    }

    /// Base URL with the API prefix; endpoint paths are appended to this.
    pub fn endpoint_base(&self) -> String {
        format!("{}{}", self.base_url, self.api_prefix)
    }
}

fn normalize_base_url(raw: &str) -> Result<String, String> {
    let trimmed = raw.trim();
    let parsed = Url::parse(trimmed).map_err(|e| format!("Invalid API URL {:?}: {}", raw, e))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(format!("API URL must be http or https: {}", raw));
    }
    Ok(trimmed.trim_end_matches('/').to_string())
}

fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}

/// Resolve the backend base URL.
///
/// Precedence: environment override, config `apiUrl`, production hostname
/// match (`publicHost` listed in `productionHosts` selects
/// `productionApiUrl`), then [`DEFAULT_API_URL`]. Empty values are skipped.
pub fn resolve_api_base(
    env_override: Option<&str>,
    config: &Config,
    served_host: Option<&str>,
) -> Result<ResolvedApi, String> {
    let prefix = normalize_prefix(&config.api_prefix);
    let non_empty = |v: Option<&str>| {
        v.map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };

    let (raw, source) = if let Some(url) = non_empty(env_override) {
        (url, BaseUrlSource::Environment)
    } else if let Some(url) = non_empty(config.api_url.as_deref()) {
        (url, BaseUrlSource::ConfigFile)
    } else if let Some(url) = production_api_for(config, served_host) {
        (url, BaseUrlSource::ProductionHost)
    } else {
        (DEFAULT_API_URL.to_string(), BaseUrlSource::Default)
    };

    Ok(ResolvedApi {
        base_url: normalize_base_url(&raw)?,
        api_prefix: prefix,
        source,
    })
}

fn production_api_for(config: &Config, served_host: Option<&str>) -> Option<String> {
    let host = served_host
        .or(config.public_host.as_deref())
        .map(|h| h.trim().to_ascii_lowercase())
        .filter(|h| !h.is_empty())?;
    // Accept "host:port" as well as bare hostnames.
    let bare = host.split(':').next().unwrap_or(host.as_str());
    let recognized = config
        .production_hosts
        .iter()
        .any(|candidate| candidate.trim().eq_ignore_ascii_case(bare));
    if recognized {
        config.production_api_url.clone().filter(|u| !u.trim().is_empty())
    } else {
        None
    }
}

/// Get the config file path (~/.afriai/config.json)
pub fn config_path() -> Result<PathBuf, String> {
    let home = dirs::home_dir().ok_or("Could not find home directory")?;
    Ok(home.join(".afriai").join("config.json"))
}

/// Load configuration. A missing file yields defaults; a malformed one is an error.
pub fn load_config(path: Option<&Path>) -> Result<Config, String> {
    let config_path = match path {
        Some(p) => p.to_path_buf(),
        None => config_path()?,
    };

    if !config_path.exists() {
        log::info!(
            "Config file not found at {}, using defaults",
            config_path.display()
        );
        return Ok(Config::default());
    }

    let content =
        fs::read_to_string(&config_path).map_err(|e| format!("Failed to read config: {}", e))?;

    serde_json::from_str(&content).map_err(|e| format!("Failed to parse config: {}", e))
}

/// Shared service state for the HTTP surface and CLI.
pub struct AppState {
    pub config: Config,
    pub api: ResolvedApi,
    pub completeness: DataCompletenessService,
    pub homepage: HomepageService,
    pub monitor: CompletenessMonitor,
    pub assistant: AssistantProxy,
}

impl AppState {
    /// Build clients and services. Must be called inside a tokio runtime when
    /// `start_monitor` is true, since mounting spawns the poller.
    pub fn new(config: Config, api: ResolvedApi, start_monitor: bool) -> Result<Self, String> {
        let backend = BackendClient::new(&api, config.request_timeout_secs)
            .map_err(|e| e.to_string())?;
        let source: Arc<dyn CompletenessSource> = Arc::new(backend.clone());

        let monitor_options = if start_monitor {
            MonitorOptions {
                auto_fetch: config.completeness.auto_fetch,
                fetch_interval: config
                    .completeness
                    .poll_interval_secs
                    .filter(|secs| *secs > 0)
                    .map(Duration::from_secs),
            }
        } else {
            MonitorOptions {
                auto_fetch: false,
                fetch_interval: None,
            }
        };

        let assistant = AssistantProxy::new(&config.assistant, &api).map_err(|e| e.to_string())?;

        Ok(Self {
            completeness: DataCompletenessService::new(source.clone()),
            homepage: HomepageService::new(backend, config.recent_innovations_limit),
            monitor: CompletenessMonitor::mount(source, monitor_options),
            assistant,
            config,
            api,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn production_config() -> Config {
        Config {
            production_hosts: vec!["dashboard.example.org".into()],
            production_api_url: Some("https://api.example.org/".into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_default_when_nothing_configured() {
        let api = resolve_api_base(None, &Config::default(), None).unwrap();
        assert_eq!(api.base_url, DEFAULT_API_URL);
        assert_eq!(api.source, BaseUrlSource::Default);
        assert_eq!(api.endpoint_base(), "http://localhost:8030/api");
    }

    #[test]
    fn test_environment_beats_config() {
        let config = Config {
            api_url: Some("http://config:9000".into()),
            ..production_config()
        };
        let api = resolve_api_base(Some("http://env:7000/"), &config, Some("dashboard.example.org"))
            .unwrap();
        assert_eq!(api.base_url, "http://env:7000");
        assert_eq!(api.source, BaseUrlSource::Environment);
    }

    #[test]
    fn test_blank_environment_is_ignored() {
        let config = Config {
            api_url: Some("http://config:9000".into()),
            ..Default::default()
        };
        let api = resolve_api_base(Some("  "), &config, None).unwrap();
        assert_eq!(api.source, BaseUrlSource::ConfigFile);
    }

    #[test]
    fn test_production_host_heuristic() {
        let config = production_config();
        let api = resolve_api_base(None, &config, Some("Dashboard.Example.org:443")).unwrap();
        assert_eq!(api.base_url, "https://api.example.org");
        assert_eq!(api.source, BaseUrlSource::ProductionHost);

        let api = resolve_api_base(None, &config, Some("localhost")).unwrap();
        assert_eq!(api.source, BaseUrlSource::Default);
    }

    #[test]
    fn test_public_host_from_config() {
        let config = Config {
            public_host: Some("dashboard.example.org".into()),
            ..production_config()
        };
        let api = resolve_api_base(None, &config, None).unwrap();
        assert_eq!(api.source, BaseUrlSource::ProductionHost);
    }

    #[test]
    fn test_rejects_non_http_url() {
        assert!(resolve_api_base(Some("ftp://files"), &Config::default(), None).is_err());
        assert!(resolve_api_base(Some("not a url"), &Config::default(), None).is_err());
    }

    #[test]
    fn test_prefix_normalization() {
        let config = Config {
            api_prefix: "api/v1/".into(),
            ..Default::default()
        };
        let api = resolve_api_base(None, &config, None).unwrap();
        assert_eq!(api.endpoint_base(), "http://localhost:8030/api/v1");
    }

    #[test]
    fn test_load_config_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = load_config(Some(&dir.path().join("absent.json"))).unwrap();
        assert_eq!(config.api_prefix, "/api");
    }

    #[test]
    fn test_load_config_reads_camel_case() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{ "apiUrl": "http://stats:8000", "completeness": { "pollIntervalSecs": 60 } }"#,
        )
        .unwrap();
        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.api_url.as_deref(), Some("http://stats:8000"));
        assert_eq!(config.completeness.poll_interval_secs, Some(60));
        assert!(config.completeness.auto_fetch);
    }

    #[test]
    fn test_load_config_malformed_is_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(load_config(Some(&path)).unwrap_err().contains("Failed to parse config"));
    }
}
