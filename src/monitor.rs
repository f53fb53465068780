//! Data-completeness monitor.
//!
//! Owns the latest missing-data map and enrichment-gap snapshot and keeps it
//! fresh: an optional fetch on mount, an optional polling interval, and
//! manual refreshes. The missing-data map is the primary source; its failure
//! is surfaced as `error`. Enrichment-gap failures are logged and otherwise
//! ignored, so a partial snapshot beats an empty one.
//!
//! Last successful values are kept across failed or in-flight fetches.
//! Every request takes a sequence number and only the newest completed
//! response per source is applied. After [`CompletenessMonitor::unmount`] the
//! poller is stopped and late responses are dropped.

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::api::CompletenessSource;
use crate::error::{DashboardError, FetchError};
use crate::types::{EnrichmentGaps, MissingDataMap};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorOptions {
    /// Fetch once immediately on mount.
    pub auto_fetch: bool,
    /// Re-fetch cadence. `None` or zero disables polling.
    pub fetch_interval: Option<Duration>,
}

impl Default for MonitorOptions {
    fn default() -> Self {
        Self {
            auto_fetch: true,
            fetch_interval: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MonitorStatus {
    Idle,
    Loading,
    Ready,
    ReadyWithError,
}

/// Read-only view of the monitor state.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletenessSnapshot {
    pub missing_data_map: Option<MissingDataMap>,
    pub enrichment_gaps: Option<EnrichmentGaps>,
    pub loading: bool,
    pub error: Option<String>,
    /// Classification of `error` for the retry banner.
    pub error_detail: Option<DashboardError>,
    pub status: MonitorStatus,
    pub last_updated: Option<String>,
}

#[derive(Default)]
struct MonitorState {
    missing_data_map: Option<MissingDataMap>,
    enrichment_gaps: Option<EnrichmentGaps>,
    error: Option<FetchError>,
    map_seq: u64,
    gaps_seq: u64,
    completed_any: bool,
    last_updated: Option<DateTime<Utc>>,
}

struct Shared {
    source: Arc<dyn CompletenessSource>,
    state: RwLock<MonitorState>,
    mounted: AtomicBool,
    next_seq: AtomicU64,
    in_flight: AtomicUsize,
}

/// Marks a fetch as in flight; released on drop so an aborted poll does not
/// leave the monitor stuck in `loading`.
struct InFlight<'a>(&'a Shared);

impl<'a> InFlight<'a> {
    fn enter(shared: &'a Shared) -> Self {
        shared.in_flight.fetch_add(1, Ordering::SeqCst);
        InFlight(shared)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

impl Shared {
    fn is_mounted(&self) -> bool {
        self.mounted.load(Ordering::SeqCst)
    }

    fn next_seq(&self) -> u64 {
        self.next_seq.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Start a primary fetch: take a sequence number and clear the prior error.
    fn begin_map_fetch(&self) -> u64 {
        let seq = self.next_seq();
        self.state.write().error = None;
        seq
    }

    fn apply_map(&self, seq: u64, result: Result<MissingDataMap, FetchError>) {
        if !self.is_mounted() {
            log::debug!("Completeness monitor: dropping missing-data map response after unmount");
            return;
        }
        let mut state = self.state.write();
        if seq < state.map_seq {
            log::debug!(
                "Completeness monitor: dropping stale missing-data map response #{}",
                seq
            );
            return;
        }
        state.map_seq = seq;
        state.completed_any = true;
        match result {
            Ok(map) => {
                state.missing_data_map = Some(map);
                state.error = None;
                state.last_updated = Some(Utc::now());
            }
            Err(e) => {
                log::warn!("Completeness monitor: missing-data map fetch failed: {}", e);
                state.error = Some(e);
            }
        }
    }

    fn apply_gaps(&self, seq: u64, result: Result<EnrichmentGaps, FetchError>) {
        if !self.is_mounted() {
            log::debug!("Completeness monitor: dropping enrichment gaps response after unmount");
            return;
        }
        let mut state = self.state.write();
        if seq < state.gaps_seq {
            log::debug!(
                "Completeness monitor: dropping stale enrichment gaps response #{}",
                seq
            );
            return;
        }
        state.gaps_seq = seq;
        state.completed_any = true;
        match result {
            Ok(gaps) => state.enrichment_gaps = Some(gaps),
            // Secondary source: never surfaced as the monitor error.
            Err(e) => log::warn!("Completeness monitor: enrichment gaps fetch failed: {}", e),
        }
    }

    fn snapshot(&self) -> CompletenessSnapshot {
        let state = self.state.read();
        let loading = self.in_flight.load(Ordering::SeqCst) > 0;
        let status = if loading {
            MonitorStatus::Loading
        } else if !state.completed_any {
            MonitorStatus::Idle
        } else if state.error.is_some() {
            MonitorStatus::ReadyWithError
        } else {
            MonitorStatus::Ready
        };

        CompletenessSnapshot {
            missing_data_map: state.missing_data_map.clone(),
            enrichment_gaps: state.enrichment_gaps.clone(),
            loading,
            error: state.error.as_ref().map(|e| e.to_string()),
            error_detail: state.error.as_ref().map(DashboardError::from),
            status,
            last_updated: state.last_updated.map(|t| t.to_rfc3339()),
        }
    }

    async fn fetch_all(&self) {
        if !self.is_mounted() {
            return;
        }
        let _in_flight = InFlight::enter(self);
        let map_seq = self.begin_map_fetch();
        let gaps_seq = self.next_seq();

        let (map, gaps) = tokio::join!(
            self.source.fetch_missing_data_map(),
            self.source.fetch_enrichment_gaps()
        );

        self.apply_map(map_seq, map);
        self.apply_gaps(gaps_seq, gaps);
    }

    async fn fetch_missing_data_map(&self) {
        if !self.is_mounted() {
            return;
        }
        let _in_flight = InFlight::enter(self);
        let seq = self.begin_map_fetch();
        let result = self.source.fetch_missing_data_map().await;
        self.apply_map(seq, result);
    }

    async fn fetch_enrichment_gaps(&self) {
        if !self.is_mounted() {
            return;
        }
        let _in_flight = InFlight::enter(self);
        let seq = self.next_seq();
        let result = self.source.fetch_enrichment_gaps().await;
        self.apply_gaps(seq, result);
    }
}

pub struct CompletenessMonitor {
    shared: Arc<Shared>,
    poller: Mutex<Option<JoinHandle<()>>>,
}

impl CompletenessMonitor {
    /// Create a mounted monitor. Spawns the initial fetch and poller as
    /// configured, so this must run inside a tokio runtime when either is on.
    pub fn mount(source: Arc<dyn CompletenessSource>, options: MonitorOptions) -> Self {
        let shared = Arc::new(Shared {
            source,
            state: RwLock::new(MonitorState::default()),
            mounted: AtomicBool::new(true),
            next_seq: AtomicU64::new(0),
            in_flight: AtomicUsize::new(0),
        });
        let poller = spawn_poller(shared.clone(), options);

        Self {
            shared,
            poller: Mutex::new(poller),
        }
    }

    /// Fetch the missing-data map and enrichment gaps concurrently.
    pub async fn fetch_all(&self) -> CompletenessSnapshot {
        self.shared.fetch_all().await;
        self.snapshot()
    }

    /// Manual refresh; identical to [`Self::fetch_all`].
    pub async fn refresh(&self) -> CompletenessSnapshot {
        self.fetch_all().await
    }

    pub async fn fetch_missing_data_map(&self) -> CompletenessSnapshot {
        self.shared.fetch_missing_data_map().await;
        self.snapshot()
    }

    pub async fn fetch_enrichment_gaps(&self) -> CompletenessSnapshot {
        self.shared.fetch_enrichment_gaps().await;
        self.snapshot()
    }

    pub fn snapshot(&self) -> CompletenessSnapshot {
        self.shared.snapshot()
    }

    pub fn is_mounted(&self) -> bool {
        self.shared.is_mounted()
    }

    /// Stop polling and ignore any response still in flight. Fetch calls on an
    /// unmounted monitor are no-ops.
    pub fn unmount(&self) {
        if self.shared.mounted.swap(false, Ordering::SeqCst) {
            log::info!("Completeness monitor: unmounted");
        }
        if let Some(handle) = self.poller.lock().take() {
            handle.abort();
        }
    }
}

impl Drop for CompletenessMonitor {
    fn drop(&mut self) {
        self.unmount();
    }
}

fn spawn_poller(shared: Arc<Shared>, options: MonitorOptions) -> Option<JoinHandle<()>> {
    let interval = options.fetch_interval.filter(|d| !d.is_zero());
    if !options.auto_fetch && interval.is_none() {
        return None;
    }

    Some(tokio::spawn(async move {
        // Cadence is measured from mount, not from the end of the first fetch.
        let first_tick = interval.map(|period| Instant::now() + period);

        if options.auto_fetch {
            log::info!("Completeness monitor: initial fetch");
            shared.fetch_all().await;
        }

        let (Some(period), Some(start)) = (interval, first_tick) else {
            return;
        };
        log::info!(
            "Completeness monitor: polling every {}ms",
            period.as_millis()
        );

        let mut ticker = tokio::time::interval_at(start, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            if !shared.is_mounted() {
                break;
            }
            shared.fetch_all().await;
        }
    }))
}
