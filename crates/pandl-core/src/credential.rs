//! Session credential lifecycle: shared store, liveness probing and
//! single-flight passive recapture.
//!
//! The token is the only state shared between the background health loop and
//! foreground request handling. The lock is held just long enough to clone or
//! replace the value, never across a network call; the capture flag is the
//! only other shared mutable and is checked with a compare-and-swap so two
//! triggers (timer vs. user request) can never run two captures.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::capture;
use crate::config::{CaptureConfig, PandlConfig};
use crate::drive::DriveClient;
use crate::error::PandlError;

/// Lifecycle state of the session credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialState {
    /// Installed but never probed (startup, or just after a recapture).
    Unknown,
    /// Last probe got a 2xx.
    Alive,
    /// Probe failed and recapture did not produce a replacement.
    Dead,
    /// A capture subprocess is running.
    Capturing,
}

/// Process-wide store for the single live session credential.
pub struct CredentialStore {
    token: Mutex<String>,
    state: Mutex<CredentialState>,
    capturing: AtomicBool,
}

impl CredentialStore {
    pub fn new(seed: impl Into<String>) -> Self {
        Self {
            token: Mutex::new(seed.into()),
            state: Mutex::new(CredentialState::Unknown),
            capturing: AtomicBool::new(false),
        }
    }

    /// Current token, cloned under the lock.
    pub fn get(&self) -> String {
        self.token.lock().unwrap().clone()
    }

    /// Install a new token.
    pub fn set(&self, value: String) {
        *self.token.lock().unwrap() = value;
    }

    pub fn state(&self) -> CredentialState {
        *self.state.lock().unwrap()
    }

    fn set_state(&self, state: CredentialState) {
        *self.state.lock().unwrap() = state;
    }

    /// Claim the single capture slot. Returns false if a capture is already
    /// in flight.
    pub fn begin_capture(&self) -> bool {
        self.capturing
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub fn end_capture(&self) {
        self.capturing.store(false, Ordering::Release);
    }
}

/// Outcome of one `ensure_fresh` cycle.
#[derive(Debug)]
pub enum RefreshOutcome {
    /// Probe succeeded; nothing to do.
    Alive,
    /// Probe failed and a capture installed a new token.
    Refreshed,
    /// Probe failed but another capture already holds the slot.
    CaptureInFlight,
    /// Probe failed and the capture did too; token left unchanged.
    Failed(PandlError),
}

/// Lightweight authenticated probe. A 2xx means the token works; any other
/// HTTP status means it is dead. Transport-level errors are inconclusive and
/// reported as alive so a flaky network cannot trigger a recapture storm.
pub async fn probe_liveness(client: &DriveClient) -> bool {
    match client.probe_request().await {
        Ok(status) if status.is_success() => true,
        Ok(status) => {
            tracing::warn!("liveness probe got HTTP {status}");
            false
        }
        Err(err) => {
            tracing::debug!("liveness probe inconclusive: {err}");
            true
        }
    }
}

/// Probe the credential and, if it is dead, run one passive capture to
/// replace it. At most one capture runs process-wide; a losing caller
/// returns immediately with `CaptureInFlight`.
pub async fn ensure_fresh(client: &DriveClient, capture_cfg: &CaptureConfig) -> RefreshOutcome {
    let store = client.credential();
    if probe_liveness(client).await {
        store.set_state(CredentialState::Alive);
        return RefreshOutcome::Alive;
    }

    if !store.begin_capture() {
        return RefreshOutcome::CaptureInFlight;
    }
    store.set_state(CredentialState::Capturing);
    tracing::warn!(
        "credential dead, capturing on port {} interface {}",
        capture_cfg.port,
        capture_cfg.interface
    );

    let result = capture::capture_token(
        capture_cfg.timeout_secs,
        capture_cfg.port,
        &capture_cfg.interface,
    )
    .await;
    store.end_capture();

    match result {
        Ok(token) => {
            store.set(token);
            // Fresh token, validity unknown until the next probe.
            store.set_state(CredentialState::Unknown);
            tracing::info!("credential replaced from captured traffic");
            RefreshOutcome::Refreshed
        }
        Err(err) => {
            store.set_state(CredentialState::Dead);
            tracing::error!("credential capture failed: {err}");
            RefreshOutcome::Failed(err)
        }
    }
}

/// Background liveness cycle: runs once immediately, then at the configured
/// interval. Foreground handling never waits on this loop.
pub async fn health_loop(client: DriveClient, cfg: PandlConfig) {
    let mut ticker =
        tokio::time::interval(Duration::from_secs(cfg.health_check_interval_secs.max(1)));
    loop {
        ticker.tick().await;
        match ensure_fresh(&client, &cfg.capture).await {
            RefreshOutcome::Alive => tracing::debug!("credential alive"),
            RefreshOutcome::Refreshed => tracing::info!("credential refreshed"),
            RefreshOutcome::CaptureInFlight => {
                tracing::debug!("capture already in flight, skipping cycle")
            }
            RefreshOutcome::Failed(err) => {
                tracing::error!("credential recovery failed, will retry next cycle: {err}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PandlConfig;
    use httpmock::prelude::*;

    fn client_for(base: &str, store: std::sync::Arc<CredentialStore>) -> DriveClient {
        let cfg = PandlConfig {
            api_host: base.trim_end_matches('/').to_string(),
            auth_token: "seed".into(),
            space: "space".into(),
            parent_folder_id: "parent".into(),
            ..PandlConfig::default()
        };
        DriveClient::new(&cfg, store).unwrap()
    }

    #[test]
    fn store_get_set_roundtrip() {
        let store = CredentialStore::new("seed");
        assert_eq!(store.get(), "seed");
        store.set("fresh".into());
        assert_eq!(store.get(), "fresh");
        assert_eq!(store.state(), CredentialState::Unknown);
    }

    #[test]
    fn capture_slot_is_single_flight() {
        let store = CredentialStore::new("seed");
        assert!(store.begin_capture());
        assert!(!store.begin_capture());
        store.end_capture();
        assert!(store.begin_capture());
    }

    #[tokio::test]
    async fn probe_2xx_is_alive() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/drive/v1/files");
            then.status(200).json_body(serde_json::json!({"files": []}));
        });
        let store = std::sync::Arc::new(CredentialStore::new("seed"));
        let client = client_for(&server.base_url(), store);
        assert!(probe_liveness(&client).await);
    }

    #[tokio::test]
    async fn probe_401_is_dead() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/drive/v1/files");
            then.status(401);
        });
        let store = std::sync::Arc::new(CredentialStore::new("seed"));
        let client = client_for(&server.base_url(), store);
        assert!(!probe_liveness(&client).await);
    }

    #[tokio::test]
    async fn probe_transport_error_is_inconclusive_alive() {
        // Nothing listens here; connection failure must not count as dead.
        let store = std::sync::Arc::new(CredentialStore::new("seed"));
        let client = client_for("http://127.0.0.1:1", store);
        assert!(probe_liveness(&client).await);
    }

    #[tokio::test]
    async fn dead_probe_with_capture_in_flight_does_not_capture_again() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(GET).path("/drive/v1/files");
            then.status(401);
        });
        let store = std::sync::Arc::new(CredentialStore::new("seed"));
        assert!(store.begin_capture());
        let client = client_for(&server.base_url(), store.clone());
        let outcome = ensure_fresh(&client, &CaptureConfig::default()).await;
        assert!(matches!(outcome, RefreshOutcome::CaptureInFlight));
        assert_eq!(store.get(), "seed");
        store.end_capture();
    }
}
