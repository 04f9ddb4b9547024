//! Streaming session seam
//!
//! The streaming engine (manifest parsing, adaptive selection, buffering,
//! licensing) is an external service. The adapter only creates sessions,
//! hands them a [`DashSource`] and relays what they report back through
//! [`SessionEvent`](crate::SessionEvent)s.

use crate::types::{LoadTicket, SurfaceId};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use url::Url;

/// Bandwidth estimator handed to the streaming engine
///
/// The adapter never calls into an estimator; it only passes a host-supplied
/// override through to the session in place of the engine default.
pub trait BandwidthEstimator: Send + Sync {
    /// Record a completed transfer
    fn sample(&self, delay_ms: u64, bytes: u64);

    /// Current estimate in bits per second
    fn estimate_bps(&self) -> u64;
}

/// DRM configuration returned by a content-protection callback
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrmInfo {
    /// Key system, e.g. `com.widevine.alpha`
    pub key_system: String,
    /// License server
    pub license_server_url: Option<Url>,
    /// Send credentials with license requests
    #[serde(default)]
    pub with_credentials: bool,
}

/// Maps `(scheme_id_uri, content_protection_element)` to DRM configuration
pub type ContentProtectionCallback = Arc<dyn Fn(&str, &str) -> Option<DrmInfo> + Send + Sync>;

/// Runs against the session after its manifest load completed
pub type PostLoadCallback = Arc<dyn Fn(&mut dyn StreamingSession) + Send + Sync>;

/// Everything a session needs to load one MPEG-DASH presentation
#[derive(Clone)]
pub struct DashSource {
    /// Manifest location as the host gave it, resolved against
    /// `EngineConfig::base_url` when one is configured
    pub manifest_url: String,
    pub content_protection: Option<ContentProtectionCallback>,
    /// `None` selects the engine's default estimator
    pub bandwidth_estimator: Option<Arc<dyn BandwidthEstimator>>,
}

impl std::fmt::Debug for DashSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DashSource")
            .field("manifest_url", &self.manifest_url)
            .field("content_protection", &self.content_protection.is_some())
            .field("bandwidth_estimator", &self.bandwidth_estimator.is_some())
            .finish()
    }
}

/// Per-load session of the external streaming engine
pub trait StreamingSession: Send {
    /// Start loading the manifest
    ///
    /// Must return without waiting for the load. Completion or rejection is
    /// reported later as `SessionEvent::LoadCompleted`/`LoadFailed` carrying
    /// `ticket`.
    fn load(&mut self, source: DashSource, ticket: LoadTicket);

    /// Release the engine resources bound to the surface
    fn unload(&mut self);
}

/// Factory for streaming sessions
pub trait StreamingEngine: Send {
    /// Engine name, used in the adapter identity
    fn name(&self) -> &str;

    /// Engine version, used in the adapter identity
    fn version(&self) -> &str;

    /// Create a session bound to `surface`
    fn create_session(&mut self, surface: SurfaceId) -> Box<dyn StreamingSession>;
}
