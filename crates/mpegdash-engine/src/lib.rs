//! MPEG-DASH Engine - playback engine adapter for player hosts
//!
//! This crate lets a generic player host hand MPEG-DASH playback to an
//! external streaming engine while still receiving the event stream of a plain
//! media resource:
//! - Source picking and capability query for `application/dash+xml`
//! - Control forwarding to the playback surface and streaming session
//! - Native event translation into host events
//! - Resume suppression after seeks on autoplaying hosts
//! - Buffered edge tracking around the play head
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         Player Host                             │
//! └───────────┬─────────────────────────────────────▲───────────────┘
//!             │ commands                            │ host events
//! ┌───────────▼─────────────────────────────────────┴───────────────┐
//! │                        EngineDriver                             │
//! │   ┌─────────────────────────────────────────────────────────┐   │
//! │   │                      DashEngine                         │   │
//! │   │  event translation · resume suppression · buffer edge   │   │
//! │   └──────────┬───────────────────────────────▲──────────────┘   │
//! └──────────────┼───────────────────────────────┼──────────────────┘
//!                │                               │ native / session events
//!     ┌──────────▼─────────┐          ┌──────────┴─────────┐
//!     │  PlaybackSurface   │◄─────────┤  StreamingSession  │
//!     └────────────────────┘  bound   └────────────────────┘
//! ```

pub mod adapter;
pub mod buffer;
pub mod config;
pub mod driver;
pub mod engine;
pub mod error;
pub mod host;
pub mod session;
pub mod sim;
pub mod suppression;
pub mod surface;
pub mod types;

pub use adapter::{can_play, pick_source, DashEngine};
pub use buffer::buffered_edge;
pub use config::EngineConfig;
pub use driver::{EngineDriver, EngineHandle, EngineInput, HostCommand};
pub use engine::PlayerEngine;
pub use error::{Error, Result};
pub use host::{ChannelSink, HostEvent, HostEventRecord, HostEventSink, RecordingSink};
pub use session::{
    BandwidthEstimator, ContentProtectionCallback, DashSource, DrmInfo, PostLoadCallback,
    StreamingEngine, StreamingSession,
};
pub use suppression::ResumeSuppression;
pub use surface::{PlaybackSurface, PlayerRegion};
pub use types::*;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the library
pub fn init() {
    tracing::info!(version = VERSION, "MPEG-DASH engine initialized");
}
