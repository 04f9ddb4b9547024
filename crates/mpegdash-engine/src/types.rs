//! Core types for the MPEG-DASH engine adapter

use crate::{
    session::{BandwidthEstimator, ContentProtectionCallback, PostLoadCallback},
    Error, Result,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// MIME type of an MPEG-DASH media presentation description
pub const DASH_MIME_TYPE: &str = "application/dash+xml";

/// Unique identifier for a playback surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SurfaceId(pub Uuid);

impl SurfaceId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SurfaceId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Generation tag of one `load()` call
///
/// Completions reported by a streaming session carry the ticket they were
/// issued with so the adapter can discard those of a superseded load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LoadTicket(pub u64);

impl LoadTicket {
    pub(crate) fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl std::fmt::Display for LoadTicket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A candidate source offered by the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceDescriptor {
    /// Declared content type
    #[serde(rename = "type")]
    pub mime_type: String,
    /// Source URL
    pub src: String,
}

impl SourceDescriptor {
    pub fn new(mime_type: impl Into<String>, src: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            src: src.into(),
        }
    }
}

/// A single buffered or seekable interval in seconds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: f64,
    pub end: f64,
}

impl TimeRange {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    /// Check whether `time` lies within the range, both ends inclusive
    pub fn contains(&self, time: f64) -> bool {
        self.start <= time && time <= self.end
    }
}

/// Set of disjoint time ranges as reported by a playback surface
///
/// Ranges are kept in the order the surface reported them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimeRanges(Vec<TimeRange>);

impl TimeRanges {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn push(&mut self, start: f64, end: f64) {
        self.0.push(TimeRange::new(start, end));
    }

    /// Start of range `index`
    pub fn start(&self, index: usize) -> Result<f64> {
        self.get(index).map(|r| r.start)
    }

    /// End of range `index`
    pub fn end(&self, index: usize) -> Result<f64> {
        self.get(index).map(|r| r.end)
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &TimeRange> {
        self.0.iter()
    }

    fn get(&self, index: usize) -> Result<&TimeRange> {
        self.0.get(index).ok_or(Error::TimeRange {
            index,
            len: self.0.len(),
        })
    }
}

impl From<Vec<(f64, f64)>> for TimeRanges {
    fn from(ranges: Vec<(f64, f64)>) -> Self {
        Self(ranges.into_iter().map(|(s, e)| TimeRange::new(s, e)).collect())
    }
}

/// Per-load options for the streaming session
#[derive(Clone, Default)]
pub struct DashOptions {
    /// Replaces the engine's default bandwidth estimator
    pub bandwidth_estimator: Option<Arc<dyn BandwidthEstimator>>,
    /// Resolves DRM configuration for content protection elements
    pub content_protection: Option<ContentProtectionCallback>,
    /// Invoked with the session once the manifest load completes
    pub on_load: Option<PostLoadCallback>,
}

impl std::fmt::Debug for DashOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DashOptions")
            .field("bandwidth_estimator", &self.bandwidth_estimator.is_some())
            .field("content_protection", &self.content_protection.is_some())
            .field("on_load", &self.on_load.is_some())
            .finish()
    }
}

/// Video metadata shared between the host and the adapter
///
/// The host fills in `src` (and optionally `dash`) before `load`; the adapter
/// fills in the media properties once the surface reports loaded data.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VideoDescriptor {
    /// Manifest URL
    pub src: String,
    /// Declared content type
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    /// Content duration in seconds
    #[serde(default)]
    pub duration: Option<f64>,
    /// End of the seekable window in seconds
    #[serde(default)]
    pub seekable: Option<f64>,
    /// Intrinsic video width
    #[serde(default)]
    pub width: Option<u32>,
    /// Intrinsic video height
    #[serde(default)]
    pub height: Option<u32>,
    /// Resolved source URL reported by the surface
    #[serde(default)]
    pub url: Option<String>,
    /// Buffered edge around the play head
    #[serde(default)]
    pub buffer: Option<f64>,
    /// Streaming session options
    #[serde(skip)]
    pub dash: DashOptions,
}

impl VideoDescriptor {
    pub fn new(src: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            mime_type: Some(DASH_MIME_TYPE.to_string()),
            ..Default::default()
        }
    }

    pub fn with_options(mut self, dash: DashOptions) -> Self {
        self.dash = dash;
        self
    }
}

impl From<&SourceDescriptor> for VideoDescriptor {
    fn from(source: &SourceDescriptor) -> Self {
        Self {
            src: source.src.clone(),
            mime_type: Some(source.mime_type.clone()),
            ..Default::default()
        }
    }
}

/// Native events fired by a playback surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SurfaceEvent {
    Play,
    Pause,
    TimeUpdate,
    LoadedData,
    Seeked,
    /// Native buffering notification
    Progress,
    Ended,
    VolumeChange,
}

impl std::fmt::Display for SurfaceEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SurfaceEvent::Play => "play",
            SurfaceEvent::Pause => "pause",
            SurfaceEvent::TimeUpdate => "timeupdate",
            SurfaceEvent::LoadedData => "loadeddata",
            SurfaceEvent::Seeked => "seeked",
            SurfaceEvent::Progress => "progress",
            SurfaceEvent::Ended => "ended",
            SurfaceEvent::VolumeChange => "volumechange",
        };
        f.write_str(name)
    }
}

/// Fault reported by a streaming session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionError {
    pub code: String,
    pub message: String,
    #[serde(default)]
    pub fatal: bool,
}

impl SessionError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            fatal: false,
        }
    }

    pub fn fatal(mut self) -> Self {
        self.fatal = true;
        self
    }
}

/// Notifications delivered by a streaming session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SessionEvent {
    /// Asynchronous manifest load finished
    LoadCompleted { ticket: LoadTicket },
    /// Asynchronous manifest load was rejected
    LoadFailed { ticket: LoadTicket, error: SessionError },
    /// Engine-level fault during playback
    Error { error: SessionError },
}
