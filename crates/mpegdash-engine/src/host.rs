//! Host event vocabulary and delivery

use crate::types::{SessionError, VideoDescriptor};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tracing::debug;

/// Events the adapter fires on the host
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum HostEvent {
    /// Playback started or resumed
    Resume,

    /// Playback paused
    Pause,

    /// Play head moved
    Progress { time: f64 },

    /// Media is ready; metadata has been merged into the descriptor
    Ready { video: VideoDescriptor },

    /// Seek completed
    Seek { time: f64 },

    /// Surface buffered more data
    Buffer { edge: Option<f64> },

    /// Playback reached the end
    Finish,

    /// Volume changed
    Volume { level: f64 },

    /// Playback rate changed
    Speed { rate: f64 },

    /// Engine unloaded
    Unload,

    /// Streaming session fault (only when enabled in the configuration)
    Error { error: SessionError },
}

impl HostEvent {
    /// Host-side event name
    pub fn name(&self) -> &'static str {
        match self {
            HostEvent::Resume => "resume",
            HostEvent::Pause => "pause",
            HostEvent::Progress { .. } => "progress",
            HostEvent::Ready { .. } => "ready",
            HostEvent::Seek { .. } => "seek",
            HostEvent::Buffer { .. } => "buffer",
            HostEvent::Finish => "finish",
            HostEvent::Volume { .. } => "volume",
            HostEvent::Speed { .. } => "speed",
            HostEvent::Unload => "unload",
            HostEvent::Error { .. } => "error",
        }
    }
}

/// Receiver of translated events
pub trait HostEventSink: Send {
    fn trigger(&mut self, event: HostEvent);
}

/// Host event with delivery metadata
#[derive(Debug, Clone, Serialize)]
pub struct HostEventRecord {
    /// Sequence number
    pub sequence: u64,
    /// Timestamp
    pub timestamp: DateTime<Utc>,
    /// The event
    #[serde(flatten)]
    pub event: HostEvent,
}

/// Sink forwarding events over a tokio channel
pub struct ChannelSink {
    sequence: u64,
    tx: mpsc::UnboundedSender<HostEventRecord>,
}

impl ChannelSink {
    /// Create a sink and the receiver the host reads from
    pub fn new() -> (Self, mpsc::UnboundedReceiver<HostEventRecord>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { sequence: 0, tx }, rx)
    }
}

impl HostEventSink for ChannelSink {
    fn trigger(&mut self, event: HostEvent) {
        self.sequence += 1;
        let record = HostEventRecord {
            sequence: self.sequence,
            timestamp: Utc::now(),
            event,
        };
        if self.tx.send(record).is_err() {
            debug!(sequence = self.sequence, "Host event receiver dropped");
        }
    }
}

/// Sink keeping every event in memory
///
/// Clones share the same event log.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    events: Arc<Mutex<Vec<HostEvent>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the recorded events
    pub fn events(&self) -> Vec<HostEvent> {
        self.lock().clone()
    }

    /// Names of the recorded events, in order
    pub fn names(&self) -> Vec<&'static str> {
        self.lock().iter().map(HostEvent::name).collect()
    }

    /// Number of recorded events called `name`
    pub fn count(&self, name: &str) -> usize {
        self.lock().iter().filter(|e| e.name() == name).count()
    }

    /// Remove and return the recorded events
    pub fn take(&self) -> Vec<HostEvent> {
        std::mem::take(&mut *self.lock())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<HostEvent>> {
        // A poisoned log is still a valid log.
        self.events.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl HostEventSink for RecordingSink {
    fn trigger(&mut self, event: HostEvent) {
        self.lock().push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serialization() {
        let json = serde_json::to_value(HostEvent::Progress { time: 4.5 }).unwrap();
        assert_eq!(json["event"], "progress");
        assert_eq!(json["time"], 4.5);

        let json = serde_json::to_value(HostEvent::Unload).unwrap();
        assert_eq!(json["event"], "unload");
    }

    #[test]
    fn test_recording_sink_shares_log() {
        let sink = RecordingSink::new();
        let mut writer = sink.clone();
        writer.trigger(HostEvent::Pause);
        writer.trigger(HostEvent::Finish);

        assert_eq!(sink.names(), vec!["pause", "finish"]);
        assert_eq!(sink.count("pause"), 1);
        assert_eq!(sink.take().len(), 2);
        assert!(sink.events().is_empty());
    }

    #[tokio::test]
    async fn test_channel_sink_sequences() {
        let (mut sink, mut rx) = ChannelSink::new();
        sink.trigger(HostEvent::Resume);
        sink.trigger(HostEvent::Speed { rate: 2.0 });

        let first = rx.recv().await.unwrap();
        let second = rx.recv().await.unwrap();
        assert_eq!(first.sequence, 1);
        assert_eq!(second.sequence, 2);
        assert_eq!(second.event.name(), "speed");
    }

    #[test]
    fn test_channel_sink_survives_dropped_receiver() {
        let (mut sink, rx) = ChannelSink::new();
        drop(rx);
        sink.trigger(HostEvent::Finish);
    }
}
