//! Replay scenarios
//!
//! A scenario is a JSON list of steps mixing host commands, native surface
//! events, surface state changes and streaming session notifications.

use anyhow::Context;
use mpegdash_engine::{sim::SimSurface, EngineConfig, SurfaceEvent, TimeRanges};
use serde::Deserialize;
use std::path::Path;

/// Scripted run of the engine adapter
#[derive(Debug, Deserialize)]
pub struct Scenario {
    /// Engine configuration, defaults when absent
    #[serde(default)]
    pub config: Option<EngineConfig>,
    pub steps: Vec<Step>,
}

impl Scenario {
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading scenario {}", path.display()))?;
        Self::from_json(&content).with_context(|| format!("parsing scenario {}", path.display()))
    }
}

/// One scenario step
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    /// Host loads a video
    Load {
        src: String,
        /// Register a post-load callback
        #[serde(default)]
        on_load: bool,
    },
    Play,
    Resume,
    Pause,
    Seek { time: f64 },
    Volume { level: f64 },
    Speed { rate: f64 },
    Unload,
    /// Host announces a seek
    BeforeSeek,
    /// Host autoplay flag changes
    Autoplay { enabled: bool },
    /// Current surface fires a native event
    Native { event: SurfaceEvent },
    /// Change what the current surface reports
    Surface(SurfacePatch),
    /// Latest streaming session finishes loading
    CompleteLoad,
    /// Streaming session reports a fault
    SessionError {
        code: String,
        message: String,
        #[serde(default)]
        fatal: bool,
    },
}

/// Partial update of a simulated surface
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SurfacePatch {
    pub current_time: Option<f64>,
    pub duration: Option<f64>,
    pub buffered: Option<TimeRanges>,
    pub seekable: Option<TimeRanges>,
    pub paused: Option<bool>,
    pub volume: Option<f64>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub src: Option<String>,
}

impl SurfacePatch {
    pub fn apply(&self, surface: &SimSurface) {
        surface.update(|s| {
            if let Some(time) = self.current_time {
                s.current_time = time;
            }
            if let Some(duration) = self.duration {
                s.duration = duration;
            }
            if let Some(buffered) = &self.buffered {
                s.buffered = buffered.clone();
            }
            if let Some(seekable) = &self.seekable {
                s.seekable = seekable.clone();
            }
            if let Some(paused) = self.paused {
                s.paused = paused;
            }
            if let Some(volume) = self.volume {
                s.volume = volume;
            }
            if let Some(width) = self.width {
                s.width = width;
            }
            if let Some(height) = self.height {
                s.height = height;
            }
            if let Some(src) = &self.src {
                s.current_src = Some(src.clone());
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_steps() {
        let scenario = Scenario::from_json(
            r#"{
                "config": {"autoplay": true},
                "steps": [
                    {"op": "load", "src": "https://cdn.example.com/a.mpd", "on_load": true},
                    {"op": "surface", "current_time": 10, "buffered": [{"start": 0, "end": 5}]},
                    {"op": "native", "event": "progress"},
                    {"op": "before_seek"},
                    {"op": "session_error", "code": "1001", "message": "boom"}
                ]
            }"#,
        )
        .unwrap();

        assert!(scenario.config.unwrap().autoplay);
        assert_eq!(scenario.steps.len(), 5);
        assert!(matches!(scenario.steps[0], Step::Load { on_load: true, .. }));
        assert!(matches!(
            scenario.steps[2],
            Step::Native { event: SurfaceEvent::Progress }
        ));
    }

    #[test]
    fn test_patch_applies_only_given_fields() {
        let surface = SimSurface::new("fp-engine");
        let patch = SurfacePatch {
            current_time: Some(12.0),
            paused: Some(false),
            ..Default::default()
        };
        patch.apply(&surface);

        let state = surface.snapshot();
        assert_eq!(state.current_time, 12.0);
        assert!(!state.paused);
        assert_eq!(state.volume, 1.0);
    }
}
