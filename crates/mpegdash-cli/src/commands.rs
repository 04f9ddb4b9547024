//! CLI command implementations

use crate::{
    output::{format_output, format_records},
    scenario::{Scenario, Step},
};
use anyhow::Context;
use mpegdash_engine::{
    pick_source,
    sim::{SimEngine, SimRegion},
    ChannelSink, DashEngine, DashOptions, EngineConfig, EngineDriver, EngineHandle, HostCommand,
    HostEventRecord, SessionError, SourceDescriptor, StreamingSession, VideoDescriptor,
};
use serde::Serialize;
use std::path::Path;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};
use tracing::{info, warn};

#[derive(Serialize)]
struct PickResult<'a> {
    picked: Option<&'a SourceDescriptor>,
}

impl std::fmt::Display for PickResult<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.picked {
            Some(source) => write!(f, "{} ({})", source.src, source.mime_type),
            None => write!(f, "no match"),
        }
    }
}

#[derive(Serialize)]
struct CanPlayResult<'a> {
    mime_type: &'a str,
    can_play: bool,
}

impl std::fmt::Display for CanPlayResult<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let verdict = if self.can_play { "yes" } else { "no" };
        write!(f, "{}: {}", self.mime_type, verdict)
    }
}

/// Print the source the engine would pick
pub fn pick(sources: &[SourceDescriptor], format: &str) -> anyhow::Result<()> {
    let result = PickResult {
        picked: pick_source(sources),
    };
    println!("{}", format_output(&result, format));
    Ok(())
}

/// Print whether a content type is handled
pub fn can_play(mime_type: &str, format: &str) -> anyhow::Result<()> {
    let result = CanPlayResult {
        mime_type,
        can_play: DashEngine::can_play(mime_type),
    };
    println!("{}", format_output(&result, format));
    Ok(())
}

/// Replay a scenario and print the host events it produced
pub async fn replay(
    path: &Path,
    config_path: Option<&Path>,
    autoplay: bool,
    format: &str,
) -> anyhow::Result<()> {
    let scenario = Scenario::from_file(path)?;
    let config = replay_config(&scenario, config_path, autoplay)?;
    let outcome = run_scenario(scenario.steps, config).await?;

    println!("{}", format_records(&outcome.records, format));
    info!(
        events = outcome.records.len(),
        ready = outcome.ready,
        surfaces = outcome.surfaces,
        sessions = outcome.sessions,
        post_load_callbacks = outcome.post_load_callbacks,
        "Scenario finished"
    );
    Ok(())
}

/// What a replayed scenario left behind
#[derive(Debug)]
pub struct ReplayOutcome {
    pub records: Vec<HostEventRecord>,
    pub ready: bool,
    pub surfaces: usize,
    pub sessions: usize,
    pub post_load_callbacks: usize,
}

impl ReplayOutcome {
    /// Host event names in delivery order
    pub fn event_names(&self) -> Vec<&'static str> {
        self.records.iter().map(|r| r.event.name()).collect()
    }
}

/// Engine configuration for a replay
///
/// A config file replaces the scenario's own; `autoplay` forces autoplay on.
fn replay_config(
    scenario: &Scenario,
    config_path: Option<&Path>,
    autoplay: bool,
) -> anyhow::Result<EngineConfig> {
    let mut config = match config_path {
        Some(config_path) => EngineConfig::from_file(config_path)
            .with_context(|| format!("loading config {}", config_path.display()))?,
        None => scenario.config.clone().unwrap_or_default(),
    };
    if autoplay {
        config.autoplay = true;
    }
    Ok(config)
}

/// Drive the simulated backend through `steps`, one flushed step at a time
pub async fn run_scenario(
    steps: Vec<Step>,
    config: EngineConfig,
) -> anyhow::Result<ReplayOutcome> {
    info!(steps = steps.len(), autoplay = config.autoplay, "Replaying scenario");

    let region = SimRegion::new();
    let streaming = SimEngine::new();
    let (sink, mut events) = ChannelSink::new();
    let engine = DashEngine::new(config, region.clone(), streaming.clone(), sink);
    let (driver, handle) = EngineDriver::new(engine);
    let task = tokio::spawn(driver.run());

    let callbacks = Arc::new(AtomicUsize::new(0));
    for (index, step) in steps.into_iter().enumerate() {
        apply_step(step, &handle, &region, &streaming, &callbacks)
            .with_context(|| format!("step {}", index + 1))?;
        handle.flush().await?;
    }

    handle.shutdown()?;
    let engine = task.await.context("engine driver panicked")?;

    let mut records = Vec::new();
    while let Ok(record) = events.try_recv() {
        records.push(record);
    }

    Ok(ReplayOutcome {
        records,
        ready: engine.is_ready(),
        surfaces: region.surface_count(),
        sessions: streaming.sessions().len(),
        post_load_callbacks: callbacks.load(Ordering::SeqCst),
    })
}

fn apply_step(
    step: Step,
    handle: &EngineHandle,
    region: &SimRegion,
    streaming: &SimEngine,
    callbacks: &Arc<AtomicUsize>,
) -> anyhow::Result<()> {
    let command = match step {
        Step::Load { src, on_load } => {
            let mut options = DashOptions::default();
            if on_load {
                let counter = Arc::clone(callbacks);
                options.on_load = Some(Arc::new(move |_session: &mut dyn StreamingSession| {
                    counter.fetch_add(1, Ordering::SeqCst);
                    info!("Post-load callback ran");
                }));
            }
            HostCommand::Load(VideoDescriptor::new(src).with_options(options))
        }
        Step::Play => HostCommand::Play,
        Step::Resume => HostCommand::Resume,
        Step::Pause => HostCommand::Pause,
        Step::Seek { time } => HostCommand::Seek(time),
        Step::Volume { level } => HostCommand::Volume(level),
        Step::Speed { rate } => HostCommand::Speed(rate),
        Step::Unload => HostCommand::Unload,
        Step::BeforeSeek => HostCommand::BeforeSeek,
        Step::Autoplay { enabled } => HostCommand::SetAutoplay(enabled),
        Step::Native { event } => {
            match region.front() {
                Some(surface) => handle.surface_event(surface.snapshot().id, event)?,
                None => warn!(%event, "No surface to fire native event on"),
            }
            return Ok(());
        }
        Step::Surface(patch) => {
            match region.front() {
                Some(surface) => patch.apply(&surface),
                None => warn!("No surface to update"),
            }
            return Ok(());
        }
        Step::CompleteLoad => {
            match streaming.last_session().and_then(|s| s.ticket) {
                Some(ticket) => handle.load_completed(ticket)?,
                None => warn!("No load to complete"),
            }
            return Ok(());
        }
        Step::SessionError { code, message, fatal } => {
            let mut error = SessionError::new(code, message);
            error.fatal = fatal;
            handle.session_error(error)?;
            return Ok(());
        }
    };

    handle.command(command)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mpegdash_engine::HostEvent;

    fn shipped_scenario() -> Scenario {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("scenarios/seek_autoplay.json");
        Scenario::from_file(&path).unwrap()
    }

    #[tokio::test]
    async fn test_replay_seek_autoplay_scenario() {
        let scenario = shipped_scenario();
        let config = replay_config(&scenario, None, false).unwrap();
        assert!(config.autoplay);

        let outcome = run_scenario(scenario.steps, config).await.unwrap();

        assert_eq!(
            outcome.event_names(),
            vec!["ready", "resume", "pause", "seek", "buffer", "speed", "unload"]
        );
        // The play after the announced seek was swallowed.
        let seek_at = outcome.event_names().iter().position(|n| *n == "seek").unwrap();
        assert!(!outcome.event_names()[seek_at..].contains(&"resume"));

        let sequences: Vec<u64> = outcome.records.iter().map(|r| r.sequence).collect();
        assert!(sequences.windows(2).all(|w| w[0] < w[1]));

        assert!(matches!(
            outcome.records[4].event,
            HostEvent::Buffer { edge: Some(edge) } if edge == 140.0
        ));
        assert_eq!(outcome.post_load_callbacks, 1);
        assert_eq!(outcome.sessions, 1);
        assert_eq!(outcome.surfaces, 0);
        assert!(!outcome.ready);
    }

    #[tokio::test]
    async fn test_replay_without_autoplay_reports_resume() {
        let mut scenario = shipped_scenario();
        scenario.config = None;
        let config = replay_config(&scenario, None, false).unwrap();
        assert!(!config.autoplay);

        let outcome = run_scenario(scenario.steps, config).await.unwrap();
        let names = outcome.event_names();
        assert_eq!(names.iter().filter(|n| **n == "resume").count(), 2);
    }

    #[test]
    fn test_autoplay_flag_overrides_scenario_config() {
        let mut scenario = shipped_scenario();
        scenario.config = Some(EngineConfig::default());
        assert!(replay_config(&scenario, None, true).unwrap().autoplay);
        assert!(!replay_config(&scenario, None, false).unwrap().autoplay);
    }

    #[tokio::test]
    async fn test_steps_without_surface_are_skipped() {
        let steps = Scenario::from_json(
            r#"{"steps": [
                {"op": "native", "event": "play"},
                {"op": "surface", "paused": false},
                {"op": "complete_load"},
                {"op": "unload"}
            ]}"#,
        )
        .unwrap()
        .steps;

        let outcome = run_scenario(steps, EngineConfig::default()).await.unwrap();
        assert_eq!(outcome.event_names(), vec!["unload"]);
        assert_eq!(outcome.sessions, 0);
    }

    #[tokio::test]
    async fn test_autoplay_step_arms_suppression() {
        let steps = Scenario::from_json(
            r#"{"steps": [
                {"op": "autoplay", "enabled": true},
                {"op": "load", "src": "/vod/manifest.mpd"},
                {"op": "surface", "paused": true},
                {"op": "before_seek"},
                {"op": "seek", "time": 30},
                {"op": "native", "event": "play"},
                {"op": "native", "event": "seeked"}
            ]}"#,
        )
        .unwrap()
        .steps;

        let outcome = run_scenario(steps, EngineConfig::default()).await.unwrap();
        assert_eq!(outcome.event_names(), vec!["seek"]);
        assert_eq!(outcome.surfaces, 1);
    }
}
