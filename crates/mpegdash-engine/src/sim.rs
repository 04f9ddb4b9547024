//! In-memory playback backend
//!
//! Implements the surface, region and streaming engine seams without a
//! decoder or network. State is shared behind `Arc<Mutex<..>>`: the adapter
//! owns one clone, the host or test keeps another to inspect it and to change
//! what the surface reports before firing native events.

use crate::{
    driver::EngineHandle,
    session::{DashSource, StreamingEngine, StreamingSession},
    surface::{PlaybackSurface, PlayerRegion},
    types::{LoadTicket, SurfaceId, TimeRanges},
};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

/// Observable state of a simulated surface
#[derive(Debug, Clone)]
pub struct SimSurfaceState {
    pub id: SurfaceId,
    pub class_name: String,
    pub paused: bool,
    pub current_time: f64,
    pub duration: f64,
    pub buffered: TimeRanges,
    pub seekable: TimeRanges,
    pub volume: f64,
    pub playback_rate: f64,
    pub width: u32,
    pub height: u32,
    pub current_src: Option<String>,
    pub play_calls: usize,
    pub pause_calls: usize,
}

impl SimSurfaceState {
    fn new(class_name: &str) -> Self {
        Self {
            id: SurfaceId::new(),
            class_name: class_name.to_string(),
            paused: true,
            current_time: 0.0,
            duration: f64::NAN,
            buffered: TimeRanges::new(),
            seekable: TimeRanges::new(),
            volume: 1.0,
            playback_rate: 1.0,
            width: 0,
            height: 0,
            current_src: None,
            play_calls: 0,
            pause_calls: 0,
        }
    }
}

/// Simulated playback surface
#[derive(Debug, Clone)]
pub struct SimSurface {
    state: Arc<Mutex<SimSurfaceState>>,
}

impl SimSurface {
    pub fn new(class_name: &str) -> Self {
        Self {
            state: Arc::new(Mutex::new(SimSurfaceState::new(class_name))),
        }
    }

    /// Copy of the current state
    pub fn snapshot(&self) -> SimSurfaceState {
        lock(&self.state).clone()
    }

    /// Change what the surface reports
    pub fn update(&self, f: impl FnOnce(&mut SimSurfaceState)) {
        f(&mut lock(&self.state));
    }

    /// Report media metadata as a decoder would after the first frames
    pub fn set_media(&self, duration: f64, width: u32, height: u32, src: &str) {
        self.update(|s| {
            s.duration = duration;
            s.width = width;
            s.height = height;
            s.current_src = Some(src.to_string());
            s.seekable = TimeRanges::from(vec![(0.0, duration)]);
        });
    }
}

impl PlaybackSurface for SimSurface {
    fn id(&self) -> SurfaceId {
        lock(&self.state).id
    }

    fn play(&mut self) {
        self.update(|s| {
            s.paused = false;
            s.play_calls += 1;
        });
    }

    fn pause(&mut self) {
        self.update(|s| {
            s.paused = true;
            s.pause_calls += 1;
        });
    }

    fn paused(&self) -> bool {
        lock(&self.state).paused
    }

    fn current_time(&self) -> f64 {
        lock(&self.state).current_time
    }

    fn set_current_time(&mut self, time: f64) {
        self.update(|s| s.current_time = time);
    }

    fn duration(&self) -> f64 {
        lock(&self.state).duration
    }

    fn buffered(&self) -> TimeRanges {
        lock(&self.state).buffered.clone()
    }

    fn seekable(&self) -> TimeRanges {
        lock(&self.state).seekable.clone()
    }

    fn volume(&self) -> f64 {
        lock(&self.state).volume
    }

    fn set_volume(&mut self, level: f64) {
        self.update(|s| s.volume = level);
    }

    fn set_playback_rate(&mut self, rate: f64) {
        self.update(|s| s.playback_rate = rate);
    }

    fn video_width(&self) -> u32 {
        lock(&self.state).width
    }

    fn video_height(&self) -> u32 {
        lock(&self.state).height
    }

    fn current_src(&self) -> Option<String> {
        lock(&self.state).current_src.clone()
    }
}

#[derive(Debug, Default)]
struct RegionState {
    /// Attached surfaces, first is the front of the region
    attached: Vec<SimSurface>,
    created: usize,
    removed: usize,
}

/// Simulated player region
#[derive(Debug, Clone, Default)]
pub struct SimRegion {
    state: Arc<Mutex<RegionState>>,
}

impl SimRegion {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of surfaces currently attached
    pub fn surface_count(&self) -> usize {
        lock(&self.state).attached.len()
    }

    /// Surface at the front of the region
    pub fn front(&self) -> Option<SimSurface> {
        lock(&self.state).attached.first().cloned()
    }

    /// Attached surface by id
    pub fn surface(&self, id: SurfaceId) -> Option<SimSurface> {
        lock(&self.state)
            .attached
            .iter()
            .find(|s| s.id() == id)
            .cloned()
    }

    /// Attach a surface that was not created through the region
    pub fn attach_foreign(&self, class_name: &str) -> SimSurface {
        let surface = SimSurface::new(class_name);
        lock(&self.state).attached.push(surface.clone());
        surface
    }

    /// Surfaces created so far
    pub fn created(&self) -> usize {
        lock(&self.state).created
    }

    /// Surfaces removed so far
    pub fn removed(&self) -> usize {
        lock(&self.state).removed
    }
}

impl PlayerRegion for SimRegion {
    fn attached_surface(&self) -> Option<SurfaceId> {
        lock(&self.state).attached.first().map(|s| s.id())
    }

    fn remove_surface(&mut self, id: SurfaceId) -> bool {
        let mut state = lock(&self.state);
        let before = state.attached.len();
        state.attached.retain(|s| s.id() != id);
        let removed = state.attached.len() != before;
        if removed {
            state.removed += 1;
        }
        removed
    }

    fn create_surface(&mut self, class_name: &str) -> Box<dyn PlaybackSurface> {
        let surface = SimSurface::new(class_name);
        let mut state = lock(&self.state);
        state.attached.insert(0, surface.clone());
        state.created += 1;
        Box::new(surface)
    }
}

/// What one simulated session was asked to do
#[derive(Debug, Clone)]
pub struct SimSessionRecord {
    pub surface: SurfaceId,
    pub manifest_url: Option<String>,
    pub ticket: Option<LoadTicket>,
    pub custom_estimator: bool,
    pub content_protection: bool,
    pub unload_calls: usize,
}

#[derive(Debug, Default)]
struct EngineState {
    sessions: Vec<SimSessionRecord>,
    handle: Option<EngineHandle>,
}

/// Simulated streaming engine
///
/// With a driver handle attached, every load completes on its own: the
/// session queues `LoadCompleted` right after the load is issued.
#[derive(Debug, Clone, Default)]
pub struct SimEngine {
    state: Arc<Mutex<EngineState>>,
}

impl SimEngine {
    pub const NAME: &'static str = "sim";
    pub const VERSION: &'static str = "1.0.0";

    pub fn new() -> Self {
        Self::default()
    }

    /// Complete loads automatically through `handle`
    pub fn attach(&self, handle: EngineHandle) {
        lock(&self.state).handle = Some(handle);
    }

    /// Records of every session created so far
    pub fn sessions(&self) -> Vec<SimSessionRecord> {
        lock(&self.state).sessions.clone()
    }

    /// Record of the latest session
    pub fn last_session(&self) -> Option<SimSessionRecord> {
        lock(&self.state).sessions.last().cloned()
    }
}

impl StreamingEngine for SimEngine {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn version(&self) -> &str {
        Self::VERSION
    }

    fn create_session(&mut self, surface: SurfaceId) -> Box<dyn StreamingSession> {
        let mut state = lock(&self.state);
        state.sessions.push(SimSessionRecord {
            surface,
            manifest_url: None,
            ticket: None,
            custom_estimator: false,
            content_protection: false,
            unload_calls: 0,
        });
        Box::new(SimSession {
            index: state.sessions.len() - 1,
            engine: Arc::clone(&self.state),
        })
    }
}

/// Simulated streaming session
pub struct SimSession {
    index: usize,
    engine: Arc<Mutex<EngineState>>,
}

impl StreamingSession for SimSession {
    fn load(&mut self, source: DashSource, ticket: LoadTicket) {
        let mut state = lock(&self.engine);
        let record = &mut state.sessions[self.index];
        record.manifest_url = Some(source.manifest_url);
        record.ticket = Some(ticket);
        record.custom_estimator = source.bandwidth_estimator.is_some();
        record.content_protection = source.content_protection.is_some();

        if let Some(handle) = &state.handle {
            if handle.load_completed(ticket).is_err() {
                debug!(%ticket, "Driver gone before load completion");
            }
        }
    }

    fn unload(&mut self) {
        lock(&self.engine).sessions[self.index].unload_calls += 1;
    }
}
