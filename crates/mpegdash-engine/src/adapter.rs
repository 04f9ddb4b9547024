//! MPEG-DASH engine adapter
//!
//! Reconciles two independently evented subsystems:
//! - the playback surface, firing native media events
//! - the streaming session, loading the manifest and reporting faults
//!
//! into the single event stream the host expects from any engine. Control
//! commands go to the surface, except load/unload which also drive the session.

use crate::{
    buffer::buffered_edge,
    config::EngineConfig,
    engine::PlayerEngine,
    host::{HostEvent, HostEventSink},
    session::{DashSource, PostLoadCallback, StreamingEngine, StreamingSession},
    suppression::ResumeSuppression,
    surface::{PlaybackSurface, PlayerRegion},
    types::*,
    Error, Result,
};
use tracing::{debug, error, info, instrument, trace, warn};

/// Returns true if the content type is handled by this engine
pub fn can_play(mime_type: &str) -> bool {
    mime_type == DASH_MIME_TYPE
}

/// First MPEG-DASH source in host order
pub fn pick_source(sources: &[SourceDescriptor]) -> Option<&SourceDescriptor> {
    sources.iter().find(|source| can_play(&source.mime_type))
}

/// Engine adapter owning one playback surface and one streaming session
pub struct DashEngine {
    /// Host configuration
    config: EngineConfig,
    /// Host player region that holds the surface
    region: Box<dyn PlayerRegion>,
    /// External streaming engine
    streaming: Box<dyn StreamingEngine>,
    /// Host event receiver
    host: Box<dyn HostEventSink>,
    /// Current surface
    surface: Option<Box<dyn PlaybackSurface>>,
    /// Session bound to the current surface
    session: Option<Box<dyn StreamingSession>>,
    /// Video of the current load cycle
    video: VideoDescriptor,
    /// Surface reported loaded data in this cycle
    ready: bool,
    /// Auto-resume suppression state
    suppression: ResumeSuppression,
    /// Ticket of the latest load
    ticket: LoadTicket,
    /// Post-load callback waiting for its load to complete
    pending_on_load: Option<(LoadTicket, PostLoadCallback)>,
}

impl DashEngine {
    /// Create an adapter
    pub fn new(
        config: EngineConfig,
        region: impl PlayerRegion + 'static,
        streaming: impl StreamingEngine + 'static,
        host: impl HostEventSink + 'static,
    ) -> Self {
        Self {
            config,
            region: Box::new(region),
            streaming: Box::new(streaming),
            host: Box::new(host),
            surface: None,
            session: None,
            video: VideoDescriptor::default(),
            ready: false,
            suppression: ResumeSuppression::default(),
            ticket: LoadTicket(0),
            pending_on_load: None,
        }
    }

    /// Returns true if the content type is handled by this engine
    pub fn can_play(mime_type: &str) -> bool {
        can_play(mime_type)
    }

    /// Get configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Mutable configuration, read again by every load and seek announcement
    pub fn config_mut(&mut self) -> &mut EngineConfig {
        &mut self.config
    }

    /// Video of the current load cycle, including merged media metadata
    pub fn video(&self) -> &VideoDescriptor {
        &self.video
    }

    /// Surface reported loaded data in the current load cycle
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Current resume suppression state
    pub fn suppression(&self) -> ResumeSuppression {
        self.suppression
    }

    /// Id of the surface the adapter currently drives
    pub fn surface_id(&self) -> Option<SurfaceId> {
        self.surface.as_ref().map(|s| s.id())
    }

    /// Ticket of the latest load
    pub fn current_ticket(&self) -> LoadTicket {
        self.ticket
    }

    /// Translate a native surface event into host events
    ///
    /// Events from a surface other than the current one are dropped.
    pub fn handle_surface_event(&mut self, surface_id: SurfaceId, event: SurfaceEvent) {
        let Some(surface) = self.surface.as_mut() else {
            debug!(%surface_id, %event, "Surface event without a surface");
            return;
        };
        if surface.id() != surface_id {
            debug!(%surface_id, %event, "Surface event from a discarded surface");
            return;
        }

        match event {
            SurfaceEvent::Play => {
                if self.suppression.on_play() {
                    surface.pause();
                    debug!("Suppressed resume after seek");
                } else {
                    self.host.trigger(HostEvent::Resume);
                }
            }
            SurfaceEvent::Pause => self.host.trigger(HostEvent::Pause),
            SurfaceEvent::TimeUpdate => self.host.trigger(HostEvent::Progress {
                time: surface.current_time(),
            }),
            SurfaceEvent::LoadedData => {
                if self.ready {
                    debug!("Repeated loadeddata in the same load cycle");
                    return;
                }

                let duration = surface.duration();
                self.video.duration = (!duration.is_nan()).then_some(duration);
                self.video.seekable = surface.seekable().end(0).ok();
                self.video.width = Some(surface.video_width());
                self.video.height = Some(surface.video_height());
                self.video.url = surface.current_src();
                self.ready = true;

                info!(
                    duration = ?self.video.duration,
                    width = surface.video_width(),
                    height = surface.video_height(),
                    "Media ready"
                );
                self.host.trigger(HostEvent::Ready {
                    video: self.video.clone(),
                });
            }
            SurfaceEvent::Seeked => self.host.trigger(HostEvent::Seek {
                time: surface.current_time(),
            }),
            SurfaceEvent::Progress => {
                match buffered_edge(&surface.buffered(), surface.current_time()) {
                    Ok(edge) => self.video.buffer = Some(edge),
                    Err(err) => trace!(error = %err, "Buffered edge unavailable"),
                }
                self.host.trigger(HostEvent::Buffer {
                    edge: self.video.buffer,
                });
            }
            SurfaceEvent::Ended => self.host.trigger(HostEvent::Finish),
            SurfaceEvent::VolumeChange => self.host.trigger(HostEvent::Volume {
                level: surface.volume(),
            }),
        }
    }

    /// Handle a notification from the streaming session
    pub fn handle_session_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::LoadCompleted { ticket } => {
                if ticket != self.ticket {
                    debug!(%ticket, current = %self.ticket, "Ignoring superseded load completion");
                    return;
                }
                info!(%ticket, "Manifest loaded");

                let on_load = match self.pending_on_load.take() {
                    Some((pending, on_load)) if pending == ticket => on_load,
                    other => {
                        self.pending_on_load = other;
                        return;
                    }
                };
                match self.session.as_mut() {
                    Some(session) => on_load(session.as_mut()),
                    None => debug!(%ticket, "Session gone before post-load callback"),
                }
            }
            SessionEvent::LoadFailed { ticket, error } => {
                if ticket != self.ticket {
                    debug!(%ticket, current = %self.ticket, "Ignoring superseded load failure");
                    return;
                }
                self.pending_on_load = None;
                self.report_session_error(error);
            }
            SessionEvent::Error { error } => self.report_session_error(error),
        }
    }

    fn report_session_error(&mut self, error: SessionError) {
        error!(
            code = %error.code,
            fatal = error.fatal,
            message = %error.message,
            "Streaming session error"
        );
        if self.config.report_session_errors {
            self.host.trigger(HostEvent::Error { error });
        }
    }

    /// Manifest location handed to the streaming session
    fn resolve_source(&self, src: &str) -> Result<String> {
        if src.trim().is_empty() {
            return Err(Error::EmptySource);
        }
        match &self.config.base_url {
            Some(base) => base
                .join(src)
                .map(String::from)
                .map_err(|source| Error::InvalidSource {
                    src: src.to_string(),
                    source,
                }),
            None => Ok(src.to_string()),
        }
    }

    /// Remove every surface attached to the region, ours or not
    fn discard_surfaces(&mut self) {
        if let Some(surface) = self.surface.take() {
            self.region.remove_surface(surface.id());
        }
        while let Some(id) = self.region.attached_surface() {
            if !self.region.remove_surface(id) {
                warn!(surface = %id, "Region refused to remove surface");
                break;
            }
        }
    }

    fn surface_mut(&mut self, op: &'static str) -> Option<&mut Box<dyn PlaybackSurface>> {
        if self.surface.is_none() {
            debug!(op, "No surface");
        }
        self.surface.as_mut()
    }
}

impl PlayerEngine for DashEngine {
    fn engine_name(&self) -> String {
        format!(
            "mpegdash-{}-{}",
            self.streaming.name(),
            self.streaming.version()
        )
    }

    fn pick<'a>(&self, sources: &'a [SourceDescriptor]) -> Option<&'a SourceDescriptor> {
        pick_source(sources)
    }

    #[instrument(skip(self, video), fields(src = %video.src))]
    fn load(&mut self, video: VideoDescriptor) -> Result<()> {
        let manifest_url = self.resolve_source(&video.src)?;

        self.discard_surfaces();
        if let Some(mut previous) = self.session.take() {
            previous.unload();
        }

        let mut surface = self.region.create_surface(&self.config.surface_class);
        let mut session = self.streaming.create_session(surface.id());

        let ticket = self.ticket.next();
        self.ticket = ticket;
        self.ready = false;
        self.suppression = ResumeSuppression::Idle;
        self.pending_on_load = video.dash.on_load.clone().map(|cb| (ticket, cb));

        let source = DashSource {
            manifest_url,
            content_protection: video.dash.content_protection.clone(),
            bandwidth_estimator: video.dash.bandwidth_estimator.clone(),
        };
        info!(
            surface = %surface.id(),
            %ticket,
            manifest = %source.manifest_url,
            custom_estimator = source.bandwidth_estimator.is_some(),
            "Loading manifest"
        );
        session.load(source, ticket);

        // Native autoplay is unreliable for this surface type on some platforms.
        if self.config.autoplay {
            surface.play();
        }

        self.video = video;
        self.surface = Some(surface);
        self.session = Some(session);
        Ok(())
    }

    fn play(&mut self) {
        if let Some(surface) = self.surface_mut("play") {
            surface.play();
        }
    }

    fn resume(&mut self) {
        if let Some(surface) = self.surface_mut("resume") {
            surface.play();
        }
    }

    fn pause(&mut self) {
        if let Some(surface) = self.surface_mut("pause") {
            surface.pause();
        }
    }

    fn seek(&mut self, time: f64) {
        if let Some(surface) = self.surface_mut("seek") {
            surface.set_current_time(time);
        }
    }

    fn volume(&mut self, level: f64) {
        if let Some(surface) = self.surface_mut("volume") {
            surface.set_volume(level);
        }
    }

    fn speed(&mut self, rate: f64) {
        let Some(surface) = self.surface_mut("speed") else {
            return;
        };
        surface.set_playback_rate(rate);
        self.host.trigger(HostEvent::Speed { rate });
    }

    fn unload(&mut self) {
        if self.ready {
            if let Some(mut session) = self.session.take() {
                session.unload();
            }
            if let Some(surface) = self.surface.take() {
                self.region.remove_surface(surface.id());
            }
            self.ready = false;
            self.suppression = ResumeSuppression::Idle;
            self.pending_on_load = None;
            info!(ticket = %self.ticket, "Engine unloaded");
        } else {
            debug!(ticket = %self.ticket, "Unload before ready, nothing to tear down");
        }

        self.host.trigger(HostEvent::Unload);
    }

    fn set_autoplay(&mut self, autoplay: bool) {
        debug!(autoplay, "Host autoplay changed");
        self.config.autoplay = autoplay;
    }

    fn before_seek(&mut self) {
        let paused = self.surface.as_ref().is_some_and(|s| s.paused());
        self.suppression.before_seek(self.config.autoplay, paused);
        trace!(state = %self.suppression, "Seek announced");
    }
}

impl std::fmt::Debug for DashEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DashEngine")
            .field("config", &self.config)
            .field("surface", &self.surface_id())
            .field("ready", &self.ready)
            .field("suppression", &self.suppression)
            .field("ticket", &self.ticket)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_can_play_exact_match() {
        assert!(can_play("application/dash+xml"));
        assert!(!can_play("application/x-mpegurl"));
        assert!(!can_play("APPLICATION/DASH+XML"));
        assert!(!can_play("application/dash+xml; codecs=avc1"));
    }

    #[test]
    fn test_pick_first_match_wins() {
        let sources = vec![
            SourceDescriptor::new("video/mp4", "https://example.com/a.mp4"),
            SourceDescriptor::new(DASH_MIME_TYPE, "https://example.com/first.mpd"),
            SourceDescriptor::new(DASH_MIME_TYPE, "https://example.com/second.mpd"),
        ];
        let picked = pick_source(&sources).unwrap();
        assert_eq!(picked.src, "https://example.com/first.mpd");
    }

    fn engine(config: EngineConfig) -> DashEngine {
        DashEngine::new(
            config,
            crate::sim::SimRegion::new(),
            crate::sim::SimEngine::new(),
            crate::host::RecordingSink::new(),
        )
    }

    #[test]
    fn test_resolve_source_without_base_passes_through() {
        let engine = engine(EngineConfig::default());
        assert_eq!(
            engine.resolve_source("/vod/manifest.mpd").unwrap(),
            "/vod/manifest.mpd"
        );
        assert_eq!(engine.resolve_source("manifest.mpd").unwrap(), "manifest.mpd");
        assert!(matches!(
            engine.resolve_source("  "),
            Err(Error::EmptySource)
        ));
    }

    #[test]
    fn test_resolve_source_against_base() {
        let base = url::Url::parse("https://cdn.example.com/live/event/").unwrap();
        let engine = engine(EngineConfig::default().with_base_url(base));

        assert_eq!(
            engine.resolve_source("manifest.mpd").unwrap(),
            "https://cdn.example.com/live/event/manifest.mpd"
        );
        assert_eq!(
            engine.resolve_source("/vod/a.mpd").unwrap(),
            "https://cdn.example.com/vod/a.mpd"
        );
        assert_eq!(
            engine.resolve_source("https://other.example.com/b.mpd").unwrap(),
            "https://other.example.com/b.mpd"
        );
    }

    #[test]
    fn test_pick_no_match() {
        let sources = vec![
            SourceDescriptor::new("video/webm", "https://example.com/a.webm"),
            SourceDescriptor::new("application/x-mpegurl", "https://example.com/a.m3u8"),
        ];
        assert!(pick_source(&sources).is_none());
        assert!(pick_source(&[]).is_none());
    }
}
