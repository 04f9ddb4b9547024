//! Playback surface seam
//!
//! A surface is the media sink that decodes and renders the stream. The host's
//! player region creates and removes surfaces; the adapter drives them and
//! receives their native events through
//! [`DashEngine::handle_surface_event`](crate::DashEngine::handle_surface_event).

use crate::types::{SurfaceId, TimeRanges};

/// A media element capable of playing decoded media
pub trait PlaybackSurface: Send {
    fn id(&self) -> SurfaceId;

    fn play(&mut self);

    fn pause(&mut self);

    fn paused(&self) -> bool;

    /// Play head position in seconds
    fn current_time(&self) -> f64;

    fn set_current_time(&mut self, time: f64);

    /// Duration in seconds, `NaN` while unknown and infinite for live content
    fn duration(&self) -> f64;

    fn buffered(&self) -> TimeRanges;

    fn seekable(&self) -> TimeRanges;

    fn volume(&self) -> f64;

    fn set_volume(&mut self, level: f64);

    fn set_playback_rate(&mut self, rate: f64);

    fn video_width(&self) -> u32;

    fn video_height(&self) -> u32;

    /// Resolved source URL, if any
    fn current_src(&self) -> Option<String>;
}

/// The host's player region that holds the playback surface
pub trait PlayerRegion: Send {
    /// Surface currently attached to the region, whoever created it
    fn attached_surface(&self) -> Option<SurfaceId>;

    /// Detach and discard a surface; returns false if it was not attached
    fn remove_surface(&mut self, id: SurfaceId) -> bool;

    /// Create a surface with the given class name and prepend it to the region
    fn create_surface(&mut self, class_name: &str) -> Box<dyn PlaybackSurface>;
}
