//! Host-facing engine contract

use crate::{
    types::{SourceDescriptor, VideoDescriptor},
    Result,
};

/// Playback engine as seen by a player host
///
/// The host asks every registered engine to `pick` a source and hands the
/// video to the first engine that returns one. Everything after that is
/// reported back through host events.
pub trait PlayerEngine {
    /// Identity used for engine selection and priority ordering
    fn engine_name(&self) -> String;

    /// First source this engine can play
    fn pick<'a>(&self, sources: &'a [SourceDescriptor]) -> Option<&'a SourceDescriptor>;

    /// Start loading a video; readiness is reported by a `ready` event
    fn load(&mut self, video: VideoDescriptor) -> Result<()>;

    fn play(&mut self);

    fn resume(&mut self);

    fn pause(&mut self);

    /// Move the play head to `time` seconds
    fn seek(&mut self, time: f64);

    /// Set volume in `[0, 1]`
    fn volume(&mut self, level: f64);

    /// Set the playback rate
    fn speed(&mut self, rate: f64);

    fn unload(&mut self);

    /// Host autoplay flag changed
    fn set_autoplay(&mut self, _autoplay: bool) {}

    /// Host is about to seek
    fn before_seek(&mut self) {}
}
