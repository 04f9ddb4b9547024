//! Event loop driving a [`DashEngine`]
//!
//! Host commands, native surface events and streaming session notifications
//! all go through one channel and are applied one at a time on a single task,
//! so the adapter itself needs no locking.

use crate::{
    adapter::DashEngine,
    engine::PlayerEngine,
    types::{LoadTicket, SessionError, SessionEvent, SurfaceEvent, SurfaceId, VideoDescriptor},
    Error, Result,
};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, instrument};

/// Host command addressed to the engine
#[derive(Debug, Clone)]
pub enum HostCommand {
    Load(VideoDescriptor),
    Play,
    Resume,
    Pause,
    Seek(f64),
    Volume(f64),
    Speed(f64),
    Unload,
    /// Host is about to seek
    BeforeSeek,
    SetAutoplay(bool),
}

impl HostCommand {
    /// Apply the command to an engine
    pub fn apply(self, engine: &mut dyn PlayerEngine) -> Result<()> {
        match self {
            HostCommand::Load(video) => engine.load(video)?,
            HostCommand::Play => engine.play(),
            HostCommand::Resume => engine.resume(),
            HostCommand::Pause => engine.pause(),
            HostCommand::Seek(time) => engine.seek(time),
            HostCommand::Volume(level) => engine.volume(level),
            HostCommand::Speed(rate) => engine.speed(rate),
            HostCommand::Unload => engine.unload(),
            HostCommand::BeforeSeek => engine.before_seek(),
            HostCommand::SetAutoplay(autoplay) => engine.set_autoplay(autoplay),
        }
        Ok(())
    }
}

/// Input processed by the driver
#[derive(Debug)]
pub enum EngineInput {
    Command(HostCommand),
    Surface {
        surface: SurfaceId,
        event: SurfaceEvent,
    },
    Session(SessionEvent),
    /// Acknowledged once every earlier input has been applied
    Flush(oneshot::Sender<()>),
    Shutdown,
}

/// Cloneable sender into a running driver
#[derive(Debug, Clone)]
pub struct EngineHandle {
    tx: mpsc::UnboundedSender<EngineInput>,
}

impl EngineHandle {
    fn send(&self, input: EngineInput) -> Result<()> {
        self.tx.send(input).map_err(|_| Error::ChannelClosed)
    }

    /// Queue a host command
    pub fn command(&self, command: HostCommand) -> Result<()> {
        self.send(EngineInput::Command(command))
    }

    /// Queue a native surface event
    pub fn surface_event(&self, surface: SurfaceId, event: SurfaceEvent) -> Result<()> {
        self.send(EngineInput::Surface { surface, event })
    }

    /// Queue a streaming session notification
    pub fn session_event(&self, event: SessionEvent) -> Result<()> {
        self.send(EngineInput::Session(event))
    }

    /// Report completion of the load tagged `ticket`
    pub fn load_completed(&self, ticket: LoadTicket) -> Result<()> {
        self.session_event(SessionEvent::LoadCompleted { ticket })
    }

    /// Report a streaming session fault
    pub fn session_error(&self, error: SessionError) -> Result<()> {
        self.session_event(SessionEvent::Error { error })
    }

    /// Wait until every input queued so far has been applied
    pub async fn flush(&self) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.send(EngineInput::Flush(tx))?;
        rx.await.map_err(|_| Error::ChannelClosed)
    }

    /// Stop the driver after the inputs queued so far
    pub fn shutdown(&self) -> Result<()> {
        self.send(EngineInput::Shutdown)
    }
}

/// Single-task event loop owning the engine
pub struct EngineDriver {
    engine: DashEngine,
    rx: mpsc::UnboundedReceiver<EngineInput>,
}

impl EngineDriver {
    /// Create a driver and the handle feeding it
    pub fn new(engine: DashEngine) -> (Self, EngineHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { engine, rx }, EngineHandle { tx })
    }

    /// Process inputs until shutdown or until every handle is dropped
    ///
    /// Returns the engine so its final state can be inspected.
    pub async fn run(mut self) -> DashEngine {
        info!(engine = %self.engine.engine_name(), "Engine driver started");

        while let Some(input) = self.rx.recv().await {
            match input {
                EngineInput::Shutdown => break,
                EngineInput::Flush(ack) => {
                    let _ = ack.send(());
                }
                input => self.dispatch(input),
            }
        }

        info!("Engine driver stopped");
        self.engine
    }

    #[instrument(level = "debug", skip(self))]
    fn dispatch(&mut self, input: EngineInput) {
        match input {
            EngineInput::Command(command) => {
                if let Err(err) = command.apply(&mut self.engine) {
                    error!(error = %err, code = err.error_code(), "Host command failed");
                }
            }
            EngineInput::Surface { surface, event } => {
                self.engine.handle_surface_event(surface, event);
            }
            EngineInput::Session(event) => self.engine.handle_session_event(event),
            EngineInput::Flush(_) | EngineInput::Shutdown => {
                debug!("Control input reached dispatch");
            }
        }
    }
}
