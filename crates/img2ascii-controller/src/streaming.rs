//! Start/stop guard for the live stream.

use tracing::{debug, error, info, instrument, warn};

use img2ascii_ipc::{EngineLifecycleState, StreamConfig, StreamEndpoint, StreamingState};

use crate::address::AddressProvider;
use crate::{ControllerError, ControllerResult, EngineBoundary};

/// What a toggle request ended up doing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamToggle {
    /// The stream is now running at this endpoint.
    Started(StreamEndpoint),

    /// The stream is now stopped.
    Stopped,
}

/// Keeps the engine from being started twice or stopped into limbo.
#[derive(Debug)]
pub struct StreamingController {
    config: StreamConfig,
    state: StreamingState,
    endpoint: Option<StreamEndpoint>,
}

impl StreamingController {
    /// Create a stopped controller serving `config`.
    pub fn new(config: StreamConfig) -> Self {
        Self {
            config,
            state: StreamingState::Stopped,
            endpoint: None,
        }
    }

    /// Start streaming.
    ///
    /// Fails fast with `NotReady` before the engine is initialized; requests
    /// are never queued. Starting an active stream returns its endpoint
    /// without touching the engine.
    #[instrument(name = "start_stream", skip(self, engine, addresses))]
    pub fn start<E, A>(
        &mut self,
        engine: &mut E,
        lifecycle: EngineLifecycleState,
        addresses: &A,
    ) -> ControllerResult<StreamEndpoint>
    where
        E: EngineBoundary + ?Sized,
        A: AddressProvider + ?Sized,
    {
        match lifecycle {
            EngineLifecycleState::Cleaned => return Err(ControllerError::InvalidStateAfterTeardown),
            EngineLifecycleState::Uninitialized => {
                debug!("Start requested before engine is ready");
                return Err(ControllerError::NotReady);
            }
            EngineLifecycleState::Initialized => {}
        }

        if let (StreamingState::Active, Some(endpoint)) = (self.state, &self.endpoint) {
            debug!("Already streaming, ignoring start request");
            return Ok(endpoint.clone());
        }

        info!(
            port = self.config.port,
            mount = %self.config.mount_point(),
            "Starting stream"
        );

        if let Err(e) = engine.start_streaming(&self.config) {
            error!("Stream start failed: {}", e);
            self.state = StreamingState::Stopped;
            self.endpoint = None;
            return Err(ControllerError::EngineStartFailed(e));
        }

        let address = addresses.local_address();
        if address.is_none() {
            warn!(
                fallback = %self.config.fallback_address,
                "Device address unknown, using placeholder"
            );
        }
        let endpoint = self.config.endpoint(address.map(|ip| ip.to_string()));

        self.state = StreamingState::Active;
        self.endpoint = Some(endpoint.clone());
        info!(url = %endpoint, "Stream started");
        Ok(endpoint)
    }

    /// Stop streaming. Always leaves the stream marked stopped once the
    /// engine has been asked to stop.
    #[instrument(name = "stop_stream", skip(self, engine))]
    pub fn stop<E: EngineBoundary + ?Sized>(
        &mut self,
        engine: &mut E,
        lifecycle: EngineLifecycleState,
    ) -> ControllerResult<()> {
        if lifecycle.is_cleaned() {
            return Err(ControllerError::InvalidStateAfterTeardown);
        }

        if !self.state.is_active() {
            debug!("Already stopped, ignoring stop request");
            return Ok(());
        }

        info!("Stopping stream");
        engine.stop_streaming();
        self.mark_stopped();
        info!("Stream stopped");
        Ok(())
    }

    /// Stop if streaming, otherwise start.
    pub fn toggle<E, A>(
        &mut self,
        engine: &mut E,
        lifecycle: EngineLifecycleState,
        addresses: &A,
    ) -> ControllerResult<StreamToggle>
    where
        E: EngineBoundary + ?Sized,
        A: AddressProvider + ?Sized,
    {
        if self.state.is_active() {
            self.stop(engine, lifecycle)?;
            Ok(StreamToggle::Stopped)
        } else {
            self.start(engine, lifecycle, addresses)
                .map(StreamToggle::Started)
        }
    }

    /// The engine ended the stream by itself. No engine call is made.
    /// Returns true if the stream was considered active.
    pub fn on_engine_stream_ended(&mut self) -> bool {
        let was_active = self.state.is_active();
        if was_active {
            info!("Engine reported stream ended");
        } else {
            debug!("Engine reported stream ended while already stopped");
        }
        self.mark_stopped();
        was_active
    }

    /// Forget the stream without calling the engine. Used at teardown,
    /// where the engine's cleanup releases streaming resources itself.
    pub(crate) fn mark_stopped(&mut self) {
        self.state = StreamingState::Stopped;
        self.endpoint = None;
    }

    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }

    pub fn state(&self) -> StreamingState {
        self.state
    }

    /// Endpoint of the running stream.
    pub fn endpoint(&self) -> Option<&StreamEndpoint> {
        self.endpoint.as_ref()
    }

    pub fn config(&self) -> &StreamConfig {
        &self.config
    }
}
