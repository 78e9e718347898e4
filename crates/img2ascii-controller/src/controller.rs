//! The controller the host shell talks to.

use tracing::{debug, instrument, warn};

use img2ascii_ipc::{
    ControllerSnapshot, EngineLifecycleState, PermissionState, RenderTargetHandle, StreamConfig,
    StreamEndpoint,
};

use crate::address::AddressProvider;
use crate::lifecycle::{InitOutcome, LifecycleController};
use crate::streaming::{StreamToggle, StreamingController};
use crate::{ControllerError, ControllerResult, EngineBoundary};

/// Readiness gating plus stream control for one host session.
///
/// Owns the engine's boundary object and every piece of session state.
/// Not shared between threads: the host calls it from its dispatch thread,
/// or drives it through [`ControllerService`](crate::ControllerService).
/// Dropping a controller that was never torn down tears it down.
pub struct Controller<E: EngineBoundary, A: AddressProvider> {
    engine: E,
    addresses: A,
    lifecycle: LifecycleController,
    streaming: StreamingController,
}

impl<E: EngineBoundary, A: AddressProvider> Controller<E, A> {
    /// Create a controller for a new host session.
    pub fn new(engine: E, addresses: A, config: StreamConfig) -> Self {
        debug!(engine = engine.name(), "Creating controller");
        Self {
            engine,
            addresses,
            lifecycle: LifecycleController::new(),
            streaming: StreamingController::new(config),
        }
    }

    /// The user answered the permission prompt.
    pub fn on_permission_result(&mut self, granted: bool) -> ControllerResult<InitOutcome> {
        self.lifecycle.on_permission_result(&mut self.engine, granted)
    }

    /// The host created a render surface.
    pub fn on_render_target_created(
        &mut self,
        handle: RenderTargetHandle,
    ) -> ControllerResult<InitOutcome> {
        self.lifecycle.on_render_target_created(&mut self.engine, handle)
    }

    /// The host destroyed its render surface.
    pub fn on_render_target_destroyed(&mut self) -> ControllerResult<()> {
        self.lifecycle.on_render_target_destroyed(&mut self.engine)
    }

    /// Start the live stream and return where it can be watched.
    pub fn start(&mut self) -> ControllerResult<StreamEndpoint> {
        let lifecycle = self.lifecycle.state();
        self.streaming.start(&mut self.engine, lifecycle, &self.addresses)
    }

    /// Stop the live stream.
    pub fn stop(&mut self) -> ControllerResult<()> {
        let lifecycle = self.lifecycle.state();
        self.streaming.stop(&mut self.engine, lifecycle)
    }

    /// Stop if streaming, otherwise start.
    pub fn toggle(&mut self) -> ControllerResult<StreamToggle> {
        let lifecycle = self.lifecycle.state();
        self.streaming.toggle(&mut self.engine, lifecycle, &self.addresses)
    }

    /// Ask the engine whether it is streaming, e.g. to pick the button
    /// label when the host resumes.
    pub fn engine_is_streaming(&self) -> ControllerResult<bool> {
        self.ensure_live()?;
        Ok(self.engine.is_streaming())
    }

    /// The engine reported that its stream ended without a stop request.
    /// Returns true if the stream had been active.
    pub fn on_engine_stream_ended(&mut self) -> ControllerResult<bool> {
        self.ensure_live()?;
        Ok(self.streaming.on_engine_stream_ended())
    }

    /// The host is going away. Cleans the engine up whatever state the
    /// session is in; an active stream is released by the engine's cleanup.
    #[instrument(name = "controller_teardown", skip(self))]
    pub fn teardown(&mut self) -> ControllerResult<()> {
        self.lifecycle.teardown(&mut self.engine)?;
        self.streaming.mark_stopped();
        Ok(())
    }

    /// Pure read of the stream state.
    pub fn is_active(&self) -> bool {
        self.streaming.is_active()
    }

    pub fn is_ready(&self) -> bool {
        self.lifecycle.readiness().is_ready()
    }

    pub fn permission(&self) -> PermissionState {
        self.lifecycle.readiness().permission()
    }

    pub fn lifecycle_state(&self) -> EngineLifecycleState {
        self.lifecycle.state()
    }

    pub fn endpoint(&self) -> Option<&StreamEndpoint> {
        self.streaming.endpoint()
    }

    pub fn config(&self) -> &StreamConfig {
        self.streaming.config()
    }

    /// Copy of all session state.
    pub fn snapshot(&self) -> ControllerSnapshot {
        let readiness = self.lifecycle.readiness();
        ControllerSnapshot {
            permission: readiness.permission(),
            render_target: readiness.render_target(),
            lifecycle: self.lifecycle.state(),
            streaming: self.streaming.state(),
            endpoint: self.streaming.endpoint().cloned(),
        }
    }

    fn ensure_live(&self) -> ControllerResult<()> {
        if self.lifecycle.state().is_cleaned() {
            return Err(ControllerError::InvalidStateAfterTeardown);
        }
        Ok(())
    }
}

impl<E: EngineBoundary, A: AddressProvider> Drop for Controller<E, A> {
    fn drop(&mut self) {
        if !self.lifecycle.state().is_cleaned() {
            warn!("Controller dropped without teardown, cleaning up");
            let _ = self.teardown();
        }
    }
}
