//! Engine initialization and teardown, gated on readiness.

use tracing::{debug, info, instrument, warn};

use img2ascii_ipc::{EngineLifecycleState, PermissionState, RenderTargetHandle};

use crate::readiness::ReadinessTracker;
use crate::{ControllerError, ControllerResult, EngineBoundary};

/// Result of a readiness event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitOutcome {
    /// This event completed readiness and the engine was initialized.
    Initialized,

    /// Still waiting for the other precondition.
    Waiting,

    /// The engine was initialized by an earlier event.
    AlreadyInitialized,
}

/// Decides when the engine is initialized and cleaned up.
///
/// The only caller of the engine's lifecycle entry points. Initialization
/// happens once, on whichever of permission or render target arrives last.
#[derive(Debug, Default)]
pub struct LifecycleController {
    readiness: ReadinessTracker,
    state: EngineLifecycleState,
}

impl LifecycleController {
    /// Create a controller with nothing known and the engine untouched.
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply the user's permission decision.
    ///
    /// A denial is fatal for this controller and leaves the engine alone.
    /// The first decision sticks; later results do not change it.
    #[instrument(name = "permission_result", skip(self, engine))]
    pub fn on_permission_result<E: EngineBoundary + ?Sized>(
        &mut self,
        engine: &mut E,
        granted: bool,
    ) -> ControllerResult<InitOutcome> {
        self.ensure_not_cleaned()?;

        match self.readiness.permission() {
            PermissionState::Denied => {
                warn!("Permission already denied, ignoring later result");
                return Err(ControllerError::PermissionDenied);
            }
            PermissionState::Granted => {
                if !granted {
                    warn!("Permission already granted, ignoring later denial");
                }
                return Ok(self.attempt_initialization(engine));
            }
            PermissionState::Unknown => {}
        }

        self.readiness.set_permission(granted);
        if !granted {
            warn!("Camera permission denied");
            return Err(ControllerError::PermissionDenied);
        }

        info!("Camera permission granted");
        Ok(self.attempt_initialization(engine))
    }

    /// A render surface was created. The engine always gets the handle.
    #[instrument(name = "render_target_created", skip(self, engine))]
    pub fn on_render_target_created<E: EngineBoundary + ?Sized>(
        &mut self,
        engine: &mut E,
        handle: RenderTargetHandle,
    ) -> ControllerResult<InitOutcome> {
        self.ensure_not_cleaned()?;

        engine.render_target_acquired(handle);
        self.readiness.set_render_target(Some(handle));
        Ok(self.attempt_initialization(engine))
    }

    /// The render surface was destroyed. The engine is told even if it was
    /// never initialized, since it may still hold the old handle.
    #[instrument(name = "render_target_destroyed", skip(self, engine))]
    pub fn on_render_target_destroyed<E: EngineBoundary + ?Sized>(
        &mut self,
        engine: &mut E,
    ) -> ControllerResult<()> {
        self.ensure_not_cleaned()?;

        self.readiness.set_render_target(None);
        engine.render_target_lost();
        Ok(())
    }

    /// Initialize the engine if both preconditions hold and it has not been
    /// initialized yet.
    fn attempt_initialization<E: EngineBoundary + ?Sized>(
        &mut self,
        engine: &mut E,
    ) -> InitOutcome {
        debug!(
            permission = %self.readiness.permission().name(),
            render_target = %self.readiness.render_target().name(),
            lifecycle = %self.state.name(),
            "Attempting initialization"
        );

        match self.state {
            EngineLifecycleState::Initialized => InitOutcome::AlreadyInitialized,
            EngineLifecycleState::Uninitialized if self.readiness.is_ready() => {
                info!(engine = engine.name(), "Initializing engine");
                engine.init();
                self.state = EngineLifecycleState::Initialized;
                InitOutcome::Initialized
            }
            _ => InitOutcome::Waiting,
        }
    }

    /// Release the engine. Runs `cleanup` whatever state the engine is in;
    /// afterwards every call is rejected.
    #[instrument(name = "lifecycle_teardown", skip(self, engine))]
    pub fn teardown<E: EngineBoundary + ?Sized>(
        &mut self,
        engine: &mut E,
    ) -> ControllerResult<()> {
        self.ensure_not_cleaned()?;

        info!(from = %self.state.name(), "Cleaning up engine");
        engine.cleanup();
        self.state = EngineLifecycleState::Cleaned;
        Ok(())
    }

    pub fn state(&self) -> EngineLifecycleState {
        self.state
    }

    pub fn readiness(&self) -> &ReadinessTracker {
        &self.readiness
    }

    fn ensure_not_cleaned(&self) -> ControllerResult<()> {
        if self.state.is_cleaned() {
            warn!("Rejecting call after teardown");
            return Err(ControllerError::InvalidStateAfterTeardown);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::{EngineCall, FakeEngine};

    const SURFACE: RenderTargetHandle = RenderTargetHandle::new(0x51);

    #[test]
    fn test_permission_then_surface_initializes_once() {
        let mut engine = FakeEngine::new();
        let mut lifecycle = LifecycleController::new();

        assert_eq!(
            lifecycle.on_permission_result(&mut engine, true),
            Ok(InitOutcome::Waiting)
        );
        assert_eq!(engine.count(&EngineCall::Init), 0);

        assert_eq!(
            lifecycle.on_render_target_created(&mut engine, SURFACE),
            Ok(InitOutcome::Initialized)
        );
        assert_eq!(engine.calls(), vec![EngineCall::Acquired(SURFACE), EngineCall::Init]);
        assert_eq!(lifecycle.state(), EngineLifecycleState::Initialized);
    }

    #[test]
    fn test_surface_then_permission_initializes_once() {
        let mut engine = FakeEngine::new();
        let mut lifecycle = LifecycleController::new();

        assert_eq!(
            lifecycle.on_render_target_created(&mut engine, SURFACE),
            Ok(InitOutcome::Waiting)
        );
        assert_eq!(engine.count(&EngineCall::Init), 0);

        assert_eq!(
            lifecycle.on_permission_result(&mut engine, true),
            Ok(InitOutcome::Initialized)
        );
        assert_eq!(engine.calls(), vec![EngineCall::Acquired(SURFACE), EngineCall::Init]);
    }

    #[test]
    fn test_repeated_readiness_events_do_not_reinitialize() {
        let mut engine = FakeEngine::new();
        let mut lifecycle = LifecycleController::new();

        lifecycle.on_permission_result(&mut engine, true).unwrap();
        lifecycle.on_render_target_created(&mut engine, SURFACE).unwrap();

        assert_eq!(
            lifecycle.on_permission_result(&mut engine, true),
            Ok(InitOutcome::AlreadyInitialized)
        );
        assert_eq!(
            lifecycle.on_render_target_created(&mut engine, SURFACE),
            Ok(InitOutcome::AlreadyInitialized)
        );
        for _ in 0..3 {
            assert_eq!(
                lifecycle.attempt_initialization(&mut engine),
                InitOutcome::AlreadyInitialized
            );
        }
        assert_eq!(engine.count(&EngineCall::Init), 1);
    }

    #[test]
    fn test_surface_recreated_after_init_is_forwarded_only() {
        let mut engine = FakeEngine::new();
        let mut lifecycle = LifecycleController::new();
        let second = RenderTargetHandle::new(0x52);

        lifecycle.on_permission_result(&mut engine, true).unwrap();
        lifecycle.on_render_target_created(&mut engine, SURFACE).unwrap();
        lifecycle.on_render_target_destroyed(&mut engine).unwrap();
        lifecycle.on_render_target_created(&mut engine, second).unwrap();

        assert_eq!(
            engine.calls(),
            vec![
                EngineCall::Acquired(SURFACE),
                EngineCall::Init,
                EngineCall::Lost,
                EngineCall::Acquired(second),
            ]
        );
        assert_eq!(lifecycle.readiness().render_target_handle(), Some(second));
    }

    #[test]
    fn test_denial_never_initializes() {
        // Every interleaving of a denial with surface create/destroy.
        let orders: [&[u8]; 6] = [b"pcd", b"pdc", b"cpd", b"cdp", b"dpc", b"dcp"];

        for order in orders {
            let mut engine = FakeEngine::new();
            let mut lifecycle = LifecycleController::new();

            for &step in order {
                match step {
                    b'p' => {
                        assert_eq!(
                            lifecycle.on_permission_result(&mut engine, false),
                            Err(ControllerError::PermissionDenied)
                        );
                    }
                    b'c' => {
                        lifecycle.on_render_target_created(&mut engine, SURFACE).unwrap();
                    }
                    _ => lifecycle.on_render_target_destroyed(&mut engine).unwrap(),
                }
            }

            assert_eq!(engine.count(&EngineCall::Init), 0, "order {:?}", order);
            assert_eq!(lifecycle.state(), EngineLifecycleState::Uninitialized);
        }
    }

    #[test]
    fn test_denial_is_terminal() {
        let mut engine = FakeEngine::new();
        let mut lifecycle = LifecycleController::new();

        lifecycle.on_render_target_created(&mut engine, SURFACE).unwrap();
        let _ = lifecycle.on_permission_result(&mut engine, false);

        assert_eq!(
            lifecycle.on_permission_result(&mut engine, true),
            Err(ControllerError::PermissionDenied)
        );
        assert_eq!(lifecycle.readiness().permission(), PermissionState::Denied);
        assert_eq!(engine.count(&EngineCall::Init), 0);
    }

    #[test]
    fn test_surface_lifecycle_before_permission() {
        let mut engine = FakeEngine::new();
        let mut lifecycle = LifecycleController::new();

        lifecycle.on_render_target_created(&mut engine, SURFACE).unwrap();
        lifecycle.on_render_target_destroyed(&mut engine).unwrap();

        assert_eq!(engine.calls(), vec![EngineCall::Acquired(SURFACE), EngineCall::Lost]);

        // Permission arriving with no surface still waits.
        assert_eq!(
            lifecycle.on_permission_result(&mut engine, true),
            Ok(InitOutcome::Waiting)
        );
        assert_eq!(engine.count(&EngineCall::Init), 0);
    }

    #[test]
    fn test_teardown_cleans_up_from_uninitialized() {
        let mut engine = FakeEngine::new();
        let mut lifecycle = LifecycleController::new();

        lifecycle.teardown(&mut engine).unwrap();

        assert_eq!(engine.calls(), vec![EngineCall::Cleanup]);
        assert_eq!(lifecycle.state(), EngineLifecycleState::Cleaned);
    }

    #[test]
    fn test_calls_after_teardown_are_rejected() {
        let mut engine = FakeEngine::new();
        let mut lifecycle = LifecycleController::new();

        lifecycle.on_permission_result(&mut engine, true).unwrap();
        lifecycle.teardown(&mut engine).unwrap();

        assert_eq!(
            lifecycle.on_render_target_created(&mut engine, SURFACE),
            Err(ControllerError::InvalidStateAfterTeardown)
        );
        assert_eq!(
            lifecycle.on_render_target_destroyed(&mut engine),
            Err(ControllerError::InvalidStateAfterTeardown)
        );
        assert_eq!(
            lifecycle.teardown(&mut engine),
            Err(ControllerError::InvalidStateAfterTeardown)
        );
        assert_eq!(engine.calls(), vec![EngineCall::Cleanup]);
    }
}
