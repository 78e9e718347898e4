//! Stand-in for the native frame-processing engine.

use tracing::{debug, info, warn};

use img2ascii_controller::{EngineBoundary, EngineError, EngineResult, LibraryLoader};
use img2ascii_ipc::{RenderTargetHandle, StreamConfig};

/// Process-wide engine library setup.
pub static ENGINE_LIBRARY: LibraryLoader = LibraryLoader::new();

/// Engine that logs each lifecycle call and keeps just enough state to
/// answer `is_streaming`.
#[derive(Debug, Default)]
pub struct SimulatedEngine {
    initialized: bool,
    surface: Option<RenderTargetHandle>,
    streaming: bool,
}

impl SimulatedEngine {
    /// Create the engine, loading the engine library first if needed.
    pub fn new() -> Self {
        ENGINE_LIBRARY.ensure_loaded(|| info!("Loading engine library"));
        Self::default()
    }

    pub fn surface(&self) -> Option<RenderTargetHandle> {
        self.surface
    }
}

impl EngineBoundary for SimulatedEngine {
    fn init(&mut self) {
        info!("Engine init: starting camera and converter");
        self.initialized = true;
    }

    fn render_target_acquired(&mut self, handle: RenderTargetHandle) {
        info!(%handle, "Engine render target acquired");
        self.surface = Some(handle);
    }

    fn render_target_lost(&mut self) {
        match self.surface.take() {
            Some(handle) => info!(%handle, "Engine render target lost"),
            None => debug!("Engine render target lost with no surface held"),
        }
    }

    fn cleanup(&mut self) {
        info!(
            initialized = self.initialized,
            streaming = self.streaming,
            "Engine cleanup"
        );
        self.streaming = false;
        self.initialized = false;
        self.surface = None;
    }

    fn start_streaming(&mut self, config: &StreamConfig) -> EngineResult<()> {
        if !self.initialized {
            warn!("Engine asked to stream before init");
            return Err(EngineError::NotInitialized);
        }
        if self.streaming {
            debug!("Engine already streaming");
            return Ok(());
        }

        info!(
            port = config.port,
            mount = %config.mount_point(),
            width = config.width,
            height = config.height,
            fps = config.fps,
            bitrate = config.bitrate,
            "Engine serving stream"
        );
        self.streaming = true;
        Ok(())
    }

    fn stop_streaming(&mut self) {
        info!("Engine stream stopped");
        self.streaming = false;
    }

    fn is_streaming(&self) -> bool {
        self.streaming
    }

    fn name(&self) -> &'static str {
        "simulated"
    }
}
