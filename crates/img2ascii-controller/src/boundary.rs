//! The interface the processing engine exposes to the controller.

use parking_lot::Once;
use tracing::debug;

use img2ascii_ipc::{RenderTargetHandle, StreamConfig};

use crate::EngineResult;

/// Lifecycle and streaming entry points of the frame-processing engine.
///
/// The controller is the only caller. Calls arrive on the controller's
/// dispatch thread; an engine that blocks must move that work elsewhere and
/// report back through the controller's command channel.
pub trait EngineBoundary: Send {
    /// One-time setup. Called at most once per controller.
    fn init(&mut self);

    /// A render surface is available. May be called many times.
    fn render_target_acquired(&mut self, handle: RenderTargetHandle);

    /// The render surface went away. May be called many times, and before
    /// `init`.
    fn render_target_lost(&mut self);

    /// Release everything. Must be safe without a prior `init`.
    fn cleanup(&mut self);

    /// Begin serving the stream described by `config`.
    fn start_streaming(&mut self, config: &StreamConfig) -> EngineResult<()>;

    /// Stop serving the stream. Best effort.
    fn stop_streaming(&mut self);

    /// Whether the engine is currently streaming.
    fn is_streaming(&self) -> bool;

    /// Engine name for diagnostics.
    fn name(&self) -> &'static str {
        "engine"
    }
}

impl<T: EngineBoundary + ?Sized> EngineBoundary for Box<T> {
    fn init(&mut self) {
        (**self).init()
    }

    fn render_target_acquired(&mut self, handle: RenderTargetHandle) {
        (**self).render_target_acquired(handle)
    }

    fn render_target_lost(&mut self) {
        (**self).render_target_lost()
    }

    fn cleanup(&mut self) {
        (**self).cleanup()
    }

    fn start_streaming(&mut self, config: &StreamConfig) -> EngineResult<()> {
        (**self).start_streaming(config)
    }

    fn stop_streaming(&mut self) {
        (**self).stop_streaming()
    }

    fn is_streaming(&self) -> bool {
        (**self).is_streaming()
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

/// Runs the engine's process-wide library setup at most once.
///
/// Whoever owns the engine's lifetime holds one of these (typically in a
/// `static`) and calls [`ensure_loaded`](Self::ensure_loaded) before
/// constructing the engine.
pub struct LibraryLoader {
    once: Once,
}

impl LibraryLoader {
    /// Create a loader that has not run yet.
    pub const fn new() -> Self {
        Self { once: Once::new() }
    }

    /// Run `load` unless an earlier call already did. Returns true if this
    /// call ran it.
    pub fn ensure_loaded<F: FnOnce()>(&self, load: F) -> bool {
        let mut ran = false;
        self.once.call_once(|| {
            load();
            ran = true;
        });
        if !ran {
            debug!("Engine library already loaded");
        }
        ran
    }

    /// Returns true once the library has been loaded.
    pub fn is_loaded(&self) -> bool {
        self.once.state().done()
    }
}

impl Default for LibraryLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loader_runs_once() {
        let loader = LibraryLoader::new();
        let mut loads = 0;

        assert!(!loader.is_loaded());
        assert!(loader.ensure_loaded(|| loads += 1));
        assert!(!loader.ensure_loaded(|| loads += 1));
        assert!(loader.is_loaded());
        assert_eq!(loads, 1);
    }

    #[test]
    fn test_static_loader() {
        static LOADER: LibraryLoader = LibraryLoader::new();

        let first = LOADER.ensure_loaded(|| {});
        let second = LOADER.ensure_loaded(|| {});
        assert!(first);
        assert!(!second);
    }
}
