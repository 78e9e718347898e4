//! Recording engine used by the controller tests.

use std::sync::Arc;

use parking_lot::Mutex;

use img2ascii_ipc::{RenderTargetHandle, StreamConfig};

use crate::{EngineBoundary, EngineError, EngineResult};

/// One call made through the engine boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCall {
    Init,
    Acquired(RenderTargetHandle),
    Lost,
    Cleanup,
    Start,
    Stop,
}

#[derive(Default)]
struct Shared {
    calls: Vec<EngineCall>,
    streaming: bool,
    fail_start: bool,
}

/// Engine that records every call. Clones share the same log, so a test can
/// keep one clone while the controller owns another.
#[derive(Clone, Default)]
pub struct FakeEngine {
    shared: Arc<Mutex<Shared>>,
}

impl FakeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following `start_streaming` fail until reset.
    pub fn set_fail_start(&self, fail: bool) {
        self.shared.lock().fail_start = fail;
    }

    /// Pretend the engine's stream ended by itself.
    pub fn end_stream(&self) {
        self.shared.lock().streaming = false;
    }

    pub fn calls(&self) -> Vec<EngineCall> {
        self.shared.lock().calls.clone()
    }

    pub fn count(&self, call: &EngineCall) -> usize {
        self.shared.lock().calls.iter().filter(|c| *c == call).count()
    }

    fn record(&self, call: EngineCall) {
        self.shared.lock().calls.push(call);
    }
}

impl EngineBoundary for FakeEngine {
    fn init(&mut self) {
        self.record(EngineCall::Init);
    }

    fn render_target_acquired(&mut self, handle: RenderTargetHandle) {
        self.record(EngineCall::Acquired(handle));
    }

    fn render_target_lost(&mut self) {
        self.record(EngineCall::Lost);
    }

    fn cleanup(&mut self) {
        let mut shared = self.shared.lock();
        shared.streaming = false;
        shared.calls.push(EngineCall::Cleanup);
    }

    fn start_streaming(&mut self, _config: &StreamConfig) -> EngineResult<()> {
        let mut shared = self.shared.lock();
        shared.calls.push(EngineCall::Start);
        if shared.fail_start {
            return Err(EngineError::StartFailed("server refused to attach".into()));
        }
        shared.streaming = true;
        Ok(())
    }

    fn stop_streaming(&mut self) {
        let mut shared = self.shared.lock();
        shared.streaming = false;
        shared.calls.push(EngineCall::Stop);
    }

    fn is_streaming(&self) -> bool {
        self.shared.lock().streaming
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}
