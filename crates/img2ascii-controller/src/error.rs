//! Error types for the controller.

use thiserror::Error;

/// Errors reported by the processing engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// The engine could not start streaming.
    #[error("Stream start failed: {0}")]
    StartFailed(String),

    /// The engine was asked to stream before it was initialized.
    #[error("Engine not initialized")]
    NotInitialized,

    /// The operation is not available on this platform or build.
    #[error("Not supported: {0}")]
    NotSupported(String),
}

/// Errors returned by controller operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ControllerError {
    /// The user refused camera access. Fatal for this controller.
    #[error("Camera permission denied")]
    PermissionDenied,

    /// Permission or render target is still missing.
    #[error("Engine not ready: waiting for permission and render target")]
    NotReady,

    /// The engine refused to start streaming.
    #[error("Failed to start streaming: {0}")]
    EngineStartFailed(#[source] EngineError),

    /// The controller has already been torn down.
    #[error("Controller used after teardown")]
    InvalidStateAfterTeardown,
}

impl ControllerError {
    /// Returns true if the caller may retry the operation later.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::NotReady | Self::EngineStartFailed(_))
    }
}
