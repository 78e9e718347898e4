//! Commands sent from the host shell to the controller.

use serde::{Deserialize, Serialize};

use crate::types::RenderTargetHandle;

/// Commands that the host (or the engine's background context) can send to
/// the controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum HostCommand {
    /// The user answered the camera permission prompt.
    PermissionResult { granted: bool },

    /// The render surface was created.
    RenderTargetCreated { handle: RenderTargetHandle },

    /// The render surface was destroyed.
    RenderTargetDestroyed,

    /// Start the live stream.
    StartStreaming,

    /// Stop the live stream.
    StopStreaming,

    /// Start if stopped, stop if streaming.
    ToggleStreaming,

    /// Ask the engine whether it is streaming.
    QueryStreaming,

    /// The engine stopped streaming on its own.
    EngineStreamEnded,

    /// Request current controller state.
    GetState,

    /// The host is being destroyed.
    Teardown,
}
