//! Events sent from the controller to the host shell.

use serde::{Deserialize, Serialize};

use crate::state::ControllerSnapshot;
use crate::types::StreamEndpoint;

/// Events that the controller can send to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControllerEvent {
    /// Controller state has changed.
    StateChanged {
        /// Previous state.
        previous: Box<ControllerSnapshot>,

        /// Current state.
        current: Box<ControllerSnapshot>,
    },

    /// The engine was initialized.
    EngineInitialized,

    /// The user refused camera access. The session cannot continue.
    PermissionDenied,

    /// The stream is running.
    StreamStarted {
        /// Where viewers can connect.
        endpoint: StreamEndpoint,
    },

    /// The stream is stopped.
    StreamStopped,

    /// Answer to a streaming query.
    StreamingStatus { active: bool },

    /// Error occurred.
    Error {
        /// Whether the error is recoverable.
        recoverable: bool,

        /// Error message.
        message: String,
    },

    /// Controller is ready to receive commands.
    Ready,

    /// Controller has torn down.
    TornDown,
}
