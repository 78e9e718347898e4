//! Controller state machine types.

use serde::{Deserialize, Serialize};

use crate::types::StreamEndpoint;

/// Outcome of the camera permission prompt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PermissionState {
    /// The user has not answered yet.
    #[default]
    Unknown,

    /// The user refused access. Terminal.
    Denied,

    /// The user granted access. Terminal.
    Granted,
}

impl PermissionState {
    /// Returns true once the user has answered either way.
    pub fn is_decided(self) -> bool {
        !matches!(self, Self::Unknown)
    }

    /// Returns true if access was granted.
    pub fn is_granted(self) -> bool {
        matches!(self, Self::Granted)
    }

    /// Returns a simple string representation of the state.
    pub fn name(self) -> &'static str {
        match self {
            Self::Unknown => "Unknown",
            Self::Denied => "Denied",
            Self::Granted => "Granted",
        }
    }
}

/// Whether the host's render surface currently exists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RenderTargetState {
    /// No surface. Initial state, and again after each destruction.
    #[default]
    Absent,

    /// A surface is available.
    Available,
}

impl RenderTargetState {
    /// Returns true if a surface is available.
    pub fn is_available(self) -> bool {
        matches!(self, Self::Available)
    }

    /// Returns a simple string representation of the state.
    pub fn name(self) -> &'static str {
        match self {
            Self::Absent => "Absent",
            Self::Available => "Available",
        }
    }
}

/// Lifecycle of the processing engine as seen by one controller.
///
/// `Uninitialized -> Initialized -> Cleaned`, with `Cleaned` also reachable
/// straight from `Uninitialized`. Nothing leaves `Cleaned`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineLifecycleState {
    /// The engine has not been initialized yet.
    #[default]
    Uninitialized,

    /// `init` has run exactly once.
    Initialized,

    /// `cleanup` has run. No further engine calls are issued.
    Cleaned,
}

impl EngineLifecycleState {
    /// Returns true if the engine has been initialized and not cleaned up.
    pub fn is_initialized(self) -> bool {
        matches!(self, Self::Initialized)
    }

    /// Returns true if the engine has been cleaned up.
    pub fn is_cleaned(self) -> bool {
        matches!(self, Self::Cleaned)
    }

    /// Returns a simple string representation of the state.
    pub fn name(self) -> &'static str {
        match self {
            Self::Uninitialized => "Uninitialized",
            Self::Initialized => "Initialized",
            Self::Cleaned => "Cleaned",
        }
    }
}

/// Whether the live network stream is running.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum StreamingState {
    /// Not streaming.
    #[default]
    Stopped,

    /// Streaming.
    Active,
}

impl StreamingState {
    /// Returns true if the stream is running.
    pub fn is_active(self) -> bool {
        matches!(self, Self::Active)
    }

    /// Returns a simple string representation of the state.
    pub fn name(self) -> &'static str {
        match self {
            Self::Stopped => "Stopped",
            Self::Active => "Active",
        }
    }
}

/// A copy of every state the controller owns, for display.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControllerSnapshot {
    /// Camera permission.
    pub permission: PermissionState,

    /// Render surface availability.
    pub render_target: RenderTargetState,

    /// Engine lifecycle.
    pub lifecycle: EngineLifecycleState,

    /// Stream state.
    pub streaming: StreamingState,

    /// Endpoint of the running stream, if any.
    pub endpoint: Option<StreamEndpoint>,
}

impl ControllerSnapshot {
    /// Returns true if both readiness preconditions hold.
    pub fn is_ready(&self) -> bool {
        self.permission.is_granted() && self.render_target.is_available()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_initial_states() {
        let snapshot = ControllerSnapshot::default();

        assert_eq!(snapshot.permission, PermissionState::Unknown);
        assert_eq!(snapshot.render_target, RenderTargetState::Absent);
        assert_eq!(snapshot.lifecycle, EngineLifecycleState::Uninitialized);
        assert_eq!(snapshot.streaming, StreamingState::Stopped);
        assert!(snapshot.endpoint.is_none());
        assert!(!snapshot.is_ready());
    }

    #[test]
    fn test_permission_decided() {
        assert!(!PermissionState::Unknown.is_decided());
        assert!(PermissionState::Denied.is_decided());
        assert!(PermissionState::Granted.is_decided());
        assert!(!PermissionState::Denied.is_granted());
    }

    #[test]
    fn test_snapshot_ready_needs_both() {
        let mut snapshot = ControllerSnapshot {
            permission: PermissionState::Granted,
            ..Default::default()
        };
        assert!(!snapshot.is_ready());

        snapshot.render_target = RenderTargetState::Available;
        assert!(snapshot.is_ready());
    }
}
