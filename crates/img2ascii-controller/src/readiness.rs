//! The two-input readiness gate.

use img2ascii_ipc::{PermissionState, RenderTargetHandle, RenderTargetState};

/// Remembers whether camera permission was granted and whether a render
/// surface exists.
#[derive(Debug, Clone, Default)]
pub struct ReadinessTracker {
    permission: PermissionState,
    render_target: Option<RenderTargetHandle>,
}

impl ReadinessTracker {
    /// Create a tracker with nothing known yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the user's permission decision.
    pub fn set_permission(&mut self, granted: bool) {
        self.permission = if granted {
            PermissionState::Granted
        } else {
            PermissionState::Denied
        };
    }

    /// Record the current render surface, or `None` when it is gone.
    pub fn set_render_target(&mut self, handle: Option<RenderTargetHandle>) {
        self.render_target = handle;
    }

    /// True iff permission is granted and a surface is available.
    pub fn is_ready(&self) -> bool {
        self.permission.is_granted() && self.render_target.is_some()
    }

    pub fn permission(&self) -> PermissionState {
        self.permission
    }

    pub fn render_target(&self) -> RenderTargetState {
        if self.render_target.is_some() {
            RenderTargetState::Available
        } else {
            RenderTargetState::Absent
        }
    }

    /// The surface most recently reported as created.
    pub fn render_target_handle(&self) -> Option<RenderTargetHandle> {
        self.render_target
    }
}
