//! Typed host<->controller messages for img2ascii.
//!
//! This crate defines the state, configuration and message types shared
//! between the host shell and the lifecycle controller.

mod commands;
mod error;
mod events;
mod state;
mod types;

pub use commands::HostCommand;
pub use error::ConfigError;
pub use events::ControllerEvent;
pub use state::{
    ControllerSnapshot, EngineLifecycleState, PermissionState, RenderTargetState, StreamingState,
};
pub use types::{
    RenderTargetHandle, StreamConfig, StreamEndpoint, DEFAULT_STREAM_PATH, DEFAULT_STREAM_PORT,
    FALLBACK_ADDRESS,
};

use crossbeam_channel::{Receiver, Sender};

/// Channel capacity for commands (host → controller).
pub const COMMAND_CHANNEL_CAPACITY: usize = 64;

/// Channel capacity for events (controller → host).
pub const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Creates a bounded command channel.
pub fn command_channel() -> (Sender<HostCommand>, Receiver<HostCommand>) {
    crossbeam_channel::bounded(COMMAND_CHANNEL_CAPACITY)
}

/// Creates a bounded event channel.
pub fn event_channel() -> (Sender<ControllerEvent>, Receiver<ControllerEvent>) {
    crossbeam_channel::bounded(EVENT_CHANNEL_CAPACITY)
}
