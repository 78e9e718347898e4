//! Readiness gating and streaming lifecycle control for img2ascii.
//!
//! The processing engine may only be initialized once camera permission is
//! granted and a render surface exists, in whichever order those arrive.
//! This crate tracks both, initializes and cleans up the engine at the right
//! transitions, and guards stream start/stop against repeats and early
//! calls.

mod address;
mod boundary;
mod controller;
mod error;
#[cfg(test)]
mod fake;
mod lifecycle;
mod readiness;
mod service;
mod streaming;

pub use address::{wifi_ipv4, AddressProvider, FixedAddress, NoAddress};
pub use boundary::{EngineBoundary, LibraryLoader};
pub use controller::Controller;
pub use error::{ControllerError, EngineError};
pub use lifecycle::{InitOutcome, LifecycleController};
pub use readiness::ReadinessTracker;
pub use service::ControllerService;
pub use streaming::{StreamToggle, StreamingController};

use crossbeam_channel::{Receiver, Sender};
use img2ascii_ipc::{ControllerEvent, HostCommand, StreamConfig};

/// Result type for controller operations.
pub type ControllerResult<T> = Result<T, ControllerError>;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Create a controller service wired to IPC channels.
pub fn create_service<E, A>(
    command_rx: Receiver<HostCommand>,
    event_tx: Sender<ControllerEvent>,
    engine: E,
    addresses: A,
    config: StreamConfig,
) -> ControllerService<E, A>
where
    E: EngineBoundary,
    A: AddressProvider,
{
    ControllerService::new(command_rx, event_tx, Controller::new(engine, addresses, config))
}
