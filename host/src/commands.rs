//! Host-side command helpers.

use std::time::Duration;

use crossbeam_channel::RecvTimeoutError;
use tracing::{debug, instrument};

use img2ascii_ipc::{ControllerEvent, HostCommand, RenderTargetHandle};

use crate::HostShell;

fn send(shell: &HostShell, command: HostCommand) -> Result<(), String> {
    shell
        .command_tx
        .send(command)
        .map_err(|e| format!("Failed to send command: {}", e))
}

/// Deliver the permission prompt's answer.
#[instrument(skip(shell))]
pub fn permission_result(shell: &HostShell, granted: bool) -> Result<(), String> {
    debug!("permission_result command");
    send(shell, HostCommand::PermissionResult { granted })
}

/// Report a newly created render surface.
#[instrument(skip(shell))]
pub fn surface_created(shell: &HostShell, handle: RenderTargetHandle) -> Result<(), String> {
    debug!("surface_created command");
    send(shell, HostCommand::RenderTargetCreated { handle })
}

/// Report that the render surface is gone.
pub fn surface_destroyed(shell: &HostShell) -> Result<(), String> {
    send(shell, HostCommand::RenderTargetDestroyed)
}

/// Start streaming.
pub fn start_streaming(shell: &HostShell) -> Result<(), String> {
    send(shell, HostCommand::StartStreaming)
}

/// Stop streaming.
pub fn stop_streaming(shell: &HostShell) -> Result<(), String> {
    send(shell, HostCommand::StopStreaming)
}

/// The stream button: start if stopped, stop if streaming.
pub fn toggle_streaming(shell: &HostShell) -> Result<(), String> {
    send(shell, HostCommand::ToggleStreaming)
}

/// Ask whether the engine is streaming.
pub fn query_streaming(shell: &HostShell) -> Result<(), String> {
    send(shell, HostCommand::QueryStreaming)
}

/// Request current controller state.
pub fn get_state(shell: &HostShell) -> Result<(), String> {
    send(shell, HostCommand::GetState)
}

/// The host is being destroyed.
pub fn teardown(shell: &HostShell) -> Result<(), String> {
    send(shell, HostCommand::Teardown)
}

/// Poll for controller events (non-blocking).
pub fn poll_events(shell: &HostShell) -> Result<Vec<ControllerEvent>, String> {
    let rx = shell.event_rx.lock();
    let mut events = Vec::new();

    loop {
        match rx.try_recv() {
            Ok(event) => events.push(event),
            Err(crossbeam_channel::TryRecvError::Empty) => break,
            Err(crossbeam_channel::TryRecvError::Disconnected) => {
                if events.is_empty() {
                    return Err("Event channel disconnected".to_string());
                }
                break;
            }
        }
    }

    Ok(events)
}

/// Block until an event matching `wanted` arrives, returning it together
/// with every event skipped on the way.
pub fn wait_for<F>(
    shell: &HostShell,
    timeout: Duration,
    wanted: F,
) -> Result<(ControllerEvent, Vec<ControllerEvent>), String>
where
    F: Fn(&ControllerEvent) -> bool,
{
    let rx = shell.event_rx.lock();
    let mut skipped = Vec::new();

    loop {
        match rx.recv_timeout(timeout) {
            Ok(event) if wanted(&event) => return Ok((event, skipped)),
            Ok(event) => skipped.push(event),
            Err(RecvTimeoutError::Timeout) => {
                return Err(format!("Timeout waiting for event after {:?}", timeout))
            }
            Err(RecvTimeoutError::Disconnected) => {
                return Err("Event channel disconnected".to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use img2ascii_ipc::{command_channel, event_channel};
    use parking_lot::Mutex;

    use super::*;

    #[test]
    fn test_commands_reach_channel() {
        let (command_tx, command_rx) = command_channel();
        let (_event_tx, event_rx) = event_channel();
        let shell = HostShell {
            command_tx,
            event_rx: Mutex::new(event_rx),
        };

        permission_result(&shell, true).unwrap();
        surface_created(&shell, RenderTargetHandle::new(2)).unwrap();
        toggle_streaming(&shell).unwrap();

        let received: Vec<HostCommand> = command_rx.try_iter().collect();
        assert_eq!(
            received,
            vec![
                HostCommand::PermissionResult { granted: true },
                HostCommand::RenderTargetCreated {
                    handle: RenderTargetHandle::new(2)
                },
                HostCommand::ToggleStreaming,
            ]
        );
    }

    #[test]
    fn test_wait_for_collects_skipped() {
        let (command_tx, _command_rx) = command_channel();
        let (event_tx, event_rx) = event_channel();
        let shell = HostShell {
            command_tx,
            event_rx: Mutex::new(event_rx),
        };

        event_tx.send(ControllerEvent::Ready).unwrap();
        event_tx.send(ControllerEvent::EngineInitialized).unwrap();

        let (event, skipped) = wait_for(&shell, Duration::from_secs(1), |e| {
            matches!(e, ControllerEvent::EngineInitialized)
        })
        .unwrap();

        assert_eq!(event, ControllerEvent::EngineInitialized);
        assert_eq!(skipped, vec![ControllerEvent::Ready]);
        assert!(poll_events(&shell).unwrap().is_empty());
    }

    #[test]
    fn test_send_fails_when_controller_gone() {
        let (command_tx, command_rx) = command_channel();
        let (_event_tx, event_rx) = event_channel();
        let shell = HostShell {
            command_tx,
            event_rx: Mutex::new(event_rx),
        };
        drop(command_rx);

        assert!(start_streaming(&shell).is_err());
    }
}
