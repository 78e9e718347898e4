//! Single-threaded command loop around a [`Controller`].

use crossbeam_channel::{Receiver, Sender};
use tracing::{debug, info, instrument, warn};

use img2ascii_ipc::{ControllerEvent, ControllerSnapshot, HostCommand};

use crate::address::AddressProvider;
use crate::controller::Controller;
use crate::lifecycle::InitOutcome;
use crate::streaming::StreamToggle;
use crate::{ControllerError, EngineBoundary};

/// Owns a controller and applies host commands to it, one at a time, on the
/// thread that calls [`run`](Self::run).
///
/// Every state change goes through the command channel, so any thread
/// (including the engine's own workers) can post commands while the
/// controller itself only ever has one writer.
pub struct ControllerService<E: EngineBoundary, A: AddressProvider> {
    command_rx: Receiver<HostCommand>,
    event_tx: Sender<ControllerEvent>,
    controller: Controller<E, A>,
}

impl<E: EngineBoundary, A: AddressProvider> ControllerService<E, A> {
    /// Create a service.
    pub fn new(
        command_rx: Receiver<HostCommand>,
        event_tx: Sender<ControllerEvent>,
        controller: Controller<E, A>,
    ) -> Self {
        Self {
            command_rx,
            event_tx,
            controller,
        }
    }

    /// Run the command loop (blocking) until teardown or until every
    /// command sender is gone.
    #[instrument(name = "controller_run", skip(self))]
    pub fn run(&mut self) {
        info!("Controller service starting");
        self.send_event(ControllerEvent::Ready);

        loop {
            match self.command_rx.recv() {
                Ok(command) => {
                    if !self.handle_command(command) {
                        break;
                    }
                }
                Err(_) => {
                    info!("Command channel disconnected, tearing down");
                    self.teardown();
                    break;
                }
            }
        }

        info!("Controller service stopped");
    }

    /// Handle a command. Returns false if the loop should stop.
    fn handle_command(&mut self, command: HostCommand) -> bool {
        debug!(?command, "Handling command");
        let previous = self.controller.snapshot();

        let keep_running = match command {
            HostCommand::PermissionResult { granted } => {
                let result = self.controller.on_permission_result(granted);
                self.report_init(result);
                true
            }
            HostCommand::RenderTargetCreated { handle } => {
                let result = self.controller.on_render_target_created(handle);
                self.report_init(result);
                true
            }
            HostCommand::RenderTargetDestroyed => {
                if let Err(e) = self.controller.on_render_target_destroyed() {
                    self.report_error(&e);
                }
                true
            }
            HostCommand::StartStreaming => {
                match self.controller.start() {
                    Ok(endpoint) => self.send_event(ControllerEvent::StreamStarted { endpoint }),
                    Err(e) => self.report_error(&e),
                }
                true
            }
            HostCommand::StopStreaming => {
                match self.controller.stop() {
                    Ok(()) => self.send_event(ControllerEvent::StreamStopped),
                    Err(e) => self.report_error(&e),
                }
                true
            }
            HostCommand::ToggleStreaming => {
                match self.controller.toggle() {
                    Ok(StreamToggle::Started(endpoint)) => {
                        self.send_event(ControllerEvent::StreamStarted { endpoint })
                    }
                    Ok(StreamToggle::Stopped) => self.send_event(ControllerEvent::StreamStopped),
                    Err(e) => self.report_error(&e),
                }
                true
            }
            HostCommand::QueryStreaming => {
                match self.controller.engine_is_streaming() {
                    Ok(active) => self.send_event(ControllerEvent::StreamingStatus { active }),
                    Err(e) => self.report_error(&e),
                }
                true
            }
            HostCommand::EngineStreamEnded => {
                match self.controller.on_engine_stream_ended() {
                    Ok(true) => self.send_event(ControllerEvent::StreamStopped),
                    Ok(false) => {}
                    Err(e) => self.report_error(&e),
                }
                true
            }
            HostCommand::GetState => {
                self.send_state();
                true
            }
            HostCommand::Teardown => {
                // publishes its own transition
                self.teardown();
                return false;
            }
        };

        self.publish_change(previous);
        keep_running
    }

    fn teardown(&mut self) {
        let previous = self.controller.snapshot();
        match self.controller.teardown() {
            Ok(()) => {
                self.publish_change(previous);
                self.send_event(ControllerEvent::TornDown);
            }
            Err(e) => self.report_error(&e),
        }
    }

    fn report_init(&self, result: Result<InitOutcome, ControllerError>) {
        match result {
            Ok(InitOutcome::Initialized) => self.send_event(ControllerEvent::EngineInitialized),
            Ok(_) => {}
            Err(e) => self.report_error(&e),
        }
    }

    fn report_error(&self, error: &ControllerError) {
        match error {
            ControllerError::PermissionDenied => self.send_event(ControllerEvent::PermissionDenied),
            _ => self.send_event(ControllerEvent::Error {
                recoverable: error.is_recoverable(),
                message: error.to_string(),
            }),
        }
    }

    fn send_state(&self) {
        let state = self.controller.snapshot();
        self.send_event(ControllerEvent::StateChanged {
            previous: Box::new(state.clone()),
            current: Box::new(state),
        });
    }

    fn publish_change(&self, previous: ControllerSnapshot) {
        let current = self.controller.snapshot();
        if current == previous {
            return;
        }

        debug!(
            lifecycle = %current.lifecycle.name(),
            streaming = %current.streaming.name(),
            "State transition"
        );

        self.send_event(ControllerEvent::StateChanged {
            previous: Box::new(previous),
            current: Box::new(current),
        });
    }

    fn send_event(&self, event: ControllerEvent) {
        if let Err(e) = self.event_tx.try_send(event) {
            warn!("Failed to send event: {}", e);
        }
    }

    /// The controller being driven.
    pub fn controller(&self) -> &Controller<E, A> {
        &self.controller
    }
}
