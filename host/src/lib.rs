//! img2ascii host shell library.

pub mod commands;
mod engine;

use std::env;
use std::net::IpAddr;
use std::thread;
use std::time::Duration;

use anyhow::{anyhow, Context};
use parking_lot::Mutex;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crossbeam_channel::{Receiver, Sender};
use img2ascii_controller::{create_service, wifi_ipv4};
use img2ascii_ipc::{
    command_channel, event_channel, ControllerEvent, HostCommand, RenderTargetHandle, StreamConfig,
};

pub use engine::{SimulatedEngine, ENGINE_LIBRARY};

/// Environment variable holding the address shown in stream URLs, either
/// dotted (`10.0.0.5`) or as the packed integer Wi-Fi APIs report.
pub const DEVICE_ADDRESS_ENV: &str = "IMG2ASCII_DEVICE_ADDRESS";

/// How long the scripted session waits for each controller response.
const RESPONSE_TIMEOUT: Duration = Duration::from_secs(5);

/// Host state shared by the command helpers.
pub struct HostShell {
    pub command_tx: Sender<HostCommand>,
    pub event_rx: Mutex<Receiver<ControllerEvent>>,
}

/// Initialize logging.
pub fn init_logging() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            "img2ascii_host=debug,img2ascii_controller=debug,img2ascii_ipc=debug".into()
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Parse a device address as dotted text or as a packed little-endian IPv4.
pub fn parse_device_address(value: &str) -> Option<IpAddr> {
    let value = value.trim();
    if let Ok(ip) = value.parse::<IpAddr>() {
        return Some(ip);
    }
    value
        .parse::<u32>()
        .ok()
        .and_then(wifi_ipv4)
        .map(IpAddr::V4)
}

/// Address lookup handed to the controller.
fn device_address() -> Option<IpAddr> {
    let value = env::var(DEVICE_ADDRESS_ENV).ok()?;
    let address = parse_device_address(&value);
    if address.is_none() {
        warn!(%value, "Ignoring unparseable {}", DEVICE_ADDRESS_ENV);
    }
    address
}

fn log_events(events: &[ControllerEvent]) {
    for event in events {
        match serde_json::to_string(event) {
            Ok(json) => info!(event = %json, "Controller event"),
            Err(e) => warn!("Failed to serialize event: {}", e),
        }
    }
}

/// Wait for the first event `wanted` accepts, logging everything received.
fn expect_event<F>(shell: &HostShell, wanted: F) -> anyhow::Result<ControllerEvent>
where
    F: Fn(&ControllerEvent) -> bool,
{
    let (event, skipped) =
        commands::wait_for(shell, RESPONSE_TIMEOUT, wanted).map_err(|e| anyhow!(e))?;
    log_events(&skipped);
    log_events(std::slice::from_ref(&event));
    Ok(event)
}

/// Run one host session against the simulated engine: surface, permission,
/// a stream started and stopped through the toggle, then teardown.
pub fn run(config: StreamConfig) -> anyhow::Result<()> {
    info!("img2ascii host starting");

    // Create IPC channels
    let (command_tx, command_rx) = command_channel();
    let (event_tx, event_rx) = event_channel();

    let engine = SimulatedEngine::new();
    let controller_thread = thread::Builder::new()
        .name("controller".into())
        .spawn(move || {
            let mut service = create_service(command_rx, event_tx, engine, device_address, config);
            service.run();
        })
        .context("Failed to spawn controller thread")?;

    let shell = HostShell {
        command_tx,
        event_rx: Mutex::new(event_rx),
    };
    let to_anyhow = |e: String| anyhow!(e);

    commands::surface_created(&shell, RenderTargetHandle::new(1)).map_err(to_anyhow)?;
    commands::permission_result(&shell, true).map_err(to_anyhow)?;
    expect_event(&shell, |e| matches!(e, ControllerEvent::EngineInitialized))?;

    commands::toggle_streaming(&shell).map_err(to_anyhow)?;
    match expect_event(&shell, |e| {
        matches!(
            e,
            ControllerEvent::StreamStarted { .. } | ControllerEvent::Error { .. }
        )
    })? {
        ControllerEvent::StreamStarted { endpoint } => info!(url = %endpoint, "Streaming"),
        other => warn!(?other, "Failed to start streaming"),
    }

    commands::query_streaming(&shell).map_err(to_anyhow)?;
    expect_event(&shell, |e| matches!(e, ControllerEvent::StreamingStatus { .. }))?;

    commands::toggle_streaming(&shell).map_err(to_anyhow)?;
    expect_event(&shell, |e| matches!(e, ControllerEvent::StreamStopped))?;

    commands::surface_destroyed(&shell).map_err(to_anyhow)?;
    commands::teardown(&shell).map_err(to_anyhow)?;
    expect_event(&shell, |e| matches!(e, ControllerEvent::TornDown))?;

    controller_thread
        .join()
        .map_err(|_| anyhow!("Controller thread panicked"))?;

    let remaining = commands::poll_events(&shell).unwrap_or_default();
    log_events(&remaining);

    info!("img2ascii host stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;

    use super::*;

    #[test]
    fn test_parse_dotted_address() {
        assert_eq!(
            parse_device_address(" 10.0.0.5 "),
            Some(IpAddr::V4(Ipv4Addr::new(10, 0, 0, 5)))
        );
    }

    #[test]
    fn test_parse_packed_wifi_address() {
        // 0x2a01a8c0 is 192.168.1.42 packed low octet first
        assert_eq!(
            parse_device_address("704751808"),
            Some(IpAddr::V4(Ipv4Addr::new(192, 168, 1, 42)))
        );
        assert_eq!(parse_device_address("0"), None);
        assert_eq!(parse_device_address("phone"), None);
    }

    #[test]
    fn test_scripted_session_completes() {
        run(StreamConfig::default()).unwrap();
        assert!(ENGINE_LIBRARY.is_loaded());
    }
}
