//! Common types used across IPC messages.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default RTSP port used by the streaming engine.
pub const DEFAULT_STREAM_PORT: u16 = 8554;

/// Default mount path of the stream.
pub const DEFAULT_STREAM_PATH: &str = "ascii_stream";

/// Address shown when the device address cannot be looked up.
pub const FALLBACK_ADDRESS: &str = "192.168.1.xxx";

/// Opaque identifier of a host render surface.
///
/// The controller only passes it through to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RenderTargetHandle(u64);

impl RenderTargetHandle {
    /// Wrap a raw host handle.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw host handle.
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RenderTargetHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "surface#{:x}", self.0)
    }
}

/// Where a running stream can be reached, for display to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamEndpoint {
    /// URL scheme (e.g., "rtsp").
    pub scheme: String,

    /// Device address, or a placeholder if it could not be determined.
    pub address: String,

    /// Server port.
    pub port: u16,

    /// Mount path, without the leading slash.
    pub path: String,
}

impl StreamEndpoint {
    /// Full URL, e.g. `rtsp://10.0.0.5:8554/ascii_stream`.
    pub fn url(&self) -> String {
        format!(
            "{}://{}:{}/{}",
            self.scheme, self.address, self.port, self.path
        )
    }
}

impl fmt::Display for StreamEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url())
    }
}

/// Configuration for the stream the engine serves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    /// URL scheme shown in the endpoint.
    pub scheme: String,

    /// Server port (default: 8554).
    pub port: u16,

    /// Mount path (default: "ascii_stream"). A leading slash is ignored.
    pub path: String,

    /// Address shown when the host cannot report one.
    pub fallback_address: String,

    /// Encoded frame width in pixels.
    pub width: u32,

    /// Encoded frame height in pixels.
    pub height: u32,

    /// Target frames per second (default: 20).
    pub fps: u32,

    /// Target bitrate in bits per second (default: 2_000_000).
    pub bitrate: u32,

    /// Columns of the ASCII grid the converter produces.
    pub ascii_columns: u32,

    /// Rows of the ASCII grid the converter produces.
    pub ascii_rows: u32,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            scheme: "rtsp".to_string(),
            port: DEFAULT_STREAM_PORT,
            path: DEFAULT_STREAM_PATH.to_string(),
            fallback_address: FALLBACK_ADDRESS.to_string(),
            width: 640,
            height: 480,
            fps: 20,
            bitrate: 2_000_000,
            ascii_columns: 80,
            ascii_rows: 40,
        }
    }
}

impl StreamConfig {
    /// Parse a JSON document. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Check that the values describe a servable stream.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.scheme.is_empty() {
            return Err(ConfigError::Invalid("scheme must not be empty".into()));
        }
        if self.port == 0 {
            return Err(ConfigError::Invalid("port must not be 0".into()));
        }
        if self.mount_path().is_empty() {
            return Err(ConfigError::Invalid("path must not be empty".into()));
        }
        if self.fps == 0 {
            return Err(ConfigError::Invalid("fps must be positive".into()));
        }
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "invalid frame size {}x{}",
                self.width, self.height
            )));
        }
        if self.ascii_columns == 0 || self.ascii_rows == 0 {
            return Err(ConfigError::Invalid(format!(
                "invalid ASCII grid {}x{}",
                self.ascii_columns, self.ascii_rows
            )));
        }
        Ok(())
    }

    /// Mount path without the leading slash.
    pub fn mount_path(&self) -> &str {
        self.path.trim_start_matches('/')
    }

    /// Mount point as the streaming server expects it, with a leading slash.
    pub fn mount_point(&self) -> String {
        format!("/{}", self.mount_path())
    }

    /// Build the display endpoint for the given device address.
    pub fn endpoint(&self, address: Option<String>) -> StreamEndpoint {
        StreamEndpoint {
            scheme: self.scheme.clone(),
            address: address.unwrap_or_else(|| self.fallback_address.clone()),
            port: self.port,
            path: self.mount_path().to_string(),
        }
    }
}
