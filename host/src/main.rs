//! img2ascii host shell.
//!
//! Usage: `img2ascii-host [config.json]`. Log filtering follows `RUST_LOG`.

use std::env;

use anyhow::Context;
use tracing::info;

use img2ascii_ipc::StreamConfig;

fn main() -> anyhow::Result<()> {
    img2ascii_host::init_logging();

    let config = match env::args().nth(1) {
        Some(path) => {
            info!(%path, "Loading stream config");
            StreamConfig::load(&path).with_context(|| format!("Failed to load config {path}"))?
        }
        None => StreamConfig::default(),
    };

    img2ascii_host::run(config)
}
