//! Log output setup.
//!
//! All log output goes to stderr. When the server runs on the stdio
//! transport, stdout carries the MCP protocol stream, and a single stray
//! log line there would corrupt a frame.
//!
//! Filtering is driven by `RUST_LOG` (default `info`):
//!
//! - `RUST_LOG=debug` turns on debug logging everywhere
//! - `RUST_LOG=openai_mcp=debug` scopes it to the server crate
//! - `RUST_LOG=warn,openai_mcp_common=debug` mixes levels per crate

use tracing_subscriber::{fmt, prelude::*, EnvFilter, Registry};

fn subscriber() -> impl tracing::Subscriber + Send + Sync {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    Registry::default().with(filter).with(
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true),
    )
}

/// Install the global tracing subscriber.
///
/// Call once, at the top of `main`, before anything logs.
///
/// # Panics
///
/// Panics if a global subscriber is already installed.
pub fn init_tracing() {
    subscriber().init();
}

/// Like [`init_tracing`], but reports an already-installed subscriber as
/// `Err(())` instead of panicking. Useful in tests, where several entry
/// points may race to initialize.
pub fn try_init_tracing() -> Result<(), ()> {
    subscriber().try_init().map_err(|_| ())
}
