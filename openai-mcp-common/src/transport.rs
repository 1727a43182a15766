//! Transport selection for the MCP server.
//!
//! The server speaks MCP over one of two channels:
//!
//! - **stdio** (the default): the host application launches the server as a
//!   subprocess and exchanges protocol frames over stdin/stdout.
//! - **streamable HTTP**: the server listens on a TCP port and accepts
//!   web-based MCP clients.
//!
//! [`TransportArgs`] is meant to be `#[command(flatten)]`-ed into a clap
//! CLI; [`TransportArgs::into_transport`] resolves the flags into a
//! [`Transport`] value the server builder can run.

use clap::{Args, ValueEnum};
use std::fmt;

/// A fully resolved transport choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Transport {
    /// Protocol frames over stdin/stdout.
    #[default]
    Stdio,
    /// Streamable HTTP on the given port.
    Http {
        /// Port to listen on
        port: u16,
    },
}

impl Transport {
    /// The stdio transport.
    pub fn stdio() -> Self {
        Transport::Stdio
    }

    /// The streamable HTTP transport on `port`.
    pub fn http(port: u16) -> Self {
        Transport::Http { port }
    }

    /// Whether this is the stdio transport.
    pub fn is_stdio(&self) -> bool {
        matches!(self, Transport::Stdio)
    }

    /// The listen port, for network transports.
    pub fn port(&self) -> Option<u16> {
        match self {
            Transport::Stdio => None,
            Transport::Http { port } => Some(*port),
        }
    }
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transport::Stdio => f.write_str("stdio"),
            Transport::Http { port } => write!(f, "http (port {})", port),
        }
    }
}

/// Transport flag value, before the port is attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum TransportMode {
    /// stdin/stdout subprocess transport
    #[default]
    Stdio,
    /// streamable HTTP transport
    Http,
}

/// Clap arguments shared by every command that starts the server.
///
/// ```ignore
/// #[derive(Parser)]
/// struct Cli {
///     #[command(flatten)]
///     transport: TransportArgs,
/// }
/// ```
#[derive(Args, Debug, Clone)]
pub struct TransportArgs {
    /// Transport to serve on
    #[arg(long, value_enum, default_value_t = TransportMode::Stdio)]
    pub transport: TransportMode,

    /// Listen port for the HTTP transport
    #[arg(long, env = "PORT", default_value_t = 8080)]
    pub port: u16,
}

impl TransportArgs {
    /// Resolve the parsed flags into a [`Transport`].
    ///
    /// The port flag only takes effect for the HTTP transport; stdio
    /// ignores it.
    pub fn into_transport(self) -> Transport {
        match self.transport {
            TransportMode::Stdio => Transport::Stdio,
            TransportMode::Http => Transport::Http { port: self.port },
        }
    }
}

impl Default for TransportArgs {
    fn default() -> Self {
        Self {
            transport: TransportMode::Stdio,
            port: 8080,
        }
    }
}
