//! Host-application registration for the OpenAI MCP server.
//!
//! `openai-mcp install` looks for the configuration file of a known MCP host
//! and merges a server-registration stanza into its `mcpServers` table. When
//! no host is found, manual installation instructions are printed instead.

use openai_mcp_common::error::{ConfigError, Error};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Key under which the server is registered in a host's `mcpServers` table.
pub const SERVER_KEY: &str = "openai-mcp";

/// Placeholder the user must replace with a real API key after installation.
pub const API_KEY_PLACEHOLDER: &str = "your-openai-api-key";

/// A host application whose configuration file can be patched.
pub struct InstallTarget {
    /// Human-readable host name
    pub name: &'static str,
    /// Configuration file path segments, relative to the home directory
    pub config_path: &'static [&'static str],
}

/// Known MCP hosts, probed in order.
pub const INSTALL_TARGETS: &[InstallTarget] = &[
    InstallTarget {
        name: "Roo Code",
        config_path: &[
            ".config",
            "Code",
            "User",
            "globalStorage",
            "rooveterinaryinc.roo-cline",
            "settings",
            "cline_mcp_settings.json",
        ],
    },
    InstallTarget {
        name: "Claude Desktop",
        config_path: &[
            "Library",
            "Application Support",
            "Claude",
            "claude_desktop_config.json",
        ],
    },
];

impl InstallTarget {
    /// Resolve the configuration file path under the given home directory.
    pub fn config_file(&self, home: &Path) -> PathBuf {
        self.config_path
            .iter()
            .fold(home.to_path_buf(), |path, segment| path.join(segment))
    }
}

/// Build the registration stanza for this executable.
fn server_stanza(executable: &str) -> Value {
    json!({
        "command": executable,
        "args": ["serve"],
        "env": {
            "OPENAI_API_KEY": API_KEY_PLACEHOLDER
        }
    })
}

/// Merge the registration stanza into an existing host configuration file.
///
/// Existing configuration is preserved; only the `mcpServers["openai-mcp"]`
/// entry is created or replaced.
pub fn install_to_config(config_path: &Path, executable: &str) -> Result<(), Error> {
    let contents = std::fs::read_to_string(config_path)?;
    let mut config: Value = serde_json::from_str(&contents)?;

    let root = config.as_object_mut().ok_or_else(|| {
        Error::validation(format!(
            "{} does not contain a JSON object",
            config_path.display()
        ))
    })?;

    let servers = root
        .entry("mcpServers")
        .or_insert_with(|| json!({}))
        .as_object_mut()
        .ok_or_else(|| Error::validation("mcpServers is not a JSON object".to_string()))?;

    servers.insert(SERVER_KEY.to_string(), server_stanza(executable));

    std::fs::write(config_path, serde_json::to_string_pretty(&config)?)?;
    Ok(())
}

/// Install the server registration into the first host found.
///
/// # Errors
/// Returns an error when the home directory cannot be determined or when a
/// found configuration file cannot be read, parsed, or written.
pub fn install() -> Result<(), Error> {
    println!("Installing OpenAI MCP server configuration...");

    let executable = std::env::current_exe()?.display().to_string();
    let home = home_dir()?;

    for target in INSTALL_TARGETS {
        let config_path = target.config_file(&home);
        if config_path.exists() {
            install_to_config(&config_path, &executable)?;
            println!(
                "Successfully installed OpenAI MCP server configuration to {}",
                config_path.display()
            );
            println!();
            println!(
                "IMPORTANT: You need to replace \"{}\" with your actual OpenAI API key.",
                API_KEY_PLACEHOLDER
            );
            println!("You can edit the configuration file directly or use the settings UI.");
            println!();
            println!("Restart {} for the changes to take effect.", target.name);
            return Ok(());
        }
        debug!(host = target.name, path = %config_path.display(), "No configuration file found");
    }

    print_manual_instructions(&executable);
    Ok(())
}

/// Print manual installation instructions when no host is found.
fn print_manual_instructions(executable: &str) {
    eprintln!("Could not find a Roo Code or Claude Desktop configuration file.");
    eprintln!("Please make sure Roo Code or Claude Desktop is installed.");
    eprintln!();
    eprintln!("Manual installation instructions:");
    eprintln!("1. Add the following to your MCP settings configuration file:");
    let stanza = json!({
        "mcpServers": {
            SERVER_KEY: server_stanza(executable)
        }
    });
    eprintln!(
        "{}",
        serde_json::to_string_pretty(&stanza).unwrap_or_default()
    );
}

fn home_dir() -> Result<PathBuf, Error> {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .ok_or_else(|| ConfigError::missing_env_var("HOME").into())
}
