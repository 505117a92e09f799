use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use telnet_negotiation::options::terminal_type::TERM_VARIABLE;
use telnet_negotiation::{ConnectionBuilder, OptionCode, OptionEntry};
use tracing::{info, warn};

use crate::errors::ConfigError;

/// Default config file, looked up in the working directory
pub const CONFIG_FILE: &str = "telnet-client.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub server: ServerConfig,
    pub terminal: TerminalConfig,
    pub negotiation: NegotiationConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Zero waits for the OS default
    pub connect_timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerminalConfig {
    /// Reported instead of `$TERM` when set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub terminal_type: Option<String>,
    pub terminal_speed: String,
    /// Fallback size when detection is off or fails
    pub width: u16,
    pub height: u16,
    pub detect_size: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NegotiationConfig {
    pub read_buffer_size: usize,
    pub escape_outbound_iac: bool,
    pub disable_remote_echo: bool,
    /// Per-option overrides applied on top of the built-in table
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<OptionOverride>,
}

/// `[[negotiation.options]]` entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionOverride {
    pub code: u8,
    /// Answer DO with WILL
    #[serde(default)]
    pub will: bool,
    /// Answer WILL with DO
    #[serde(default)]
    pub allow: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 23,
            connect_timeout_secs: 10,
        }
    }
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self {
            terminal_type: None,
            terminal_speed: telnet_negotiation::options::DEFAULT_TERMINAL_SPEED.to_string(),
            width: 80,
            height: 24,
            detect_size: true,
        }
    }
}

impl Default for NegotiationConfig {
    fn default() -> Self {
        Self {
            read_buffer_size: telnet_negotiation::DEFAULT_READ_BUFFER_SIZE,
            escape_outbound_iac: false,
            disable_remote_echo: false,
            options: Vec::new(),
        }
    }
}

impl ClientConfig {
    /// Load `path`, creating it with defaults when it does not exist
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(content) => {
                let config = Self::parse_config(&content)?;
                info!("Configuration loaded from {}", path.display());
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let default_config = Self::default();
                match default_config
                    .to_config_file_format()
                    .map(|content| fs::write(path, content))
                {
                    Ok(Ok(())) => info!("Created default config file {}", path.display()),
                    Ok(Err(e)) => warn!("Could not create default config file: {}", e),
                    Err(e) => warn!("Could not create default config file: {}", e),
                }
                Ok(default_config)
            }
            Err(source) => Err(ConfigError::Read {
                path: path.display().to_string(),
                source,
            }),
        }
    }

    /// Parse and validate TOML content
    pub fn parse_config(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.host.trim().is_empty() {
            return Err(ConfigError::InvalidValue(
                "server.host".to_string(),
                self.server.host.clone(),
            ));
        }
        if self.server.port == 0 {
            return Err(ConfigError::InvalidValue(
                "server.port".to_string(),
                "0".to_string(),
            ));
        }
        if self.negotiation.read_buffer_size == 0 {
            return Err(ConfigError::InvalidValue(
                "negotiation.read_buffer_size".to_string(),
                "0".to_string(),
            ));
        }
        Ok(())
    }

    /// `host:port` to connect to
    pub fn address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn connect_timeout(&self) -> Option<Duration> {
        match self.server.connect_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    /// Connection setup for this configuration and the given window size
    pub fn connection_builder(&self, width: u16, height: u16) -> ConnectionBuilder {
        let mut builder = ConnectionBuilder::new()
            .window_size(width, height)
            .terminal_speed(self.terminal.terminal_speed.clone())
            .read_buffer_size(self.negotiation.read_buffer_size)
            .escape_outbound_iac(self.negotiation.escape_outbound_iac);

        if let Some(timeout) = self.connect_timeout() {
            builder = builder.connect_timeout(timeout);
        }

        if let Some(term) = &self.terminal.terminal_type {
            let mut env = HashMap::new();
            env.insert(TERM_VARIABLE.to_string(), term.clone());
            builder = builder.environment(Arc::new(env));
        }

        for entry in &self.negotiation.options {
            builder = builder.option(
                OptionCode(entry.code),
                OptionEntry::new(entry.will, entry.allow),
            );
        }
        builder
    }

    fn to_config_file_format(&self) -> Result<String, ConfigError> {
        Ok(format!(
            "# telnet-client configuration\n\
             # Set RUST_LOG=debug to trace option negotiation on stderr\n\n{}",
            toml::to_string_pretty(self)?
        ))
    }
}
