//! # Terminal Speed Option Implementation (RFC 1079)
//!
//! ```text
//! IAC SB TERMINAL-SPEED SEND IAC SE
//! IAC SB TERMINAL-SPEED IS <transmit>,<receive> IAC SE
//! ```

use tracing::debug;

use super::{OptionHandler, Session, Subnegotiation};
use crate::error::Result;
use crate::protocol::{OptionCode, Operation};

/// Reported when nothing else is configured
pub const DEFAULT_TERMINAL_SPEED: &str = "115200,115200";

/// Sub-negotiation handler for TERMINAL-SPEED, answering with a fixed value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerminalSpeedHandler {
    speed: String,
}

impl TerminalSpeedHandler {
    /// Handler reporting `speed` (formatted `<transmit>,<receive>`)
    pub fn new(speed: impl Into<String>) -> Self {
        Self {
            speed: speed.into(),
        }
    }

    /// Reported speed string
    pub fn speed(&self) -> &str {
        &self.speed
    }
}

impl Default for TerminalSpeedHandler {
    fn default() -> Self {
        Self::new(DEFAULT_TERMINAL_SPEED)
    }
}

impl OptionHandler for TerminalSpeedHandler {
    fn handle(&self, session: &mut dyn Session, command: &[u8]) -> Result<()> {
        let Some(sb) = Subnegotiation::parse(command) else {
            debug!("Ignoring malformed TERMINAL-SPEED sub-negotiation: {:?}", command);
            return Ok(());
        };

        if sb.operation() == Some(Operation::SEND) {
            debug!("Reporting terminal speed {}", self.speed);
            return session.send_subnegotiation(
                OptionCode::TERMINAL_SPEED,
                Some(Operation::IS),
                self.speed.as_bytes(),
            );
        }
        Ok(())
    }
}
