//! # NAWS Option Implementation (RFC 1073)
//!
//! Negotiate About Window Size lets the client report its terminal dimensions.
//!
//! ## Sub-negotiation Protocol
//!
//! ```text
//! IAC SB NAWS <width-high> <width-low> <height-high> <height-low> IAC SE
//! ```
//!
//! Width and height are 16-bit values in network byte order (big-endian); a 255
//! byte inside them is doubled like any other sub-negotiation data.
//! There is no operation byte.
//!
//! ## Client Flow
//! 1. Server sends IAC DO NAWS
//! 2. Client answers IAC WILL NAWS
//! 3. Client immediately sends its size via sub-negotiation
//! 4. Client re-sends whenever its terminal is resized

use tracing::debug;

use super::{OptionHandler, Session};
use crate::error::Result;
use crate::protocol::OptionCode;

/// Terminal window size information
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WindowSize {
    /// Terminal width in characters
    pub width: u16,
    /// Terminal height in lines
    pub height: u16,
}

impl WindowSize {
    /// Create a new window size
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }

    /// Wire form: width then height, both big-endian
    pub fn to_bytes(self) -> [u8; 4] {
        let [w_hi, w_lo] = self.width.to_be_bytes();
        let [h_hi, h_lo] = self.height.to_be_bytes();
        [w_hi, w_lo, h_hi, h_lo]
    }

    /// Parse the 4-byte wire form
    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        match data {
            [w_hi, w_lo, h_hi, h_lo] => Some(Self {
                width: u16::from_be_bytes([*w_hi, *w_lo]),
                height: u16::from_be_bytes([*h_hi, *h_lo]),
            }),
            _ => None,
        }
    }

    /// Zero in either dimension means "unknown" per RFC 1073
    pub fn is_known(&self) -> bool {
        self.width > 0 && self.height > 0
    }
}

impl std::fmt::Display for WindowSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Post-acceptance handler for NAWS: sends the connection's current size
#[derive(Debug, Clone, Copy, Default)]
pub struct WindowSizeHandler;

impl OptionHandler for WindowSizeHandler {
    fn handle(&self, session: &mut dyn Session, _command: &[u8]) -> Result<()> {
        let size = session.window_size();
        debug!("Sending window size {}", size);
        session.send_subnegotiation(OptionCode::NAWS, None, &size.to_bytes())
    }
}
