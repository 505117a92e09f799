//! # Telnet Option Handlers
//!
//! Handlers run when the negotiation engine needs option-specific behaviour:
//! either a sub-negotiation block arrived for the option, or we just answered
//! the peer's `DO` for it (post-acceptance).
//!
//! ## Implemented Options
//!
//! ### Terminal Type (RFC 1091)
//! Answers `SEND` with `IS <terminal type>` taken from the environment.
//!
//! ### NAWS - Negotiate About Window Size (RFC 1073)
//! Reports the window size as soon as the peer's `DO NAWS` is accepted.
//!
//! ### Terminal Speed (RFC 1079)
//! Answers `SEND` with `IS <transmit>,<receive>`.
//!
//! ## Architecture
//!
//! Handlers never own the connection. They get a [`Session`], a handle onto the
//! connection that owns the option table, and write replies through it.
//! Any closure with the right signature is also a handler.

pub mod naws;
pub mod terminal_speed;
pub mod terminal_type;

pub use naws::{WindowSize, WindowSizeHandler};
pub use terminal_speed::{DEFAULT_TERMINAL_SPEED, TerminalSpeedHandler};
pub use terminal_type::{Environment, ProcessEnvironment, TerminalTypeHandler};

use crate::error::Result;
use crate::protocol::{IAC, OptionCode, Operation, TelnetCommand, unescape_iac};

/// Handle given to option handlers onto the connection that invoked them
pub trait Session {
    /// Send `IAC SB <option> [<operation>] <payload> IAC SE`
    fn send_subnegotiation(
        &mut self,
        option: OptionCode,
        operation: Option<Operation>,
        payload: &[u8],
    ) -> Result<()>;

    /// Send a 3-byte negotiation command
    fn send_negotiation(&mut self, verb: TelnetCommand, option: OptionCode) -> Result<()>;

    /// Window size currently stored on the connection
    fn window_size(&self) -> WindowSize;
}

/// Option-specific behaviour invoked by the negotiation engine
///
/// `command` is the complete control sequence that triggered the call: the full
/// `IAC SB <option> ... IAC SE` block for sub-negotiations, the received
/// `IAC DO <option>` for post-acceptance handlers, or empty when the
/// connection re-sends on its own (window-size updates).
pub trait OptionHandler: Send + Sync {
    fn handle(&self, session: &mut dyn Session, command: &[u8]) -> Result<()>;
}

impl<F> OptionHandler for F
where
    F: Fn(&mut dyn Session, &[u8]) -> Result<()> + Send + Sync,
{
    fn handle(&self, session: &mut dyn Session, command: &[u8]) -> Result<()> {
        self(session, command)
    }
}

/// Borrowed view of a complete `IAC SB <option> ... IAC SE` block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subnegotiation<'a> {
    option: OptionCode,
    /// Bytes between the option code and the trailing `IAC SE`, still escaped
    body: &'a [u8],
}

impl<'a> Subnegotiation<'a> {
    /// Parse a full block. Returns `None` unless the framing is intact.
    pub fn parse(command: &'a [u8]) -> Option<Self> {
        match command {
            [IAC, sb, option, body @ .., IAC, se]
                if *sb == TelnetCommand::SB.to_byte() && *se == TelnetCommand::SE.to_byte() =>
            {
                Some(Self {
                    option: OptionCode(*option),
                    body,
                })
            }
            _ => None,
        }
    }

    /// Option the block belongs to
    pub fn option(&self) -> OptionCode {
        self.option
    }

    /// First body byte, if any
    pub fn operation(&self) -> Option<Operation> {
        self.body.first().map(|&byte| Operation(byte))
    }

    /// Body after the operation byte, with `IAC IAC` collapsed
    pub fn value(&self) -> Vec<u8> {
        self.body.get(1..).map(unescape_iac).unwrap_or_default()
    }

    /// Whole body with `IAC IAC` collapsed, for options without an operation byte
    pub fn payload(&self) -> Vec<u8> {
        unescape_iac(self.body)
    }
}
