//! # Telnet Negotiation Library
//!
//! Client-side Telnet protocol handling as defined in:
//! - RFC 854: Telnet Protocol Specification (https://tools.ietf.org/html/rfc854)
//! - RFC 855: Telnet Option Specifications
//! - Option-specific RFCs (1073, 1079, 1091)
//!
//! ## Architecture Overview
//!
//! The library is organized into several modules:
//! - `protocol`: Telnet constants, commands and option codes (RFC 854)
//! - `demux`: byte-level separation of application data and commands
//! - `negotiation`: per-option policy table
//! - `options`: Terminal Type, NAWS and Terminal Speed handlers
//! - `transport`: the byte stream underneath, with a TCP implementation
//! - [`Connection`]: ties them together behind `Read`/`Write`
//!
//! ```rust,no_run
//! use std::io::Read;
//! use telnet_negotiation::Connection;
//!
//! # fn main() -> telnet_negotiation::Result<()> {
//! let mut conn = Connection::builder()
//!     .window_size(120, 40)
//!     .connect("bbs.example.org:23")?;
//!
//! let mut buf = [0u8; 1024];
//! let n = conn.read(&mut buf)?;
//! println!("{}", String::from_utf8_lossy(&buf[..n]));
//! # Ok(())
//! # }
//! ```

mod connection;
pub mod demux;
pub mod error;
pub mod negotiation;
pub mod options;
pub mod protocol;
pub mod transport;

pub use connection::{Connection, ConnectionBuilder, DEFAULT_READ_BUFFER_SIZE};
pub use demux::{Demultiplexer, StreamState};
pub use error::{Result, TelnetError};
pub use negotiation::{OptionEntry, OptionTable};
pub use options::{
    Environment, OptionHandler, ProcessEnvironment, Session, TerminalSpeedHandler,
    TerminalTypeHandler, WindowSize, WindowSizeHandler,
};
pub use protocol::{IAC, OptionCode, Operation, TelnetCommand};
pub use transport::{TcpTransport, TcpWriter, Transport};

/// Library version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Supported Telnet RFCs
pub const SUPPORTED_RFCS: &[&str] = &[
    "RFC 854 - Telnet Protocol Specification",
    "RFC 855 - Telnet Option Specifications",
    "RFC 1073 - Telnet Window Size Option",
    "RFC 1079 - Telnet Terminal Speed Option",
    "RFC 1091 - Telnet Terminal-Type Option",
];
