//! # Telnet Protocol Constants and Types
//!
//! This module implements the wire vocabulary of the Telnet protocol as defined in:
//! - **RFC 854**: Telnet Protocol Specification
//! - **RFC 855**: Telnet Option Specifications
//!
//! ## Key Concepts from RFC 854:
//!
//! ### IAC (Interpret As Command) - Byte 255
//! The IAC byte (255/0xFF) signals that the following bytes should be interpreted
//! as Telnet commands rather than data. Any data byte with value 255 must be
//! escaped as IAC IAC (255 255).
//!
//! ### Command Structure
//! - For negotiation: `IAC WILL/WONT/DO/DONT <option>`
//! - For actions: `IAC <command>` (like IAC NOP)
//! - For sub-options (RFC 855): `IAC SB <option> <parameters...> IAC SE`

use std::fmt;

/// IAC - Interpret As Command (RFC 854, Section 4)
///
/// **Important**: Any data byte with value 255 must be escaped as two consecutive
/// IAC bytes (255 255) to distinguish it from command sequences.
pub const IAC: u8 = 255;

/// Telnet Commands (RFC 854, Section 4)
///
/// These commands follow the IAC byte to indicate specific protocol operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TelnetCommand {
    /// End of subnegotiation parameters (RFC 855)
    SE = 240,
    /// No Operation
    NOP = 241,
    /// Data Mark
    DM = 242,
    /// Break
    BRK = 243,
    /// Interrupt Process
    IP = 244,
    /// Abort Output
    AO = 245,
    /// Are You There
    AYT = 246,
    /// Erase Character
    EC = 247,
    /// Erase Line
    EL = 248,
    /// Go Ahead
    GA = 249,
    /// Subnegotiation Begin (RFC 855)
    SB = 250,
    /// WILL - sender wants to enable option
    WILL = 251,
    /// WON'T - sender refuses to enable or wants to disable option
    WONT = 252,
    /// DO - sender wants receiver to enable option
    DO = 253,
    /// DON'T - sender wants receiver to disable option or refuses request
    DONT = 254,
}

impl TelnetCommand {
    /// Convert a byte to a TelnetCommand if it represents a valid command
    ///
    /// # Example
    /// ```
    /// use telnet_negotiation::protocol::TelnetCommand;
    ///
    /// assert_eq!(TelnetCommand::from_byte(251), Some(TelnetCommand::WILL));
    /// assert_eq!(TelnetCommand::from_byte(100), None);
    /// ```
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            240 => Some(TelnetCommand::SE),
            241 => Some(TelnetCommand::NOP),
            242 => Some(TelnetCommand::DM),
            243 => Some(TelnetCommand::BRK),
            244 => Some(TelnetCommand::IP),
            245 => Some(TelnetCommand::AO),
            246 => Some(TelnetCommand::AYT),
            247 => Some(TelnetCommand::EC),
            248 => Some(TelnetCommand::EL),
            249 => Some(TelnetCommand::GA),
            250 => Some(TelnetCommand::SB),
            251 => Some(TelnetCommand::WILL),
            252 => Some(TelnetCommand::WONT),
            253 => Some(TelnetCommand::DO),
            254 => Some(TelnetCommand::DONT),
            _ => None,
        }
    }

    /// Convert command to its byte representation
    pub fn to_byte(self) -> u8 {
        self as u8
    }

    /// True for WILL, WONT, DO and DONT, the four negotiation verbs
    pub fn is_negotiation_verb(self) -> bool {
        matches!(
            self,
            TelnetCommand::WILL | TelnetCommand::WONT | TelnetCommand::DO | TelnetCommand::DONT
        )
    }

    /// True when `byte` is one of the four negotiation verbs
    pub fn is_verb_byte(byte: u8) -> bool {
        Self::from_byte(byte).is_some_and(Self::is_negotiation_verb)
    }
}

/// A Telnet option code.
///
/// Option codes are a single byte. Well-known codes are provided as associated
/// constants; any other byte is still a valid code and can be registered on a
/// connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OptionCode(pub u8);

impl OptionCode {
    /// Binary Transmission (RFC 856)
    pub const BINARY: OptionCode = OptionCode(0);
    /// Echo (RFC 857)
    pub const ECHO: OptionCode = OptionCode(1);
    /// Suppress Go Ahead (RFC 858)
    pub const SUPPRESS_GO_AHEAD: OptionCode = OptionCode(3);
    /// Status (RFC 859)
    pub const STATUS: OptionCode = OptionCode(5);
    /// Terminal Type (RFC 1091)
    pub const TERMINAL_TYPE: OptionCode = OptionCode(24);
    /// Negotiate About Window Size (RFC 1073)
    pub const NAWS: OptionCode = OptionCode(31);
    /// Terminal Speed (RFC 1079)
    pub const TERMINAL_SPEED: OptionCode = OptionCode(32);
    /// Remote Flow Control (RFC 1372)
    pub const REMOTE_FLOW_CONTROL: OptionCode = OptionCode(33);

    /// Byte value of this option code
    pub fn to_byte(self) -> u8 {
        self.0
    }

    /// Human readable name for well-known options
    pub fn name(self) -> Option<&'static str> {
        match self.0 {
            0 => Some("BINARY"),
            1 => Some("ECHO"),
            3 => Some("SUPPRESS-GO-AHEAD"),
            5 => Some("STATUS"),
            24 => Some("TERMINAL-TYPE"),
            31 => Some("NAWS"),
            32 => Some("TERMINAL-SPEED"),
            33 => Some("REMOTE-FLOW-CONTROL"),
            _ => None,
        }
    }
}

impl From<u8> for OptionCode {
    fn from(byte: u8) -> Self {
        OptionCode(byte)
    }
}

impl fmt::Display for OptionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{}({})", name, self.0),
            None => write!(f, "OPTION({})", self.0),
        }
    }
}

/// Sub-negotiation operation byte.
///
/// Operations are option-specific; `IS` and `SEND` are shared by Terminal Type
/// and Terminal Speed. A sub-negotiation without an operation byte (NAWS) is
/// expressed as `None` wherever an `Option<Operation>` is taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Operation(pub u8);

impl Operation {
    /// IS (0): the sender reports a value
    pub const IS: Operation = Operation(0);
    /// SEND (1): the sender asks for a value
    pub const SEND: Operation = Operation(1);
}

/// Build a 3-byte negotiation command: `IAC <verb> <option>`
pub fn negotiation(verb: TelnetCommand, option: OptionCode) -> [u8; 3] {
    [IAC, verb.to_byte(), option.to_byte()]
}

/// Build a sub-negotiation block: `IAC SB <option> [<operation>] <payload> IAC SE`
///
/// IAC bytes inside the payload are doubled so the block cannot terminate early.
pub fn subnegotiation(option: OptionCode, operation: Option<Operation>, payload: &[u8]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(payload.len() + 6);
    bytes.push(IAC);
    bytes.push(TelnetCommand::SB.to_byte());
    bytes.push(option.to_byte());
    if let Some(Operation(op)) = operation {
        bytes.push(op);
    }
    escape_iac_into(payload, &mut bytes);
    bytes.push(IAC);
    bytes.push(TelnetCommand::SE.to_byte());
    bytes
}

/// Append `data` to `out`, doubling every IAC byte
pub fn escape_iac_into(data: &[u8], out: &mut Vec<u8>) {
    for &byte in data {
        if byte == IAC {
            out.push(IAC);
        }
        out.push(byte);
    }
}

/// Collapse `IAC IAC` pairs back into single 255 bytes
pub fn unescape_iac(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len());
    let mut previous_iac = false;
    for &byte in data {
        if byte == IAC && previous_iac {
            previous_iac = false;
            continue;
        }
        previous_iac = byte == IAC;
        out.push(byte);
    }
    out
}
