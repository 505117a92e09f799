//! # Telnet Stream Demultiplexer
//!
//! This module splits the raw byte stream coming from the transport into plain
//! application data and complete Telnet control commands, according to
//! **RFC 854** (Telnet Protocol Specification) and **RFC 855** (sub-options).
//!
//! ## IAC State Machine
//! - **Data**: normal data bytes; IAC starts a command
//! - **InIac**: found 255, the next byte decides what the command is
//! - **InSubnegotiation**: copying an `IAC SB ... IAC SE` block
//! - **InSubnegotiationEscape**: found 255 inside a block, expecting SE or IAC
//! - **NotReady**: the connection is not usable; any byte is an error
//!
//! ## Command Sequences
//! - Negotiation: `IAC <WILL|WONT|DO|DONT> <option>` (3 bytes)
//! - Sub-negotiation: `IAC SB <option> <data...> IAC SE`
//! - Short command: `IAC <command>` (e.g. IAC NOP, IAC GA)
//! - Escaped data: `IAC IAC` (represents data byte 255)
//!
//! The pending command buffer lives in the demultiplexer, so a command split
//! across two transport reads is reassembled.

use crate::error::{Result, TelnetError};
use crate::protocol::{IAC, TelnetCommand};

/// Demultiplexer state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StreamState {
    /// Expecting normal data or IAC byte
    Data,
    /// Found IAC (255), expecting command byte (or the option byte after a verb)
    InIac,
    /// Inside a sub-negotiation block
    InSubnegotiation,
    /// Found IAC inside a sub-negotiation block
    InSubnegotiationEscape,
    /// Connection not set up or already closed
    #[default]
    NotReady,
}

/// What a single input byte turned into
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Demuxed {
    /// A plain data byte for the application
    Data(u8),
    /// A complete control command, ready for the negotiation engine
    Command(Vec<u8>),
    /// The byte was absorbed into a pending command
    Pending,
}

/// Byte-at-a-time Telnet stream demultiplexer
#[derive(Debug, Clone, Default)]
pub struct Demultiplexer {
    state: StreamState,
    /// Bytes of the command currently being assembled
    pending: Vec<u8>,
}

impl Demultiplexer {
    /// Create a demultiplexer in the not-ready state
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state
    pub fn state(&self) -> StreamState {
        self.state
    }

    /// True unless the demultiplexer is in the not-ready state
    pub fn is_ready(&self) -> bool {
        self.state != StreamState::NotReady
    }

    /// Move from not-ready to the data state. No-op when already ready.
    pub fn set_ready(&mut self) {
        if self.state == StreamState::NotReady {
            self.state = StreamState::Data;
        }
    }

    /// Force the not-ready state, discarding any partially assembled command
    pub fn shutdown(&mut self) {
        self.state = StreamState::NotReady;
        self.pending.clear();
    }

    /// Number of bytes buffered for the command being assembled
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Feed one byte through the state machine
    pub fn feed(&mut self, byte: u8) -> Result<Demuxed> {
        match self.state {
            StreamState::NotReady => Err(TelnetError::NotReady),

            StreamState::Data => {
                if byte == IAC {
                    self.pending.clear();
                    self.pending.push(byte);
                    self.state = StreamState::InIac;
                    Ok(Demuxed::Pending)
                } else {
                    Ok(Demuxed::Data(byte))
                }
            }

            StreamState::InIac => {
                // IAC <verb> already buffered: this byte is the option code,
                // whatever its value.
                if self.pending.len() >= 2 {
                    self.pending.push(byte);
                    return Ok(self.complete());
                }

                if TelnetCommand::is_verb_byte(byte) {
                    self.pending.push(byte);
                    Ok(Demuxed::Pending)
                } else if byte == IAC {
                    self.pending.clear();
                    self.state = StreamState::Data;
                    Ok(Demuxed::Data(IAC))
                } else if byte == TelnetCommand::SB.to_byte() {
                    self.pending.push(byte);
                    self.state = StreamState::InSubnegotiation;
                    Ok(Demuxed::Pending)
                } else {
                    self.pending.push(byte);
                    Ok(self.complete())
                }
            }

            StreamState::InSubnegotiation => {
                self.pending.push(byte);
                if byte == IAC {
                    self.state = StreamState::InSubnegotiationEscape;
                }
                Ok(Demuxed::Pending)
            }

            StreamState::InSubnegotiationEscape => {
                self.pending.push(byte);
                if byte == TelnetCommand::SE.to_byte() {
                    Ok(self.complete())
                } else {
                    // IAC IAC is a literal 255 in the payload; anything else is
                    // not a valid terminator, keep copying.
                    self.state = StreamState::InSubnegotiation;
                    Ok(Demuxed::Pending)
                }
            }
        }
    }

    fn complete(&mut self) -> Demuxed {
        self.state = StreamState::Data;
        Demuxed::Command(std::mem::take(&mut self.pending))
    }
}
