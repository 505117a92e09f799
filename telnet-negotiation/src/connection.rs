//! # Connection - Transparent Telnet Client Session
//!
//! `Connection` wraps a transport and handles Telnet protocol processing
//! inline with every read:
//!
//! - Reads return clean application data; control sequences are stripped.
//! - Negotiation requests are answered from the option table as they arrive.
//! - Sub-negotiations are dispatched to the owning option's handler.
//! - Writes pass application data straight through to the transport.
//!
//! ```rust,no_run
//! use std::io::{Read, Write};
//! use telnet_negotiation::Connection;
//!
//! fn main() -> telnet_negotiation::Result<()> {
//!     let mut conn = Connection::connect("127.0.0.1:2323")?;
//!     conn.set_window_size(80, 24)?;
//!     conn.write_all(b"USER admin\r\n")?;
//!
//!     let mut buffer = [0; 1024];
//!     let n = conn.read(&mut buffer)?;
//!     // buffer[..n] contains only application data
//!     conn.close()?;
//!     Ok(())
//! }
//! ```
//!
//! ## Internal Architecture
//!
//! `Connection` maintains:
//! - `Demultiplexer`: separates commands from data, byte by byte
//! - `OptionTable`: the per-option policy and handlers
//! - an output queue holding data the caller has not read yet
//! - the window size reported through NAWS

use std::collections::VecDeque;
use std::io::{self, Read, Write};
use std::net::ToSocketAddrs;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, trace, warn};

use crate::demux::{Demultiplexer, Demuxed, StreamState};
use crate::error::{Result, TelnetError};
use crate::negotiation::{OptionEntry, OptionTable};
use crate::options::{
    DEFAULT_TERMINAL_SPEED, Environment, OptionHandler, ProcessEnvironment, Session,
    TerminalSpeedHandler, TerminalTypeHandler, WindowSize, WindowSizeHandler,
};
use crate::protocol::{
    IAC, OptionCode, Operation, TelnetCommand, escape_iac_into, negotiation, subnegotiation,
};
use crate::transport::{TcpTransport, Transport};

/// Size of each transport read
pub const DEFAULT_READ_BUFFER_SIZE: usize = 1024;

/// A Telnet client session over one transport
pub struct Connection<T: Transport> {
    /// Underlying byte stream
    transport: T,

    /// Byte-level state machine, also carrying the ready / not-ready lifecycle
    demux: Demultiplexer,

    /// Per-option negotiation policy
    options: OptionTable,

    /// Reported through NAWS
    window_size: WindowSize,

    /// Demultiplexed data not yet handed to the caller
    output: VecDeque<u8>,

    /// Error to report on the next read, after already buffered data was returned
    pending_error: Option<TelnetError>,

    read_buffer_size: usize,

    /// Double IAC bytes in application writes
    escape_outbound: bool,
}

impl Connection<TcpTransport> {
    /// Connect over TCP and set up the default option table
    pub fn connect<A: ToSocketAddrs>(addr: A) -> Result<Self> {
        ConnectionBuilder::new().connect(addr)
    }

    /// Start configuring a connection
    pub fn builder() -> ConnectionBuilder {
        ConnectionBuilder::new()
    }
}

impl<T: Transport> Connection<T> {
    /// Wrap `transport` with the default option table
    pub fn new(transport: T) -> Self {
        ConnectionBuilder::new().build(transport)
    }

    /// Wrap `transport` with an empty option table: every request is declined
    pub fn bare(transport: T) -> Self {
        let mut connection = Self::unready(transport);
        connection.demux.set_ready();
        connection
    }

    fn unready(transport: T) -> Self {
        Self {
            transport,
            demux: Demultiplexer::new(),
            options: OptionTable::new(),
            window_size: WindowSize::default(),
            output: VecDeque::new(),
            pending_error: None,
            read_buffer_size: DEFAULT_READ_BUFFER_SIZE,
            escape_outbound: false,
        }
    }

    /// Register an option. A later registration for the same code replaces it.
    pub fn add_option(
        &mut self,
        code: OptionCode,
        we_will: bool,
        peer_do: bool,
        subnegotiation: Option<Arc<dyn OptionHandler>>,
        on_accept: Option<Arc<dyn OptionHandler>>,
    ) {
        self.options.insert(
            code,
            OptionEntry {
                we_will,
                peer_do,
                subnegotiation,
                on_accept,
            },
        );
    }

    /// Configured option table
    pub fn options(&self) -> &OptionTable {
        &self.options
    }

    /// Current demultiplexer state
    pub fn state(&self) -> StreamState {
        self.demux.state()
    }

    /// True until the connection is closed or torn down
    pub fn is_ready(&self) -> bool {
        self.demux.is_ready()
    }

    /// Window size reported through NAWS
    pub fn window_size(&self) -> WindowSize {
        self.window_size
    }

    /// Store a new window size and report it right away when NAWS is configured
    /// with a post-acceptance handler
    pub fn set_window_size(&mut self, width: u16, height: u16) -> Result<()> {
        self.window_size = WindowSize::new(width, height);
        let handler = self
            .options
            .get(OptionCode::NAWS)
            .and_then(|entry| entry.on_accept.clone());
        match handler {
            Some(handler) => handler.handle(self, &[]),
            None => Ok(()),
        }
    }

    /// Ask the peer to stop echoing: `IAC DONT ECHO`
    pub fn disable_remote_echo(&mut self) -> Result<()> {
        self.send_negotiation(TelnetCommand::DONT, OptionCode::ECHO)
    }

    /// Underlying transport
    pub fn get_ref(&self) -> &T {
        &self.transport
    }

    /// Mutable access to the transport.
    ///
    /// **Warning**: Direct access bypasses telnet processing. Use with caution.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Close the transport and enter the not-ready state. Idempotent.
    pub fn close(&mut self) -> Result<()> {
        self.demux.shutdown();
        self.output.clear();
        self.pending_error = None;
        self.transport.close()?;
        Ok(())
    }

    /// Read demultiplexed application data.
    ///
    /// Blocks until at least one data byte is available, the stream ends
    /// (`Ok(0)`), or an error occurs. If a negotiation reply fails after some
    /// data was already decoded, that data is returned first and the error on
    /// the following call.
    pub fn read_data(&mut self, buf: &mut [u8]) -> Result<usize> {
        if let Some(err) = self.pending_error.take() {
            return Err(err);
        }
        if !self.demux.is_ready() {
            return Err(TelnetError::NotReady);
        }
        if buf.is_empty() {
            return Ok(0);
        }

        let mut raw = vec![0u8; self.read_buffer_size];
        loop {
            if !self.output.is_empty() {
                return Ok(self.drain_output(buf));
            }

            let n = match self.transport.read(&mut raw) {
                Ok(0) => return Ok(0),
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };
            trace!("Read {} raw bytes", n);

            let mut decoded = Vec::with_capacity(n);
            let result = self.process_commands(&raw[..n], &mut decoded);
            self.output.extend(decoded);

            if let Err(err) = result {
                self.teardown(&err);
                if self.output.is_empty() {
                    return Err(err);
                }
                self.pending_error = Some(err);
                return Ok(self.drain_output(buf));
            }
        }
    }

    /// Write application data to the transport
    pub fn write_data(&mut self, buf: &[u8]) -> Result<usize> {
        if !self.demux.is_ready() {
            return Err(TelnetError::NotReady);
        }
        if self.escape_outbound && buf.contains(&IAC) {
            let mut escaped = Vec::with_capacity(buf.len() + 8);
            escape_iac_into(buf, &mut escaped);
            self.transport.write_all(&escaped)?;
            return Ok(buf.len());
        }
        Ok(self.transport.write(buf)?)
    }

    /// Run raw transport bytes through the demultiplexer.
    ///
    /// Plain data is appended to `output`; complete commands are negotiated
    /// immediately. Fails without touching `output` when not ready. A failed
    /// reply stops processing; data decoded before it stays in `output`.
    pub fn process_commands(&mut self, input: &[u8], output: &mut Vec<u8>) -> Result<()> {
        if !self.demux.is_ready() {
            return Err(TelnetError::NotReady);
        }
        for &byte in input {
            match self.demux.feed(byte)? {
                Demuxed::Data(b) => output.push(b),
                Demuxed::Pending => {}
                Demuxed::Command(command) => self.negotiate(&command)?,
            }
        }
        Ok(())
    }

    /// React to one complete control command
    fn negotiate(&mut self, command: &[u8]) -> Result<()> {
        let Some(&verb) = command.get(1) else {
            return Err(TelnetError::MalformedCommand(command.to_vec()));
        };

        match TelnetCommand::from_byte(verb) {
            Some(TelnetCommand::DO) => {
                let option = option_code(command)?;
                let reply = self.options.reply_to_do(option);
                debug!("Received DO {}, answering {:?}", option, reply);
                self.send_negotiation(reply, option)?;

                let handler = self
                    .options
                    .get(option)
                    .and_then(|entry| entry.on_accept.clone());
                if let Some(handler) = handler {
                    handler.handle(self, command)?;
                }
                Ok(())
            }

            Some(TelnetCommand::WILL) => {
                let option = option_code(command)?;
                let reply = self.options.reply_to_will(option);
                debug!("Received WILL {}, answering {:?}", option, reply);
                self.send_negotiation(reply, option)
            }

            Some(TelnetCommand::SB) => {
                let option = option_code(command)?;
                let handler = self
                    .options
                    .get(option)
                    .and_then(|entry| entry.subnegotiation.clone());
                match handler {
                    Some(handler) => handler.handle(self, command),
                    None => {
                        debug!(
                            "Ignoring sub-negotiation for {} ({} bytes), no handler",
                            option,
                            command.len()
                        );
                        Ok(())
                    }
                }
            }

            Some(TelnetCommand::WONT) | Some(TelnetCommand::DONT) => {
                debug!("Peer acknowledged/refused: {:?}", command);
                Ok(())
            }

            _ => {
                trace!("Ignoring command {:?}", command);
                Ok(())
            }
        }
    }

    fn drain_output(&mut self, buf: &mut [u8]) -> usize {
        let n = buf.len().min(self.output.len());
        for (slot, byte) in buf.iter_mut().zip(self.output.drain(..n)) {
            *slot = byte;
        }
        n
    }

    /// A reply could not be written: the session is unusable
    fn teardown(&mut self, err: &TelnetError) {
        warn!("Telnet negotiation failed, closing connection: {}", err);
        self.demux.shutdown();
        if let Err(e) = self.transport.close() {
            debug!("Closing transport after failure: {}", e);
        }
    }

    fn write_command(&mut self, bytes: &[u8]) -> Result<()> {
        if !self.demux.is_ready() {
            return Err(TelnetError::NotReady);
        }
        self.transport.write_all(bytes)?;
        Ok(())
    }
}

fn option_code(command: &[u8]) -> Result<OptionCode> {
    command
        .get(2)
        .map(|&byte| OptionCode(byte))
        .ok_or_else(|| TelnetError::MalformedCommand(command.to_vec()))
}

impl<T: Transport> Session for Connection<T> {
    fn send_subnegotiation(
        &mut self,
        option: OptionCode,
        operation: Option<Operation>,
        payload: &[u8],
    ) -> Result<()> {
        self.write_command(&subnegotiation(option, operation, payload))
    }

    fn send_negotiation(&mut self, verb: TelnetCommand, option: OptionCode) -> Result<()> {
        self.write_command(&negotiation(verb, option))
    }

    fn window_size(&self) -> WindowSize {
        self.window_size
    }
}

impl<T: Transport> Read for Connection<T> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Ok(self.read_data(buf)?)
    }
}

impl<T: Transport> Write for Connection<T> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(self.write_data(buf)?)
    }

    fn flush(&mut self) -> io::Result<()> {
        if !self.demux.is_ready() {
            return Err(TelnetError::NotReady.into());
        }
        self.transport.flush()
    }
}

impl<T: Transport> std::fmt::Debug for Connection<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("state", &self.demux.state())
            .field("options", &self.options)
            .field("window_size", &self.window_size)
            .field("buffered", &self.output.len())
            .finish_non_exhaustive()
    }
}

/// Configures a [`Connection`] before it becomes ready
///
/// The default option table is:
///
/// | Option              | WILL | DO  | Handler                     |
/// |---------------------|------|-----|-----------------------------|
/// | BINARY              | no   | no  |                             |
/// | ECHO                | no   | yes |                             |
/// | SUPPRESS-GO-AHEAD   | yes  | yes |                             |
/// | STATUS              | no   | no  |                             |
/// | TERMINAL-TYPE       | yes  | yes | `TERM` from the environment |
/// | NAWS                | yes  | yes | window size on acceptance   |
/// | TERMINAL-SPEED      | yes  | yes | fixed speed string          |
/// | REMOTE-FLOW-CONTROL | no   | no  |                             |
pub struct ConnectionBuilder {
    environment: Arc<dyn Environment>,
    terminal_speed: String,
    window_size: WindowSize,
    read_buffer_size: usize,
    escape_outbound: bool,
    connect_timeout: Option<Duration>,
    overrides: Vec<(OptionCode, OptionEntry)>,
}

impl ConnectionBuilder {
    /// Default option table, the process environment and an unknown (0x0)
    /// window size
    pub fn new() -> Self {
        Self {
            environment: Arc::new(ProcessEnvironment),
            terminal_speed: DEFAULT_TERMINAL_SPEED.to_string(),
            window_size: WindowSize::default(),
            read_buffer_size: DEFAULT_READ_BUFFER_SIZE,
            escape_outbound: false,
            connect_timeout: None,
            overrides: Vec::new(),
        }
    }

    /// Where the terminal type is looked up
    pub fn environment(mut self, environment: Arc<dyn Environment>) -> Self {
        self.environment = environment;
        self
    }

    /// Value answered to TERMINAL-SPEED SEND
    pub fn terminal_speed(mut self, speed: impl Into<String>) -> Self {
        self.terminal_speed = speed.into();
        self
    }

    /// Initial window size, sent once the peer asks for NAWS
    pub fn window_size(mut self, width: u16, height: u16) -> Self {
        self.window_size = WindowSize::new(width, height);
        self
    }

    /// Bytes requested per transport read. Zero is bumped to one.
    pub fn read_buffer_size(mut self, size: usize) -> Self {
        self.read_buffer_size = size.max(1);
        self
    }

    /// Double IAC bytes in application writes
    pub fn escape_outbound_iac(mut self, escape: bool) -> Self {
        self.escape_outbound = escape;
        self
    }

    /// Bound each TCP connection attempt
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Register an option after the defaults; replaces a default with the same code
    pub fn option(mut self, code: OptionCode, entry: OptionEntry) -> Self {
        self.overrides.push((code, entry));
        self
    }

    /// Connect over TCP
    pub fn connect<A: ToSocketAddrs>(self, addr: A) -> Result<Connection<TcpTransport>> {
        let transport = TcpTransport::connect(addr, self.connect_timeout)?;
        debug!("Connected to {:?}", transport.peer_addr().ok());
        Ok(self.build(transport))
    }

    /// Wrap an existing transport
    pub fn build<T: Transport>(self, transport: T) -> Connection<T> {
        let mut connection = Connection::unready(transport);
        connection.window_size = self.window_size;
        connection.read_buffer_size = self.read_buffer_size;
        connection.escape_outbound = self.escape_outbound;

        connection.add_option(OptionCode::BINARY, false, false, None, None);
        connection.add_option(OptionCode::ECHO, false, true, None, None);
        connection.add_option(OptionCode::SUPPRESS_GO_AHEAD, true, true, None, None);
        connection.add_option(OptionCode::STATUS, false, false, None, None);
        connection.add_option(
            OptionCode::TERMINAL_TYPE,
            true,
            true,
            Some(Arc::new(TerminalTypeHandler::new(self.environment))),
            None,
        );
        connection.add_option(
            OptionCode::NAWS,
            true,
            true,
            None,
            Some(Arc::new(WindowSizeHandler)),
        );
        connection.add_option(
            OptionCode::TERMINAL_SPEED,
            true,
            true,
            Some(Arc::new(TerminalSpeedHandler::new(self.terminal_speed))),
            None,
        );
        connection.add_option(OptionCode::REMOTE_FLOW_CONTROL, false, false, None, None);

        for (code, entry) in self.overrides {
            connection.options.insert(code, entry);
        }

        connection.demux.set_ready();
        connection
    }
}

impl Default for ConnectionBuilder {
    fn default() -> Self {
        Self::new()
    }
}
