//! Interactive session: bridges the local terminal and a telnet connection
//!
//! The main thread reads demultiplexed data from the connection and copies it
//! to stdout. A worker thread copies stdin to the connection through a
//! [`TcpWriter`](telnet_negotiation::TcpWriter), so typing never waits on the
//! server. Whichever side finishes first closes the socket, which unblocks the
//! other.

use std::io::{self, Read, Write};
use std::thread;

use telnet_negotiation::{Connection, TcpTransport, Transport};
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::errors::{ClientError, ClientResult};
use crate::terminal;

const COPY_BUFFER_SIZE: usize = 4096;

pub struct ClientSession {
    config: ClientConfig,
}

impl ClientSession {
    pub fn new(config: ClientConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Connect and run until either the server or stdin closes
    pub fn run(&mut self) -> ClientResult<()> {
        let mut conn = self.connect()?;

        let mut writer = conn.get_ref().writer();
        let input = thread::spawn(move || {
            let result = pump_input(io::stdin().lock(), &mut writer);
            if let Err(e) = writer.close() {
                debug!("Closing connection after stdin ended: {}", e);
            }
            result
        });

        let output = pump_output(&mut conn, io::stdout().lock());
        conn.close()?;
        info!("Connection closed");

        // A worker still blocked on stdin is left behind; the process is exiting
        if input.is_finished() {
            match input.join() {
                Ok(Err(e)) => warn!("Input stopped with an error: {}", e),
                Ok(Ok(sent)) => debug!("Sent {} bytes from stdin", sent),
                Err(_) => warn!("Input thread panicked"),
            }
        }

        output.map(|received| debug!("Received {} bytes", received))
    }

    /// Open the connection and perform the client's opening moves. The window
    /// size goes out once the server asks for NAWS.
    pub fn connect(&self) -> ClientResult<Connection<TcpTransport>> {
        let (width, height) = terminal::window_size(&self.config.terminal);
        let address = self.config.address();
        info!("Connecting to {} ({}x{})", address, width, height);

        let mut conn = self
            .config
            .connection_builder(width, height)
            .connect(address.as_str())?;

        if self.config.negotiation.disable_remote_echo {
            conn.disable_remote_echo()?;
        }
        Ok(conn)
    }
}

/// Copy demultiplexed server data to `out` until end of stream.
///
/// Returns the number of bytes copied. A connection that was closed from the
/// other side counts as a normal end.
pub fn pump_output<T, W>(conn: &mut Connection<T>, mut out: W) -> ClientResult<u64>
where
    T: Transport,
    W: Write,
{
    let mut buf = [0u8; COPY_BUFFER_SIZE];
    let mut total = 0u64;
    loop {
        let n = match conn.read_data(&mut buf) {
            Ok(0) => return Ok(total),
            Ok(n) => n,
            Err(e) if e.is_not_ready() => return Ok(total),
            Err(e) => match ClientError::from(e) {
                ClientError::Disconnected => return Ok(total),
                err => return Err(err),
            },
        };
        out.write_all(&buf[..n])?;
        out.flush()?;
        total += n as u64;
    }
}

/// Copy local input to the connection until `input` ends.
///
/// Line endings go out as CR LF. Returns the number of input bytes consumed.
pub fn pump_input<R, W>(mut input: R, out: &mut W) -> ClientResult<u64>
where
    R: Read,
    W: Write,
{
    let mut buf = [0u8; COPY_BUFFER_SIZE];
    let mut line = Vec::with_capacity(COPY_BUFFER_SIZE * 2);
    let mut last = 0u8;
    let mut total = 0u64;
    loop {
        let n = match input.read(&mut buf) {
            Ok(0) => return Ok(total),
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        };

        line.clear();
        for &byte in &buf[..n] {
            if byte == b'\n' && last != b'\r' {
                line.push(b'\r');
            }
            line.push(byte);
            last = byte;
        }
        out.write_all(&line)?;
        out.flush()?;
        total += n as u64;
    }
}
