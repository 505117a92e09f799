//! # Transports
//!
//! A transport is any blocking bidirectional byte stream that can be closed.
//! Closing must be idempotent and must make pending and future reads and
//! writes fail promptly; this is the only way to cancel a blocked read.
//!
//! [`TcpTransport`] shares its write half behind a mutex so a second thread can
//! write application data through a [`TcpWriter`] while the connection's owner
//! is blocked reading. Negotiation replies and application writes then never
//! interleave inside a single command.

use std::io::{self, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tracing::debug;

use crate::error::{NOT_READY_MESSAGE, Result};

/// Byte stream a [`Connection`](crate::Connection) runs over
pub trait Transport: Read + Write {
    /// Close the stream. Calling it again is not an error.
    fn close(&mut self) -> io::Result<()>;
}

impl Transport for TcpStream {
    fn close(&mut self) -> io::Result<()> {
        shutdown_quietly(self)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn close(&mut self) -> io::Result<()> {
        (**self).close()
    }
}

fn shutdown_quietly(stream: &TcpStream) -> io::Result<()> {
    match stream.shutdown(Shutdown::Both) {
        Err(e) if e.kind() != io::ErrorKind::NotConnected => Err(e),
        _ => Ok(()),
    }
}

/// TCP transport whose write half can be shared with other threads
#[derive(Debug)]
pub struct TcpTransport {
    reader: TcpStream,
    writer: Arc<Mutex<TcpStream>>,
    closed: Arc<AtomicBool>,
}

impl TcpTransport {
    /// Connect to `addr`, optionally bounded by `timeout` per resolved address
    pub fn connect<A: ToSocketAddrs>(addr: A, timeout: Option<Duration>) -> Result<Self> {
        let stream = match timeout {
            None => TcpStream::connect(addr)?,
            Some(timeout) => connect_with_timeout(addr, timeout)?,
        };
        Self::from_stream(stream)
    }

    /// Wrap an already connected stream
    pub fn from_stream(stream: TcpStream) -> Result<Self> {
        stream.set_nodelay(true)?;
        let writer = stream.try_clone()?;
        Ok(Self {
            reader: stream,
            writer: Arc::new(Mutex::new(writer)),
            closed: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Cloneable write handle for another thread
    pub fn writer(&self) -> TcpWriter {
        TcpWriter {
            stream: Arc::clone(&self.writer),
            closed: Arc::clone(&self.closed),
        }
    }

    /// Address of the remote peer
    pub fn peer_addr(&self) -> io::Result<SocketAddr> {
        self.reader.peer_addr()
    }

    /// Set the read timeout of the underlying socket
    pub fn set_read_timeout(&self, dur: Option<Duration>) -> io::Result<()> {
        self.reader.set_read_timeout(dur)
    }

    fn lock_writer(&self) -> io::Result<MutexGuard<'_, TcpStream>> {
        lock(&self.writer)
    }
}

fn connect_with_timeout<A: ToSocketAddrs>(addr: A, timeout: Duration) -> io::Result<TcpStream> {
    let mut last_error = None;
    for candidate in addr.to_socket_addrs()? {
        match TcpStream::connect_timeout(&candidate, timeout) {
            Ok(stream) => return Ok(stream),
            Err(e) => {
                debug!("Connecting to {} failed: {}", candidate, e);
                last_error = Some(e);
            }
        }
    }
    Err(last_error.unwrap_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, "address resolved to nothing")
    }))
}

fn lock(stream: &Mutex<TcpStream>) -> io::Result<MutexGuard<'_, TcpStream>> {
    stream
        .lock()
        .map_err(|_| io::Error::other("telnet writer lock poisoned"))
}

impl Read for TcpTransport {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.reader.read(buf)
    }
}

impl Write for TcpTransport {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        // Whole buffer under one lock so commands stay contiguous on the wire
        self.lock_writer()?.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.lock_writer()?.flush()
    }
}

impl Transport for TcpTransport {
    fn close(&mut self) -> io::Result<()> {
        self.closed.store(true, Ordering::SeqCst);
        shutdown_quietly(&self.reader)
    }
}

/// Write handle onto a [`TcpTransport`]
///
/// Fails with the not-ready error once either side closed the transport.
#[derive(Debug, Clone)]
pub struct TcpWriter {
    stream: Arc<Mutex<TcpStream>>,
    closed: Arc<AtomicBool>,
}

impl TcpWriter {
    /// True once the transport was closed
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Close the shared socket, unblocking the reading side
    pub fn close(&self) -> io::Result<()> {
        self.closed.store(true, Ordering::SeqCst);
        shutdown_quietly(&*lock(&self.stream)?)
    }

    fn check_open(&self) -> io::Result<()> {
        if self.is_closed() {
            return Err(io::Error::new(io::ErrorKind::NotConnected, NOT_READY_MESSAGE));
        }
        Ok(())
    }
}

impl Write for TcpWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.check_open()?;
        lock(&self.stream)?.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.check_open()?;
        lock(&self.stream)?.flush()
    }
}
