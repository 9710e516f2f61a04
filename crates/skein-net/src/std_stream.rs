//! [`NetworkStream`] over `std::net::TcpStream`.

use std::io::{Read, Write};
use std::net::{Shutdown, TcpStream, ToSocketAddrs};
use std::time::Duration;

use skein_types::error::{Result, SkeinError};
use skein_types::stream::NetworkStream;

/// A blocking TCP connection.
pub struct StdNetworkStream {
    stream: TcpStream,
    closed: bool,
}

impl StdNetworkStream {
    pub fn new(stream: TcpStream) -> Self {
        Self {
            stream,
            closed: false,
        }
    }
}

impl NetworkStream for StdNetworkStream {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        Ok(self.stream.read(buf)?)
    }

    fn write(&mut self, data: &[u8]) -> Result<usize> {
        Ok(self.stream.write(data)?)
    }

    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        match self.stream.shutdown(Shutdown::Both) {
            Ok(()) => Ok(()),
            // The peer may already have torn the connection down.
            Err(e) if e.kind() == std::io::ErrorKind::NotConnected => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Resolve `host:port` and open a TCP connection with connect and read
/// timeouts applied.
pub fn tcp_connect(
    host: &str,
    port: u16,
    connect_timeout: Duration,
    read_timeout: Duration,
) -> Result<StdNetworkStream> {
    let addr = (host, port)
        .to_socket_addrs()
        .map_err(|e| SkeinError::Connection(format!("DNS resolution failed for {host}: {e}")))?
        .next()
        .ok_or_else(|| SkeinError::Connection(format!("no addresses for {host}:{port}")))?;

    log::debug!("connecting to {addr} ({host}:{port})");
    let stream = TcpStream::connect_timeout(&addr, connect_timeout)
        .map_err(|e| SkeinError::Connection(format!("TCP connect to {host}:{port} failed: {e}")))?;

    stream
        .set_read_timeout(Some(read_timeout))
        .map_err(|e| SkeinError::Connection(format!("set read timeout: {e}")))?;

    Ok(StdNetworkStream::new(stream))
}
