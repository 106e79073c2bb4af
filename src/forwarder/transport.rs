//! Transport primitives for the syslog forwarder.

use std::{
    io::{self, Write},
    net::{SocketAddr, TcpStream, ToSocketAddrs},
    time::Duration,
};

/// An open byte stream to the collector.
pub trait Connection: Write + Send {
    /// Apply the read/write deadline used for subsequent I/O.
    fn set_io_timeout(&mut self, timeout: Duration) -> io::Result<()>;
}

/// Opens connections to the collector.
pub trait Connector: Send {
    type Conn: Connection;

    fn connect(&mut self, timeout: Duration) -> io::Result<Self::Conn>;

    /// Human-readable target used in diagnostics.
    fn target(&self) -> &str;
}

impl Connection for TcpStream {
    fn set_io_timeout(&mut self, timeout: Duration) -> io::Result<()> {
        self.set_read_timeout(Some(timeout))?;
        self.set_write_timeout(Some(timeout))
    }
}

/// Plain TCP transport dialing `host:port`.
#[derive(Clone, Debug)]
pub struct TcpTransport {
    address: String,
}

impl TcpTransport {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
        }
    }

    fn socket_addrs(&self) -> io::Result<Vec<SocketAddr>> {
        self.address
            .as_str()
            .to_socket_addrs()
            .map(|iter| iter.collect())
    }
}

impl Connector for TcpTransport {
    type Conn = TcpStream;

    /// Try each resolved address in turn, returning the last failure.
    fn connect(&mut self, timeout: Duration) -> io::Result<TcpStream> {
        let mut last_err = None;
        for addr in self.socket_addrs()? {
            match TcpStream::connect_timeout(&addr, timeout) {
                Ok(stream) => {
                    stream.set_nonblocking(false)?;
                    return Ok(stream);
                }
                Err(err) => last_err = Some(err),
            }
        }
        Err(last_err.unwrap_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} did not resolve to any address", self.address),
            )
        }))
    }

    fn target(&self) -> &str {
        &self.address
    }
}

/// Write one complete line under the configured deadline.
pub(crate) fn write_line<C: Connection + ?Sized>(
    conn: &mut C,
    line: &[u8],
    timeout: Duration,
) -> io::Result<()> {
    conn.set_io_timeout(timeout)?;
    conn.write_all(line)?;
    conn.flush()
}
