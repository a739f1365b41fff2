//! Sending a packet to a device and waiting for its answer.

use std::io;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr, ToSocketAddrs, UdpSocket};
use std::time::Duration;

use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How long a client waits for a reply when the caller does not say.
pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(2);

/// Largest datagram a reply is read into.
const MAX_DATAGRAM: usize = 2048;

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("cannot resolve {addr}: {source}")]
    Resolve { addr: String, source: io::Error },

    #[error("cannot open a socket to {addr}: {source}")]
    Open { addr: SocketAddr, source: io::Error },

    #[error("cannot send to {addr}: {source}")]
    Write { addr: SocketAddr, source: io::Error },

    #[error("no reply from {addr} within {deadline:?}")]
    Timeout { addr: SocketAddr, deadline: Duration },

    #[error("cannot read the reply from {addr}: {source}")]
    Read { addr: SocketAddr, source: io::Error },

    #[error("a zero deadline would never wait for a reply")]
    ZeroDeadline,
}

/// The wire a device is reached over.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    #[default]
    Udp,
}

impl Protocol {
    /// A fresh client for this protocol.
    pub fn client(self) -> Box<dyn Transport> {
        match self {
            Protocol::Udp => Box::new(Udp),
        }
    }
}

/// One request, one reply.
///
/// Implementations send `packet` to `host:port` and return the first datagram that comes back,
/// trimmed to the size it declares in its first two bytes.  Replies split over several
/// datagrams are not reassembled.
pub trait Transport: Send {
    fn send(&mut self, host: &str, port: u16, packet: &[u8]) -> Result<Vec<u8>, TransportError> {
        self.send_with_deadline(host, port, packet, DEFAULT_DEADLINE)
    }

    fn send_with_deadline(
        &mut self,
        host: &str,
        port: u16,
        packet: &[u8],
        deadline: Duration,
    ) -> Result<Vec<u8>, TransportError>;
}

/// Plain UDP: a new socket per exchange, closed once the reply is in.
#[derive(Debug, Default, Clone, Copy)]
pub struct Udp;

impl Transport for Udp {
    fn send_with_deadline(
        &mut self,
        host: &str,
        port: u16,
        packet: &[u8],
        deadline: Duration,
    ) -> Result<Vec<u8>, TransportError> {
        if deadline.is_zero() {
            return Err(TransportError::ZeroDeadline);
        }
        let addr = resolve(host, port)?;
        let local: SocketAddr = if addr.is_ipv4() {
            (Ipv4Addr::UNSPECIFIED, 0).into()
        } else {
            (Ipv6Addr::UNSPECIFIED, 0).into()
        };

        let sock = UdpSocket::bind(local).map_err(|source| TransportError::Open { addr, source })?;
        sock.connect(addr)
            .map_err(|source| TransportError::Open { addr, source })?;
        sock.set_read_timeout(Some(deadline))
            .map_err(|source| TransportError::Open { addr, source })?;

        debug!("Sending {} bytes to {}", packet.len(), addr);
        sock.send(packet)
            .map_err(|source| TransportError::Write { addr, source })?;

        let mut buf = [0; MAX_DATAGRAM];
        let n = match sock.recv(&mut buf) {
            Ok(n) => n,
            Err(e) if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut) => {
                return Err(TransportError::Timeout { addr, deadline });
            }
            Err(source) => return Err(TransportError::Read { addr, source }),
        };
        debug!("Received {} bytes from {}", n, addr);

        Ok(trim_reply(&buf[..n]))
    }
}

fn resolve(host: &str, port: u16) -> Result<SocketAddr, TransportError> {
    let name = format!("{}:{}", host, port);
    (host, port)
        .to_socket_addrs()
        .map_err(|source| TransportError::Resolve {
            addr: name.clone(),
            source,
        })?
        .next()
        .ok_or_else(|| TransportError::Resolve {
            addr: name,
            source: io::Error::new(io::ErrorKind::NotFound, "no address"),
        })
}

/// Cuts a reply down to its declared size.  A reply shorter than it claims is returned whole,
/// so decoding can reject it.
fn trim_reply(reply: &[u8]) -> Vec<u8> {
    if reply.len() < 2 {
        return reply.to_vec();
    }
    let declared = u16::from_le_bytes([reply[0], reply[1]]) as usize;
    reply[..declared.min(reply.len())].to_vec()
}
