//! UDP socket wrapper and datagram-channel realization
//!
//! [`ArqSocket`] is a thin non-blocking UDP wrapper; [`UdpChannel`] pairs
//! one with a fixed peer address and implements the protocol's
//! [`DatagramChannel`] contract on top of it.

use arq_protocol::channel::{ChannelError, DatagramChannel};
use socket2::{Domain, Protocol, Socket, Type};
use std::io::{self, ErrorKind};
use std::mem::MaybeUninit;
use std::net::SocketAddr;
use std::thread;
use std::time::Duration;
use thiserror::Error;

/// Pause between polls while emulating a blocking receive on a
/// non-blocking socket.
const POLL_INTERVAL: Duration = Duration::from_micros(50);

/// Socket configuration errors
#[derive(Error, Debug)]
pub enum SocketError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid socket address")]
    InvalidAddress,
}

/// Non-blocking UDP socket for ARQ transfer.
pub struct ArqSocket {
    inner: Socket,
}

impl ArqSocket {
    /// Create a socket bound to the given address.
    pub fn bind(addr: SocketAddr) -> Result<Self, SocketError> {
        let domain = if addr.is_ipv4() {
            Domain::IPV4
        } else {
            Domain::IPV6
        };

        let socket = Socket::new(domain, Type::DGRAM, Some(Protocol::UDP))?;
        socket.set_reuse_address(true)?;
        socket.bind(&addr.into())?;
        socket.set_nonblocking(true)?;

        Ok(ArqSocket { inner: socket })
    }

    /// Get the local address this socket is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, SocketError> {
        self.inner
            .local_addr()?
            .as_socket()
            .ok_or(SocketError::InvalidAddress)
    }

    /// Send a datagram to the given address.
    pub fn send_to(&self, buf: &[u8], target: SocketAddr) -> Result<usize, SocketError> {
        Ok(self.inner.send_to(buf, &target.into())?)
    }

    /// Try to receive a datagram without blocking.
    ///
    /// Returns `WouldBlock` inside `SocketError::Io` when nothing is ready.
    pub fn recv_from(&self, buf: &mut [u8]) -> Result<(usize, SocketAddr), SocketError> {
        let uninit_buf = unsafe {
            std::slice::from_raw_parts_mut(buf.as_mut_ptr() as *mut MaybeUninit<u8>, buf.len())
        };

        match self.inner.recv_from(uninit_buf) {
            Ok((n, addr)) => Ok((n, addr.as_socket().ok_or(SocketError::InvalidAddress)?)),
            Err(e) => Err(SocketError::Io(e)),
        }
    }

    /// `true` when at least one datagram is ready to be received.
    pub fn readable(&self) -> bool {
        let mut probe = [MaybeUninit::<u8>::uninit(); 1];
        match self.inner.peek_from(&mut probe) {
            Ok(_) => true,
            Err(ref e) if e.kind() == ErrorKind::WouldBlock => false,
            Err(_) => false,
        }
    }

    /// Block until a datagram arrives and report its source without
    /// consuming it. Lets a passive endpoint learn its peer from the
    /// first frame.
    pub fn wait_peer(&self) -> Result<SocketAddr, SocketError> {
        let mut probe = [MaybeUninit::<u8>::uninit(); 1];
        loop {
            match self.inner.peek_from(&mut probe) {
                Ok((_, addr)) => {
                    return addr.as_socket().ok_or(SocketError::InvalidAddress);
                }
                Err(ref e) if e.kind() == ErrorKind::WouldBlock => {
                    thread::sleep(POLL_INTERVAL);
                }
                Err(e) => return Err(SocketError::Io(e)),
            }
        }
    }
}

/// One endpoint of an ARQ session over UDP.
///
/// Data frames and acknowledgments both travel over the same socket to the
/// same peer; the logical directions of the channel contract map onto one
/// bidirectional flow.
pub struct UdpChannel {
    socket: ArqSocket,
    peer: SocketAddr,
}

impl UdpChannel {
    /// Bind locally and aim at the peer.
    pub fn connect(local: SocketAddr, peer: SocketAddr) -> Result<Self, SocketError> {
        let socket = ArqSocket::bind(local)?;
        tracing::debug!(local = %socket.local_addr()?, %peer, "udp channel up");
        Ok(UdpChannel { socket, peer })
    }

    /// Wrap an already-bound socket.
    pub fn from_socket(socket: ArqSocket, peer: SocketAddr) -> Self {
        UdpChannel { socket, peer }
    }

    pub fn local_addr(&self) -> Result<SocketAddr, SocketError> {
        self.socket.local_addr()
    }
}

impl DatagramChannel for UdpChannel {
    fn send_to(&mut self, datagram: &[u8]) -> Result<(), ChannelError> {
        match self.socket.send_to(datagram, self.peer) {
            Ok(_) => Ok(()),
            Err(SocketError::Io(e)) => Err(ChannelError::Io(e)),
            Err(SocketError::InvalidAddress) => Err(ChannelError::Io(io::Error::new(
                ErrorKind::AddrNotAvailable,
                "invalid peer address",
            ))),
        }
    }

    fn ack_to(&mut self, datagram: &[u8]) -> Result<(), ChannelError> {
        // Same wire, reverse logical direction.
        self.send_to(datagram)
    }

    fn recv_from(&mut self, buf: &mut [u8]) -> Result<usize, ChannelError> {
        loop {
            match self.socket.recv_from(buf) {
                Ok((n, _addr)) => return Ok(n),
                Err(SocketError::Io(ref e)) if e.kind() == ErrorKind::WouldBlock => {
                    thread::sleep(POLL_INTERVAL);
                }
                Err(SocketError::Io(e)) => return Err(ChannelError::Io(e)),
                Err(SocketError::InvalidAddress) => {
                    return Err(ChannelError::Io(io::Error::new(
                        ErrorKind::AddrNotAvailable,
                        "invalid source address",
                    )))
                }
            }
        }
    }

    fn poll_recv_from(&mut self) -> usize {
        // Bound the sender's spin between timer checks.
        thread::sleep(POLL_INTERVAL);
        usize::from(self.socket.readable())
    }
}
