//! Datagram Channel Contract
//!
//! The ARQ endpoints never touch a socket directly; they drive this trait.
//! The channel is best-effort: datagrams may be lost, duplicated, or
//! reordered, but the link itself is never considered broken: delivery is
//! eventually repaired by retransmission, not surfaced as an error.
//!
//! `arq-io` provides the real UDP implementation; the test crate provides a
//! deterministic in-memory pair with scripted faults.

use std::io;
use thiserror::Error;

/// Channel transport errors.
///
/// These cover the transport plumbing itself (an unusable socket, a torn
/// down in-memory peer), never loss on the wire.
#[derive(Error, Debug)]
pub enum ChannelError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Peer endpoint is gone")]
    Disconnected,
}

/// An unreliable, unordered, duplicating datagram channel.
///
/// One instance represents one endpoint of a single session: the data
/// direction is written with [`send_to`](DatagramChannel::send_to), the
/// acknowledgment direction with [`ack_to`](DatagramChannel::ack_to), and
/// everything the peer sends arrives through the receive side.
pub trait DatagramChannel {
    /// Fire-and-forget send on the data direction. No delivery guarantee.
    fn send_to(&mut self, datagram: &[u8]) -> Result<(), ChannelError>;

    /// Fire-and-forget send on the acknowledgment direction.
    fn ack_to(&mut self, datagram: &[u8]) -> Result<(), ChannelError>;

    /// Block until a datagram is available; returns its length.
    ///
    /// `buf` must be large enough for the largest datagram the peer sends;
    /// the configured frame size bounds this.
    fn recv_from(&mut self, buf: &mut [u8]) -> Result<usize, ChannelError>;

    /// Non-blocking count of datagrams ready to be received (0 or more).
    fn poll_recv_from(&mut self) -> usize;
}
