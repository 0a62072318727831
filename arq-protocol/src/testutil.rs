//! Scripted in-process channel for unit-testing the transfer loops.

use crate::channel::{ChannelError, DatagramChannel};
use std::collections::VecDeque;

/// A deterministic, single-threaded [`DatagramChannel`].
///
/// Incoming datagrams are either preloaded or released once the endpoint
/// has performed a given number of sends, which lets a test script "the peer
/// answers after the retransmission" without threads or real time.
#[derive(Default)]
pub(crate) struct ScriptChannel {
    /// Datagrams ready to be received.
    pub incoming: VecDeque<Vec<u8>>,
    /// Everything sent on the data direction, in order.
    pub sent: Vec<Vec<u8>>,
    /// Everything sent on the acknowledgment direction, in order.
    pub acked: Vec<Vec<u8>>,
    /// `(min_sends, datagram)`: once `sent.len() >= min_sends`, the datagram
    /// moves into `incoming`.
    pub release_on_send: Vec<(usize, Vec<u8>)>,
}

impl ScriptChannel {
    pub fn new() -> Self {
        Self::default()
    }

    fn release_ready(&mut self) {
        let sends = self.sent.len();
        let mut i = 0;
        while i < self.release_on_send.len() {
            if self.release_on_send[i].0 <= sends {
                let (_, datagram) = self.release_on_send.remove(i);
                self.incoming.push_back(datagram);
            } else {
                i += 1;
            }
        }
    }
}

impl DatagramChannel for ScriptChannel {
    fn send_to(&mut self, datagram: &[u8]) -> Result<(), ChannelError> {
        self.sent.push(datagram.to_vec());
        self.release_ready();
        Ok(())
    }

    fn ack_to(&mut self, datagram: &[u8]) -> Result<(), ChannelError> {
        self.acked.push(datagram.to_vec());
        Ok(())
    }

    fn recv_from(&mut self, buf: &mut [u8]) -> Result<usize, ChannelError> {
        match self.incoming.pop_front() {
            Some(datagram) => {
                buf[..datagram.len()].copy_from_slice(&datagram);
                Ok(datagram.len())
            }
            // A blocking receive with nothing scripted means the test under
            // scrutiny would hang; fail instead.
            None => Err(ChannelError::Disconnected),
        }
    }

    fn poll_recv_from(&mut self) -> usize {
        self.incoming.len()
    }
}
