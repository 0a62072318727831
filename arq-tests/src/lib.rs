//! In-memory transfer harness with fault injection
//!
//! Builds a pair of connected [`DatagramChannel`]s backed by crossbeam
//! queues instead of sockets, so integration tests can script exactly
//! which datagrams get dropped, duplicated, or reordered, per direction
//! and by index.

use arq::{
    FrameCodec, SlidingWindowReceiver, SlidingWindowSender, StopWaitReceiver, StopWaitSender,
};
use arq_protocol::channel::{ChannelError, DatagramChannel};
use bytes::Bytes;
use crossbeam::channel::{unbounded, Receiver, Sender};
use std::collections::BTreeSet;
use std::thread;
use std::time::Duration;

/// Upper bound on any single blocking receive. A transfer that stalls
/// this long has deadlocked; failing the receive fails the test instead
/// of hanging the run.
const RECV_DEADLINE: Duration = Duration::from_secs(5);

/// Scripted faults for one direction of a channel pair.
///
/// Indices count the datagrams an endpoint hands to the channel, starting
/// at zero and including retransmissions. Datagrams not named pass
/// through untouched.
#[derive(Debug, Clone, Default)]
pub struct FaultPlan {
    drop: BTreeSet<u64>,
    duplicate: BTreeSet<u64>,
    delay: BTreeSet<u64>,
}

impl FaultPlan {
    /// A plan that touches nothing.
    pub fn clean() -> Self {
        Self::default()
    }

    /// Drop the datagram with the given index.
    pub fn drop_nth(mut self, index: u64) -> Self {
        self.drop.insert(index);
        self
    }

    /// Deliver the datagram with the given index twice.
    pub fn duplicate_nth(mut self, index: u64) -> Self {
        self.duplicate.insert(index);
        self
    }

    /// Hold the datagram with the given index back until the next one
    /// has gone out, swapping their delivery order.
    pub fn delay_nth(mut self, index: u64) -> Self {
        self.delay.insert(index);
        self
    }
}

/// One endpoint of an in-memory channel pair.
pub struct LossyChannel {
    tx: Sender<Vec<u8>>,
    rx: Receiver<Vec<u8>>,
    plan: FaultPlan,
    sent: u64,
    held: Option<Vec<u8>>,
}

impl LossyChannel {
    fn new(tx: Sender<Vec<u8>>, rx: Receiver<Vec<u8>>, plan: FaultPlan) -> Self {
        LossyChannel {
            tx,
            rx,
            plan,
            sent: 0,
            held: None,
        }
    }

    fn push(&self, datagram: Vec<u8>) {
        // A departed peer swallows datagrams, the way UDP does.
        let _ = self.tx.send(datagram);
    }

    fn transmit(&mut self, datagram: &[u8]) -> Result<(), ChannelError> {
        let index = self.sent;
        self.sent += 1;

        if self.plan.delay.contains(&index) {
            self.held = Some(datagram.to_vec());
            return Ok(());
        }

        if !self.plan.drop.contains(&index) {
            self.push(datagram.to_vec());
            if self.plan.duplicate.contains(&index) {
                self.push(datagram.to_vec());
            }
        }

        if let Some(held) = self.held.take() {
            self.push(held);
        }
        Ok(())
    }
}

impl DatagramChannel for LossyChannel {
    fn send_to(&mut self, datagram: &[u8]) -> Result<(), ChannelError> {
        self.transmit(datagram)
    }

    fn ack_to(&mut self, datagram: &[u8]) -> Result<(), ChannelError> {
        self.transmit(datagram)
    }

    fn recv_from(&mut self, buf: &mut [u8]) -> Result<usize, ChannelError> {
        let datagram = self
            .rx
            .recv_timeout(RECV_DEADLINE)
            .map_err(|_| ChannelError::Disconnected)?;
        let n = datagram.len().min(buf.len());
        buf[..n].copy_from_slice(&datagram[..n]);
        Ok(n)
    }

    fn poll_recv_from(&mut self) -> usize {
        thread::yield_now();
        usize::from(!self.rx.is_empty())
    }
}

/// Connect two [`LossyChannel`]s. `forward` scripts faults on the first
/// endpoint's outgoing datagrams, `reverse` on the second's.
pub fn lossy_pair(forward: FaultPlan, reverse: FaultPlan) -> (LossyChannel, LossyChannel) {
    let (a_tx, b_rx) = unbounded();
    let (b_tx, a_rx) = unbounded();
    (
        LossyChannel::new(a_tx, a_rx, forward),
        LossyChannel::new(b_tx, b_rx, reverse),
    )
}

/// Payload size for harness transfers: one big-endian message number.
pub const HARNESS_PAYLOAD_LEN: usize = 8;

fn harness_payload(msg_num: u64) -> Bytes {
    Bytes::copy_from_slice(&msg_num.to_be_bytes())
}

fn decode_payload(payload: &[u8]) -> u64 {
    let mut raw = [0u8; 8];
    raw.copy_from_slice(payload);
    u64::from_be_bytes(raw)
}

/// Run a complete sliding-window transfer across an in-memory pair.
///
/// The receiver runs on its own thread. Returns the sender's
/// retransmission count and the message numbers delivered, in order.
pub fn run_sliding_transfer(
    window_size: u32,
    count: u64,
    timeout_us: u64,
    forward: FaultPlan,
    reverse: FaultPlan,
) -> (u64, Vec<u64>) {
    let (sender_chan, receiver_chan) = lossy_pair(forward, reverse);
    let codec = FrameCodec::new(HARNESS_PAYLOAD_LEN);

    let receiver = thread::spawn(move || {
        let mut delivered = Vec::new();
        let mut receiver = SlidingWindowReceiver::new(receiver_chan, codec, window_size);
        receiver
            .receive(count, |payload| delivered.push(decode_payload(&payload)))
            .expect("receive failed");
        delivered
    });

    let mut sender = SlidingWindowSender::with_timeout(sender_chan, codec, window_size, timeout_us);
    let retrans = sender.transmit(count, harness_payload).expect("transmit failed");

    (retrans, receiver.join().expect("receiver panicked"))
}

/// Run a complete stop-and-wait transfer across an in-memory pair.
pub fn run_stop_wait_transfer(
    count: u64,
    timeout_us: u64,
    forward: FaultPlan,
    reverse: FaultPlan,
) -> (u64, Vec<u64>) {
    let (sender_chan, receiver_chan) = lossy_pair(forward, reverse);
    let codec = FrameCodec::new(HARNESS_PAYLOAD_LEN);

    let receiver = thread::spawn(move || {
        let mut delivered = Vec::new();
        let mut receiver = StopWaitReceiver::new(receiver_chan, codec);
        receiver
            .receive(count, |payload| delivered.push(decode_payload(&payload)))
            .expect("receive failed");
        delivered
    });

    let mut sender = StopWaitSender::with_timeout(sender_chan, codec, timeout_us);
    let retrans = sender.transmit(count, harness_payload).expect("transmit failed");

    (retrans, receiver.join().expect("receiver panicked"))
}
