//! Stop-and-Wait ARQ
//!
//! One frame in flight at a time, sequenced by a single alternating bit.
//! The sender holds each message until the matching echo comes back,
//! resending on timeout; the receiver echoes every frame's bit and delivers
//! a payload only when the bit matches the expected alternation, so a
//! retransmitted duplicate re-acks without being delivered twice.

use crate::channel::DatagramChannel;
use crate::error::ArqError;
use crate::frame::{Ack, Frame, FrameCodec, ACK_SIZE};
use crate::timer::{Timer, RETRANSMIT_TIMEOUT_US};
use bytes::Bytes;
use tracing::{debug, trace};

/// Send side of the alternating-bit protocol.
pub struct StopWaitSender<C> {
    channel: C,
    codec: FrameCodec,
    timeout_us: u64,
}

impl<C: DatagramChannel> StopWaitSender<C> {
    /// Create a sender with the default retransmission threshold.
    pub fn new(channel: C, codec: FrameCodec) -> Self {
        Self::with_timeout(channel, codec, RETRANSMIT_TIMEOUT_US)
    }

    /// Create a sender with an explicit retransmission threshold (µs).
    pub fn with_timeout(channel: C, codec: FrameCodec, timeout_us: u64) -> Self {
        StopWaitSender {
            channel,
            codec,
            timeout_us,
        }
    }

    /// Transmit `count` messages reliably, in order.
    ///
    /// `source` produces the payload for each message number; every payload
    /// must match the codec's configured size. Returns the number of
    /// duplicate sends (timeout resends plus counted ack mismatches). Blocks
    /// until every message has been acknowledged; retries are unbounded.
    pub fn transmit<F>(&mut self, count: u64, mut source: F) -> Result<u64, ArqError>
    where
        F: FnMut(u64) -> Bytes,
    {
        let mut retrans = 0u64;
        let mut timer = Timer::new();
        let mut ack_buf = [0u8; ACK_SIZE];

        for msg_num in 0..count {
            let bit = (msg_num & 1) as u32;
            let frame = Frame {
                seq: bit,
                payload: source(msg_num),
            };
            let wire = self.codec.encode(&frame)?;

            self.channel.send_to(&wire)?;
            timer.start();

            loop {
                // Poll for the echo, resending whenever the timer runs out.
                while self.channel.poll_recv_from() < 1 {
                    if timer.expired(self.timeout_us) {
                        debug!(msg_num, bit, "ack timeout, resending frame");
                        self.channel.send_to(&wire)?;
                        retrans += 1;
                        timer.start();
                    }
                }

                let n = self.channel.recv_from(&mut ack_buf)?;
                let ack = Ack::from_bytes(&ack_buf[..n])?;
                if ack.seq == bit {
                    break;
                }
                // A stale echo from the previous round: count the mismatch
                // and keep waiting without a speculative resend.
                trace!(msg_num, got = ack.seq, expected = bit, "stale ack");
                retrans += u64::from(ack.seq ^ bit);
            }
        }

        Ok(retrans)
    }

    /// Tear down, returning the channel.
    pub fn into_channel(self) -> C {
        self.channel
    }
}

/// Receive side of the alternating-bit protocol.
pub struct StopWaitReceiver<C> {
    channel: C,
    codec: FrameCodec,
}

impl<C: DatagramChannel> StopWaitReceiver<C> {
    pub fn new(channel: C, codec: FrameCodec) -> Self {
        StopWaitReceiver { channel, codec }
    }

    /// Receive `count` messages reliably, in order.
    ///
    /// Every received frame is re-acked by echoing its bit, which repairs a
    /// lost acknowledgment, but `sink` sees exactly one new in-order
    /// payload per message.
    pub fn receive<F>(&mut self, count: u64, mut sink: F) -> Result<(), ArqError>
    where
        F: FnMut(Bytes),
    {
        let mut buf = vec![0u8; self.codec.frame_len()];

        for msg_num in 0..count {
            let expected = (msg_num & 1) as u32;
            loop {
                let n = self.channel.recv_from(&mut buf)?;
                let frame = self.codec.decode(&buf[..n])?;
                self.channel.ack_to(&Ack::new(frame.seq).to_bytes())?;

                if frame.seq == expected {
                    sink(frame.payload);
                    break;
                }
                trace!(msg_num, got = frame.seq, expected, "duplicate frame, re-acked");
            }
        }

        Ok(())
    }

    /// Tear down, returning the channel.
    pub fn into_channel(self) -> C {
        self.channel
    }
}
