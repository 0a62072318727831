//! Sliding-Window ARQ (Stenning's protocol)
//!
//! The sender keeps up to `window_size` frames outstanding, sequenced over
//! the ring `2 * window_size + 1`. Acknowledgments are cumulative: the value
//! is the receiver's next-expected sequence number, validated through
//! [`ack_advance`] so a stale or impossible ack is discarded with no state
//! change. A timeout while the window is full retransmits every outstanding
//! frame, oldest to newest.
//!
//! The receiver accepts frames anywhere inside its window, buffers
//! out-of-order arrivals, and releases payloads to the sink strictly in
//! cumulative order. Every received datagram, including out-of-window
//! duplicates, triggers a fresh cumulative ack, which is what repairs a
//! lost acknowledgment.

use crate::channel::DatagramChannel;
use crate::error::ArqError;
use crate::frame::{Ack, Frame, FrameCodec, ACK_SIZE};
use crate::sequence::{ack_advance, SeqRing};
use crate::timer::{Timer, RETRANSMIT_TIMEOUT_US};
use crate::window::{Acceptance, ReceiveWindow, SendWindow};
use bytes::Bytes;
use tracing::{debug, trace};

/// Send side of the sliding-window protocol.
pub struct SlidingWindowSender<C> {
    channel: C,
    codec: FrameCodec,
    window_size: u32,
    timeout_us: u64,
}

impl<C: DatagramChannel> SlidingWindowSender<C> {
    /// Create a sender with the default retransmission threshold.
    pub fn new(channel: C, codec: FrameCodec, window_size: u32) -> Self {
        Self::with_timeout(channel, codec, window_size, RETRANSMIT_TIMEOUT_US)
    }

    /// Create a sender with an explicit retransmission threshold (µs).
    pub fn with_timeout(channel: C, codec: FrameCodec, window_size: u32, timeout_us: u64) -> Self {
        SlidingWindowSender {
            channel,
            codec,
            window_size,
            timeout_us,
        }
    }

    /// Transmit `count` messages reliably, in order.
    ///
    /// `source` produces the payload for each message number. Returns the
    /// total number of frames retransmitted. Blocks until every frame has
    /// been covered by a cumulative acknowledgment; at no point are more
    /// than `window_size` frames outstanding.
    pub fn transmit<F>(&mut self, count: u64, mut source: F) -> Result<u64, ArqError>
    where
        F: FnMut(u64) -> Bytes,
    {
        let ring = SeqRing::for_window(self.window_size);
        let mut window = SendWindow::new(self.window_size)?;
        let mut timer = Timer::new();
        let mut retrans = 0u64;

        for msg_num in 0..count {
            timer.start();

            // Wait for room, retransmitting the whole window on timeout.
            while window.is_full() {
                if timer.expired(self.timeout_us) {
                    retrans += self.retransmit_outstanding(&window)?;
                    timer.start();
                }
                if self.try_advance(&mut window)? > 0 {
                    timer.start();
                }
            }

            let frame = Frame {
                seq: ring.wrap(msg_num),
                payload: source(msg_num),
            };
            self.channel.send_to(&self.codec.encode(&frame)?)?;
            window.push(frame)?;

            // Fast path: consume an ack that arrived between sends.
            self.try_advance(&mut window)?;
        }

        // Hold until the last window is fully acknowledged.
        timer.start();
        while !window.is_empty() {
            if timer.expired(self.timeout_us) {
                retrans += self.retransmit_outstanding(&window)?;
                timer.start();
            }
            if self.try_advance(&mut window)? > 0 {
                timer.start();
            }
        }

        Ok(retrans)
    }

    /// Resend every outstanding frame, oldest to newest.
    fn retransmit_outstanding(&mut self, window: &SendWindow) -> Result<u64, ArqError> {
        debug!(
            outstanding = window.len(),
            "ack timeout, retransmitting window"
        );
        let mut resent = 0u64;
        for frame in window.outstanding() {
            self.channel.send_to(&self.codec.encode(frame)?)?;
            resent += 1;
        }
        Ok(resent)
    }

    /// Non-blocking: read at most one acknowledgment and advance the window
    /// by however many frames it newly confirms. Returns the advance.
    fn try_advance(&mut self, window: &mut SendWindow) -> Result<u32, ArqError> {
        if self.channel.poll_recv_from() < 1 {
            return Ok(0);
        }
        let mut ack_buf = [0u8; ACK_SIZE];
        let n = self.channel.recv_from(&mut ack_buf)?;
        let ack = Ack::from_bytes(&ack_buf[..n])?;

        let Some(last_acked) = window.oldest_unacked_seq() else {
            return Ok(0);
        };
        let advance = ack_advance(ack.seq, last_acked, self.window_size);
        if advance > 0 {
            window.advance(advance);
        } else {
            trace!(ack = ack.seq, last_acked, "stale ack discarded");
        }
        Ok(advance)
    }

    /// Tear down, returning the channel.
    pub fn into_channel(self) -> C {
        self.channel
    }
}

/// Receive side of the sliding-window protocol.
pub struct SlidingWindowReceiver<C> {
    channel: C,
    codec: FrameCodec,
    window_size: u32,
}

impl<C: DatagramChannel> SlidingWindowReceiver<C> {
    pub fn new(channel: C, codec: FrameCodec, window_size: u32) -> Self {
        SlidingWindowReceiver {
            channel,
            codec,
            window_size,
        }
    }

    /// Receive `count` messages reliably.
    ///
    /// `sink` sees exactly `count` distinct payloads in increasing
    /// cumulative order, regardless of duplication or reordering within the
    /// window bound. Runs until that many frames have been newly accepted;
    /// a peer that sends only out-of-window frames keeps it waiting.
    pub fn receive<F>(&mut self, count: u64, mut sink: F) -> Result<(), ArqError>
    where
        F: FnMut(Bytes),
    {
        let mut window = ReceiveWindow::new(self.window_size)?;
        let mut buf = vec![0u8; self.codec.frame_len()];
        let mut delivered = 0u64;

        while delivered < count {
            let n = self.channel.recv_from(&mut buf)?;
            let frame = self.codec.decode(&buf[..n])?;
            let seq = frame.seq;

            match window.accept(frame) {
                Acceptance::Accepted => {}
                Acceptance::Duplicate => trace!(seq, "duplicate of buffered frame"),
                Acceptance::OutOfWindow => {
                    trace!(seq, ack = window.cumulative_ack(), "out of window, re-acking")
                }
            }

            delivered += u64::from(window.slide(&mut sink));
            self.channel
                .ack_to(&Ack::new(window.cumulative_ack()).to_bytes())?;
        }

        Ok(())
    }

    /// Tear down, returning the channel.
    pub fn into_channel(self) -> C {
        self.channel
    }
}
