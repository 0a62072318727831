//! Send and Receive Windows
//!
//! Pure window bookkeeping for the sliding-window endpoints; all socket I/O
//! and timing stay with the caller.
//!
//! The send side keeps outstanding frames in a ring of capacity
//! `window_size + 1` addressed by two cursors, so the buffer footprint is
//! decoupled from the total message count. The receive side keeps an
//! acceptance slot per sequence number over the full ring range
//! `2 * window_size + 1` and slides the cumulative boundary forward over
//! contiguously filled slots.

use crate::frame::Frame;
use crate::sequence::SeqRing;
use bytes::Bytes;
use thiserror::Error;

/// Window configuration and bookkeeping errors
#[derive(Error, Debug)]
pub enum WindowError {
    #[error("Window size must be at least 1")]
    ZeroWindow,

    #[error("Send window is full ({0} outstanding)")]
    Full(usize),
}

/// Send-side ring of outstanding (sent, unacknowledged) frames.
///
/// ```text
///   oldest_unacked        newest_sent
///        │                     │
///   ─────┼─────────────────────┼────▶ ring of window_size + 1 slots
///        │ ◀── outstanding ──▶ │
/// ```
///
/// Invariant: the number of outstanding frames never exceeds `window_size`.
#[derive(Debug)]
pub struct SendWindow {
    slots: Vec<Option<Frame>>,
    /// Cursor just behind the oldest unacknowledged slot.
    oldest_unacked: usize,
    /// Cursor of the most recently sent slot.
    newest_sent: usize,
    window_size: usize,
}

impl SendWindow {
    /// Create an empty send window. Fails fast on a zero window size.
    pub fn new(window_size: u32) -> Result<Self, WindowError> {
        if window_size == 0 {
            return Err(WindowError::ZeroWindow);
        }
        let capacity = window_size as usize + 1;
        Ok(SendWindow {
            slots: vec![None; capacity],
            oldest_unacked: 0,
            newest_sent: 0,
            window_size: window_size as usize,
        })
    }

    #[inline]
    fn capacity(&self) -> usize {
        self.window_size + 1
    }

    /// Number of outstanding frames.
    pub fn len(&self) -> usize {
        (self.newest_sent + self.capacity() - self.oldest_unacked) % self.capacity()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `true` when no more frames may be sent before an ack arrives.
    pub fn is_full(&self) -> bool {
        self.oldest_unacked == (self.newest_sent + 1) % self.capacity()
    }

    /// Buffer a just-sent frame, advancing the newest-sent cursor.
    pub fn push(&mut self, frame: Frame) -> Result<(), WindowError> {
        if self.is_full() {
            return Err(WindowError::Full(self.len()));
        }
        self.newest_sent = (self.newest_sent + 1) % self.capacity();
        self.slots[self.newest_sent] = Some(frame);
        Ok(())
    }

    /// Sequence number of the oldest unacknowledged frame, if any.
    pub fn oldest_unacked_seq(&self) -> Option<u32> {
        if self.is_empty() {
            return None;
        }
        let slot = (self.oldest_unacked + 1) % self.capacity();
        self.slots[slot].as_ref().map(|f| f.seq)
    }

    /// Free `n` slots from the oldest end after a trusted cumulative ack.
    ///
    /// `n` comes from [`crate::sequence::ack_advance`] and is therefore at
    /// most the number of outstanding frames.
    pub fn advance(&mut self, n: u32) {
        debug_assert!(n as usize <= self.len(), "ack advance past newest sent");
        for _ in 0..n.min(self.len() as u32) {
            self.oldest_unacked = (self.oldest_unacked + 1) % self.capacity();
            self.slots[self.oldest_unacked] = None;
        }
    }

    /// Iterate outstanding frames from oldest to newest, for a timeout
    /// retransmission burst.
    pub fn outstanding(&self) -> impl Iterator<Item = &Frame> {
        let capacity = self.capacity();
        let oldest = self.oldest_unacked;
        (1..=self.len()).filter_map(move |i| self.slots[(oldest + i) % capacity].as_ref())
    }
}

/// Outcome of offering a received frame to the receive window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acceptance {
    /// In-window and previously unseen; buffered in its slot.
    Accepted,
    /// In-window but its slot was already filled; nothing changed.
    Duplicate,
    /// Outside `[next_expected, window_edge]`; not buffered. The caller
    /// still re-acks the cumulative boundary to repair lost acks.
    OutOfWindow,
}

/// Receive-side acceptance window with cumulative slide.
#[derive(Debug)]
pub struct ReceiveWindow {
    ring: SeqRing,
    slots: Vec<Option<Bytes>>,
    /// Next cumulative-ack value; first still-missing sequence number.
    next_expected: u32,
    /// Farthest sequence number currently acceptable.
    window_edge: u32,
    window_size: u32,
}

impl ReceiveWindow {
    /// Create a receive window positioned so sequence number 0 is the first
    /// acceptable value. Fails fast on a zero window size.
    pub fn new(window_size: u32) -> Result<Self, WindowError> {
        if window_size == 0 {
            return Err(WindowError::ZeroWindow);
        }
        let ring = SeqRing::for_window(window_size);
        Ok(ReceiveWindow {
            ring,
            slots: vec![None; ring.range() as usize],
            next_expected: 0,
            window_edge: window_size - 1,
            window_size,
        })
    }

    /// The cumulative acknowledgment value to send: everything before
    /// `next_expected` has been accepted contiguously.
    #[inline]
    pub fn cumulative_ack(&self) -> u32 {
        self.next_expected
    }

    #[inline]
    fn in_window(&self, seq: u32) -> bool {
        self.ring.distance(self.next_expected, seq) < self.window_size
    }

    /// Offer a received frame for acceptance.
    ///
    /// Sequence numbers are reduced into the ring; only frames inside
    /// `[next_expected, window_edge]` are buffered, and only into an empty
    /// slot, so duplicates of buffered-but-unconsumed frames change nothing.
    pub fn accept(&mut self, frame: Frame) -> Acceptance {
        let seq = self.ring.wrap(u64::from(frame.seq));
        if !self.in_window(seq) {
            return Acceptance::OutOfWindow;
        }
        let slot = &mut self.slots[seq as usize];
        if slot.is_some() {
            return Acceptance::Duplicate;
        }
        *slot = Some(frame.payload);
        Acceptance::Accepted
    }

    /// Slide the window over contiguously filled slots, handing each payload
    /// to `deliver` in cumulative order. Returns the number of positions
    /// advanced, which can be several at once when out-of-order frames were
    /// already buffered.
    pub fn slide(&mut self, mut deliver: impl FnMut(Bytes)) -> u32 {
        let mut advanced = 0;
        while let Some(payload) = self.slots[self.next_expected as usize].take() {
            deliver(payload);
            self.next_expected = self.ring.next(self.next_expected);
            self.window_edge = self.ring.next(self.window_edge);
            advanced += 1;
        }
        advanced
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    fn frame(seq: u32) -> Frame {
        Frame {
            seq,
            payload: Bytes::copy_from_slice(&[seq as u8]),
        }
    }

    #[test]
    fn zero_window_rejected() {
        assert!(matches!(SendWindow::new(0), Err(WindowError::ZeroWindow)));
        assert!(matches!(ReceiveWindow::new(0), Err(WindowError::ZeroWindow)));
    }

    #[test]
    fn send_window_fills_at_window_size() {
        let mut w = SendWindow::new(3).unwrap();
        assert!(w.is_empty());

        for seq in 0..3 {
            assert!(!w.is_full());
            w.push(frame(seq)).unwrap();
        }
        assert!(w.is_full());
        assert_eq!(w.len(), 3);
        assert!(matches!(w.push(frame(3)), Err(WindowError::Full(3))));
    }

    #[test]
    fn advance_frees_oldest_slots() {
        let mut w = SendWindow::new(3).unwrap();
        for seq in 0..3 {
            w.push(frame(seq)).unwrap();
        }
        assert_eq!(w.oldest_unacked_seq(), Some(0));

        w.advance(2);
        assert_eq!(w.len(), 1);
        assert_eq!(w.oldest_unacked_seq(), Some(2));
        assert!(!w.is_full());

        w.advance(1);
        assert!(w.is_empty());
        assert_eq!(w.oldest_unacked_seq(), None);
    }

    #[test]
    fn outstanding_iterates_oldest_to_newest() {
        let mut w = SendWindow::new(4).unwrap();
        for seq in 0..4 {
            w.push(frame(seq)).unwrap();
        }
        w.advance(1);
        let seqs: Vec<u32> = w.outstanding().map(|f| f.seq).collect();
        assert_eq!(seqs, vec![1, 2, 3]);
    }

    #[test]
    fn ring_reuses_slots_across_wrap() {
        let mut w = SendWindow::new(2).unwrap();
        // Push/ack repeatedly well past the ring capacity.
        for round in 0..10u32 {
            w.push(frame(round)).unwrap();
            w.push(frame(round + 100)).unwrap();
            assert!(w.is_full());
            w.advance(2);
            assert!(w.is_empty());
        }
    }

    #[test]
    fn receive_in_order_slides_one_at_a_time() {
        let mut w = ReceiveWindow::new(4).unwrap();
        let mut delivered = Vec::new();

        for seq in 0..5 {
            assert_eq!(w.accept(frame(seq)), Acceptance::Accepted);
            assert_eq!(w.slide(|p| delivered.push(p[0])), 1);
            assert_eq!(w.cumulative_ack(), (seq + 1) % 9);
        }
        assert_eq!(delivered, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn receive_out_of_order_slides_in_batch() {
        let mut w = ReceiveWindow::new(4).unwrap();
        let mut delivered = Vec::new();

        assert_eq!(w.accept(frame(2)), Acceptance::Accepted);
        assert_eq!(w.accept(frame(1)), Acceptance::Accepted);
        assert_eq!(w.slide(|p| delivered.push(p[0])), 0);
        assert!(delivered.is_empty());

        assert_eq!(w.accept(frame(0)), Acceptance::Accepted);
        assert_eq!(w.slide(|p| delivered.push(p[0])), 3);
        assert_eq!(delivered, vec![0, 1, 2]);
        assert_eq!(w.cumulative_ack(), 3);
    }

    #[test]
    fn duplicate_of_buffered_frame_ignored() {
        let mut w = ReceiveWindow::new(4).unwrap();
        assert_eq!(w.accept(frame(1)), Acceptance::Accepted);
        assert_eq!(w.accept(frame(1)), Acceptance::Duplicate);
    }

    #[test]
    fn consumed_and_far_ahead_frames_out_of_window() {
        let mut w = ReceiveWindow::new(4).unwrap();
        let mut sink = Vec::new();

        w.accept(frame(0));
        w.slide(|p| sink.push(p));

        // Already consumed: its number now sits behind the window.
        assert_eq!(w.accept(frame(0)), Acceptance::OutOfWindow);
        // One past the window edge (edge is now 4).
        assert_eq!(w.accept(frame(5)), Acceptance::OutOfWindow);
        // Still inside.
        assert_eq!(w.accept(frame(4)), Acceptance::Accepted);
    }

    #[test]
    fn receive_window_wraps_the_ring() {
        let window = 2u32;
        let mut w = ReceiveWindow::new(window).unwrap();
        let mut delivered = Vec::new();
        let ring = SeqRing::for_window(window);

        // Walk a full ring twice; cumulative ack must track modulo range 5.
        for msg in 0..10u32 {
            let seq = ring.wrap(u64::from(msg));
            assert_eq!(w.accept(frame(seq)), Acceptance::Accepted);
            assert_eq!(w.slide(|p| delivered.push(p[0])), 1);
            assert_eq!(w.cumulative_ack(), ring.wrap(u64::from(msg) + 1));
        }
        assert_eq!(delivered.len(), 10);
    }
}
