//! Sequence Number Arithmetic
//!
//! ARQ sequence numbers live in a small finite ring: range 2 for the
//! alternating-bit scheme, `2 * window + 1` for the sliding window
//! (Stenning's bound: the minimum range that keeps an old frame's number
//! from being mistaken for a new one within one window's reach). This module
//! provides the ring arithmetic and the cumulative-ack validation used by
//! the sliding-window sender.

use std::fmt;

/// Sequence range for a sliding window of the given size (Stenning's bound).
#[inline]
pub const fn seq_range(window_size: u32) -> u32 {
    2 * window_size + 1
}

/// A finite sequence-number ring of runtime-chosen range.
///
/// All values handled by a ring are already reduced into `0..range`.
#[derive(Copy, Clone, Eq, PartialEq)]
pub struct SeqRing {
    range: u32,
}

impl SeqRing {
    /// Create a ring of the given range.
    ///
    /// # Panics
    /// Panics if `range` is zero.
    pub fn new(range: u32) -> Self {
        assert!(range > 0, "sequence range must be non-zero");
        SeqRing { range }
    }

    /// Ring for a sliding window of size `window_size`.
    pub fn for_window(window_size: u32) -> Self {
        SeqRing::new(seq_range(window_size))
    }

    /// The ring's range.
    #[inline]
    pub fn range(self) -> u32 {
        self.range
    }

    /// Reduce an arbitrary value into the ring.
    #[inline]
    pub fn wrap(self, value: u64) -> u32 {
        (value % u64::from(self.range)) as u32
    }

    /// `seq + n` within the ring.
    #[inline]
    pub fn add(self, seq: u32, n: u32) -> u32 {
        ((u64::from(seq) + u64::from(n)) % u64::from(self.range)) as u32
    }

    /// The successor of `seq` within the ring.
    #[inline]
    pub fn next(self, seq: u32) -> u32 {
        self.add(seq, 1)
    }

    /// Forward distance from `from` to `to`, in `0..range`.
    #[inline]
    pub fn distance(self, from: u32, to: u32) -> u32 {
        ((u64::from(to) + u64::from(self.range) - u64::from(from)) % u64::from(self.range)) as u32
    }
}

impl fmt::Debug for SeqRing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SeqRing(mod {})", self.range)
    }
}

/// Validate a cumulative acknowledgment and compute the window advance.
///
/// `received_ack` is the next-expected value just read off the wire;
/// `last_acked` is the sender's oldest unacknowledged sequence number. The
/// ack is trusted only when the acknowledged position falls within one
/// window's reach forward of the last confirmed position:
///
/// ```text
/// (received_ack - (last_acked + 1) + range) mod range < window_size
/// ```
///
/// A trusted ack yields the number of frames newly confirmed, in
/// `1..=window_size`. Anything else (a stale duplicate, an ack already
/// superseded, or a value too far ahead to be legitimate) yields 0 and must
/// leave sender state untouched.
///
/// Pure and deterministic; both operands are expected to already lie within
/// the ring for `window_size`.
pub fn ack_advance(received_ack: u32, last_acked: u32, window_size: u32) -> u32 {
    let ring = SeqRing::for_window(window_size);
    if ring.distance(ring.next(last_acked), received_ack) < window_size {
        ring.distance(last_acked, received_ack)
    } else {
        0
    }
}
