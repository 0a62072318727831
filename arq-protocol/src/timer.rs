//! Retransmission Timer
//!
//! A lap timer owned by the sending loop: `start` resets the elapsed time,
//! `lap` reads it in microseconds. The timeout threshold shared by both ARQ
//! variants defaults to [`RETRANSMIT_TIMEOUT_US`]; endpoints accept an
//! explicit threshold so configuration (and slow test environments) can
//! widen it.

use std::time::Instant;

/// Default retransmission threshold in microseconds, shared by both the
/// stop-and-wait and sliding-window senders.
pub const RETRANSMIT_TIMEOUT_US: u64 = 1500;

/// Elapsed-time lap timer over the monotonic clock.
#[derive(Debug, Clone)]
pub struct Timer {
    started: Instant,
}

impl Timer {
    /// Create a timer already running from now.
    pub fn new() -> Self {
        Timer {
            started: Instant::now(),
        }
    }

    /// Reset elapsed time to zero.
    #[inline]
    pub fn start(&mut self) {
        self.started = Instant::now();
    }

    /// Microseconds elapsed since the last `start`.
    #[inline]
    pub fn lap(&self) -> u64 {
        self.started.elapsed().as_micros().try_into().unwrap_or(u64::MAX)
    }

    /// Whether the elapsed time exceeds `threshold_us`.
    #[inline]
    pub fn expired(&self, threshold_us: u64) -> bool {
        self.lap() > threshold_us
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}
