//! ARQ CLI Library
//!
//! Shared functionality for the ARQ command-line tools.

pub mod config;
pub mod stats;

pub use config::{Config, ConfigError, Mode, ReceiverConfig, SenderConfig};
pub use stats::{display_summary, format_bandwidth, format_bytes, TransferSummary};

use bytes::Bytes;

/// Deterministic payload for a message number: the big-endian message
/// number repeated to fill the configured size. Both ends can derive it,
/// so the receiver can verify delivery order without a side channel.
pub fn message_payload(msg_num: u64, payload_len: usize) -> Bytes {
    let pattern = msg_num.to_be_bytes();
    let payload: Vec<u8> = pattern.iter().copied().cycle().take(payload_len).collect();
    Bytes::from(payload)
}
