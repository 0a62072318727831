//! ARQ - Reliable delivery over unreliable datagrams
//!
//! High-level Rust API for stop-and-wait and sliding-window ARQ transfer.

pub use arq_io as io;
pub use arq_protocol as protocol;

// Re-export commonly used types
pub use protocol::{
    ack_advance, Ack, ArqError, ChannelError, DatagramChannel, Frame, FrameCodec,
    SlidingWindowReceiver, SlidingWindowSender, StopWaitReceiver, StopWaitSender,
    RETRANSMIT_TIMEOUT_US,
};

pub use io::UdpChannel;
