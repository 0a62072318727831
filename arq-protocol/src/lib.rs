//! ARQ Protocol Core Implementation
//!
//! This crate implements two Automatic-Repeat-reQuest schemes over an
//! abstract datagram channel: stop-and-wait with a 1-bit alternating
//! sequence number, and sliding-window transfer with cumulative
//! acknowledgments and timeout-triggered batch retransmission (Stenning's
//! protocol). It owns the sequence-ring arithmetic, the wire codec, the
//! send/receive window state, and the transfer loops; sockets live in
//! `arq-io`.

pub mod channel;
pub mod error;
pub mod frame;
pub mod sequence;
pub mod sliding;
pub mod stop_wait;
pub mod timer;
pub mod window;

#[cfg(test)]
pub(crate) mod testutil;

pub use channel::{ChannelError, DatagramChannel};
pub use error::ArqError;
pub use frame::{Ack, Frame, FrameCodec, FrameError, ACK_SIZE, SEQ_SIZE};
pub use sequence::{ack_advance, seq_range, SeqRing};
pub use sliding::{SlidingWindowReceiver, SlidingWindowSender};
pub use stop_wait::{StopWaitReceiver, StopWaitSender};
pub use timer::{Timer, RETRANSMIT_TIMEOUT_US};
pub use window::{Acceptance, ReceiveWindow, SendWindow, WindowError};
