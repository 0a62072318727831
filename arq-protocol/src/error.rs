//! Endpoint error type.
//!
//! Only transport plumbing and configuration mismatches surface as errors;
//! timeouts and stale acknowledgments are recoverable conditions handled
//! inside the transfer loops and reported solely through the retransmission
//! counter.

use crate::channel::ChannelError;
use crate::frame::FrameError;
use crate::window::WindowError;
use thiserror::Error;

/// Errors surfaced by the ARQ transfer loops.
#[derive(Error, Debug)]
pub enum ArqError {
    #[error("Frame codec error: {0}")]
    Frame(#[from] FrameError),

    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),

    #[error("Window error: {0}")]
    Window(#[from] WindowError),
}
