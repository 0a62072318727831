//! Frame and Acknowledgment Wire Format
//!
//! The wire format carries no handshake and no length field; both ends
//! agree on the payload size out of band:
//!
//! - Data frame: one big-endian `u32` sequence number followed by exactly
//!   `payload_len` opaque bytes.
//! - Acknowledgment: one big-endian `u32` (the echoed bit for stop-and-wait,
//!   the cumulative next-expected value for the sliding window).
//!
//! Decoding is length-strict: a datagram whose size disagrees with the
//! configured payload length means the two ends were launched with different
//! parameters, and the decode fails instead of misinterpreting bytes.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use thiserror::Error;

/// Size of the sequence-number header in bytes.
pub const SEQ_SIZE: usize = 4;

/// Size of an acknowledgment datagram in bytes.
pub const ACK_SIZE: usize = 4;

/// Frame encoding and decoding errors
#[derive(Error, Debug)]
pub enum FrameError {
    #[error("Datagram length {actual} does not match configured frame size {expected}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("Acknowledgment datagram too short: {0} bytes")]
    ShortAck(usize),

    #[error("Payload length {actual} does not match configured {expected}")]
    PayloadSize { expected: usize, actual: usize },
}

/// A data frame: sequence number plus fixed-size opaque payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub seq: u32,
    pub payload: Bytes,
}

/// A cumulative or echoed acknowledgment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ack {
    pub seq: u32,
}

impl Ack {
    pub fn new(seq: u32) -> Self {
        Ack { seq }
    }

    /// Serialize to a wire datagram.
    pub fn to_bytes(self) -> BytesMut {
        let mut buf = BytesMut::with_capacity(ACK_SIZE);
        buf.put_u32(self.seq);
        buf
    }

    /// Parse from a received datagram.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, FrameError> {
        if bytes.len() < ACK_SIZE {
            return Err(FrameError::ShortAck(bytes.len()));
        }
        let mut buf = bytes;
        Ok(Ack {
            seq: buf.get_u32(),
        })
    }
}

/// Codec for fixed-size frames.
///
/// Carries the out-of-band payload-size agreement; both ends must be
/// constructed with the same `payload_len`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameCodec {
    payload_len: usize,
}

impl FrameCodec {
    pub fn new(payload_len: usize) -> Self {
        FrameCodec { payload_len }
    }

    /// Configured payload size in bytes.
    #[inline]
    pub fn payload_len(self) -> usize {
        self.payload_len
    }

    /// Total datagram size for one frame.
    #[inline]
    pub fn frame_len(self) -> usize {
        SEQ_SIZE + self.payload_len
    }

    /// Serialize a frame to a wire datagram.
    ///
    /// Fails if the payload does not match the configured size.
    pub fn encode(self, frame: &Frame) -> Result<BytesMut, FrameError> {
        if frame.payload.len() != self.payload_len {
            return Err(FrameError::PayloadSize {
                expected: self.payload_len,
                actual: frame.payload.len(),
            });
        }
        let mut buf = BytesMut::with_capacity(self.frame_len());
        buf.put_u32(frame.seq);
        buf.put_slice(&frame.payload);
        Ok(buf)
    }

    /// Parse a frame from a received datagram.
    ///
    /// Length-strict: anything other than exactly `frame_len()` bytes is a
    /// configuration mismatch between the two ends.
    pub fn decode(self, bytes: &[u8]) -> Result<Frame, FrameError> {
        if bytes.len() != self.frame_len() {
            return Err(FrameError::LengthMismatch {
                expected: self.frame_len(),
                actual: bytes.len(),
            });
        }
        let mut buf = bytes;
        let seq = buf.get_u32();
        Ok(Frame {
            seq,
            payload: Bytes::copy_from_slice(buf),
        })
    }
}
