//! ARQ I/O and Platform Abstraction
//!
//! This crate realizes the protocol's datagram-channel contract over real
//! UDP sockets.

pub mod socket;

pub use socket::{ArqSocket, SocketError, UdpChannel};
