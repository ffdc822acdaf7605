//! Telnet transport layer.
//!
//! This module provides the low-level byte channel the console session is
//! built on: a minimal RFC 854 client over TCP in production, scripted
//! transcripts in tests.

pub mod config;
mod telnet;

#[cfg(test)]
pub(crate) mod scripted;

use std::future::Future;
use std::io;

use bytes::Bytes;

pub use config::ConsoleConfig;
pub use telnet::TelnetTransport;

/// Byte-level channel to a switch console.
///
/// The session engine is generic over this seam, so tests can drive it from
/// a scripted transcript instead of a live switch.
pub trait Transport: Send {
    /// Read the next chunk of console output. `Ok(None)` means the peer
    /// closed the stream.
    fn read_chunk(&mut self) -> impl Future<Output = io::Result<Option<Bytes>>> + Send;

    /// Write the whole buffer to the peer.
    fn write_all(&mut self, data: &[u8]) -> impl Future<Output = io::Result<()>> + Send;
}
