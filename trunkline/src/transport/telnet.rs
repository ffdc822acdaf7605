//! Minimal telnet (RFC 854) client transport.
//!
//! The switch console is line-oriented text, and this transport handles only
//! what that needs: refusing option negotiation, stripping IAC sequences out
//! of the data stream, and escaping IAC on writes. Decoder state carries
//! across reads, so a sequence split by TCP segmentation is still handled.

use std::io;
use std::time::Duration;

use bytes::{BufMut, Bytes, BytesMut};
use log::trace;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;

use super::Transport;
use crate::error::{ConnectionError, Result};

/// Interpret As Command escape byte.
const IAC: u8 = 255;
/// Option negotiation verbs.
const WILL: u8 = 251;
const WONT: u8 = 252;
const DO: u8 = 253;
const DONT: u8 = 254;
/// Subnegotiation delimiters.
const SB: u8 = 250;
const SE: u8 = 240;
/// Options the server may drive without our participation.
const OPT_ECHO: u8 = 1;
const OPT_SUPPRESS_GO_AHEAD: u8 = 3;

const READ_CHUNK: usize = 4096;

/// Decoder position, carried between chunks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DecodeState {
    /// Plain data bytes.
    Data,
    /// Seen IAC, awaiting the command byte.
    Command,
    /// Seen IAC WILL/WONT/DO/DONT, awaiting the option byte.
    Negotiate(u8),
    /// Inside an IAC SB ... IAC SE block.
    Subnegotiation,
    /// Seen IAC inside a subnegotiation block.
    SubnegotiationCommand,
}

/// Stateful telnet decoder: splits raw input into console data and the
/// negotiation replies owed to the peer.
#[derive(Debug)]
struct TelnetDecoder {
    state: DecodeState,
}

impl TelnetDecoder {
    fn new() -> Self {
        Self {
            state: DecodeState::Data,
        }
    }

    /// Feed one raw chunk. Returns the cleaned console data and any replies
    /// that must be written back before the data is surfaced.
    fn feed(&mut self, chunk: &[u8]) -> (BytesMut, Vec<u8>) {
        let mut data = BytesMut::with_capacity(chunk.len());
        let mut replies = Vec::new();

        // Fast path: no carried state and no IAC means the chunk is pure data.
        if self.state == DecodeState::Data && memchr::memchr(IAC, chunk).is_none() {
            data.extend_from_slice(chunk);
            return (data, replies);
        }

        for &byte in chunk {
            match self.state {
                DecodeState::Data => {
                    if byte == IAC {
                        self.state = DecodeState::Command;
                    } else {
                        data.put_u8(byte);
                    }
                }
                DecodeState::Command => match byte {
                    // IAC IAC is an escaped 0xff data byte
                    IAC => {
                        data.put_u8(IAC);
                        self.state = DecodeState::Data;
                    }
                    WILL | WONT | DO | DONT => self.state = DecodeState::Negotiate(byte),
                    SB => self.state = DecodeState::Subnegotiation,
                    // NOP, GA and the other two-byte commands
                    _ => self.state = DecodeState::Data,
                },
                DecodeState::Negotiate(verb) => {
                    if let Some(reply) = negotiation_reply(verb, byte) {
                        replies.extend_from_slice(&reply);
                    }
                    self.state = DecodeState::Data;
                }
                DecodeState::Subnegotiation => {
                    if byte == IAC {
                        self.state = DecodeState::SubnegotiationCommand;
                    }
                }
                DecodeState::SubnegotiationCommand => {
                    self.state = match byte {
                        SE => DecodeState::Data,
                        // IAC IAC inside SB escapes a parameter byte
                        _ => DecodeState::Subnegotiation,
                    };
                }
            }
        }

        (data, replies)
    }
}

/// Reply to a negotiation request, refusing everything except the options a
/// plain NVT client lets the server drive on its own.
fn negotiation_reply(verb: u8, option: u8) -> Option<[u8; 3]> {
    match verb {
        DO => Some([IAC, WONT, option]),
        WILL if option == OPT_ECHO || option == OPT_SUPPRESS_GO_AHEAD => Some([IAC, DO, option]),
        WILL => Some([IAC, DONT, option]),
        // WONT and DONT announce states we never asked to change
        _ => None,
    }
}

/// Minimal telnet client over an async byte stream.
///
/// `S` is [`TcpStream`] in production; tests substitute mock streams.
#[derive(Debug)]
pub struct TelnetTransport<S> {
    stream: S,
    decoder: TelnetDecoder,
}

impl TelnetTransport<TcpStream> {
    /// Connect to the switch's telnet port, bounded by `timeout`.
    pub async fn dial(host: &str, port: u16, timeout: Duration) -> Result<Self> {
        let stream = tokio::time::timeout(timeout, TcpStream::connect((host, port)))
            .await
            .map_err(|_| ConnectionError::ConnectTimeout {
                host: host.to_string(),
                port,
                timeout,
            })?
            .map_err(|source| ConnectionError::ConnectFailed {
                host: host.to_string(),
                port,
                source,
            })?;

        // Interactive command traffic; don't batch it.
        if let Err(e) = stream.set_nodelay(true) {
            trace!("set_nodelay failed for {host}:{port}: {e}");
        }

        Ok(Self::new(stream))
    }
}

impl<S> TelnetTransport<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    /// Wrap an already-established stream.
    pub fn new(stream: S) -> Self {
        Self {
            stream,
            decoder: TelnetDecoder::new(),
        }
    }
}

impl<S> Transport for TelnetTransport<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    async fn read_chunk(&mut self) -> io::Result<Option<Bytes>> {
        let mut raw = [0u8; READ_CHUNK];
        loop {
            let n = self.stream.read(&mut raw).await?;
            if n == 0 {
                return Ok(None);
            }

            let (data, replies) = self.decoder.feed(&raw[..n]);
            if !replies.is_empty() {
                self.stream.write_all(&replies).await?;
            }

            // A chunk may be nothing but negotiation; keep reading.
            if !data.is_empty() {
                return Ok(Some(data.freeze()));
            }
        }
    }

    async fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        if memchr::memchr(IAC, data).is_none() {
            return self.stream.write_all(data).await;
        }

        let mut escaped = Vec::with_capacity(data.len() + 4);
        for &byte in data {
            escaped.push(byte);
            if byte == IAC {
                escaped.push(IAC);
            }
        }
        self.stream.write_all(&escaped).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::io::Builder;

    #[test]
    fn decoder_passes_plain_data_through() {
        let mut decoder = TelnetDecoder::new();
        let (data, replies) = decoder.feed(b"show int sw g1\r\n");
        assert_eq!(&data[..], b"show int sw g1\r\n");
        assert!(replies.is_empty());
    }

    #[test]
    fn decoder_carries_state_between_feeds() {
        let mut decoder = TelnetDecoder::new();

        let (data, replies) = decoder.feed(&[b'a', IAC]);
        assert_eq!(&data[..], b"a");
        assert!(replies.is_empty());

        let (data, replies) = decoder.feed(&[WILL, OPT_ECHO, b'b']);
        assert_eq!(&data[..], b"b");
        assert_eq!(replies, vec![IAC, DO, OPT_ECHO]);
    }

    #[tokio::test]
    async fn refuses_do_and_accepts_server_echo() {
        let mock = Builder::new()
            .read(&[IAC, DO, 24, IAC, WILL, OPT_ECHO, b'h', b'i'])
            .write(&[IAC, WONT, 24, IAC, DO, OPT_ECHO])
            .build();

        let mut transport = TelnetTransport::new(mock);
        let chunk = transport.read_chunk().await.unwrap().unwrap();
        assert_eq!(&chunk[..], b"hi");
    }

    #[tokio::test]
    async fn refuses_other_will_options() {
        let mock = Builder::new()
            .read(&[IAC, WILL, 31, b'x'])
            .write(&[IAC, DONT, 31])
            .build();

        let mut transport = TelnetTransport::new(mock);
        let chunk = transport.read_chunk().await.unwrap().unwrap();
        assert_eq!(&chunk[..], b"x");
    }

    #[tokio::test]
    async fn unescapes_doubled_iac() {
        let mock = Builder::new().read(&[b'a', IAC, IAC, b'b']).build();

        let mut transport = TelnetTransport::new(mock);
        let chunk = transport.read_chunk().await.unwrap().unwrap();
        assert_eq!(&chunk[..], &[b'a', IAC, b'b']);
    }

    #[tokio::test]
    async fn handles_negotiation_split_across_reads() {
        let mock = Builder::new()
            .read(&[b'a', IAC])
            .read(&[DO, 24, b'b'])
            .write(&[IAC, WONT, 24])
            .build();

        let mut transport = TelnetTransport::new(mock);
        assert_eq!(&transport.read_chunk().await.unwrap().unwrap()[..], b"a");
        assert_eq!(&transport.read_chunk().await.unwrap().unwrap()[..], b"b");
    }

    #[tokio::test]
    async fn skips_subnegotiation_blocks() {
        let mock = Builder::new()
            .read(&[IAC, SB, 24, 0, b'v', b't', IAC, SE, b'o', b'k'])
            .build();

        let mut transport = TelnetTransport::new(mock);
        let chunk = transport.read_chunk().await.unwrap().unwrap();
        assert_eq!(&chunk[..], b"ok");
    }

    #[tokio::test]
    async fn escapes_outgoing_iac() {
        let mock = Builder::new().write(&[1, IAC, IAC, 2]).build();

        let mut transport = TelnetTransport::new(mock);
        transport.write_all(&[1, IAC, 2]).await.unwrap();
    }

    #[tokio::test]
    async fn end_of_stream_yields_none() {
        let mock = Builder::new().build();

        let mut transport = TelnetTransport::new(mock);
        assert!(transport.read_chunk().await.unwrap().is_none());
    }
}
