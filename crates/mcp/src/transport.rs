//! MCP transport layer.
//!
//! `McpTransport` moves newline-delimited JSON-RPC messages. `receive` must
//! be cancel-safe: the server loop races it against completed responses and
//! shutdown, so a dropped `receive` future may not lose a partial line.

use std::cmp;

use async_trait::async_trait;
use bytes::{Buf, BufMut, BytesMut};
use futures::{SinkExt, StreamExt};
use tokio::io::{Stdin, Stdout};
use tokio::sync::mpsc;
use tokio_util::codec::{Decoder, Encoder, FramedRead, FramedWrite};

use crate::error::McpError;

/// Upper bound on a single inbound message.
pub const MAX_MESSAGE_BYTES: usize = 8 * 1024 * 1024;

/// A line that could not be turned into a message. The stream stays usable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FrameError {
    #[error("Message exceeds {0} bytes")]
    TooLong(usize),

    #[error("Message is not valid UTF-8")]
    InvalidUtf8,
}

#[async_trait]
pub trait McpTransport: Send {
    /// Next non-empty message line, or `None` once the peer has closed.
    ///
    /// `Err(McpError::Framing(_))` reports one unusable line; the next call
    /// continues after it. Any other error means the transport is gone.
    async fn receive(&mut self) -> Result<Option<String>, McpError>;

    /// Write one message followed by a newline and flush it.
    async fn send(&mut self, message: &str) -> Result<(), McpError>;
}

/// Newline framing that reports oversized or non-UTF-8 lines as items
/// instead of decoder errors, so one bad line does not end the stream.
///
/// An oversized line is reported as soon as the limit is passed and the rest
/// of it is skipped up to the next newline.
#[derive(Debug, Clone)]
pub struct MessageCodec {
    max_length: usize,
    next_index: usize,
    discarding: bool,
}

impl MessageCodec {
    pub fn new(max_length: usize) -> Self {
        Self {
            max_length,
            next_index: 0,
            discarding: false,
        }
    }

    fn frame(line: &[u8]) -> Result<String, FrameError> {
        let line = line.strip_suffix(b"\r").unwrap_or(line);
        std::str::from_utf8(line)
            .map(str::to_string)
            .map_err(|_| FrameError::InvalidUtf8)
    }
}

impl Default for MessageCodec {
    fn default() -> Self {
        Self::new(MAX_MESSAGE_BYTES)
    }
}

impl Decoder for MessageCodec {
    type Item = Result<String, FrameError>;
    type Error = std::io::Error;

    fn decode(&mut self, buf: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        loop {
            let read_to = cmp::min(self.max_length.saturating_add(1), buf.len());
            let newline = buf[self.next_index..read_to]
                .iter()
                .position(|b| *b == b'\n');

            match (self.discarding, newline) {
                (true, Some(offset)) => {
                    buf.advance(self.next_index + offset + 1);
                    self.discarding = false;
                    self.next_index = 0;
                }
                (true, None) => {
                    buf.advance(read_to);
                    self.next_index = 0;
                    if buf.is_empty() {
                        return Ok(None);
                    }
                }
                (false, Some(offset)) => {
                    let end = self.next_index + offset;
                    self.next_index = 0;
                    let line = buf.split_to(end + 1);
                    return Ok(Some(Self::frame(&line[..end])));
                }
                (false, None) if buf.len() > self.max_length => {
                    self.discarding = true;
                    self.next_index = 0;
                    return Ok(Some(Err(FrameError::TooLong(self.max_length))));
                }
                (false, None) => {
                    self.next_index = read_to;
                    return Ok(None);
                }
            }
        }
    }

    fn decode_eof(&mut self, buf: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if let Some(frame) = self.decode(buf)? {
            return Ok(Some(frame));
        }
        self.next_index = 0;
        if self.discarding || buf.is_empty() {
            self.discarding = false;
            buf.clear();
            return Ok(None);
        }
        let line = buf.split_to(buf.len());
        Ok(Some(Self::frame(&line)))
    }
}

impl Encoder<&str> for MessageCodec {
    type Error = std::io::Error;

    fn encode(&mut self, message: &str, dst: &mut BytesMut) -> Result<(), Self::Error> {
        dst.reserve(message.len() + 1);
        dst.put(message.as_bytes());
        dst.put_u8(b'\n');
        Ok(())
    }
}

/// Stdin/stdout transport. Stdout carries protocol traffic only.
pub struct StdioTransport {
    reader: FramedRead<Stdin, MessageCodec>,
    writer: FramedWrite<Stdout, MessageCodec>,
}

impl StdioTransport {
    pub fn new() -> Self {
        Self {
            reader: FramedRead::new(tokio::io::stdin(), MessageCodec::default()),
            writer: FramedWrite::new(tokio::io::stdout(), MessageCodec::default()),
        }
    }
}

impl Default for StdioTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl McpTransport for StdioTransport {
    async fn receive(&mut self) -> Result<Option<String>, McpError> {
        loop {
            match self.reader.next().await {
                None => return Ok(None),
                Some(Ok(Ok(line))) => {
                    let trimmed = line.trim();
                    if !trimmed.is_empty() {
                        return Ok(Some(trimmed.to_string()));
                    }
                }
                Some(Ok(Err(frame))) => return Err(McpError::Framing(frame)),
                Some(Err(e)) => return Err(McpError::Transport(e)),
            }
        }
    }

    async fn send(&mut self, message: &str) -> Result<(), McpError> {
        self.writer.send(message).await?;
        Ok(())
    }
}

/// In-memory transport for testing, backed by channel pairs.
pub struct ChannelTransport {
    rx: mpsc::Receiver<String>,
    tx: mpsc::Sender<String>,
}

impl ChannelTransport {
    /// Create a pair of connected transports.
    ///
    /// Messages sent on one transport are received by the other.
    pub fn pair() -> (Self, Self) {
        let (tx_a, rx_b) = mpsc::channel(32);
        let (tx_b, rx_a) = mpsc::channel(32);
        (Self { rx: rx_a, tx: tx_a }, Self { rx: rx_b, tx: tx_b })
    }
}

#[async_trait]
impl McpTransport for ChannelTransport {
    async fn receive(&mut self) -> Result<Option<String>, McpError> {
        Ok(self.rx.recv().await)
    }

    async fn send(&mut self, message: &str) -> Result<(), McpError> {
        self.tx.send(message.to_string()).await.map_err(|e| {
            McpError::Transport(std::io::Error::new(std::io::ErrorKind::BrokenPipe, e))
        })
    }
}
