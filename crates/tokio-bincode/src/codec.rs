//! The bincode codec.

use crate::error::{CodecError, Result};
use crate::framing::{Framing, DEFAULT_MAX_FRAME_LENGTH};
use crate::options::{legacy_options, LegacyOptions};
use bincode::{BincodeRead, Options};
use bytes::{Buf, BufMut, Bytes, BytesMut};
use serde::de::{DeserializeOwned, Visitor};
use serde::Serialize;
use std::io::{self, Read};
use std::{fmt, marker::PhantomData};
use tokio_util::codec::{Decoder, Encoder, LengthDelimitedCodec};
use tracing::trace;

/// Bincode based codec for tokio's `Framed`, `FramedRead` and `FramedWrite`.
///
/// `T` is the message type. `O` selects the bincode [`Options`]; the default
/// [`LegacyOptions`] produce the same bytes as `bincode::serialize`.
///
/// Every message is bounded by [`max_message_length`](Self::max_message_length).
/// For length-delimited framing this is the frame limit; for streamed framing
/// it caps how much of one message may sit in the read buffer.
pub struct BinCodec<T, O = LegacyOptions> {
    options: O,
    framing: Framing,
    lower: Option<LengthDelimitedCodec>,
    max_message_length: usize,
    // a length prefix was consumed but its body has not arrived yet
    pending_frame: bool,
    _pd: PhantomData<fn() -> T>,
}

impl<T> BinCodec<T> {
    /// Codec with legacy options and the default framing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Codec with legacy options and the given framing.
    pub fn with_framing(framing: Framing) -> Result<Self> {
        Self::with_config(legacy_options(), framing)
    }
}

impl<T, O> BinCodec<T, O>
where
    O: Options + Clone,
{
    /// Codec with custom bincode options and the default framing.
    pub fn with_options(options: O) -> Result<Self> {
        Self::with_config(options, Framing::default())
    }

    /// Codec with custom bincode options and an explicit framing.
    pub fn with_config(options: O, framing: Framing) -> Result<Self> {
        let (lower, max_message_length) = match &framing {
            Framing::Streamed => (None, DEFAULT_MAX_FRAME_LENGTH),
            Framing::LengthDelimited(config) => (Some(config.build()?), config.max_frame_length),
        };
        Ok(BinCodec {
            options,
            framing,
            lower,
            max_message_length,
            pending_frame: false,
            _pd: PhantomData,
        })
    }

    /// Replace the largest message this codec reads or writes.
    ///
    /// For length-delimited framing this rewrites `max_frame_length` and the
    /// prefix width must still be able to carry it.
    pub fn with_max_message_length(mut self, max: usize) -> Result<Self> {
        if max == 0 {
            return Err(CodecError::InvalidConfig(
                "max message length must be non-zero".to_string(),
            ));
        }
        if let Framing::LengthDelimited(config) = &mut self.framing {
            config.max_frame_length = max;
            self.lower = Some(config.build()?);
        }
        self.max_message_length = max;
        Ok(self)
    }

    /// The framing this codec reads and writes.
    pub fn framing(&self) -> &Framing {
        &self.framing
    }

    /// The bincode options used for every message.
    pub fn options(&self) -> &O {
        &self.options
    }

    /// Largest encoded message, in bytes, accepted in either direction.
    pub fn max_message_length(&self) -> usize {
        self.max_message_length
    }
}

impl<T> Default for BinCodec<T> {
    #[inline]
    fn default() -> Self {
        let framing = Framing::default();
        let (lower, max_message_length) = match &framing {
            Framing::Streamed => (None, DEFAULT_MAX_FRAME_LENGTH),
            Framing::LengthDelimited(config) => {
                (Some(config.new_codec()), config.max_frame_length)
            }
        };
        BinCodec {
            options: legacy_options(),
            framing,
            lower,
            max_message_length,
            pending_frame: false,
            _pd: PhantomData,
        }
    }
}

impl<T, O: Clone> Clone for BinCodec<T, O> {
    fn clone(&self) -> Self {
        BinCodec {
            options: self.options.clone(),
            framing: self.framing.clone(),
            lower: self.lower.clone(),
            max_message_length: self.max_message_length,
            pending_frame: self.pending_frame,
            _pd: PhantomData,
        }
    }
}

impl<T, O> fmt::Debug for BinCodec<T, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BinCodec")
            .field("framing", &self.framing)
            .field("max_message_length", &self.max_message_length)
            .finish()
    }
}

/// Bincode reports a message cut short by the end of the buffer as an
/// `UnexpectedEof` from the reader.
fn is_incomplete(err: &bincode::Error) -> bool {
    matches!(&**err, bincode::ErrorKind::Io(e) if e.kind() == io::ErrorKind::UnexpectedEof)
}

fn unexpected_eof() -> bincode::Error {
    Box::new(bincode::ErrorKind::Io(io::ErrorKind::UnexpectedEof.into()))
}

/// Reads a message out of the buffered bytes.
///
/// Declared string and byte lengths are checked against what is buffered
/// before anything is allocated, so a forged length prefix only ever means
/// "wait for more bytes". The slice is advanced past everything read.
struct BufferReader<'a, 'b> {
    remaining: &'b mut &'a [u8],
}

impl<'a, 'b> BufferReader<'a, 'b> {
    fn take(&mut self, length: usize) -> bincode::Result<&'a [u8]> {
        if length > self.remaining.len() {
            return Err(unexpected_eof());
        }
        let (taken, rest) = self.remaining.split_at(length);
        *self.remaining = rest;
        Ok(taken)
    }
}

impl<'a, 'b> Read for BufferReader<'a, 'b> {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        self.remaining.read(out)
    }

    fn read_exact(&mut self, out: &mut [u8]) -> io::Result<()> {
        self.remaining.read_exact(out)
    }
}

impl<'a, 'b> BincodeRead<'a> for BufferReader<'a, 'b> {
    fn forward_read_str<V>(&mut self, length: usize, visitor: V) -> bincode::Result<V::Value>
    where
        V: Visitor<'a>,
    {
        let bytes = self.take(length)?;
        match std::str::from_utf8(bytes) {
            Ok(s) => visitor.visit_borrowed_str(s),
            Err(e) => Err(Box::new(bincode::ErrorKind::InvalidUtf8Encoding(e))),
        }
    }

    fn get_byte_buffer(&mut self, length: usize) -> bincode::Result<Vec<u8>> {
        self.take(length).map(<[u8]>::to_vec)
    }

    fn forward_read_bytes<V>(&mut self, length: usize, visitor: V) -> bincode::Result<V::Value>
    where
        V: Visitor<'a>,
    {
        visitor.visit_borrowed_bytes(self.take(length)?)
    }
}

impl<T, O> BinCodec<T, O>
where
    T: DeserializeOwned,
    O: Options + Clone,
{
    fn decode_streamed(&mut self, src: &mut BytesMut) -> Result<Option<T>> {
        if src.is_empty() {
            return Ok(None);
        }

        let mut remaining: &[u8] = &src[..];
        let reader = BufferReader {
            remaining: &mut remaining,
        };
        match self.options.clone().deserialize_from_custom::<_, T>(reader) {
            Ok(message) => {
                let consumed = src.len() - remaining.len();
                src.advance(consumed);
                trace!(consumed, "decoded streamed message");
                Ok(Some(message))
            }
            Err(err) if is_incomplete(&err) => {
                // only the front message is buffered, so it is at least this long
                if src.len() >= self.max_message_length {
                    return Err(CodecError::FrameTooLarge {
                        size: src.len() as u64,
                        max: self.max_message_length,
                    });
                }
                trace!(buffered = src.len(), "waiting for the rest of a message");
                Ok(None)
            }
            Err(err) => Err(err.into()),
        }
    }
}

impl<T, O> Decoder for BinCodec<T, O>
where
    T: DeserializeOwned,
    O: Options + Clone,
{
    type Item = T;
    type Error = CodecError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<T>> {
        let lower = match self.lower.as_mut() {
            Some(lower) => lower,
            None => return self.decode_streamed(src),
        };

        let buffered = src.len();
        match lower.decode(src)? {
            Some(frame) => {
                self.pending_frame = false;
                trace!(frame_len = frame.len(), "decoded length-delimited frame");
                Ok(Some(self.options.clone().deserialize(&frame)?))
            }
            None => {
                if src.len() < buffered {
                    self.pending_frame = true;
                }
                Ok(None)
            }
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<T>> {
        match self.decode(src)? {
            Some(message) => Ok(Some(message)),
            None if src.is_empty() && !self.pending_frame => Ok(None),
            None => {
                self.pending_frame = false;
                Err(CodecError::Io(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    format!(
                        "stream ended with {} bytes of an incomplete message",
                        src.len()
                    ),
                )))
            }
        }
    }
}

impl<T, O> Encoder<T> for BinCodec<T, O>
where
    T: Serialize,
    O: Options + Clone,
{
    type Error = CodecError;

    fn encode(&mut self, item: T, dst: &mut BytesMut) -> Result<()> {
        let size = self.options.clone().serialized_size(&item)?;
        if size > self.max_message_length as u64 {
            return Err(CodecError::FrameTooLarge {
                size,
                max: self.max_message_length,
            });
        }

        match self.lower.as_mut() {
            Some(lower) => {
                let body = self.options.clone().serialize(&item)?;
                lower.encode(Bytes::from(body), dst)?;
            }
            None => {
                dst.reserve(size as usize);
                self.options
                    .clone()
                    .serialize_into((&mut *dst).writer(), &item)?;
            }
        }

        trace!(size, framing = %self.framing, "encoded message");
        Ok(())
    }
}
