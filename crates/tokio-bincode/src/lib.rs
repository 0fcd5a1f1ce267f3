//! Tokio codec for use with bincode
//!
//! This crate provides a `bincode` based codec that can be used with
//! tokio's `Framed`, `FramedRead`, and `FramedWrite`.
//!
//! # Example
//!
//! ```no_run
//! use futures::{SinkExt, StreamExt};
//! use serde::{Deserialize, Serialize};
//! use tokio::net::TcpStream;
//! use tokio_bincode::BinCodec;
//! use tokio_util::codec::Framed;
//!
//! #[derive(Serialize, Deserialize)]
//! enum MyProtocol {
//!     Hello,
//! }
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let transport = TcpStream::connect("127.0.0.1:15151").await?;
//!
//! // Create the codec based on your custom protocol
//! let codec = BinCodec::<MyProtocol>::new();
//!
//! // Frame the transport with the codec to produce a stream/sink
//! let (mut sink, mut stream) = Framed::new(transport, codec).split();
//! sink.send(MyProtocol::Hello).await?;
//! let _reply = stream.next().await;
//! # Ok(())
//! # }
//! ```
//!
//! # Framing
//!
//! [`Framing::Streamed`] writes bare bincode messages back to back. The
//! decoder finds message boundaries by deserializing, so a large message
//! arriving over many reads is parsed again on each read.
//!
//! [`Framing::LengthDelimited`] prepends the length of each message, which
//! lets large amounts of data be buffered once and decoded a single time.
//!
//! # Features
//!
//! `big_data` makes length-delimited framing the default for
//! [`BinCodec::new`]. Without it the default is streamed framing.

#![deny(missing_debug_implementations)]

pub mod codec;
pub mod error;
pub mod framing;
pub mod options;

// Re-export key types
pub use codec::BinCodec;
pub use error::{CodecError, Result};
pub use framing::{Framing, LengthDelimitedConfig};
pub use options::{legacy_options, LegacyOptions};
