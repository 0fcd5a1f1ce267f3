//! Echo client.

use futures::{SinkExt, StreamExt};
use serde::{de::DeserializeOwned, Serialize};
use std::fmt;
use std::net::SocketAddr;
use thiserror::Error;
use tokio::net::TcpStream;
use tokio_bincode::{BinCodec, CodecError, Framing};
use tokio_util::codec::Framed;
use tracing::debug;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("Failed to connect to {addr}: {source}")]
    Connect {
        addr: SocketAddr,
        source: std::io::Error,
    },

    #[error("Server closed the connection before replying")]
    Closed,
}

/// A framed connection to an echo server.
pub struct Client<T> {
    framed: Framed<TcpStream, BinCodec<T>>,
    peer: SocketAddr,
}

impl<T> fmt::Debug for Client<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("peer", &self.peer)
            .field("codec", self.framed.codec())
            .finish()
    }
}

impl<T> Client<T>
where
    T: Serialize + DeserializeOwned,
{
    /// Connect using the given framing.
    pub async fn connect(addr: SocketAddr, framing: Framing) -> Result<Self, ClientError> {
        let codec = BinCodec::with_framing(framing)?;
        let stream = TcpStream::connect(addr)
            .await
            .map_err(|source| ClientError::Connect { addr, source })?;
        debug!(%addr, "Connected to echo server");
        Ok(Client {
            framed: Framed::new(stream, codec),
            peer: addr,
        })
    }

    /// Send a message without waiting for the echo.
    pub async fn send(&mut self, message: T) -> Result<(), ClientError> {
        self.framed.send(message).await?;
        Ok(())
    }

    /// Receive the next message, or `None` once the server hangs up.
    pub async fn recv(&mut self) -> Result<Option<T>, ClientError> {
        Ok(self.framed.next().await.transpose()?)
    }

    /// Send a message and wait for its echo.
    pub async fn round_trip(&mut self, message: T) -> Result<T, ClientError> {
        self.send(message).await?;
        self.recv().await?.ok_or(ClientError::Closed)
    }

    /// Address of the server.
    pub fn peer(&self) -> SocketAddr {
        self.peer
    }
}
