//! Echo server: every decoded message is written straight back.

use crate::config::EchoConfig;
use anyhow::{Context, Result};
use futures::{SinkExt, StreamExt};
use serde::{de::DeserializeOwned, Serialize};
use std::net::SocketAddr;
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinSet;
use tokio_bincode::{BinCodec, CodecError, Framing};
use tokio_util::codec::Framed;
use tracing::{debug, info, warn};

/// Serve echo connections on an already bound listener.
///
/// Returns once `max_connections` connections have been accepted and all of
/// them have closed. Without a bound this only returns on an accept error.
pub async fn serve<T>(listener: TcpListener, config: &EchoConfig) -> Result<()>
where
    T: Serialize + DeserializeOwned + Send + 'static,
{
    config
        .framing
        .validate()
        .context("Invalid framing for echo server")?;

    let local = listener.local_addr()?;
    info!(addr = %local, framing = %config.framing, "Echo server listening");

    let mut connections = JoinSet::new();
    let mut accepted = 0usize;

    loop {
        if config.max_connections.is_some_and(|max| accepted >= max) {
            break;
        }

        let (stream, peer) = listener
            .accept()
            .await
            .context("Failed to accept connection")?;
        accepted += 1;

        let framing = config.framing.clone();
        connections.spawn(async move {
            match handle_connection::<T>(stream, peer, framing).await {
                Ok(echoed) => info!(%peer, echoed, "Connection closed"),
                Err(e) => warn!(%peer, error = %e, "Connection failed"),
            }
        });
    }

    while let Some(joined) = connections.join_next().await {
        joined.context("Connection task panicked")?;
    }

    info!(accepted, "Echo server stopped");
    Ok(())
}

/// Bind `config.addr` and serve.
pub async fn bind_and_serve<T>(config: &EchoConfig) -> Result<()>
where
    T: Serialize + DeserializeOwned + Send + 'static,
{
    let listener = TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.addr))?;
    serve::<T>(listener, config).await
}

/// Echo one connection until the peer hangs up. Returns the number of
/// messages echoed.
async fn handle_connection<T>(
    stream: TcpStream,
    peer: SocketAddr,
    framing: Framing,
) -> std::result::Result<u64, CodecError>
where
    T: Serialize + DeserializeOwned,
{
    info!(%peer, "Connection accepted");
    let codec = BinCodec::<T>::with_framing(framing)?;
    let (mut sink, mut stream) = Framed::new(stream, codec).split();

    let mut echoed = 0u64;
    while let Some(message) = stream.next().await {
        sink.send(message?).await?;
        echoed += 1;
        debug!(%peer, echoed, "Echoed message");
    }
    Ok(echoed)
}
