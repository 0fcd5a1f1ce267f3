//! Echo round trips over a real TCP socket for both framings.

use futures::{SinkExt, StreamExt};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tokio_bincode::{BinCodec, CodecError, Framing};
use tokio_util::codec::Framed;

/// Accept a single connection and echo every message back.
async fn start_server<T>(framing: Framing) -> (SocketAddr, JoinHandle<Result<(), CodecError>>)
where
    T: Serialize + DeserializeOwned + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        let (stream, _) = listener.accept().await?;
        let (w, r) = Framed::new(stream, BinCodec::<T>::with_framing(framing)?).split();
        r.forward(w).await
    });

    (addr, handle)
}

async fn connect<T>(addr: SocketAddr, framing: Framing) -> Framed<TcpStream, BinCodec<T>> {
    let stream = TcpStream::connect(addr).await.unwrap();
    Framed::new(stream, BinCodec::with_framing(framing).unwrap())
}

async fn echo_unit_variants(framing: Framing) {
    #[derive(Deserialize, Serialize, Debug, Clone, Eq, PartialEq)]
    enum Mock {
        One,
        Two,
    }

    let (addr, server) = start_server::<Mock>(framing.clone()).await;
    let mut client = connect::<Mock>(addr, framing).await;

    client.send(Mock::One).await.unwrap();
    let got = client.next().await.transpose().unwrap();
    assert_eq!(got, Some(Mock::One), "[Mock::One]> echo mismatch");

    client.send(Mock::Two).await.unwrap();
    let got = client.next().await.transpose().unwrap();
    assert_eq!(got, Some(Mock::Two), "[Mock::Two]> echo mismatch");

    drop(client);
    server.await.unwrap().unwrap();
}

async fn echo_big_payload(framing: Framing) {
    #[derive(Deserialize, Serialize, Debug, Clone, Eq, PartialEq)]
    enum Mock {
        One(Vec<u8>),
        Two,
    }

    let (addr, server) = start_server::<Mock>(framing.clone()).await;
    let mut client = connect::<Mock>(addr, framing).await;

    let data = Mock::One(vec![0; 1_000_000]);
    client.send(data.clone()).await.unwrap();
    let got = client.next().await.transpose().unwrap();
    assert_eq!(got, Some(data));

    client.send(Mock::Two).await.unwrap();
    let got = client.next().await.transpose().unwrap();
    assert_eq!(got, Some(Mock::Two));

    drop(client);
    server.await.unwrap().unwrap();
}

#[tokio::test]
async fn it_works_streamed() {
    echo_unit_variants(Framing::Streamed).await;
}

#[tokio::test]
async fn it_works_length_delimited() {
    echo_unit_variants(Framing::length_delimited()).await;
}

#[tokio::test]
async fn it_works_with_default_codec() {
    echo_unit_variants(Framing::default()).await;
}

#[tokio::test]
async fn big_data_streamed() {
    echo_big_payload(Framing::Streamed).await;
}

#[tokio::test]
async fn big_data_length_delimited() {
    echo_big_payload(Framing::length_delimited()).await;
}

#[tokio::test]
async fn peer_closing_mid_message_is_an_error() {
    use tokio::io::AsyncWriteExt;

    #[derive(Deserialize, Serialize, Debug, PartialEq)]
    struct Note(String);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let writer = tokio::spawn(async move {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        let bytes = bincode::serialize(&Note("cut short".to_string())).unwrap();
        stream.write_all(&bytes[..bytes.len() - 2]).await.unwrap();
        stream.shutdown().await.unwrap();
    });

    let (stream, _) = listener.accept().await.unwrap();
    let codec = BinCodec::<Note>::with_framing(Framing::Streamed).unwrap();
    let mut framed = Framed::new(stream, codec);
    let result = framed.next().await.expect("stream should yield the eof error");
    assert!(result.unwrap_err().is_io());

    writer.await.unwrap();
}
