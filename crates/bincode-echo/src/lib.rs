//! bincode-echo - TCP echo service speaking tokio-bincode
//!
//! The server frames each accepted socket with a [`tokio_bincode::BinCodec`]
//! and forwards every decoded message back to the sender. The client sends
//! a message and waits for the echo.

pub mod client;
pub mod config;
pub mod message;
pub mod server;

// Re-export key types
pub use client::{Client, ClientError};
pub use config::EchoConfig;
pub use message::EchoMessage;
pub use server::{bind_and_serve, serve};
