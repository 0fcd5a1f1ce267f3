//! Messages exchanged by the echo binary.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EchoMessage {
    Ping(u64),
    Text(String),
    Blob(Vec<u8>),
}

impl EchoMessage {
    /// A blob of `size` bytes cycling through 0..=255.
    pub fn blob(size: usize) -> Self {
        EchoMessage::Blob((0..size).map(|i| i as u8).collect())
    }
}

impl fmt::Display for EchoMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EchoMessage::Ping(n) => write!(f, "ping {}", n),
            EchoMessage::Text(text) => write!(f, "text {:?}", text),
            EchoMessage::Blob(data) => write!(f, "blob of {} bytes", data.len()),
        }
    }
}
