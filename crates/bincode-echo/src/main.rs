//! bincode-echo - echo server and client for tokio-bincode
//!
//! ## Commands
//!
//! - `serve`: Listen for connections and echo every message back
//! - `send`: Send one message and print the echo

use anyhow::{Context, Result};
use bincode_echo::{bind_and_serve, Client, EchoConfig, EchoMessage};
use bincode_telemetry::TelemetryConfig;
use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use tokio_bincode::Framing;
use tracing::info;

#[derive(Parser)]
#[command(name = "bincode-echo")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Echo server and client for tokio-bincode", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    /// Address to listen on or connect to
    #[arg(short, long, global = true, env = "BINCODE_ECHO_ADDR")]
    addr: Option<SocketAddr>,

    /// Message framing (streamed or length-delimited)
    #[arg(short, long, global = true, env = "BINCODE_ECHO_FRAMING")]
    framing: Option<Framing>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the echo server
    Serve {
        /// Exit after this many connections have been served
        #[arg(long)]
        max_connections: Option<usize>,
    },

    /// Send a message and wait for the echo
    Send {
        #[command(subcommand)]
        payload: Payload,
    },
}

#[derive(Subcommand)]
enum Payload {
    /// Send a numbered ping
    Ping {
        #[arg(default_value = "1")]
        value: u64,
    },

    /// Send a text message
    Text { text: String },

    /// Send a blob of the given size in bytes
    Blob {
        #[arg(default_value = "1000000")]
        size: usize,
    },
}

impl From<Payload> for EchoMessage {
    fn from(payload: Payload) -> Self {
        match payload {
            Payload::Ping { value } => EchoMessage::Ping(value),
            Payload::Text { text } => EchoMessage::Text(text),
            Payload::Blob { size } => EchoMessage::blob(size),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    TelemetryConfig::verbose(cli.verbose)
        .with_json(cli.json)
        .init();

    let mut config = EchoConfig::from_env();
    if let Some(addr) = cli.addr {
        config.addr = addr;
    }
    if let Some(framing) = cli.framing {
        config = config.with_framing(framing);
    }

    match cli.command {
        Commands::Serve { max_connections } => {
            if let Some(max) = max_connections {
                config = config.with_max_connections(max);
            }
            bind_and_serve::<EchoMessage>(&config).await
        }
        Commands::Send { payload } => {
            let message = EchoMessage::from(payload);
            let mut client = Client::<EchoMessage>::connect(config.addr, config.framing.clone())
                .await
                .context("Failed to open echo connection")?;

            info!(peer = %client.peer(), message = %message, "Sending");
            let echoed = client.round_trip(message.clone()).await?;
            if echoed != message {
                anyhow::bail!("Echo mismatch: sent {}, received {}", message, echoed);
            }
            println!("{}", echoed);
            Ok(())
        }
    }
}
