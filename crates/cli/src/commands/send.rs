//! `send` command implementation.

use anyhow::{Context, Result};
use contracts::{codec, Message, OscType};
use tokio::net::UdpSocket;
use tracing::{info, warn};

use crate::cli::SendArgs;

/// Execute the `send` command
///
/// Fire-and-forget: a failed send is logged, not returned.
pub async fn run_send(args: &SendArgs) -> Result<()> {
    let message = Message::from_parts(args.address.clone(), vec![OscType::Int(args.arg)]);
    let bytes = codec::encode_message(&message).context("Failed to encode message")?;

    match send_datagram(&args.host, args.port, &bytes).await {
        Ok(()) => info!(host = %args.host, port = args.port, msg = %message, "Message sent"),
        Err(e) => warn!(host = %args.host, port = args.port, error = %e, "failed to send message"),
    }

    Ok(())
}

async fn send_datagram(host: &str, port: u16, bytes: &[u8]) -> std::io::Result<()> {
    let bind = if host.contains(':') { "[::]:0" } else { "0.0.0.0:0" };
    let socket = UdpSocket::bind(bind).await?;
    socket.send_to(bytes, (host, port)).await?;
    Ok(())
}
