//! UdpSink - OSC over UDP, fire-and-forget

use contracts::{codec, ContractError, Message, MessageSink};
use std::net::SocketAddr;
use tokio::net::UdpSocket;
use tracing::{debug, instrument, trace};

/// Sink that writes each message as one OSC datagram to a fixed target
///
/// A successful write only means the datagram left this host.
pub struct UdpSink {
    name: String,
    target: SocketAddr,
    socket: Option<UdpSocket>,
}

impl UdpSink {
    /// Bind an ephemeral local port and connect it to `target`
    #[instrument(name = "udp_sink_connect", skip(name))]
    pub async fn connect(name: impl Into<String>, target: SocketAddr) -> std::io::Result<Self> {
        let name = name.into();
        let local: SocketAddr = if target.is_ipv4() {
            ([0, 0, 0, 0], 0).into()
        } else {
            (std::net::Ipv6Addr::UNSPECIFIED, 0).into()
        };

        let socket = UdpSocket::bind(local).await?;
        socket.connect(target).await?;

        debug!(
            sink = %name,
            target = %target,
            local = ?socket.local_addr().ok(),
            "UdpSink connected"
        );

        Ok(Self {
            name,
            target,
            socket: Some(socket),
        })
    }

    /// Resolved target address
    pub fn target(&self) -> SocketAddr {
        self.target
    }

    fn socket(&self) -> Result<&UdpSocket, ContractError> {
        self.socket
            .as_ref()
            .ok_or_else(|| ContractError::sink_write(&self.name, "socket closed"))
    }
}

impl MessageSink for UdpSink {
    fn name(&self) -> &str {
        &self.name
    }

    async fn write(&mut self, message: &Message) -> Result<(), ContractError> {
        let socket = self.socket()?;
        let data = codec::encode_message(message)?;

        let sent = socket
            .send(&data)
            .await
            .map_err(|e| ContractError::sink_write(&self.name, e.to_string()))?;

        trace!(sink = %self.name, addr = %message.addr(), bytes = sent, "Sent");
        Ok(())
    }

    async fn close(&mut self) -> Result<(), ContractError> {
        self.socket = None;
        debug!(sink = %self.name, "UdpSink closed");
        Ok(())
    }
}
