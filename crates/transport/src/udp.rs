//! UdpTransport - UDP fire-and-forget datagrams

use std::net::SocketAddr;

use contracts::{DatagramTransport, TrackerError};
use tokio::net::{lookup_host, UdpSocket};
use tracing::{debug, instrument};

/// Unconnected UDP socket bound to an ephemeral local port.
///
/// Unconnected so the destination can change without rebinding.
pub struct UdpTransport {
    socket: UdpSocket,
}

impl UdpTransport {
    /// Bind an ephemeral socket of the same address family as `target`
    #[instrument(name = "udp_transport_bind", skip_all, fields(target = %target))]
    pub async fn bind_for(target: SocketAddr) -> std::io::Result<Self> {
        let local = if target.is_ipv4() {
            "0.0.0.0:0"
        } else {
            "[::]:0"
        };
        let socket = UdpSocket::bind(local).await?;
        debug!(local = ?socket.local_addr().ok(), "UdpTransport bound");
        Ok(Self { socket })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.socket.local_addr()
    }
}

impl DatagramTransport for UdpTransport {
    fn name(&self) -> &str {
        "udp"
    }

    async fn send_to(&mut self, payload: &[u8], target: SocketAddr) -> std::io::Result<usize> {
        self.socket.send_to(payload, target).await
    }

    async fn close(&mut self) -> std::io::Result<()> {
        // The socket itself is released when the transport is dropped
        debug!(local = ?self.socket.local_addr().ok(), "UdpTransport closed");
        Ok(())
    }
}

/// Resolve `host:port`, preferring IPv4 since receivers bind `0.0.0.0`
/// by default.
///
/// # Errors
/// `Configuration` when the host does not resolve.
pub async fn resolve_destination(host: &str, port: u16) -> Result<SocketAddr, TrackerError> {
    let addrs: Vec<SocketAddr> = lookup_host((host, port))
        .await
        .map_err(|e| TrackerError::Configuration {
            message: format!("cannot resolve destination '{host}:{port}'"),
            source: Some(Box::new(e)),
        })?
        .collect();

    addrs
        .iter()
        .find(|addr| addr.is_ipv4())
        .or_else(|| addrs.first())
        .copied()
        .ok_or_else(|| {
            TrackerError::configuration(format!("destination '{host}:{port}' has no addresses"))
        })
}
