//! DatagramTransport trait - sender output interface
//!
//! Abstracts the unreliable datagram channel a sender writes to.

use std::net::SocketAddr;

/// Connectionless, unacknowledged datagram channel
///
/// Implementations send each payload as exactly one datagram and never
/// retry.
#[trait_variant::make(DatagramTransport: Send)]
pub trait LocalDatagramTransport {
    /// Transport name (used for logging)
    fn name(&self) -> &str;

    /// Send one datagram to `target`
    ///
    /// # Errors
    /// Returns the OS error of the send (unreachable network, oversized
    /// datagram, ...)
    async fn send_to(&mut self, payload: &[u8], target: SocketAddr) -> std::io::Result<usize>;

    /// Release the underlying socket; later sends are a caller bug
    async fn close(&mut self) -> std::io::Result<()>;
}
