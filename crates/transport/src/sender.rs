//! TrackerSender - frame sequencing and datagram emission

use std::net::SocketAddr;
use std::sync::Arc;

use contracts::{DatagramTransport, SenderConfig, TrackerError, TrackerFrame};
use frame_builder::{TrackerFrameBuilder, TrackerUpdate};
use frame_codec::FrameCodec;
use tracing::{debug, info, instrument, warn};

use crate::metrics::SenderMetrics;
use crate::udp::{resolve_destination, UdpTransport};

/// Outcome of one confirmed transmission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SendReport {
    pub frame_id: u64,
    /// Datagram size including the envelope header
    pub bytes: usize,
    pub destination: SocketAddr,
}

/// Producer endpoint of the tracker stream.
///
/// Owns the sequence counter: `next_frame_id` advances by one per datagram
/// the transport confirms, and stays put on any failure so the receiver's
/// gap detection never sees a hole for a frame that was never on the wire.
///
/// Driven by one producer loop; every mutating method takes `&mut self`.
pub struct TrackerSender<T: DatagramTransport = UdpTransport> {
    transport: Option<T>,
    host: String,
    destination: SocketAddr,
    codec: FrameCodec,
    source_id: u32,
    system_name: String,
    max_datagram_size: usize,
    next_frame_id: u64,
    metrics: Arc<SenderMetrics>,
}

impl TrackerSender<UdpTransport> {
    /// Resolve the configured destination and bind an ephemeral UDP socket.
    ///
    /// # Errors
    /// `Configuration` when the host does not resolve or no socket can be
    /// bound.
    #[instrument(
        name = "tracker_sender_bind",
        skip(config),
        fields(host = %config.host, port = config.port)
    )]
    pub async fn bind(config: SenderConfig) -> Result<Self, TrackerError> {
        let destination = resolve_destination(&config.host, config.port).await?;
        let transport =
            UdpTransport::bind_for(destination)
                .await
                .map_err(|e| TrackerError::Configuration {
                    message: format!("cannot bind UDP socket for {destination}"),
                    source: Some(Box::new(e)),
                })?;

        Ok(Self::assemble(config, transport, destination))
    }
}

impl<T: DatagramTransport> TrackerSender<T> {
    /// Build a sender over a caller-supplied transport
    pub async fn with_transport(config: SenderConfig, transport: T) -> Result<Self, TrackerError> {
        let destination = resolve_destination(&config.host, config.port).await?;
        Ok(Self::assemble(config, transport, destination))
    }

    fn assemble(config: SenderConfig, transport: T, destination: SocketAddr) -> Self {
        info!(
            transport = transport.name(),
            %destination,
            source_id = config.source_id,
            format = ?config.wire_format,
            "TrackerSender ready"
        );

        Self {
            transport: Some(transport),
            host: config.host,
            destination,
            codec: FrameCodec::new(config.wire_format),
            source_id: config.source_id,
            system_name: config.system_name,
            max_datagram_size: config.max_datagram_size,
            next_frame_id: config.initial_frame_id,
            metrics: Arc::new(SenderMetrics::new()),
        }
    }

    /// Builder pre-filled with the next frame id, source id and system name.
    ///
    /// The id is a preview: [`send_frame`](Self::send_frame) stamps the
    /// sender's own counter, so builders created ahead of time never put a
    /// duplicate id on the wire.
    pub fn create_frame(&self) -> TrackerFrameBuilder {
        TrackerFrameBuilder::new(self.next_frame_id, self.source_id, self.system_name.clone())
    }

    /// Sanitize, encode and send `frame` as one datagram.
    ///
    /// The datagram carries `next_frame_id`, whatever `frame.frame_id`
    /// says. Never retries. The frame counter advances only when the whole
    /// datagram was handed to the transport.
    ///
    /// # Errors
    /// - `ChannelClosed` after [`close`](Self::close)
    /// - `MalformedSample` for non-finite values or duplicate tracker ids
    /// - `OversizedDatagram` when the encoding exceeds `max_datagram_size`
    /// - `Transport` when the OS rejects the send or writes it short
    #[instrument(
        name = "tracker_sender_send",
        skip(self, frame),
        fields(source_id = self.source_id, frame_id = self.next_frame_id)
    )]
    pub async fn send_frame(&mut self, frame: &TrackerFrame) -> Result<SendReport, TrackerError> {
        let frame_id = self.next_frame_id;
        match self.transmit(frame, frame_id).await {
            Ok(bytes) => {
                self.next_frame_id = frame_id.wrapping_add(1);
                self.metrics.record_sent(bytes);
                observability::record_frame_sent(self.source_id, frame_id, bytes);
                debug!(
                    destination = %self.destination,
                    bytes,
                    trackers = frame.trackers.len(),
                    "Sent"
                );

                Ok(SendReport {
                    frame_id,
                    bytes,
                    destination: self.destination,
                })
            }
            Err(e) => {
                self.metrics.inc_failure_count();
                observability::record_send_failure(self.source_id, e.kind());
                warn!(destination = %self.destination, error = %e, "Send failed");
                Err(e)
            }
        }
    }

    async fn transmit(
        &mut self,
        frame: &TrackerFrame,
        frame_id: u64,
    ) -> Result<usize, TrackerError> {
        let transport = self.transport.as_mut().ok_or(TrackerError::ChannelClosed)?;

        let mut frame = frame.clone();
        frame.frame_id = frame_id;
        frame.sanitize();
        let payload = self.codec.encode(&frame)?;

        if payload.len() > self.max_datagram_size {
            return Err(TrackerError::OversizedDatagram {
                size: payload.len(),
                max: self.max_datagram_size,
            });
        }

        let destination = self.destination;
        let sent = transport
            .send_to(&payload, destination)
            .await
            .map_err(|source| TrackerError::Transport {
                destination,
                source,
            })?;

        if sent != payload.len() {
            return Err(TrackerError::Transport {
                destination,
                source: std::io::Error::new(
                    std::io::ErrorKind::WriteZero,
                    format!("short send: {sent} of {} bytes", payload.len()),
                ),
            });
        }

        Ok(sent)
    }

    /// Build a frame from `(tracker_id, update)` pairs and send it
    pub async fn send_tracker_snapshot<I>(
        &mut self,
        trackers: I,
    ) -> Result<SendReport, TrackerError>
    where
        I: IntoIterator<Item = (u32, TrackerUpdate)>,
    {
        let mut builder = self.create_frame();
        for (tracker_id, update) in trackers {
            builder.add_tracker(tracker_id, update);
        }
        let frame = builder.build();
        self.send_frame(&frame).await
    }

    /// Point the sender at a new host and/or port.
    ///
    /// Frame sequencing continues uninterrupted.
    ///
    /// # Errors
    /// `Configuration` when the new host does not resolve; the previous
    /// destination stays in effect.
    #[instrument(name = "tracker_sender_reconfigure", skip(self))]
    pub async fn reconfigure_destination(
        &mut self,
        host: Option<&str>,
        port: Option<u16>,
    ) -> Result<SocketAddr, TrackerError> {
        let host = host.unwrap_or(&self.host).to_string();
        let port = port.unwrap_or(self.destination.port());
        if port == 0 {
            return Err(TrackerError::configuration("destination port must not be 0"));
        }

        let destination = resolve_destination(&host, port).await?;
        info!(from = %self.destination, to = %destination, "Destination changed");

        self.host = host;
        self.destination = destination;
        Ok(destination)
    }

    /// Release the transport. Later sends fail with `ChannelClosed`;
    /// closing twice is a no-op.
    #[instrument(name = "tracker_sender_close", skip(self), fields(source_id = self.source_id))]
    pub async fn close(&mut self) -> Result<(), TrackerError> {
        if let Some(mut transport) = self.transport.take() {
            transport.close().await?;
            info!(
                sent = self.metrics.sent_count(),
                failed = self.metrics.failure_count(),
                "TrackerSender closed"
            );
        }
        Ok(())
    }

    pub fn is_closed(&self) -> bool {
        self.transport.is_none()
    }

    /// Frame id the next successful send will carry when built via
    /// [`create_frame`](Self::create_frame)
    pub fn next_frame_id(&self) -> u64 {
        self.next_frame_id
    }

    pub fn destination(&self) -> SocketAddr {
        self.destination
    }

    pub fn source_id(&self) -> u32 {
        self.source_id
    }

    pub fn system_name(&self) -> &str {
        &self.system_name
    }

    pub fn metrics(&self) -> &Arc<SenderMetrics> {
        &self.metrics
    }
}
