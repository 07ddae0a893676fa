//! TrackerReceiver - datagram intake, validation and loss accounting

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use contracts::{timestamp_micros_now, ErrorKind, ReceiverConfig, TrackerError, TrackerFrame};
use observability::{LinkStatsAggregator, LinkSummary};
use tokio::net::UdpSocket;
use tracing::{debug, info, instrument, trace, warn};

use crate::handle::ReceiverHandle;
use crate::metrics::{ReceiverSnapshot, ReceiverStats};
use crate::sequence::{SequenceEvent, SequenceTracker};

/// One frame that passed decoding and validation
#[derive(Debug, Clone)]
pub struct ReceivedFrame {
    pub frame: TrackerFrame,
    pub from: SocketAddr,
    /// Datagram size including the envelope header
    pub bytes: usize,
    pub event: SequenceEvent,
}

/// Socket-free half of the receiver: decode, check, sequence, keep latest.
pub struct DatagramProcessor {
    config: ReceiverConfig,
    sequence: SequenceTracker,
    stats: Arc<ReceiverStats>,
    /// Run summary: applied frames, gaps, stale frames, sizes and intervals
    link: Arc<Mutex<LinkStatsAggregator>>,
    latest: Option<(TrackerFrame, Instant)>,
}

impl DatagramProcessor {
    pub fn new(config: ReceiverConfig) -> Self {
        Self {
            sequence: SequenceTracker::new(config.reorder_window),
            config,
            stats: Arc::new(ReceiverStats::new()),
            link: Arc::new(Mutex::new(LinkStatsAggregator::new())),
            latest: None,
        }
    }

    /// Handle one datagram.
    ///
    /// Stale frames are returned but do not replace the latest frame.
    ///
    /// # Errors
    /// `Decode`, `SchemaVersion`, `TooManyTrackers` or `MalformedSample`;
    /// the datagram is counted as dropped and the stream carries on.
    pub fn process(
        &mut self,
        datagram: &[u8],
        from: SocketAddr,
    ) -> Result<ReceivedFrame, TrackerError> {
        let mut frame = match self.decode_checked(datagram) {
            Ok(frame) => frame,
            Err(e) => {
                self.stats.inc_parse_error();
                observability::record_frame_rejected(e.kind());
                debug!(%from, bytes = datagram.len(), error = %e, "Datagram rejected");
                return Err(e);
            }
        };

        if self.config.normalize_rotations {
            frame.normalize_rotations();
        }

        let event = self.sequence.observe(frame.source_id, frame.frame_id);
        self.stats.inc_received();
        let mut link = lock_link(&self.link);

        match event {
            SequenceEvent::Gap { missing } => {
                self.stats.record_gap(missing);
                link.record_gap(missing);
                observability::record_frame_gap(frame.source_id, missing);
                debug!(
                    source_id = frame.source_id,
                    frame_id = frame.frame_id,
                    missing,
                    "Frame gap"
                );
            }
            SequenceEvent::Stale { behind } => {
                self.stats.inc_stale();
                link.record_stale();
                observability::record_stale_frame(frame.source_id);
                trace!(
                    source_id = frame.source_id,
                    frame_id = frame.frame_id,
                    behind,
                    "Stale frame ignored"
                );
            }
            SequenceEvent::Restart { previous } => {
                info!(
                    source_id = frame.source_id,
                    previous,
                    frame_id = frame.frame_id,
                    "Sender restarted its sequence"
                );
            }
            SequenceEvent::First | SequenceEvent::InOrder => {}
        }

        if event.is_applied() {
            link.record_frame(datagram.len(), timestamp_micros_now());
            observability::record_frame_received(&frame, datagram.len());
            self.latest = Some((frame.clone(), Instant::now()));
        }

        Ok(ReceivedFrame {
            frame,
            from,
            bytes: datagram.len(),
            event,
        })
    }

    fn decode_checked(&self, datagram: &[u8]) -> Result<TrackerFrame, TrackerError> {
        let frame = frame_codec::decode(datagram)?;

        if frame.trackers.len() > self.config.max_trackers {
            return Err(TrackerError::TooManyTrackers {
                count: frame.trackers.len(),
                max: self.config.max_trackers,
            });
        }

        frame.validate()?;
        Ok(frame)
    }

    /// Most recent applied frame
    pub fn latest_frame(&self) -> Option<&TrackerFrame> {
        self.latest.as_ref().map(|(frame, _)| frame)
    }

    /// Whether a frame was applied within `max_age`, or within
    /// `stale_after_ms` when `None`
    pub fn has_recent_data(&self, max_age: Option<Duration>) -> bool {
        let max_age = max_age.unwrap_or(self.stale_after());
        self.latest
            .as_ref()
            .is_some_and(|(_, at)| at.elapsed() <= max_age)
    }

    pub fn stale_after(&self) -> Duration {
        Duration::from_millis(self.config.stale_after_ms)
    }

    pub fn stats(&self) -> ReceiverSnapshot {
        self.stats.snapshot()
    }

    /// Loss rate, datagram sizes and arrival intervals since bind
    pub fn link_summary(&self) -> LinkSummary {
        lock_link(&self.link).summary()
    }

    pub(crate) fn stats_handle(&self) -> &Arc<ReceiverStats> {
        &self.stats
    }

    pub(crate) fn link_handle(&self) -> &Arc<Mutex<LinkStatsAggregator>> {
        &self.link
    }
}

/// The aggregator holds plain counters, so a poisoned lock is still usable
pub(crate) fn lock_link(
    link: &Mutex<LinkStatsAggregator>,
) -> std::sync::MutexGuard<'_, LinkStatsAggregator> {
    link.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Consumer endpoint of the tracker stream, bound to one UDP port
pub struct TrackerReceiver {
    socket: UdpSocket,
    buf: Vec<u8>,
    processor: DatagramProcessor,
}

impl TrackerReceiver {
    /// Bind `bind_address:port`.
    ///
    /// # Errors
    /// `Configuration` when the address cannot be bound.
    #[instrument(
        name = "tracker_receiver_bind",
        skip(config),
        fields(bind = %config.bind_address, port = config.port)
    )]
    pub async fn bind(config: ReceiverConfig) -> Result<Self, TrackerError> {
        let addr = format!("{}:{}", config.bind_address, config.port);
        let socket = UdpSocket::bind(&addr)
            .await
            .map_err(|e| TrackerError::Configuration {
                message: format!("cannot bind receiver to {addr}"),
                source: Some(Box::new(e)),
            })?;

        info!(local = ?socket.local_addr().ok(), "TrackerReceiver listening");

        Ok(Self {
            socket,
            buf: vec![0u8; config.max_frame_size],
            processor: DatagramProcessor::new(config),
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Wait for the next datagram and process it.
    ///
    /// Cancel-safe: a cancelled call loses no datagram.
    ///
    /// # Errors
    /// `Io` on a socket error, otherwise whatever
    /// [`DatagramProcessor::process`] reports. Neither ends the stream.
    pub async fn recv_frame(&mut self) -> Result<ReceivedFrame, TrackerError> {
        let (len, from) = match self.socket.recv_from(&mut self.buf).await {
            Ok(received) => received,
            Err(e) => {
                self.processor.stats.inc_network_error();
                observability::record_frame_rejected(ErrorKind::Transport);
                warn!(error = %e, "Receive failed");
                return Err(e.into());
            }
        };

        self.processor.process(&self.buf[..len], from)
    }

    pub fn latest_frame(&self) -> Option<&TrackerFrame> {
        self.processor.latest_frame()
    }

    pub fn has_recent_data(&self, max_age: Option<Duration>) -> bool {
        self.processor.has_recent_data(max_age)
    }

    pub fn stats(&self) -> ReceiverSnapshot {
        self.processor.stats()
    }

    pub fn link_summary(&self) -> LinkSummary {
        self.processor.link_summary()
    }

    pub(crate) fn processor(&self) -> &DatagramProcessor {
        &self.processor
    }

    /// Move the receiver onto a background task
    pub fn spawn(self) -> ReceiverHandle {
        ReceiverHandle::spawn(self)
    }
}
