//! Link counters for senders and receivers

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters of a single sender
#[derive(Debug, Default)]
pub struct SenderMetrics {
    /// Datagrams confirmed sent
    sent_count: AtomicU64,
    /// Sends that returned an error
    failure_count: AtomicU64,
    /// Payload bytes confirmed sent
    bytes_sent: AtomicU64,
}

impl SenderMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent_count(&self) -> u64 {
        self.sent_count.load(Ordering::Relaxed)
    }

    pub fn failure_count(&self) -> u64 {
        self.failure_count.load(Ordering::Relaxed)
    }

    pub fn bytes_sent(&self) -> u64 {
        self.bytes_sent.load(Ordering::Relaxed)
    }

    pub(crate) fn record_sent(&self, bytes: usize) {
        self.sent_count.fetch_add(1, Ordering::Relaxed);
        self.bytes_sent.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    pub(crate) fn inc_failure_count(&self) {
        self.failure_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> SenderSnapshot {
        SenderSnapshot {
            sent_count: self.sent_count(),
            failure_count: self.failure_count(),
            bytes_sent: self.bytes_sent(),
        }
    }
}

/// Snapshot of sender metrics (for reporting)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SenderSnapshot {
    pub sent_count: u64,
    pub failure_count: u64,
    pub bytes_sent: u64,
}

/// Counters of a single receiver, shared with its handle
#[derive(Debug, Default)]
pub struct ReceiverStats {
    /// Frames decoded and accepted (stale ones included)
    frames_received: AtomicU64,
    /// Datagrams discarded for any reason
    frames_dropped: AtomicU64,
    /// Datagrams that failed decoding or validation
    parse_errors: AtomicU64,
    /// Socket receive errors
    network_errors: AtomicU64,
    /// Frame-id discontinuities
    gaps: AtomicU64,
    /// Frames inferred lost from gaps
    frames_lost: AtomicU64,
    /// Late or duplicate frames that were not applied
    stale_frames: AtomicU64,
}

impl ReceiverStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn inc_received(&self) {
        self.frames_received.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn inc_parse_error(&self) {
        self.parse_errors.fetch_add(1, Ordering::Relaxed);
        self.frames_dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn inc_network_error(&self) {
        self.network_errors.fetch_add(1, Ordering::Relaxed);
        self.frames_dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_gap(&self, missing: u64) {
        self.gaps.fetch_add(1, Ordering::Relaxed);
        self.frames_lost.fetch_add(missing, Ordering::Relaxed);
    }

    pub(crate) fn inc_stale(&self) {
        self.stale_frames.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> ReceiverSnapshot {
        ReceiverSnapshot {
            frames_received: self.frames_received.load(Ordering::Relaxed),
            frames_dropped: self.frames_dropped.load(Ordering::Relaxed),
            parse_errors: self.parse_errors.load(Ordering::Relaxed),
            network_errors: self.network_errors.load(Ordering::Relaxed),
            gaps: self.gaps.load(Ordering::Relaxed),
            frames_lost: self.frames_lost.load(Ordering::Relaxed),
            stale_frames: self.stale_frames.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of receiver statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReceiverSnapshot {
    pub frames_received: u64,
    pub frames_dropped: u64,
    pub parse_errors: u64,
    pub network_errors: u64,
    pub gaps: u64,
    pub frames_lost: u64,
    pub stale_frames: u64,
}
