//! Tracker stream metrics
//!
//! Prometheus-facing recorders for the send and receive paths, plus an
//! in-memory aggregator for end-of-run summaries.

use contracts::{ErrorKind, TrackerFrame};
use metrics::{counter, gauge, histogram};

/// Record one successfully transmitted frame
pub fn record_frame_sent(source_id: u32, frame_id: u64, bytes: usize) {
    let source = source_id.to_string();
    counter!("tracker_stream_frames_sent_total", "source_id" => source.clone()).increment(1);
    gauge!("tracker_stream_last_sent_frame_id", "source_id" => source).set(frame_id as f64);
    histogram!("tracker_stream_datagram_bytes").record(bytes as f64);
}

/// Record a failed send, labelled by error kind
pub fn record_send_failure(source_id: u32, kind: ErrorKind) {
    counter!(
        "tracker_stream_send_failures_total",
        "source_id" => source_id.to_string(),
        "kind" => kind_label(kind)
    )
    .increment(1);
}

/// Record one accepted frame on the receive side
pub fn record_frame_received(frame: &TrackerFrame, bytes: usize) {
    let source = frame.source_id.to_string();
    counter!("tracker_stream_frames_received_total", "source_id" => source.clone())
        .increment(1);
    gauge!("tracker_stream_last_received_frame_id", "source_id" => source.clone())
        .set(frame.frame_id as f64);
    gauge!("tracker_stream_trackers_tracking", "source_id" => source)
        .set(frame.tracking_count() as f64);
    histogram!("tracker_stream_received_datagram_bytes").record(bytes as f64);
}

/// Record a frame-id discontinuity (frames lost in between)
pub fn record_frame_gap(source_id: u32, missing: u64) {
    let source = source_id.to_string();
    counter!("tracker_stream_gaps_total", "source_id" => source.clone()).increment(1);
    counter!("tracker_stream_frames_lost_total", "source_id" => source).increment(missing);
}

/// Record a datagram the receiver discarded
pub fn record_frame_rejected(kind: ErrorKind) {
    counter!("tracker_stream_frames_rejected_total", "kind" => kind_label(kind)).increment(1);
}

/// Record a late or duplicate frame that was not applied
pub fn record_stale_frame(source_id: u32) {
    counter!("tracker_stream_stale_frames_total", "source_id" => source_id.to_string())
        .increment(1);
}

fn kind_label(kind: ErrorKind) -> &'static str {
    match kind {
        ErrorKind::Configuration => "configuration",
        ErrorKind::MalformedSample => "malformed_sample",
        ErrorKind::Transport => "transport",
        ErrorKind::Resource => "resource",
        ErrorKind::Decode => "decode",
    }
}

/// Link statistics aggregator
///
/// Aggregates receive-side observations in memory for a run summary.
#[derive(Debug, Clone, Default)]
pub struct LinkStatsAggregator {
    /// Frames applied
    pub total_frames: u64,

    /// Frames inferred lost from frame-id gaps
    pub total_lost: u64,

    /// Number of gaps
    pub total_gaps: u64,

    /// Late or duplicate frames
    pub total_stale: u64,

    /// Datagram size (bytes)
    pub datagram_stats: RunningStats,

    /// Time between consecutive frames (ms)
    pub interval_stats: RunningStats,

    last_arrival_us: Option<u64>,
}

impl LinkStatsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an applied frame that arrived at `arrival_us` (µs clock)
    pub fn record_frame(&mut self, bytes: usize, arrival_us: u64) {
        self.total_frames += 1;
        self.datagram_stats.push(bytes as f64);

        if let Some(last) = self.last_arrival_us {
            self.interval_stats
                .push(arrival_us.saturating_sub(last) as f64 / 1000.0);
        }
        self.last_arrival_us = Some(arrival_us);
    }

    pub fn record_gap(&mut self, missing: u64) {
        self.total_gaps += 1;
        self.total_lost += missing;
    }

    pub fn record_stale(&mut self) {
        self.total_stale += 1;
    }

    /// Generate summary report
    pub fn summary(&self) -> LinkSummary {
        let expected = self.total_frames + self.total_lost;
        LinkSummary {
            total_frames: self.total_frames,
            total_lost: self.total_lost,
            total_gaps: self.total_gaps,
            total_stale: self.total_stale,
            loss_rate: if expected > 0 {
                self.total_lost as f64 / expected as f64 * 100.0
            } else {
                0.0
            },
            datagram_bytes: StatsSummary::from(&self.datagram_stats),
            interval_ms: StatsSummary::from(&self.interval_stats),
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Link summary
#[derive(Debug, Clone, Default)]
pub struct LinkSummary {
    pub total_frames: u64,
    pub total_lost: u64,
    pub total_gaps: u64,
    pub total_stale: u64,
    pub loss_rate: f64,
    pub datagram_bytes: StatsSummary,
    pub interval_ms: StatsSummary,
}

impl std::fmt::Display for LinkSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Tracker Link Summary ===")?;
        writeln!(f, "Frames received: {}", self.total_frames)?;
        writeln!(
            f,
            "Frames lost: {} ({:.2}%) in {} gaps",
            self.total_lost, self.loss_rate, self.total_gaps
        )?;
        writeln!(f, "Stale frames: {}", self.total_stale)?;
        writeln!(f, "Datagram size (bytes): {}", self.datagram_bytes)?;
        writeln!(f, "Frame interval (ms): {}", self.interval_ms)?;
        Ok(())
    }
}

/// Snapshot of one [`RunningStats`] series
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    /// Most recent sample
    pub last: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        let (min, max) = stats.range().unwrap_or_default();
        Self {
            count: stats.count(),
            mean: stats.mean(),
            std_dev: stats.std_dev(),
            min,
            max,
            last: stats.last().unwrap_or_default(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            return write!(f, "N/A");
        }
        write!(
            f,
            "mean={:.3} ±{:.3} range=[{:.3}, {:.3}] last={:.3} (n={})",
            self.mean, self.std_dev, self.min, self.max, self.last, self.count
        )
    }
}

/// Streaming mean/variance (Welford) with range and last sample
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    range: Option<(f64, f64)>,
    last: Option<f64>,
}

impl RunningStats {
    pub fn push(&mut self, value: f64) {
        self.count += 1;
        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (value - self.mean);

        self.range = Some(match self.range {
            Some((lo, hi)) => (lo.min(value), hi.max(value)),
            None => (value, value),
        });
        self.last = Some(value);
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    /// 0.0 until the first sample
    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Sample variance
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    /// `(min, max)`, `None` until the first sample
    pub fn range(&self) -> Option<(f64, f64)> {
        self.range
    }

    pub fn last(&self) -> Option<f64> {
        self.last
    }

    /// Spread relative to the mean; for arrival intervals this is the
    /// jitter of the stream
    pub fn coefficient_of_variation(&self) -> Option<f64> {
        (self.count >= 2 && self.mean != 0.0).then(|| self.std_dev() / self.mean)
    }
}
