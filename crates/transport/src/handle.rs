//! ReceiverHandle - runs a receiver on its own task

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use contracts::TrackerFrame;
use observability::{LinkStatsAggregator, LinkSummary};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument};

use crate::metrics::{ReceiverSnapshot, ReceiverStats};
use crate::receiver::{lock_link, TrackerReceiver};
use crate::sequence::SequenceEvent;

/// Latest applied frame as published by the receiver task
#[derive(Debug, Clone)]
pub struct LatestFrame {
    pub frame: Arc<TrackerFrame>,
    pub from: SocketAddr,
    pub event: SequenceEvent,
    pub received_at: Instant,
}

impl LatestFrame {
    pub fn age(&self) -> Duration {
        self.received_at.elapsed()
    }
}

/// Handle to a running receiver task
pub struct ReceiverHandle {
    local_addr: Option<SocketAddr>,
    stale_after: Duration,
    /// Latest-frame channel, replaced wholesale on every applied frame
    latest_rx: watch::Receiver<Option<LatestFrame>>,
    stats: Arc<ReceiverStats>,
    link: Arc<Mutex<LinkStatsAggregator>>,
    shutdown_tx: watch::Sender<bool>,
    worker_handle: JoinHandle<()>,
}

impl ReceiverHandle {
    /// Spawn the receive loop
    pub fn spawn(receiver: TrackerReceiver) -> Self {
        let local_addr = receiver.local_addr().ok();
        let stale_after = receiver.processor().stale_after();
        let stats = Arc::clone(receiver.processor().stats_handle());
        let link = Arc::clone(receiver.processor().link_handle());

        let (latest_tx, latest_rx) = watch::channel(None);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let worker_handle = tokio::spawn(async move {
            receiver_worker(receiver, latest_tx, shutdown_rx).await;
        });

        Self {
            local_addr,
            stale_after,
            latest_rx,
            stats,
            link,
            shutdown_tx,
            worker_handle,
        }
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    pub fn latest_frame(&self) -> Option<LatestFrame> {
        self.latest_rx.borrow().clone()
    }

    /// Whether a frame arrived within `max_age` (default `stale_after_ms`)
    pub fn has_recent_data(&self, max_age: Option<Duration>) -> bool {
        let max_age = max_age.unwrap_or(self.stale_after);
        self.latest_rx
            .borrow()
            .as_ref()
            .is_some_and(|latest| latest.age() <= max_age)
    }

    pub fn stats(&self) -> ReceiverSnapshot {
        self.stats.snapshot()
    }

    pub fn link_summary(&self) -> LinkSummary {
        lock_link(&self.link).summary()
    }

    /// New subscriber, woken on every applied frame
    pub fn subscribe(&self) -> watch::Receiver<Option<LatestFrame>> {
        self.latest_rx.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.worker_handle.is_finished()
    }

    /// Stop the receive loop and wait for it to exit
    #[instrument(name = "receiver_handle_shutdown", skip(self))]
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(true);
        if let Err(e) = self.worker_handle.await {
            error!(error = ?e, "Receiver task panicked");
        }
        let summary = lock_link(&self.link).summary();
        info!(
            frames = summary.total_frames,
            lost = summary.total_lost,
            gaps = summary.total_gaps,
            stale = summary.total_stale,
            loss_rate = summary.loss_rate,
            "Receiver link summary"
        );
        debug!(stats = ?self.stats.snapshot(), "ReceiverHandle shutdown complete");
    }
}

#[instrument(name = "receiver_worker_loop", skip_all, fields(local = ?receiver.local_addr().ok()))]
async fn receiver_worker(
    mut receiver: TrackerReceiver,
    latest_tx: watch::Sender<Option<LatestFrame>>,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    debug!("Receiver worker started");

    loop {
        tokio::select! {
            biased;

            changed = shutdown_rx.changed() => {
                if changed.is_err() || *shutdown_rx.borrow() {
                    break;
                }
            }

            result = receiver.recv_frame() => {
                match result {
                    Ok(received) if received.event.is_applied() => {
                        latest_tx.send_replace(Some(LatestFrame {
                            frame: Arc::new(received.frame),
                            from: received.from,
                            event: received.event,
                            received_at: Instant::now(),
                        }));
                    }
                    Ok(_) => {}
                    Err(e) if e.is_fatal() => {
                        error!(error = %e, "Receiver stopping on fatal error");
                        break;
                    }
                    // Already counted and logged; keep listening
                    Err(_) => {}
                }
            }
        }
    }

    debug!("Receiver worker stopped");
}
