//! Frame-id sequence tracking on the receive side
//!
//! Gaps are loss signals only. Nothing here asks for retransmission and
//! nothing waits for a missing frame.

use std::collections::HashMap;

/// Classification of an incoming frame id relative to its source's history
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceEvent {
    /// First frame seen from this source
    First,
    /// Exactly one past the previous frame
    InOrder,
    /// Frames between the previous one and this one never arrived
    Gap { missing: u64 },
    /// Late or duplicate frame, `behind` ids older than the newest seen
    Stale { behind: u64 },
    /// Large backward jump: the sender restarted its counter
    Restart { previous: u64 },
}

impl SequenceEvent {
    /// Whether the frame should replace the receiver's current state
    pub fn is_applied(&self) -> bool {
        !matches!(self, Self::Stale { .. })
    }
}

/// Per-source newest frame id
#[derive(Debug, Clone)]
pub struct SequenceTracker {
    reorder_window: u64,
    newest: HashMap<u32, u64>,
}

impl SequenceTracker {
    /// `reorder_window`: largest backward jump still treated as a late
    /// frame rather than a sender restart
    pub fn new(reorder_window: u64) -> Self {
        Self {
            reorder_window: reorder_window.max(1),
            newest: HashMap::new(),
        }
    }

    /// Classify `frame_id` from `source_id` and advance the baseline when
    /// the frame is applied.
    pub fn observe(&mut self, source_id: u32, frame_id: u64) -> SequenceEvent {
        let Some(previous) = self.newest.get(&source_id).copied() else {
            self.newest.insert(source_id, frame_id);
            return SequenceEvent::First;
        };

        if frame_id > previous {
            self.newest.insert(source_id, frame_id);
            let missing = frame_id - previous - 1;
            if missing == 0 {
                SequenceEvent::InOrder
            } else {
                SequenceEvent::Gap { missing }
            }
        } else {
            let behind = previous - frame_id;
            if behind > self.reorder_window {
                self.newest.insert(source_id, frame_id);
                SequenceEvent::Restart { previous }
            } else {
                SequenceEvent::Stale { behind }
            }
        }
    }

    /// Newest applied frame id of `source_id`
    pub fn newest(&self, source_id: u32) -> Option<u64> {
        self.newest.get(&source_id).copied()
    }

    /// Forget all sources
    pub fn reset(&mut self) {
        self.newest.clear();
    }
}

impl Default for SequenceTracker {
    fn default() -> Self {
        Self::new(64)
    }
}
