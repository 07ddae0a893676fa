//! TrackerFrameBuilder - incremental frame assembly

use std::collections::BTreeMap;

use contracts::{
    timestamp_micros_now, TrackerError, TrackerFrame, Vector3, HMD_TRACKER_ID, HMD_TRACKER_NAME,
};
use tracing::trace;

use crate::TrackerUpdate;

/// Mutable accumulator for one frame.
///
/// Updates are keyed by tracker id; a later update for the same id
/// replaces the earlier one wholesale. Mutation never fails, invalid
/// numbers surface in [`TrackerFrameBuilder::validate`] or when the frame
/// is encoded.
#[derive(Debug, Clone)]
pub struct TrackerFrameBuilder {
    frame_id: u64,
    source_id: u32,
    system_name: String,
    system_fps: f32,
    is_calibrated: bool,
    lost_tracking_count: u32,
    hmd: Option<TrackerUpdate>,
    trackers: BTreeMap<u32, TrackerUpdate>,
}

impl TrackerFrameBuilder {
    pub fn new(frame_id: u64, source_id: u32, system_name: impl Into<String>) -> Self {
        Self {
            frame_id,
            source_id,
            system_name: system_name.into(),
            system_fps: 0.0,
            is_calibrated: false,
            lost_tracking_count: 0,
            hmd: None,
            trackers: BTreeMap::new(),
        }
    }

    /// Insert or replace the entry for `tracker_id`
    pub fn add_tracker(&mut self, tracker_id: u32, update: TrackerUpdate) -> &mut Self {
        if self.trackers.insert(tracker_id, update).is_some() {
            trace!(frame_id = self.frame_id, tracker_id, "Tracker entry replaced");
        }
        self
    }

    /// Position-only update with identity rotation
    pub fn add_position(&mut self, tracker_id: u32, position: impl Into<Vector3>) -> &mut Self {
        self.add_tracker(tracker_id, TrackerUpdate::new(position))
    }

    /// Drop the entry for `tracker_id`; absent ids are ignored
    pub fn remove_tracker(&mut self, tracker_id: u32) -> &mut Self {
        self.trackers.remove(&tracker_id);
        self
    }

    /// Drop every body tracker; identity, telemetry and HMD pose stay
    pub fn clear_trackers(&mut self) -> &mut Self {
        self.trackers.clear();
        self
    }

    /// Set the HMD reference pose (carried outside the tracker collection)
    pub fn set_hmd_pose(&mut self, update: TrackerUpdate) -> &mut Self {
        self.hmd = Some(update);
        self
    }

    pub fn clear_hmd_pose(&mut self) -> &mut Self {
        self.hmd = None;
        self
    }

    pub fn set_system_fps(&mut self, fps: f32) -> &mut Self {
        self.system_fps = fps;
        self
    }

    pub fn set_calibrated(&mut self, is_calibrated: bool) -> &mut Self {
        self.is_calibrated = is_calibrated;
        self
    }

    pub fn set_lost_tracking_count(&mut self, count: u32) -> &mut Self {
        self.lost_tracking_count = count;
        self
    }

    pub fn tracker_count(&self) -> usize {
        self.trackers.len()
    }

    /// Accumulated ids in ascending order
    pub fn tracker_ids(&self) -> Vec<u32> {
        self.trackers.keys().copied().collect()
    }

    pub fn frame_id(&self) -> u64 {
        self.frame_id
    }

    pub fn source_id(&self) -> u32 {
        self.source_id
    }

    pub fn system_name(&self) -> &str {
        &self.system_name
    }

    /// Snapshot stamped with the current time
    pub fn build(&self) -> TrackerFrame {
        self.build_at(timestamp_micros_now())
    }

    /// Snapshot with an explicit timestamp (µs since UNIX epoch).
    ///
    /// Trackers come out in ascending id order. The builder is left
    /// untouched, so repeated calls yield equal frames.
    pub fn build_at(&self, timestamp: u64) -> TrackerFrame {
        let hmd_pose = self.hmd.as_ref().map(|update| {
            let mut pose = update.to_pose(HMD_TRACKER_ID, timestamp);
            if update.name.is_none() {
                pose.tracker_name = HMD_TRACKER_NAME.to_string();
            }
            pose
        });

        TrackerFrame {
            frame_id: self.frame_id,
            timestamp,
            source_id: self.source_id,
            system_name: self.system_name.clone(),
            system_fps: self.system_fps,
            is_calibrated: self.is_calibrated,
            lost_tracking_count: self.lost_tracking_count,
            hmd_pose,
            trackers: self
                .trackers
                .iter()
                .map(|(id, update)| update.to_pose(*id, timestamp))
                .collect(),
        }
    }

    /// Check the accumulated state without sending anything
    pub fn validate(&self) -> Result<(), TrackerError> {
        self.build_at(0).validate()
    }
}
