//! TrackerFrame - one atomic snapshot of every tracked point
//!
//! Field order of these structs is the wire schema. Reordering or adding
//! fields requires bumping the codec's schema version.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::{default_tracker_name, Quaternion, TrackerError, Vector3, HMD_TRACKER_ID};

/// State of one tracked point at a given instant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackerPose {
    /// Identity within the frame's tracker collection
    pub tracker_id: u32,

    /// Informational label, not used for identity
    pub tracker_name: String,

    /// Position (m)
    pub position: Vector3,

    /// Orientation
    pub rotation: Quaternion,

    /// Linear velocity (m/s); `None` means unknown, not zero
    pub velocity: Option<Vector3>,

    /// Angular velocity (rad/s); `None` means unknown, not zero
    pub angular_velocity: Option<Vector3>,

    /// Tracking-quality estimate in [0, 1]
    pub confidence: f32,

    /// False signals loss explicitly; position/rotation keep the last
    /// known values.
    pub is_tracking: bool,

    /// Capture time (µs since UNIX epoch)
    pub timestamp: u64,
}

impl TrackerPose {
    /// Tracking pose at `position` with identity rotation and full confidence
    pub fn new(tracker_id: u32, position: Vector3) -> Self {
        Self {
            tracker_id,
            tracker_name: default_tracker_name(tracker_id).to_string(),
            position,
            rotation: Quaternion::IDENTITY,
            velocity: None,
            angular_velocity: None,
            confidence: 1.0,
            is_tracking: true,
            timestamp: 0,
        }
    }

    /// HMD reference pose, carrying the reserved id
    pub fn hmd(position: Vector3, rotation: Quaternion) -> Self {
        Self {
            rotation,
            ..Self::new(HMD_TRACKER_ID, position)
        }
    }

    /// Reject non-finite numeric fields
    pub fn validate(&self) -> Result<(), TrackerError> {
        let id = Some(self.tracker_id);
        if !self.position.is_finite() {
            return Err(TrackerError::malformed(id, "position", "is not finite"));
        }
        if !self.rotation.is_finite() {
            return Err(TrackerError::malformed(id, "rotation", "is not finite"));
        }
        if self.velocity.is_some_and(|v| !v.is_finite()) {
            return Err(TrackerError::malformed(id, "velocity", "is not finite"));
        }
        if self.angular_velocity.is_some_and(|v| !v.is_finite()) {
            return Err(TrackerError::malformed(
                id,
                "angular_velocity",
                "is not finite",
            ));
        }
        if !self.confidence.is_finite() {
            return Err(TrackerError::malformed(id, "confidence", "is not finite"));
        }
        Ok(())
    }

    /// Clamp confidence into [0, 1].
    ///
    /// Position and rotation of non-tracking poses are left as they are so
    /// receivers can choose between freezing and hiding the tracker.
    pub fn sanitize(&mut self) {
        if self.confidence.is_finite() {
            self.confidence = self.confidence.clamp(0.0, 1.0);
        }
    }
}

/// One synchronized snapshot of all trackers plus the HMD reference pose
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackerFrame {
    /// Per-sender sequence number, +1 per sent frame
    pub frame_id: u64,

    /// Capture time (µs since UNIX epoch)
    pub timestamp: u64,

    /// Producing system instance
    pub source_id: u32,

    /// Producing system label
    pub system_name: String,

    /// Producer frame rate (advisory)
    pub system_fps: f32,

    /// Producer calibration state (advisory)
    pub is_calibrated: bool,

    /// Producer lost-tracking counter (advisory)
    pub lost_tracking_count: u32,

    /// Head reference pose, never part of `trackers`
    pub hmd_pose: Option<TrackerPose>,

    /// Body trackers, unique by `tracker_id`
    pub trackers: Vec<TrackerPose>,
}

impl TrackerFrame {
    /// Empty frame with the given identity
    pub fn new(frame_id: u64, source_id: u32, system_name: impl Into<String>) -> Self {
        Self {
            frame_id,
            timestamp: 0,
            source_id,
            system_name: system_name.into(),
            system_fps: 0.0,
            is_calibrated: false,
            lost_tracking_count: 0,
            hmd_pose: None,
            trackers: Vec::new(),
        }
    }

    /// Look up a body tracker by id
    pub fn tracker(&self, tracker_id: u32) -> Option<&TrackerPose> {
        self.trackers.iter().find(|t| t.tracker_id == tracker_id)
    }

    pub fn tracker_ids(&self) -> Vec<u32> {
        self.trackers.iter().map(|t| t.tracker_id).collect()
    }

    /// Number of body trackers currently reporting `is_tracking`
    pub fn tracking_count(&self) -> usize {
        self.trackers.iter().filter(|t| t.is_tracking).count()
    }

    /// Check the frame before it reaches the codec.
    ///
    /// # Errors
    /// `MalformedSample` on the first non-finite field, duplicate tracker
    /// id, or misplaced HMD id.
    pub fn validate(&self) -> Result<(), TrackerError> {
        if !self.system_fps.is_finite() {
            return Err(TrackerError::malformed(None, "system_fps", "is not finite"));
        }

        if let Some(hmd) = &self.hmd_pose {
            if hmd.tracker_id != HMD_TRACKER_ID {
                return Err(TrackerError::malformed(
                    Some(hmd.tracker_id),
                    "hmd_pose",
                    format!("must carry tracker id {HMD_TRACKER_ID}"),
                ));
            }
            hmd.validate()?;
        }

        let mut seen = HashSet::with_capacity(self.trackers.len());
        for pose in &self.trackers {
            if pose.tracker_id == HMD_TRACKER_ID {
                return Err(TrackerError::malformed(
                    Some(pose.tracker_id),
                    "trackers",
                    "HMD id is reserved for hmd_pose",
                ));
            }
            if !seen.insert(pose.tracker_id) {
                return Err(TrackerError::malformed(
                    Some(pose.tracker_id),
                    "tracker_id",
                    "appears more than once",
                ));
            }
            pose.validate()?;
        }
        Ok(())
    }

    /// Apply the pose sanitization policy to every pose
    pub fn sanitize(&mut self) {
        if let Some(hmd) = self.hmd_pose.as_mut() {
            hmd.sanitize();
        }
        self.trackers.iter_mut().for_each(TrackerPose::sanitize);
    }

    /// Normalize every rotation in place (receiver side)
    pub fn normalize_rotations(&mut self) {
        if let Some(hmd) = self.hmd_pose.as_mut() {
            hmd.rotation = hmd.rotation.normalized();
        }
        for pose in &mut self.trackers {
            pose.rotation = pose.rotation.normalized();
        }
    }
}
