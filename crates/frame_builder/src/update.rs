//! TrackerUpdate - one sparse per-tracker sample

use contracts::{default_tracker_name, Quaternion, TrackerPose, Vector3};

/// Everything a producer knows about one tracker this tick.
///
/// Only the position is required. Every optional field states its
/// presence explicitly; absent rotation becomes identity, absent
/// velocities stay unknown on the wire.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackerUpdate {
    pub position: Vector3,
    pub rotation: Option<Quaternion>,
    pub velocity: Option<Vector3>,
    pub angular_velocity: Option<Vector3>,
    pub confidence: f32,
    pub is_tracking: bool,
    /// Per-pose capture time (µs); `None` takes the frame timestamp
    pub timestamp: Option<u64>,
    /// Label; `None` takes the landmark name of the id
    pub name: Option<String>,
}

impl TrackerUpdate {
    pub fn new(position: impl Into<Vector3>) -> Self {
        Self {
            position: position.into(),
            rotation: None,
            velocity: None,
            angular_velocity: None,
            confidence: 1.0,
            is_tracking: true,
            timestamp: None,
            name: None,
        }
    }

    pub fn with_rotation(mut self, rotation: impl Into<Quaternion>) -> Self {
        self.rotation = Some(rotation.into());
        self
    }

    pub fn with_velocity(mut self, velocity: impl Into<Vector3>) -> Self {
        self.velocity = Some(velocity.into());
        self
    }

    pub fn with_angular_velocity(mut self, angular_velocity: impl Into<Vector3>) -> Self {
        self.angular_velocity = Some(angular_velocity.into());
        self
    }

    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = confidence;
        self
    }

    pub fn with_tracking(mut self, is_tracking: bool) -> Self {
        self.is_tracking = is_tracking;
        self
    }

    pub fn with_timestamp(mut self, timestamp: u64) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Materialize as a pose; `frame_timestamp` fills an absent timestamp
    pub(crate) fn to_pose(&self, tracker_id: u32, frame_timestamp: u64) -> TrackerPose {
        TrackerPose {
            tracker_id,
            tracker_name: self
                .name
                .clone()
                .unwrap_or_else(|| default_tracker_name(tracker_id).to_string()),
            position: self.position,
            rotation: self.rotation.unwrap_or(Quaternion::IDENTITY),
            velocity: self.velocity,
            angular_velocity: self.angular_velocity,
            confidence: self.confidence,
            is_tracking: self.is_tracking,
            timestamp: self.timestamp.unwrap_or(frame_timestamp),
        }
    }
}

impl From<Vector3> for TrackerUpdate {
    fn from(position: Vector3) -> Self {
        Self::new(position)
    }
}
