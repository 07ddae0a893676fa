//! Body landmark identifiers understood by the receiving driver.

use std::fmt;

/// Reserved tracker id of the head-mounted display reference pose.
///
/// The HMD pose travels in `TrackerFrame::hmd_pose`, never in the
/// general tracker collection.
pub const HMD_TRACKER_ID: u32 = 999;

/// Label carried by the HMD reference pose
pub const HMD_TRACKER_NAME: &str = "HMD";

/// Fixed set of body trackers.
///
/// The discriminant is the wire `tracker_id`. Ids outside this set are
/// still representable on the wire; they simply have no landmark name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u32)]
pub enum BodyTracker {
    LeftLeg = 0,
    RightLeg = 1,
    LeftThigh = 2,
    RightThigh = 3,
    Hip = 4,
    Waist = 5,
    Chest = 6,
    LeftUpperArm = 7,
    RightUpperArm = 8,
    LeftForearm = 9,
    RightForearm = 10,
    Head = 11,
}

impl BodyTracker {
    /// All landmarks in id order
    pub const ALL: [BodyTracker; 12] = [
        Self::LeftLeg,
        Self::RightLeg,
        Self::LeftThigh,
        Self::RightThigh,
        Self::Hip,
        Self::Waist,
        Self::Chest,
        Self::LeftUpperArm,
        Self::RightUpperArm,
        Self::LeftForearm,
        Self::RightForearm,
        Self::Head,
    ];

    #[inline]
    pub const fn id(self) -> u32 {
        self as u32
    }

    pub fn from_id(id: u32) -> Option<Self> {
        Self::ALL.get(id as usize).copied()
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::LeftLeg => "LeftLeg",
            Self::RightLeg => "RightLeg",
            Self::LeftThigh => "LeftThigh",
            Self::RightThigh => "RightThigh",
            Self::Hip => "Hip",
            Self::Waist => "Waist",
            Self::Chest => "Chest",
            Self::LeftUpperArm => "LeftUpperArm",
            Self::RightUpperArm => "RightUpperArm",
            Self::LeftForearm => "LeftForearm",
            Self::RightForearm => "RightForearm",
            Self::Head => "Head",
        }
    }
}

impl From<BodyTracker> for u32 {
    fn from(tracker: BodyTracker) -> Self {
        tracker.id()
    }
}

impl fmt::Display for BodyTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Default label for a tracker id: landmark name, `"HMD"`, or empty.
pub fn default_tracker_name(id: u32) -> &'static str {
    if id == HMD_TRACKER_ID {
        return HMD_TRACKER_NAME;
    }
    BodyTracker::from_id(id).map_or("", BodyTracker::name)
}
