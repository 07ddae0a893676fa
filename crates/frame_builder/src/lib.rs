//! # Frame Builder
//!
//! Assembles a `TrackerFrame` from sparse, possibly repeated per-tracker
//! updates.
//!
//! Responsibilities:
//! - Upsert/remove tracker entries keyed by `tracker_id`
//! - Carry the HMD reference pose outside the tracker collection
//! - Produce a deterministic, immutable snapshot on `build()`
//!
//! The builder never touches frame-id sequencing; that belongs to the
//! sender that created it.
//!
//! # Example
//!
//! ```
//! use contracts::BodyTracker;
//! use frame_builder::{TrackerFrameBuilder, TrackerUpdate};
//!
//! let mut builder = TrackerFrameBuilder::new(0, 1, "demo");
//! builder
//!     .add_position(BodyTracker::Hip.id(), [0.0, 1.0, 0.0])
//!     .add_tracker(
//!         BodyTracker::Chest.id(),
//!         TrackerUpdate::new([0.0, 1.3, 0.0]).with_confidence(0.8),
//!     );
//!
//! let frame = builder.build();
//! assert_eq!(frame.tracker_ids(), vec![4, 6]);
//! ```

mod builder;
mod update;

pub use builder::TrackerFrameBuilder;
pub use update::TrackerUpdate;
