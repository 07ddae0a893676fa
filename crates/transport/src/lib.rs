//! # Transport
//!
//! UDP endpoints of the tracker stream.
//!
//! Responsibilities:
//! - Sender: own the frame-id sequence, encode, emit one datagram per frame
//! - Receiver: decode, validate, detect gaps, keep the latest frame
//! - Never retransmit and never block on a missing frame
//!
//! # Example
//!
//! ```ignore
//! use contracts::SenderConfig;
//! use transport::TrackerSender;
//!
//! let mut sender = TrackerSender::bind(SenderConfig::default()).await?;
//!
//! let mut builder = sender.create_frame();
//! builder.add_position(0, [0.0, 0.1, 0.0]);
//! sender.send_frame(&builder.build()).await?;
//! ```

pub mod handle;
pub mod metrics;
pub mod receiver;
pub mod sender;
pub mod sequence;
pub mod udp;

pub use contracts::{DatagramTransport, TrackerError, TrackerFrame};
pub use frame_builder::{TrackerFrameBuilder, TrackerUpdate};
pub use handle::{LatestFrame, ReceiverHandle};
pub use metrics::{ReceiverSnapshot, ReceiverStats, SenderMetrics, SenderSnapshot};
pub use receiver::{DatagramProcessor, ReceivedFrame, TrackerReceiver};
pub use sender::{SendReport, TrackerSender};
pub use sequence::{SequenceEvent, SequenceTracker};
pub use udp::{resolve_destination, UdpTransport};
