//! # Contracts
//!
//! Frozen interface contracts shared by every crate of the tracker stream:
//! pose primitives, the frame model, error taxonomy and configuration.
//! All other crates depend on this one; reverse dependencies are prohibited.
//!
//! ## Time Model
//! - Frame and pose timestamps are microseconds since the UNIX epoch (u64)
//! - `frame_id` is a per-sender sequence number used for loss detection

mod body;
mod config;
mod error;
mod frame;
mod pose;
mod time;
mod transport;

pub use body::*;
pub use config::*;
pub use error::*;
pub use frame::*;
pub use pose::*;
pub use time::*;
pub use transport::{DatagramTransport, LocalDatagramTransport};
