//! Layered error definitions
//!
//! Categorized by where a failure is handled: configuration / sample /
//! transport / resource / decode.

use std::net::SocketAddr;

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum TrackerError {
    // ===== Configuration Errors =====
    /// Invalid or unusable configuration
    #[error("configuration error: {message}")]
    Configuration {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    // ===== Sample Errors =====
    /// Non-finite or out-of-contract numeric input
    #[error("malformed sample for tracker {}: {field} {reason}", display_tracker(.tracker_id))]
    MalformedSample {
        /// `None` for frame-level fields
        tracker_id: Option<u32>,
        field: &'static str,
        reason: String,
    },

    // ===== Transport Errors =====
    /// Datagram send failure
    #[error("transport error sending to {destination}: {source}")]
    Transport {
        destination: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    /// Serialized frame does not fit in one datagram
    #[error("datagram of {size} bytes exceeds limit of {max} bytes")]
    OversizedDatagram { size: usize, max: usize },

    // ===== Resource Errors =====
    /// Send or receive attempted on a closed channel
    #[error("channel is closed")]
    ChannelClosed,

    // ===== Decode Errors =====
    /// Datagram could not be decoded into a frame
    #[error("decode error: {message}")]
    Decode { message: String },

    /// Envelope carries a schema version this build does not speak
    #[error("schema version mismatch: expected {expected}, found {found}")]
    SchemaVersion { expected: u8, found: u8 },

    /// Decoded frame exceeds the receiver's tracker limit
    #[error("frame carries {count} trackers, limit is {max}")]
    TooManyTrackers { count: usize, max: usize },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

fn display_tracker(tracker_id: &Option<u32>) -> String {
    match tracker_id {
        Some(id) => id.to_string(),
        None => "<frame>".to_string(),
    }
}

/// Coarse classification driving the propagation policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Fatal at startup
    Configuration,
    /// Fails one frame
    MalformedSample,
    /// Fails one send, caller may try next tick
    Transport,
    /// Lifecycle bug, fatal
    Resource,
    /// Fails one received datagram
    Decode,
}

impl TrackerError {
    /// Create configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
            source: None,
        }
    }

    /// Create malformed sample error
    pub fn malformed(
        tracker_id: Option<u32>,
        field: &'static str,
        reason: impl Into<String>,
    ) -> Self {
        Self::MalformedSample {
            tracker_id,
            field,
            reason: reason.into(),
        }
    }

    /// Create decode error
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Configuration { .. } => ErrorKind::Configuration,
            Self::MalformedSample { .. } => ErrorKind::MalformedSample,
            Self::Transport { .. } | Self::OversizedDatagram { .. } | Self::Io(_) => {
                ErrorKind::Transport
            }
            Self::ChannelClosed => ErrorKind::Resource,
            Self::Decode { .. } | Self::SchemaVersion { .. } | Self::TooManyTrackers { .. } => {
                ErrorKind::Decode
            }
        }
    }

    /// Configuration and resource errors must stop the stream; everything
    /// else is local to a single frame.
    pub fn is_fatal(&self) -> bool {
        matches!(self.kind(), ErrorKind::Configuration | ErrorKind::Resource)
    }
}
