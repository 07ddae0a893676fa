//! # Frame Codec
//!
//! Schema codec for tracker frames.
//!
//! Each datagram carries exactly one frame behind a fixed 4-byte header:
//!
//! ```text
//! ┌──────────┬─────────────┬─────────────┬───────────────────────────┐
//! │ "YV" (2) │ version (1) │ format (1)  │ serialized TrackerFrame   │
//! └──────────┴─────────────┴─────────────┴───────────────────────────┘
//! ```
//!
//! There is no handshake, so the header is the only way a receiver learns
//! how to read a datagram. The serde field order of `TrackerFrame` and
//! `TrackerPose` is the schema; any change to it must bump
//! [`SCHEMA_VERSION`].
//!
//! # Example
//!
//! ```
//! use contracts::{TrackerFrame, WireFormat};
//! use frame_codec::FrameCodec;
//!
//! let codec = FrameCodec::new(WireFormat::Bincode);
//! let frame = TrackerFrame::new(0, 1, "demo");
//! let bytes = codec.encode(&frame).unwrap();
//! assert_eq!(frame_codec::decode(&bytes).unwrap(), frame);
//! ```

mod envelope;

pub use envelope::{EnvelopeHeader, HEADER_LEN, MAGIC, SCHEMA_VERSION};

use bytes::Bytes;
use contracts::{TrackerError, TrackerFrame, WireFormat};

/// Encoder bound to one wire format
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameCodec {
    format: WireFormat,
}

impl FrameCodec {
    pub fn new(format: WireFormat) -> Self {
        Self { format }
    }

    pub fn format(&self) -> WireFormat {
        self.format
    }

    /// Serialize a frame into one datagram payload.
    ///
    /// # Errors
    /// `MalformedSample` when the frame fails validation or cannot be
    /// serialized.
    pub fn encode(&self, frame: &TrackerFrame) -> Result<Bytes, TrackerError> {
        frame.validate()?;

        let mut buf = Vec::with_capacity(HEADER_LEN + 64 + frame.trackers.len() * 128);
        EnvelopeHeader::new(self.format).write_to(&mut buf);

        match self.format {
            WireFormat::Bincode => bincode::serialize_into(&mut buf, frame)
                .map_err(|e| encode_failure(WireFormat::Bincode, e))?,
            WireFormat::Json => serde_json::to_writer(&mut buf, frame)
                .map_err(|e| encode_failure(WireFormat::Json, e))?,
        }

        Ok(Bytes::from(buf))
    }

    /// Decode a datagram; the format is taken from its header, not from
    /// this codec.
    pub fn decode(&self, datagram: &[u8]) -> Result<TrackerFrame, TrackerError> {
        decode(datagram)
    }
}

/// A frame that passed validation but still cannot be written out is a
/// bad sample, not a wire error.
fn encode_failure(format: WireFormat, e: impl std::fmt::Display) -> TrackerError {
    TrackerError::malformed(None, "frame", format!("cannot be encoded as {format:?}: {e}"))
}

/// Decode one datagram into a frame.
///
/// # Errors
/// - `Decode` on a short datagram, wrong magic, unknown format, or a
///   payload that does not match the schema
/// - `SchemaVersion` when the sender speaks another schema version
pub fn decode(datagram: &[u8]) -> Result<TrackerFrame, TrackerError> {
    let header = EnvelopeHeader::parse(datagram)?;
    let payload = &datagram[HEADER_LEN..];

    match header.format {
        WireFormat::Bincode => bincode::deserialize(payload)
            .map_err(|e| TrackerError::decode(format!("bincode error: {e}"))),
        WireFormat::Json => serde_json::from_slice(payload)
            .map_err(|e| TrackerError::decode(format!("json error: {e}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{ErrorKind, Quaternion, TrackerPose, Vector3, HMD_TRACKER_ID};

    fn sample_frame() -> TrackerFrame {
        let first = TrackerPose {
            timestamp: 1_700_000_000_000_000,
            ..TrackerPose::new(0, Vector3::new(1.0, 2.0, 3.0))
        };
        let second = TrackerPose {
            rotation: Quaternion::new(0.0, 0.0, 0.0, 1.0),
            confidence: 0.9,
            is_tracking: false,
            timestamp: 1_700_000_000_000_000,
            ..TrackerPose::new(1, Vector3::new(4.0, 5.0, 6.0))
        };

        TrackerFrame {
            timestamp: 1_700_000_000_000_000,
            trackers: vec![first, second],
            ..TrackerFrame::new(0, 1, "codec test")
        }
    }

    #[test]
    fn test_sample_scenario_bincode() {
        let codec = FrameCodec::new(WireFormat::Bincode);
        let frame = sample_frame();

        let decoded = decode(&codec.encode(&frame).unwrap()).unwrap();

        assert_eq!(decoded, frame);
        assert_eq!(decoded.frame_id, 0);
        assert_eq!(decoded.source_id, 1);
        assert_eq!(decoded.trackers.len(), 2);
        let tracker1 = decoded.tracker(1).unwrap();
        assert!(!tracker1.is_tracking);
        assert_eq!(tracker1.confidence, 0.9);
        assert_eq!(tracker1.position, Vector3::new(4.0, 5.0, 6.0));
    }

    #[test]
    fn test_sample_scenario_json() {
        let codec = FrameCodec::new(WireFormat::Json);
        let frame = sample_frame();

        let bytes = codec.encode(&frame).unwrap();
        assert_eq!(bytes[3], 1, "json format byte");
        assert_eq!(decode(&bytes).unwrap(), frame);
    }

    #[test]
    fn test_optional_presence_survives() {
        let mut frame = sample_frame();
        frame.trackers[0].velocity = Some(Vector3::ZERO);
        frame.trackers[0].angular_velocity = None;
        frame.trackers[1].velocity = None;
        frame.trackers[1].angular_velocity = Some(Vector3::new(0.0, 0.5, 0.0));
        frame.hmd_pose = Some(TrackerPose::hmd(
            Vector3::new(0.0, 1.7, 0.0),
            Quaternion::IDENTITY,
        ));

        for format in [WireFormat::Bincode, WireFormat::Json] {
            let bytes = FrameCodec::new(format).encode(&frame).unwrap();
            let decoded = decode(&bytes).unwrap();

            assert_eq!(decoded.trackers[0].velocity, Some(Vector3::ZERO));
            assert_eq!(decoded.trackers[0].angular_velocity, None);
            assert_eq!(decoded.trackers[1].velocity, None);
            assert!(decoded.trackers[1].angular_velocity.is_some());
            assert_eq!(
                decoded.hmd_pose.as_ref().map(|p| p.tracker_id),
                Some(HMD_TRACKER_ID)
            );
        }
    }

    #[test]
    fn test_absent_hmd_stays_absent() {
        let frame = sample_frame();
        let bytes = FrameCodec::default().encode(&frame).unwrap();
        assert!(decode(&bytes).unwrap().hmd_pose.is_none());
    }

    #[test]
    fn test_encode_rejects_non_finite() {
        let mut frame = sample_frame();
        frame.trackers[1].position.y = f64::NAN;

        let err = FrameCodec::default().encode(&frame).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedSample);
    }

    #[test]
    fn test_encode_failure_is_sender_side() {
        let err = encode_failure(WireFormat::Json, "key must be a string");
        assert_eq!(err.kind(), ErrorKind::MalformedSample);
        assert!(err.to_string().contains("Json"), "got: {err}");
    }

    #[test]
    fn test_decode_rejects_garbage_payload() {
        let mut bytes = FrameCodec::default()
            .encode(&sample_frame())
            .unwrap()
            .to_vec();
        bytes.truncate(HEADER_LEN + 5);

        let err = decode(&bytes).unwrap_err();
        assert!(matches!(err, TrackerError::Decode { .. }), "got: {err:?}");
    }
}
