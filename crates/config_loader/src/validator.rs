//! Config validation
//!
//! Rules:
//! - ports are non-zero
//! - host, bind address and system name are non-empty
//! - datagram size fits one UDP payload, frame buffer at most 64 KiB
//! - max_trackers and reorder_window are at least 1

use contracts::{ReceiverConfig, SenderConfig, StreamConfig, TrackerError, MAX_UDP_PAYLOAD};

/// Largest receive buffer accepted
const MAX_FRAME_BUFFER: usize = 64 * 1024;

/// Validate a StreamConfig
///
/// Returns the first error found, or Ok(()).
pub fn validate(config: &StreamConfig) -> Result<(), TrackerError> {
    validate_sender(&config.sender)?;
    validate_receiver(&config.receiver)?;
    Ok(())
}

fn invalid(field: &str, message: impl std::fmt::Display) -> TrackerError {
    TrackerError::configuration(format!("{field}: {message}"))
}

pub fn validate_sender(sender: &SenderConfig) -> Result<(), TrackerError> {
    if sender.host.trim().is_empty() {
        return Err(invalid("sender.host", "host cannot be empty"));
    }
    if sender.port == 0 {
        return Err(invalid("sender.port", "port must be non-zero"));
    }
    if sender.system_name.trim().is_empty() {
        return Err(invalid("sender.system_name", "system name cannot be empty"));
    }
    if sender.max_datagram_size == 0 || sender.max_datagram_size > MAX_UDP_PAYLOAD {
        return Err(invalid(
            "sender.max_datagram_size",
            format!(
                "must be in 1..={MAX_UDP_PAYLOAD}, got {}",
                sender.max_datagram_size
            ),
        ));
    }
    Ok(())
}

pub fn validate_receiver(receiver: &ReceiverConfig) -> Result<(), TrackerError> {
    if receiver.bind_address.trim().is_empty() {
        return Err(invalid("receiver.bind_address", "bind address cannot be empty"));
    }
    if receiver.port == 0 {
        return Err(invalid("receiver.port", "port must be non-zero"));
    }
    if receiver.max_frame_size == 0 || receiver.max_frame_size > MAX_FRAME_BUFFER {
        return Err(invalid(
            "receiver.max_frame_size",
            format!(
                "must be in 1..={MAX_FRAME_BUFFER}, got {}",
                receiver.max_frame_size
            ),
        ));
    }
    if receiver.max_trackers == 0 {
        return Err(invalid("receiver.max_trackers", "must be at least 1"));
    }
    if receiver.reorder_window == 0 {
        return Err(invalid("receiver.reorder_window", "must be at least 1"));
    }
    Ok(())
}
