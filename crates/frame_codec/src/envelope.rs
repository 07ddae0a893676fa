//! Datagram envelope header

use contracts::{TrackerError, WireFormat};

/// Leading bytes of every tracker datagram
pub const MAGIC: [u8; 2] = *b"YV";

/// Version of the frame schema this build reads and writes
pub const SCHEMA_VERSION: u8 = 1;

/// Magic + version + format
pub const HEADER_LEN: usize = 4;

/// Parsed envelope header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvelopeHeader {
    pub version: u8,
    pub format: WireFormat,
}

impl EnvelopeHeader {
    /// Header for the current schema version
    pub fn new(format: WireFormat) -> Self {
        Self {
            version: SCHEMA_VERSION,
            format,
        }
    }

    pub fn write_to(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&MAGIC);
        buf.push(self.version);
        buf.push(format_to_byte(self.format));
    }

    /// Read and check the header at the start of `datagram`
    pub fn parse(datagram: &[u8]) -> Result<Self, TrackerError> {
        if datagram.len() < HEADER_LEN {
            return Err(TrackerError::decode(format!(
                "datagram of {} bytes is shorter than the {HEADER_LEN}-byte header",
                datagram.len()
            )));
        }
        if datagram[..2] != MAGIC {
            return Err(TrackerError::decode(format!(
                "bad magic {:02x}{:02x}",
                datagram[0], datagram[1]
            )));
        }

        let version = datagram[2];
        if version != SCHEMA_VERSION {
            return Err(TrackerError::SchemaVersion {
                expected: SCHEMA_VERSION,
                found: version,
            });
        }

        let format = format_from_byte(datagram[3])
            .ok_or_else(|| TrackerError::decode(format!("unknown wire format {}", datagram[3])))?;

        Ok(Self { version, format })
    }
}

fn format_to_byte(format: WireFormat) -> u8 {
    match format {
        WireFormat::Bincode => 0,
        WireFormat::Json => 1,
    }
}

fn format_from_byte(byte: u8) -> Option<WireFormat> {
    match byte {
        0 => Some(WireFormat::Bincode),
        1 => Some(WireFormat::Json),
        _ => None,
    }
}
