//! StreamConfig - Config Loader output
//!
//! Sender and receiver settings. Every field has a default so a config
//! file only needs to name what it changes.

use serde::{Deserialize, Serialize};

/// Default UDP port of the tracker stream
pub const DEFAULT_PORT: u16 = 9999;

/// Largest UDP payload over IPv4
pub const MAX_UDP_PAYLOAD: usize = 65_507;

/// Configuration version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Serialization used inside the datagram envelope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WireFormat {
    /// Compact binary
    #[default]
    Bincode,
    /// Human-readable, for debugging
    Json,
}

/// Full configuration document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StreamConfig {
    #[serde(default)]
    pub version: ConfigVersion,

    #[serde(default)]
    pub sender: SenderConfig,

    #[serde(default)]
    pub receiver: ReceiverConfig,
}

/// Producer side
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SenderConfig {
    /// Destination host name or IP
    #[serde(default = "default_host")]
    pub host: String,

    /// Destination UDP port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Identifies this producer when several stream to one receiver
    #[serde(default = "default_source_id")]
    pub source_id: u32,

    #[serde(default = "default_system_name")]
    pub system_name: String,

    #[serde(default)]
    pub wire_format: WireFormat,

    /// Frames encoding larger than this are rejected before sending
    #[serde(default = "default_max_datagram_size")]
    pub max_datagram_size: usize,

    /// First frame id this sender emits
    #[serde(default)]
    pub initial_frame_id: u64,
}

impl Default for SenderConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            source_id: default_source_id(),
            system_name: default_system_name(),
            wire_format: WireFormat::default(),
            max_datagram_size: default_max_datagram_size(),
            initial_frame_id: 0,
        }
    }
}

/// Consumer side
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiverConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Receive buffer size; longer datagrams are truncated and fail decode
    #[serde(default = "default_max_frame_size")]
    pub max_frame_size: usize,

    /// Frames with more trackers are rejected
    #[serde(default = "default_max_trackers")]
    pub max_trackers: usize,

    /// Age after which the latest frame no longer counts as recent
    #[serde(default = "default_stale_after_ms")]
    pub stale_after_ms: u64,

    /// Backward frame-id jumps up to this size are late frames; larger
    /// jumps mean the sender restarted.
    #[serde(default = "default_reorder_window")]
    pub reorder_window: u64,

    #[serde(default = "default_normalize_rotations")]
    pub normalize_rotations: bool,
}

impl Default for ReceiverConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
            max_frame_size: default_max_frame_size(),
            max_trackers: default_max_trackers(),
            stale_after_ms: default_stale_after_ms(),
            reorder_window: default_reorder_window(),
            normalize_rotations: default_normalize_rotations(),
        }
    }
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_source_id() -> u32 {
    1
}

fn default_system_name() -> String {
    "YoloVr".to_string()
}

fn default_max_datagram_size() -> usize {
    65_000
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_max_frame_size() -> usize {
    64 * 1024
}

fn default_max_trackers() -> usize {
    32
}

fn default_stale_after_ms() -> u64 {
    100
}

fn default_reorder_window() -> u64 {
    64
}

fn default_normalize_rotations() -> bool {
    true
}
