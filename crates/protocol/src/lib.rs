//! Wire types for the Sensor Hub WebSocket protocol.
//!
//! The device pushes JSON frames tagged by a `type` field and accepts
//! requests tagged by an `action` field. This crate owns both directions
//! plus the value types they share, so the client crate never touches raw
//! `serde_json::Value` routing.

pub mod command;
pub mod message;
pub mod types;

pub use command::Command;
pub use message::{parse_frame, DeviceMessage, FrameError};
pub use types::{
    CalibrationPhase, CalibrationStatus, CommandAck, DeviceSettings, GasReadings, HistoryRecord,
    MetricStatus, Thresholds, WifiNetwork, WifiStatus,
};
