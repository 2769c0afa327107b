//! Inbound frames, tagged by the `type` field.

use serde::Deserialize;
use thiserror::Error;

use crate::types::{
    CalibrationStatus, CommandAck, DeviceSettings, GasReadings, HistoryRecord, WifiNetwork,
    WifiStatus,
};

/// A live sensor report. Every field is optional: the device omits values
/// while sensors warm up, and `time_str` is only present once NTP has a
/// usable clock.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SensorReport {
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub gas_ppm: Option<GasReadings>,
    pub temp_status: Option<String>,
    pub hum_status: Option<String>,
    pub gas_co_status: Option<String>,
    pub gas_no2_status: Option<String>,
    pub gas_c2h5oh_status: Option<String>,
    pub gas_voc_status: Option<String>,
    pub time_str: Option<String>,
}

/// Bulk history reply. The device sends an `error` string and an empty
/// `history` array when serialization fails on its side.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct HistoryPayload {
    pub history: Vec<HistoryRecord>,
    pub error: Option<String>,
}

/// Wi-Fi scan reply: either a network list or an error string.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScanOutcome {
    pub networks: Vec<WifiNetwork>,
    pub error: Option<String>,
}

/// Every frame the device can push, discriminated by `type`. Tags this
/// client does not recognize deserialize to [`DeviceMessage::Unknown`] and
/// are dropped by the router, so a newer firmware cannot break dispatch.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type")]
pub enum DeviceMessage {
    #[serde(rename = "sensorData")]
    SensorData(SensorReport),
    #[serde(rename = "wifiStatus")]
    WifiStatus(WifiStatus),
    #[serde(rename = "historicalData")]
    HistoricalData(HistoryPayload),
    #[serde(rename = "settingsData")]
    SettingsData { settings: DeviceSettings },
    #[serde(rename = "wifiScanResults")]
    WifiScanResults(ScanOutcome),
    #[serde(rename = "connectWifiStatus")]
    ConnectWifiStatus(CommandAck),
    #[serde(rename = "saveSettingsStatus")]
    SaveSettingsStatus(CommandAck),
    #[serde(rename = "saveBrightnessStatus")]
    SaveBrightnessStatus(CommandAck),
    #[serde(rename = "resetStatus")]
    ResetStatus(CommandAck),
    #[serde(rename = "calibrationStatusUpdate")]
    CalibrationStatusUpdate { calibration: CalibrationStatus },
    #[serde(rename = "scanStatus")]
    ScanStatus { message: String },
    #[serde(rename = "error")]
    Error { message: String },
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Error)]
pub enum FrameError {
    #[error("malformed frame: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Parses one raw text frame into a [`DeviceMessage`].
pub fn parse_frame(raw: &str) -> Result<DeviceMessage, FrameError> {
    Ok(serde_json::from_str(raw)?)
}
