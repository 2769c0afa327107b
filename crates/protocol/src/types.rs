//! Value types shared by inbound and outbound frames.

use serde::{Deserialize, Serialize};

/// One reading per gas channel, in PPM. The device omits channels that are
/// still warming up, so every channel is optional.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GasReadings {
    pub co: Option<f64>,
    pub no2: Option<f64>,
    pub c2h5oh: Option<f64>,
    pub voc: Option<f64>,
}

/// Server-decided classification of a metric. The client renders these
/// tags verbatim and never computes thresholds itself.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MetricStatus {
    Normal,
    Warning,
    Disconnected,
    Initializing,
    #[default]
    Unset,
}

impl MetricStatus {
    /// Maps a wire tag to a status. Unknown or absent tags map to `Unset`
    /// so a firmware revision with new tags cannot poison a whole frame.
    pub fn from_tag(tag: Option<&str>) -> Self {
        match tag {
            Some("normal") => Self::Normal,
            Some("warning") => Self::Warning,
            Some("disconnected") => Self::Disconnected,
            Some("initializing") => Self::Initializing,
            _ => Self::Unset,
        }
    }

    pub fn as_tag(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Warning => "warning",
            Self::Disconnected => "disconnected",
            Self::Initializing => "initializing",
            Self::Unset => "",
        }
    }
}

/// Alarm threshold set, one numeric field per monitored bound.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Thresholds {
    pub temp_min: f64,
    pub temp_max: f64,
    pub hum_min: f64,
    pub hum_max: f64,
    pub co_ppm_max: f64,
    pub no2_ppm_max: f64,
    pub c2h5oh_ppm_max: f64,
    pub voc_ppm_max: f64,
}

/// Device settings snapshot carried by a `settingsData` frame.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct DeviceSettings {
    pub thresholds: Option<Thresholds>,
    #[serde(rename = "currentSSID")]
    pub current_ssid: Option<String>,
    #[serde(rename = "ledBrightness")]
    pub led_brightness: Option<u8>,
    #[serde(rename = "r0Values")]
    pub r0_values: Option<GasReadings>,
}

/// Wi-Fi link state as reported by the device.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct WifiStatus {
    pub connected: bool,
    pub ssid: Option<String>,
    pub ip: Option<String>,
    pub connecting_attempt_ssid: Option<String>,
    pub connection_failed: bool,
    pub ap_mode: bool,
    pub ap_ssid: Option<String>,
    pub ntp_synced: bool,
}

/// One network from a Wi-Fi scan.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WifiNetwork {
    pub ssid: String,
    pub rssi: i32,
    #[serde(default)]
    pub encryption: Option<String>,
}

/// Outcome of a previously sent command.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CommandAck {
    pub success: bool,
    pub message: String,
}

/// One record of the device's on-board history ring.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct HistoryRecord {
    pub time: String,
    pub temp: Option<f64>,
    pub hum: Option<f64>,
    pub co: Option<f64>,
    pub no2: Option<f64>,
    pub c2h5oh: Option<f64>,
    pub voc: Option<f64>,
}

/// Calibration phase codes pushed by the device. The client only observes
/// this state machine, it never drives it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CalibrationPhase {
    #[default]
    Idle,
    InProgress,
    Completed,
    Failed,
}

impl CalibrationPhase {
    pub fn from_code(code: u8) -> Self {
        match code {
            1 => Self::InProgress,
            2 => Self::Completed,
            3 => Self::Failed,
            _ => Self::Idle,
        }
    }
}

/// Payload of a `calibrationStatusUpdate` frame.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct CalibrationStatus {
    pub state: u8,
    pub progress: Option<u8>,
    #[serde(rename = "measuredR0")]
    pub measured_r0: Option<GasReadings>,
}

impl CalibrationStatus {
    pub fn phase(&self) -> CalibrationPhase {
        CalibrationPhase::from_code(self.state)
    }
}
