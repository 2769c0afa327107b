//! Handler-owned view state. Rendering is someone else's job; these are
//! the values a front end would bind to.

use sensorhub_protocol::{CalibrationPhase, Thresholds, WifiNetwork};

/// Placeholder shown wherever a reading is absent.
pub const PLACEHOLDER: &str = "--";

/// Wi-Fi status line classification, mirroring the dashboard's CSS states.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WifiLine {
    #[default]
    Neutral,
    Connected,
    Connecting,
    Failed,
}

/// The Wi-Fi panel: one dynamic status line plus the SSID/IP/NTP fields.
#[derive(Debug, Clone)]
pub struct WifiView {
    pub status_text: String,
    pub line: WifiLine,
    pub ssid: String,
    pub ip: String,
    pub ntp_text: String,
}

impl Default for WifiView {
    fn default() -> Self {
        Self {
            status_text: String::new(),
            line: WifiLine::Neutral,
            ssid: "N/A".to_string(),
            ip: "N/A".to_string(),
            ntp_text: String::new(),
        }
    }
}

/// Settings form model, populated from `settingsData` snapshots.
#[derive(Debug, Clone, Default)]
pub struct SettingsForm {
    pub thresholds: Option<Thresholds>,
    pub current_ssid: Option<String>,
    pub led_brightness: Option<u8>,
    /// Formatted R0 baselines per gas channel: co, no2, c2h5oh, voc.
    pub r0_values: [String; 4],
}

/// Scan result list. `visible` mirrors whether the SSID picker is shown.
#[derive(Debug, Clone, Default)]
pub struct ScanView {
    pub networks: Vec<WifiNetwork>,
    pub visible: bool,
}

/// Calibration panel, driven exclusively by server pushes: the client
/// observes this state machine and never advances it on its own.
#[derive(Debug, Clone)]
pub struct CalibrationPanel {
    pub phase: CalibrationPhase,
    pub progress: u8,
    /// Formatted measured R0 per gas channel: co, no2, c2h5oh, voc.
    pub measured_r0: [String; 4],
}

impl Default for CalibrationPanel {
    fn default() -> Self {
        Self {
            phase: CalibrationPhase::Idle,
            progress: 0,
            measured_r0: [
                PLACEHOLDER.to_string(),
                PLACEHOLDER.to_string(),
                PLACEHOLDER.to_string(),
                PLACEHOLDER.to_string(),
            ],
        }
    }
}
