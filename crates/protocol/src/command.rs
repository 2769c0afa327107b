//! Outbound requests, tagged by the `action` field.

use serde::{Deserialize, Serialize};

use crate::types::Thresholds;

/// Every request the client can send. Serialization produces the flat
/// object shape the firmware expects: the tag beside the payload fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Command {
    GetCurrentSettings,
    GetHistoricalData,
    ScanWifi,
    ConnectWifi { ssid: String, password: String },
    SaveThresholds(Thresholds),
    SaveLedBrightness { brightness: u8 },
    ResetSettings,
    StartCalibration,
}

impl Command {
    /// Wire encoding of the command.
    pub fn to_frame(&self) -> String {
        // Serialization of these shapes cannot fail; a panic here would
        // mean the enum itself is malformed.
        serde_json::to_string(self).expect("command serialization")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unit_commands_carry_only_the_action() {
        let frame: serde_json::Value =
            serde_json::from_str(&Command::GetHistoricalData.to_frame()).unwrap();
        assert_eq!(frame, json!({ "action": "getHistoricalData" }));
    }

    #[test]
    fn connect_wifi_shape() {
        let cmd = Command::ConnectWifi {
            ssid: "Home".into(),
            password: "hunter2".into(),
        };
        let frame: serde_json::Value = serde_json::from_str(&cmd.to_frame()).unwrap();
        assert_eq!(
            frame,
            json!({ "action": "connectWifi", "ssid": "Home", "password": "hunter2" })
        );
    }

    #[test]
    fn save_thresholds_is_flat() {
        let cmd = Command::SaveThresholds(Thresholds {
            temp_min: 10.0,
            temp_max: 35.0,
            hum_min: 20.0,
            hum_max: 80.0,
            co_ppm_max: 9.0,
            no2_ppm_max: 0.2,
            c2h5oh_ppm_max: 50.0,
            voc_ppm_max: 1.0,
        });
        let frame: serde_json::Value = serde_json::from_str(&cmd.to_frame()).unwrap();
        assert_eq!(frame["action"], "saveThresholds");
        // Fields sit beside the action tag, not nested under a key.
        assert_eq!(frame["tempMin"], 10.0);
        assert_eq!(frame["vocPpmMax"], 1.0);
    }

    #[test]
    fn brightness_shape() {
        let frame: serde_json::Value =
            serde_json::from_str(&Command::SaveLedBrightness { brightness: 75 }.to_frame())
                .unwrap();
        assert_eq!(
            frame,
            json!({ "action": "saveLedBrightness", "brightness": 75 })
        );
    }
}
