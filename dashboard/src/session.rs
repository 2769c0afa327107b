//! The dashboard session: one object owning the link state, the status
//! board, the telemetry buffers, the view models and the outbound gateway.
//!
//! Everything the wire can do to the UI, and everything the user can do to
//! the wire, goes through here. Each inbound message kind has exactly one
//! handler and each handler mutates exactly one area of state, so dispatch
//! stays an exhaustive match with no cross-talk between arms.

use std::time::{Duration, Instant};

use sensorhub_protocol::message::{HistoryPayload, ScanOutcome, SensorReport};
use sensorhub_protocol::{
    CalibrationStatus, Command, CommandAck, DeviceMessage, DeviceSettings, GasReadings,
    WifiStatus,
};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::connection::{ClosedDecision, Link, LinkState};
use crate::gateway::{validate_brightness, CommandError, Gateway, ThresholdsInput};
use crate::i18n::Catalog;
use crate::ingest::{Telemetry, CHART_POINTS};
use crate::series::{ChartSink, TracingSink};
use crate::status::{Slot, StatusBoard, StatusKind};
use crate::view::{CalibrationPanel, ScanView, SettingsForm, WifiView, WifiLine, PLACEHOLDER};

/// SSID the device falls back to when it opens its own access point.
const DEFAULT_AP_SSID: &str = "ESP32_Sensor_Hub_V2";

/// Tunables a session is built with. Defaults mirror the device's own
/// constants: 90 chart points, five 3-second reconnect attempts.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub max_retries: u32,
    pub retry_interval: Duration,
    pub chart_points: usize,
    /// How long the "connected" banner stays up.
    pub banner_ttl: Duration,
    /// How long command outcomes stay in their slots.
    pub status_ttl: Duration,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            max_retries: 5,
            retry_interval: Duration::from_secs(3),
            chart_points: CHART_POINTS,
            banner_ttl: Duration::from_secs(3),
            status_ttl: Duration::from_secs(5),
        }
    }
}

pub struct Session {
    link: Link,
    status: StatusBoard,
    telemetry: Telemetry,
    catalog: Catalog,
    wifi: WifiView,
    settings: SettingsForm,
    scan: ScanView,
    calibration: CalibrationPanel,
    gateway: Gateway,
    climate_sink: Box<dyn ChartSink>,
    gas_sink: Box<dyn ChartSink>,
    banner_ttl: Duration,
    status_ttl: Duration,
    /// Translation key behind the connection banner, kept so a language
    /// switch can re-render the banner in place.
    banner_key: Option<&'static str>,
}

impl Session {
    pub fn new(catalog: Catalog, commands: mpsc::UnboundedSender<Command>, opts: SessionOptions) -> Self {
        Self {
            link: Link::new(opts.max_retries, opts.retry_interval),
            status: StatusBoard::new(),
            telemetry: Telemetry::new(opts.chart_points),
            catalog,
            wifi: WifiView::default(),
            settings: SettingsForm::default(),
            scan: ScanView::default(),
            calibration: CalibrationPanel::default(),
            gateway: Gateway::new(commands),
            climate_sink: Box::new(TracingSink),
            gas_sink: Box::new(TracingSink),
            banner_ttl: opts.banner_ttl,
            status_ttl: opts.status_ttl,
            banner_key: None,
        }
    }

    /// Swaps the chart sinks. The defaults only trace.
    pub fn set_sinks(&mut self, climate: Box<dyn ChartSink>, gas: Box<dyn ChartSink>) {
        self.climate_sink = climate;
        self.gas_sink = gas;
    }

    // --- read-only views, mostly for rendering and tests ---

    pub fn link(&self) -> &Link {
        &self.link
    }

    pub fn status(&self) -> &StatusBoard {
        &self.status
    }

    pub fn telemetry(&self) -> &Telemetry {
        &self.telemetry
    }

    pub fn wifi(&self) -> &WifiView {
        &self.wifi
    }

    pub fn settings_form(&self) -> &SettingsForm {
        &self.settings
    }

    pub fn scan_view(&self) -> &ScanView {
        &self.scan
    }

    pub fn calibration_panel(&self) -> &CalibrationPanel {
        &self.calibration
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    // --- link lifecycle, driven by the supervisor loop ---

    pub fn on_connecting(&mut self) {
        self.link.on_connecting();
        self.show_banner("ws_connecting", StatusKind::Connecting, None);
    }

    pub fn on_open(&mut self) {
        self.link.on_open();
        let ttl = self.banner_ttl;
        self.show_banner("ws_connected", StatusKind::Connected, Some(ttl));
    }

    /// Transport error. Surfaces a generic banner only; retry accounting
    /// is driven by the closure that follows, never by the error itself.
    pub fn on_transport_error(&mut self) {
        self.show_banner("ws_error", StatusKind::Error, None);
    }

    /// The socket is gone. Returns what the supervisor should do next.
    pub fn on_closed(&mut self) -> ClosedDecision {
        let decision = self.link.on_closed();
        match decision {
            ClosedDecision::RetryAfter { attempt, max, .. } => {
                debug!(attempt, max, "scheduling reconnect");
                self.show_banner("ws_disconnected_retry_attempt", StatusKind::Disconnected, None);
            }
            ClosedDecision::GiveUp => {
                if self.link.state() == LinkState::Failed {
                    self.show_banner("ws_reconnect_failed", StatusKind::Error, None);
                }
            }
        }
        decision
    }

    /// Retires expired status slots.
    pub fn sweep(&mut self, now: Instant) {
        for slot in self.status.sweep(now) {
            if slot == Slot::ConnectionBanner {
                self.banner_key = None;
            }
        }
    }

    // --- inbound ---

    /// Routes one raw text frame. Unparseable frames are logged and
    /// dropped without touching any state; unknown tags are dropped
    /// silently.
    pub fn handle_frame(&mut self, raw: &str) {
        let message = match sensorhub_protocol::parse_frame(raw) {
            Ok(message) => message,
            Err(e) => {
                error!(error = %e, raw, "dropping malformed frame");
                return;
            }
        };

        match message {
            DeviceMessage::SensorData(report) => self.handle_sensor_data(&report),
            DeviceMessage::WifiStatus(status) => self.handle_wifi_status(&status),
            DeviceMessage::HistoricalData(payload) => self.handle_history(&payload),
            DeviceMessage::SettingsData { settings } => self.handle_settings(&settings),
            DeviceMessage::WifiScanResults(outcome) => self.handle_scan_results(outcome),
            DeviceMessage::ConnectWifiStatus(ack) => self.handle_ack(Slot::ConnectWifi, &ack),
            DeviceMessage::SaveSettingsStatus(ack) => self.handle_ack(Slot::SaveSettings, &ack),
            DeviceMessage::SaveBrightnessStatus(ack) => self.handle_ack(Slot::SaveLed, &ack),
            DeviceMessage::ResetStatus(ack) => self.handle_reset_status(&ack),
            DeviceMessage::CalibrationStatusUpdate { calibration } => {
                self.handle_calibration(&calibration)
            }
            DeviceMessage::ScanStatus { message } => {
                self.status
                    .show(Slot::Scan, message, StatusKind::Neutral, Some(self.status_ttl));
            }
            DeviceMessage::Error { message } => {
                error!(%message, "device reported an error");
                self.status
                    .show(Slot::General, message, StatusKind::Failed, Some(self.status_ttl));
            }
            DeviceMessage::Unknown => {
                debug!("dropping frame with unrecognized type tag");
            }
        }
    }

    fn handle_sensor_data(&mut self, report: &SensorReport) {
        self.telemetry
            .apply_report(report, self.climate_sink.as_mut(), self.gas_sink.as_mut());
    }

    fn handle_wifi_status(&mut self, status: &WifiStatus) {
        let (key, line) = if status.connected {
            ("wifi_connected_to", WifiLine::Connected)
        } else if status.connecting_attempt_ssid.is_some() {
            ("wifi_connecting_to", WifiLine::Connecting)
        } else if status.connection_failed {
            ("wifi_connection_failed", WifiLine::Failed)
        } else {
            ("wifi_disconnected", WifiLine::Neutral)
        };

        let mut text = self.catalog.tr(key);
        let ssid = if status.connected {
            status.ssid.as_deref()
        } else {
            status.connecting_attempt_ssid.as_deref()
        };
        if let Some(ssid) = ssid {
            text = text.replace("{ssid}", ssid);
        }
        if !status.connected && status.ap_mode {
            let ap = status.ap_ssid.as_deref().unwrap_or(DEFAULT_AP_SSID);
            text.push_str(&format!(" (AP: {ap})"));
        }

        self.wifi.status_text = text;
        self.wifi.line = line;
        self.wifi.ssid = status.ssid.clone().unwrap_or_else(|| "N/A".to_string());
        self.wifi.ip = status.ip.clone().unwrap_or_else(|| "N/A".to_string());
        self.wifi.ntp_text = self.catalog.tr(if status.ntp_synced {
            "ntp_status_synced"
        } else {
            "ntp_status_failed"
        });
    }

    fn handle_history(&mut self, payload: &HistoryPayload) {
        self.telemetry
            .load_history(payload, self.climate_sink.as_mut(), self.gas_sink.as_mut());
    }

    fn handle_settings(&mut self, settings: &DeviceSettings) {
        self.settings.thresholds = settings.thresholds;
        self.settings.current_ssid = settings.current_ssid.clone();
        self.settings.led_brightness = settings.led_brightness;
        self.settings.r0_values = fmt_r0(settings.r0_values.unwrap_or_default());
    }

    fn handle_scan_results(&mut self, outcome: ScanOutcome) {
        if let Some(error) = outcome.error {
            self.status
                .show(Slot::Scan, error, StatusKind::Failed, Some(self.status_ttl));
            self.scan.networks.clear();
            self.scan.visible = false;
            return;
        }

        if outcome.networks.is_empty() {
            let text = self.catalog.tr("no_networks_found_status");
            self.status
                .show(Slot::Scan, text, StatusKind::Neutral, Some(self.status_ttl));
            self.scan.networks.clear();
            self.scan.visible = false;
        } else {
            let text = format!(
                "{} {}",
                outcome.networks.len(),
                self.catalog.tr("networks_found_status")
            );
            self.status
                .show(Slot::Scan, text, StatusKind::Success, Some(self.status_ttl));
            self.scan.networks = outcome.networks;
            self.scan.visible = true;
        }
    }

    fn handle_ack(&mut self, slot: Slot, ack: &CommandAck) {
        let kind = if ack.success {
            StatusKind::Success
        } else {
            StatusKind::Failed
        };
        self.status
            .show(slot, ack.message.clone(), kind, Some(self.status_ttl));
    }

    fn handle_reset_status(&mut self, ack: &CommandAck) {
        self.handle_ack(Slot::Reset, ack);
        if ack.success {
            info!("{}", self.catalog.tr("settings_reset_success"));
        }
    }

    fn handle_calibration(&mut self, calibration: &CalibrationStatus) {
        use sensorhub_protocol::CalibrationPhase::*;

        let phase = calibration.phase();
        self.calibration.phase = phase;
        match phase {
            InProgress => {
                self.calibration.progress = calibration.progress.unwrap_or(0).min(100);
                self.calibration.measured_r0 = fmt_r0(calibration.measured_r0.unwrap_or_default());
                let text = self.catalog.tr("calibration_inprogress");
                self.status
                    .show(Slot::Calibration, text, StatusKind::Connecting, None);
            }
            Completed => {
                self.calibration.progress = 100;
                let text = self.catalog.tr("calibration_success_reboot");
                self.status
                    .show(Slot::Calibration, text, StatusKind::Success, Some(self.status_ttl));
            }
            Failed => {
                let text = self.catalog.tr("calibration_failed");
                self.status
                    .show(Slot::Calibration, text, StatusKind::Failed, Some(self.status_ttl));
            }
            Idle => {
                self.calibration = CalibrationPanel::default();
                self.status.clear(Slot::Calibration);
            }
        }
    }

    // --- outbound user actions ---

    pub fn request_settings(&mut self) -> Result<(), CommandError> {
        self.gateway
            .send(self.link.is_open(), Command::GetCurrentSettings)
    }

    pub fn request_history(&mut self) -> Result<(), CommandError> {
        self.gateway
            .send(self.link.is_open(), Command::GetHistoricalData)
    }

    pub fn scan_wifi(&mut self) -> Result<(), CommandError> {
        self.guarded_send(Command::ScanWifi, Slot::Scan)?;
        let text = self.catalog.tr("wifi_scanning");
        self.status
            .show(Slot::Scan, text, StatusKind::Connecting, None);
        Ok(())
    }

    pub fn connect_wifi(&mut self, ssid: &str, password: &str) -> Result<(), CommandError> {
        let ssid = ssid.trim();
        if ssid.is_empty() {
            let text = self.catalog.tr("wifi_ssid_empty");
            self.status
                .show(Slot::ConnectWifi, text, StatusKind::Failed, Some(self.status_ttl));
            return Err(CommandError::EmptySsid);
        }

        self.guarded_send(
            Command::ConnectWifi {
                ssid: ssid.to_string(),
                password: password.to_string(),
            },
            Slot::ConnectWifi,
        )?;
        let text = self.catalog.tr("connecting_wifi");
        self.status
            .show(Slot::ConnectWifi, text, StatusKind::Connecting, None);
        Ok(())
    }

    pub fn save_thresholds(&mut self, input: &ThresholdsInput) -> Result<(), CommandError> {
        let thresholds = match input.parse() {
            Ok(thresholds) => thresholds,
            Err(e) => {
                let key = match e {
                    CommandError::ThresholdOrder(_) => "settings_threshold_order",
                    _ => "settings_invalid_threshold",
                };
                let text = self.catalog.tr(key);
                self.status
                    .show(Slot::SaveSettings, text, StatusKind::Failed, Some(self.status_ttl));
                return Err(e);
            }
        };

        self.guarded_send(Command::SaveThresholds(thresholds), Slot::SaveSettings)?;
        let text = self.catalog.tr("settings_saving");
        self.status
            .show(Slot::SaveSettings, text, StatusKind::Neutral, Some(self.status_ttl));
        Ok(())
    }

    pub fn save_led_brightness(&mut self, value: i64) -> Result<(), CommandError> {
        let brightness = match validate_brightness(value) {
            Ok(brightness) => brightness,
            Err(e) => {
                let text = self.catalog.tr("led_brightness_invalid");
                self.status
                    .show(Slot::SaveLed, text, StatusKind::Failed, Some(self.status_ttl));
                return Err(e);
            }
        };

        self.guarded_send(Command::SaveLedBrightness { brightness }, Slot::SaveLed)?;
        let text = self.catalog.tr("led_brightness_saving");
        self.status
            .show(Slot::SaveLed, text, StatusKind::Neutral, Some(self.status_ttl));
        Ok(())
    }

    pub fn reset_settings(&mut self) -> Result<(), CommandError> {
        self.guarded_send(Command::ResetSettings, Slot::Reset)?;
        let text = self.catalog.tr("settings_resetting");
        self.status
            .show(Slot::Reset, text, StatusKind::Neutral, Some(self.status_ttl));
        Ok(())
    }

    pub fn start_calibration(&mut self) -> Result<(), CommandError> {
        self.guarded_send(Command::StartCalibration, Slot::Calibration)?;
        let text = self.catalog.tr("calibration_starting");
        self.status
            .show(Slot::Calibration, text, StatusKind::Connecting, None);
        Ok(())
    }

    /// Sends through the gateway; a refusal lands in `slot` as the
    /// translated "not connected" status.
    fn guarded_send(&mut self, command: Command, slot: Slot) -> Result<(), CommandError> {
        match self.gateway.send(self.link.is_open(), command) {
            Ok(()) => Ok(()),
            Err(e) => {
                warn!(error = %e, "command not sent");
                let text = self.catalog.tr("ws_not_connected");
                self.status
                    .show(slot, text, StatusKind::Failed, Some(self.status_ttl));
                Err(e)
            }
        }
    }

    // --- localization ---

    /// Switches the active language and re-renders the connection banner
    /// in place (other slots carry device-provided text and stay as-is).
    pub fn set_language(&mut self, lang: &str) {
        self.catalog.set_language(lang);
        if let Some(key) = self.banner_key {
            let text = self.banner_text(key);
            self.status.retitle(Slot::ConnectionBanner, text);
        }
    }

    fn show_banner(&mut self, key: &'static str, kind: StatusKind, ttl: Option<Duration>) {
        self.banner_key = Some(key);
        let text = self.banner_text(key);
        self.status.show(Slot::ConnectionBanner, text, kind, ttl);
    }

    fn banner_text(&self, key: &str) -> String {
        let mut text = self.catalog.tr(key);
        if key == "ws_disconnected_retry_attempt" {
            text = text
                .replace("{attempts}", &self.link.retry_count().to_string())
                .replace("{maxAttempts}", &self.link.max_retries().to_string());
        }
        text
    }
}

fn fmt_r0(values: GasReadings) -> [String; 4] {
    let fmt = |v: Option<f64>| match v {
        Some(v) => format!("{v:.2}"),
        None => PLACEHOLDER.to_string(),
    };
    [
        fmt(values.co),
        fmt(values.no2),
        fmt(values.c2h5oh),
        fmt(values.voc),
    ]
}
