//! Outbound command gateway: local validation, open-link guard, and the
//! channel to the socket writer.
//!
//! Commands are fire-and-forget over an assumed-live connection. A send
//! against a link that is not open is refused outright, never queued; the
//! caller surfaces the refusal in the relevant status slot.

use sensorhub_protocol::{Command, Thresholds};
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::debug;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("device link is not open")]
    NotConnected,
    #[error("ssid must not be empty")]
    EmptySsid,
    #[error("threshold `{0}` is not a number")]
    NonNumericThreshold(&'static str),
    #[error("`{0}` lower bound must be below its upper bound")]
    ThresholdOrder(&'static str),
    #[error("brightness {0} is outside 0..=100")]
    BrightnessRange(i64),
    #[error("socket writer is gone")]
    WriterGone,
}

/// Raw threshold form fields, exactly as the user typed them. Parsing is
/// the gateway's job so a non-numeric field is rejected before anything
/// touches the wire.
#[derive(Debug, Clone, Default)]
pub struct ThresholdsInput {
    pub temp_min: String,
    pub temp_max: String,
    pub hum_min: String,
    pub hum_max: String,
    pub co_ppm_max: String,
    pub no2_ppm_max: String,
    pub c2h5oh_ppm_max: String,
    pub voc_ppm_max: String,
}

impl ThresholdsInput {
    /// Parses every field and checks that each min/max pair is ordered.
    pub fn parse(&self) -> Result<Thresholds, CommandError> {
        fn num(field: &str, name: &'static str) -> Result<f64, CommandError> {
            field
                .trim()
                .parse::<f64>()
                .map_err(|_| CommandError::NonNumericThreshold(name))
        }

        let thresholds = Thresholds {
            temp_min: num(&self.temp_min, "tempMin")?,
            temp_max: num(&self.temp_max, "tempMax")?,
            hum_min: num(&self.hum_min, "humMin")?,
            hum_max: num(&self.hum_max, "humMax")?,
            co_ppm_max: num(&self.co_ppm_max, "coPpmMax")?,
            no2_ppm_max: num(&self.no2_ppm_max, "no2PpmMax")?,
            c2h5oh_ppm_max: num(&self.c2h5oh_ppm_max, "c2h5ohPpmMax")?,
            voc_ppm_max: num(&self.voc_ppm_max, "vocPpmMax")?,
        };

        if thresholds.temp_min >= thresholds.temp_max {
            return Err(CommandError::ThresholdOrder("temperature"));
        }
        if thresholds.hum_min >= thresholds.hum_max {
            return Err(CommandError::ThresholdOrder("humidity"));
        }
        Ok(thresholds)
    }
}

/// Checks a slider value against the device's accepted range.
pub fn validate_brightness(value: i64) -> Result<u8, CommandError> {
    if (0..=100).contains(&value) {
        Ok(value as u8)
    } else {
        Err(CommandError::BrightnessRange(value))
    }
}

/// Sends validated commands to the socket writer task.
#[derive(Debug)]
pub struct Gateway {
    tx: mpsc::UnboundedSender<Command>,
}

impl Gateway {
    pub fn new(tx: mpsc::UnboundedSender<Command>) -> Self {
        Self { tx }
    }

    /// Hands `command` to the writer, provided the link is open.
    pub fn send(&self, link_open: bool, command: Command) -> Result<(), CommandError> {
        if !link_open {
            debug!(?command, "link not open, command refused");
            return Err(CommandError::NotConnected);
        }
        self.tx
            .send(command)
            .map_err(|_| CommandError::WriterGone)
    }
}
