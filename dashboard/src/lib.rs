//! Native client for the ESP32 environmental sensor hub.
//!
//! Maintains a reconnecting WebSocket link to the device, routes its typed
//! JSON frames into bounded chart buffers and view state, and exposes a
//! validated command surface for Wi-Fi setup, thresholds, LED brightness,
//! reset and gas-sensor calibration. Wire types live in
//! `sensorhub-protocol`; rendering is out of scope and sits behind the
//! [`series::ChartSink`] trait.

pub mod client;
pub mod config;
pub mod connection;
pub mod gateway;
pub mod i18n;
pub mod ingest;
pub mod series;
pub mod session;
pub mod status;
pub mod view;

pub use client::{run, ClientOptions};
pub use config::Config;
pub use connection::{ClosedDecision, Link, LinkState};
pub use gateway::{CommandError, ThresholdsInput};
pub use i18n::{Catalog, Prefs};
pub use series::{ChartSink, SeriesBuffer};
pub use session::{Session, SessionOptions};
pub use status::{Slot, StatusBoard, StatusKind};
