//! Layered configuration: file, then `SENSORHUB_`-prefixed environment,
//! over built-in defaults that match the device's own constants.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::client::ClientOptions;
use crate::session::SessionOptions;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub device: DeviceConfig,
    pub connection: ConnectionConfig,
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// Hostname or address of the sensor hub.
    pub host: String,
    /// WebSocket port of the telemetry endpoint.
    pub ws_port: u16,
    /// HTTP port serving `lang.json`.
    pub http_port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionConfig {
    pub max_reconnect_attempts: u32,
    pub reconnect_interval_secs: u64,
    pub connect_timeout_secs: u64,
    pub history_request_delay_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Chart window, matching the device's on-board history depth.
    pub chart_points: usize,
    pub banner_hide_secs: u64,
    pub status_hide_secs: u64,
    pub sweep_interval_ms: u64,
    /// Where the locale preference survives restarts.
    pub prefs_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            device: DeviceConfig {
                host: "192.168.4.1".to_string(),
                ws_port: 81,
                http_port: 80,
            },
            connection: ConnectionConfig {
                max_reconnect_attempts: 5,
                reconnect_interval_secs: 3,
                connect_timeout_secs: 10,
                history_request_delay_ms: 500,
            },
            ui: UiConfig {
                chart_points: 90,
                banner_hide_secs: 3,
                status_hide_secs: 5,
                sweep_interval_ms: 250,
                prefs_path: PathBuf::from("sensorhub-prefs.json"),
            },
        }
    }
}

impl Config {
    pub fn from_file(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::Config::try_from(&Config::default())?)
            .add_source(config::File::with_name(path))
            .add_source(config::Environment::with_prefix("SENSORHUB").separator("__"))
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    pub fn from_env() -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::Config::try_from(&Config::default())?)
            .add_source(config::Environment::with_prefix("SENSORHUB").separator("__"))
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// `ws://<host>:<ws_port>/`
    pub fn ws_endpoint(&self) -> Result<Url> {
        Ok(Url::parse(&format!(
            "ws://{}:{}/",
            self.device.host, self.device.ws_port
        ))?)
    }

    /// `http://<host>:<http_port>/lang.json`
    pub fn lang_url(&self) -> Result<Url> {
        Ok(Url::parse(&format!(
            "http://{}:{}/lang.json",
            self.device.host, self.device.http_port
        ))?)
    }

    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            max_retries: self.connection.max_reconnect_attempts,
            retry_interval: Duration::from_secs(self.connection.reconnect_interval_secs),
            chart_points: self.ui.chart_points,
            banner_ttl: Duration::from_secs(self.ui.banner_hide_secs),
            status_ttl: Duration::from_secs(self.ui.status_hide_secs),
        }
    }

    pub fn client_options(&self) -> Result<ClientOptions> {
        Ok(ClientOptions {
            endpoint: self.ws_endpoint()?,
            connect_timeout: Duration::from_secs(self.connection.connect_timeout_secs),
            history_delay: Duration::from_millis(self.connection.history_request_delay_ms),
            sweep_interval: Duration::from_millis(self.ui.sweep_interval_ms),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_device_constants() {
        let config = Config::default();
        assert_eq!(config.connection.max_reconnect_attempts, 5);
        assert_eq!(config.connection.reconnect_interval_secs, 3);
        assert_eq!(config.ui.chart_points, 90);
    }

    #[test]
    fn endpoints_are_built_from_the_host() {
        let mut config = Config::default();
        config.device.host = "sensorhub.local".to_string();

        assert_eq!(
            config.ws_endpoint().unwrap().as_str(),
            "ws://sensorhub.local:81/"
        );
        assert_eq!(
            config.lang_url().unwrap().as_str(),
            "http://sensorhub.local:80/lang.json"
        );
    }

    #[test]
    fn file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dashboard.toml");
        std::fs::write(
            &path,
            "[device]\nhost = \"10.0.0.7\"\n\n[connection]\nmax_reconnect_attempts = 2\n",
        )
        .unwrap();

        let config = Config::from_file(path.to_str().unwrap()).unwrap();
        assert_eq!(config.device.host, "10.0.0.7");
        assert_eq!(config.connection.max_reconnect_attempts, 2);
        // Untouched sections keep their defaults.
        assert_eq!(config.ui.chart_points, 90);
    }
}
