use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use clap::Parser;
use sensorhub_dashboard::i18n::{Catalog, Prefs};
use sensorhub_dashboard::{Config, Session};
use tokio::signal;
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "sensorhub-dashboard")]
#[command(about = "Telemetry client for the ESP32 sensor hub", long_about = None)]
struct Cli {
    /// Config file path
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Device host, overriding the config file
    #[arg(long)]
    host: Option<String>,

    /// Display language (persisted for the next run)
    #[arg(short, long)]
    lang: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.debug {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = if let Some(config_path) = &cli.config {
        Config::from_file(config_path.to_str().unwrap())?
    } else {
        Config::from_env()?
    };
    if let Some(host) = cli.host {
        config.device.host = host;
    }

    let mut prefs = Prefs::load(&config.ui.prefs_path);
    if let Some(lang) = cli.lang {
        prefs.lang = lang;
        if let Err(e) = prefs.save(&config.ui.prefs_path) {
            warn!(error = %e, "could not persist language preference");
        }
    }

    let mut catalog = match Catalog::fetch(&config.lang_url()?).await {
        Ok(catalog) => catalog,
        Err(e) => {
            warn!(error = %e, "device catalog unavailable, using embedded copy");
            Catalog::embedded()
        }
    };
    catalog.set_language(&prefs.lang);
    info!(lang = %prefs.lang, host = %config.device.host, "starting dashboard");

    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let session = Arc::new(Mutex::new(Session::new(
        catalog,
        command_tx,
        config.session_options(),
    )));

    tokio::select! {
        result = sensorhub_dashboard::run(session, command_rx, config.client_options()?) => {
            result?;
            info!("client stopped");
        }
        _ = signal::ctrl_c() => {
            info!("received shutdown signal");
        }
    }

    Ok(())
}
