//! The supervisor loop: owns the socket, feeds lifecycle events and frames
//! to the session, and drains the outbound command channel onto the wire.
//!
//! Reconnection is strictly sequential. One connection attempt runs at a
//! time; when the stream ends the session decides whether to retry (after
//! its fixed interval) or give up, and the loop obeys.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use anyhow::Result;
use futures_util::{SinkExt, StreamExt};
use sensorhub_protocol::Command;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, info, warn};
use url::Url;

use crate::connection::{open_socket, ClosedDecision};
use crate::session::Session;

#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// `ws://<device-host>:81/`.
    pub endpoint: Url,
    pub connect_timeout: Duration,
    /// Lag between the socket opening and the history request, giving the
    /// device time to finish its own post-accept work.
    pub history_delay: Duration,
    /// Cadence of the status auto-clear sweep.
    pub sweep_interval: Duration,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            endpoint: Url::parse("ws://192.168.4.1:81/").expect("default endpoint"),
            connect_timeout: Duration::from_secs(10),
            history_delay: Duration::from_millis(500),
            sweep_interval: Duration::from_millis(250),
        }
    }
}

/// Runs the client until retries are exhausted. The session is shared so
/// a front end (or a test) can read view state while the loop runs; the
/// loop locks it only for the duration of one event, never across an
/// await.
pub async fn run(
    session: Arc<Mutex<Session>>,
    mut commands: mpsc::UnboundedReceiver<Command>,
    opts: ClientOptions,
) -> Result<()> {
    loop {
        lock(&session).on_connecting();

        match open_socket(&opts.endpoint, opts.connect_timeout).await {
            Ok(stream) => {
                lock(&session).on_open();
                if let Err(e) = lock(&session).request_settings() {
                    warn!(error = %e, "initial settings request failed");
                }

                let (mut write, mut read) = stream.split();
                let mut sweep = tokio::time::interval(opts.sweep_interval);
                let history_timer = tokio::time::sleep(opts.history_delay);
                tokio::pin!(history_timer);
                let mut history_requested = false;

                loop {
                    tokio::select! {
                        () = &mut history_timer, if !history_requested => {
                            history_requested = true;
                            if let Err(e) = lock(&session).request_history() {
                                warn!(error = %e, "history request failed");
                            }
                        }
                        _ = sweep.tick() => {
                            lock(&session).sweep(Instant::now());
                        }
                        Some(command) = commands.recv() => {
                            debug!(?command, "sending command");
                            if let Err(e) = write.send(Message::Text(command.to_frame())).await {
                                error!(error = %e, "socket write failed");
                                lock(&session).on_transport_error();
                                break;
                            }
                        }
                        frame = read.next() => match frame {
                            Some(Ok(Message::Text(raw))) => {
                                lock(&session).handle_frame(&raw);
                            }
                            Some(Ok(Message::Close(_))) | None => {
                                info!("device closed the socket");
                                break;
                            }
                            Some(Ok(_)) => {
                                // Ping/pong and binary frames carry nothing
                                // for the dashboard.
                            }
                            Some(Err(e)) => {
                                error!(error = %e, "socket read failed");
                                lock(&session).on_transport_error();
                                break;
                            }
                        }
                    }
                }
            }
            Err(e) => {
                error!(error = %e, "connection attempt failed");
                lock(&session).on_transport_error();
            }
        }

        // The stream is gone either way; the session owns retry accounting.
        // The lock must drop before the retry sleep.
        let decision = lock(&session).on_closed();
        match decision {
            ClosedDecision::RetryAfter { delay, attempt, max } => {
                info!(attempt, max, ?delay, "reconnecting after delay");
                tokio::time::sleep(delay).await;
            }
            ClosedDecision::GiveUp => {
                error!("reconnection attempts exhausted, giving up");
                return Ok(());
            }
        }
    }
}

fn lock(session: &Arc<Mutex<Session>>) -> std::sync::MutexGuard<'_, Session> {
    // Handlers are run-to-completion and never panic while holding the
    // lock, so poisoning would indicate a bug worth dying loudly over.
    session.lock().expect("session lock poisoned")
}
