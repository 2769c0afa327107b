//! Socket link state and retry accounting.
//!
//! The pure state machine lives here so retry behavior is testable
//! without a socket; the supervisor loop in [`crate::client`] feeds it
//! lifecycle events and acts on its decisions.

use std::time::Duration;

use anyhow::Result;
use tokio::net::TcpStream;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::info;
use url::Url;

pub type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Connecting,
    Open,
    Closed,
    Reconnecting,
    Failed,
}

/// What to do after the socket went away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClosedDecision {
    /// Schedule exactly one reconnect after `delay`; this is attempt
    /// `attempt` of `max`.
    RetryAfter {
        delay: Duration,
        attempt: u32,
        max: u32,
    },
    /// Retries exhausted. The link stays down until the user restarts.
    GiveUp,
}

/// Retry accounting for the device link. The interval is constant, not a
/// backoff: the device sits on the local network and either answers
/// within a few seconds or is gone.
#[derive(Debug)]
pub struct Link {
    state: LinkState,
    retry_count: u32,
    max_retries: u32,
    retry_interval: Duration,
}

impl Link {
    pub fn new(max_retries: u32, retry_interval: Duration) -> Self {
        Self {
            state: LinkState::Closed,
            retry_count: 0,
            max_retries,
            retry_interval,
        }
    }

    pub fn state(&self) -> LinkState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == LinkState::Open
    }

    pub fn retry_count(&self) -> u32 {
        self.retry_count
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// A connection attempt is starting.
    pub fn on_connecting(&mut self) {
        self.state = LinkState::Connecting;
    }

    /// The socket opened; retry accounting starts over.
    pub fn on_open(&mut self) {
        self.state = LinkState::Open;
        self.retry_count = 0;
    }

    /// The socket closed (or an attempt failed). Transport errors do not
    /// call this; only the closure that follows them does, so errors never
    /// advance the counter.
    pub fn on_closed(&mut self) -> ClosedDecision {
        if self.state == LinkState::Failed {
            return ClosedDecision::GiveUp;
        }
        if self.retry_count < self.max_retries {
            self.retry_count += 1;
            self.state = LinkState::Reconnecting;
            ClosedDecision::RetryAfter {
                delay: self.retry_interval,
                attempt: self.retry_count,
                max: self.max_retries,
            }
        } else {
            self.state = LinkState::Failed;
            ClosedDecision::GiveUp
        }
    }
}

/// Opens the WebSocket to the device, bounded by `timeout`.
pub async fn open_socket(endpoint: &Url, timeout: Duration) -> Result<WsStream> {
    info!(%endpoint, "connecting to device");
    let (stream, _response) =
        tokio::time::timeout(timeout, connect_async(endpoint.as_str())).await??;
    info!(%endpoint, "device socket open");
    Ok(stream)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link() -> Link {
        Link::new(5, Duration::from_secs(3))
    }

    #[test]
    fn schedules_exactly_max_retries_attempts() {
        let mut link = link();
        link.on_connecting();

        let mut scheduled = 0;
        loop {
            match link.on_closed() {
                ClosedDecision::RetryAfter { attempt, max, delay } => {
                    scheduled += 1;
                    assert_eq!(attempt, scheduled);
                    assert_eq!(max, 5);
                    assert_eq!(delay, Duration::from_secs(3));
                }
                ClosedDecision::GiveUp => break,
            }
        }
        assert_eq!(scheduled, 5);
        assert_eq!(link.state(), LinkState::Failed);
    }

    #[test]
    fn failed_is_terminal() {
        let mut link = link();
        while link.on_closed() != ClosedDecision::GiveUp {}
        // No sixth attempt, ever.
        assert_eq!(link.on_closed(), ClosedDecision::GiveUp);
        assert_eq!(link.retry_count(), 5);
        assert_eq!(link.state(), LinkState::Failed);
    }

    #[test]
    fn open_resets_the_counter() {
        let mut link = link();
        assert!(matches!(
            link.on_closed(),
            ClosedDecision::RetryAfter { attempt: 1, .. }
        ));
        assert!(matches!(
            link.on_closed(),
            ClosedDecision::RetryAfter { attempt: 2, .. }
        ));

        link.on_open();
        assert!(link.is_open());
        assert_eq!(link.retry_count(), 0);

        // The next disconnect starts counting from 1 again.
        assert!(matches!(
            link.on_closed(),
            ClosedDecision::RetryAfter { attempt: 1, .. }
        ));
    }

    #[test]
    fn counter_never_exceeds_max() {
        let mut link = Link::new(2, Duration::from_millis(10));
        for _ in 0..10 {
            let _ = link.on_closed();
            assert!(link.retry_count() <= link.max_retries());
        }
    }
}
