//! Per-slot transient status state.
//!
//! Each UI status surface is a tiny state machine: `Idle`, or `Showing`
//! some text with an optional expiry. Setting a slot always replaces the
//! previous expiry, so there is never more than one pending auto-clear
//! per slot; a periodic sweep retires whatever has expired.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tracing::debug;

/// Visual class of a status message, mirroring the dashboard's CSS states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Neutral,
    Connecting,
    Connected,
    Disconnected,
    Success,
    Failed,
    Error,
}

/// The status surfaces the dashboard renders into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    ConnectionBanner,
    ConnectWifi,
    SaveSettings,
    SaveLed,
    Reset,
    Scan,
    Calibration,
    General,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SlotState {
    Idle,
    Showing {
        text: String,
        kind: StatusKind,
        expires_at: Option<Instant>,
    },
}

/// All status slots of one session.
#[derive(Debug, Default)]
pub struct StatusBoard {
    slots: HashMap<Slot, SlotState>,
}

impl StatusBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shows `text` in `slot`. A `ttl` arms an auto-clear; `None` leaves
    /// the message up until it is replaced or cleared. Any previously
    /// armed expiry for the slot is discarded.
    pub fn show(&mut self, slot: Slot, text: impl Into<String>, kind: StatusKind, ttl: Option<Duration>) {
        let text = text.into();
        debug!(?slot, ?kind, %text, "status");
        self.slots.insert(
            slot,
            SlotState::Showing {
                text,
                kind,
                expires_at: ttl.map(|t| Instant::now() + t),
            },
        );
    }

    pub fn clear(&mut self, slot: Slot) {
        self.slots.insert(slot, SlotState::Idle);
    }

    /// Swaps the text of a showing slot without touching its kind or armed
    /// expiry. Used when the language changes mid-display. No-op on an
    /// idle slot.
    pub fn retitle(&mut self, slot: Slot, new_text: impl Into<String>) {
        if let Some(SlotState::Showing { text, .. }) = self.slots.get_mut(&slot) {
            *text = new_text.into();
        }
    }

    /// Retires every slot whose expiry has passed. Returns the slots that
    /// were cleared.
    pub fn sweep(&mut self, now: Instant) -> Vec<Slot> {
        let mut cleared = Vec::new();
        for (slot, state) in self.slots.iter_mut() {
            if let SlotState::Showing {
                expires_at: Some(deadline),
                ..
            } = state
            {
                if *deadline <= now {
                    *state = SlotState::Idle;
                    cleared.push(*slot);
                }
            }
        }
        cleared
    }

    pub fn state(&self, slot: Slot) -> &SlotState {
        self.slots.get(&slot).unwrap_or(&SlotState::Idle)
    }

    pub fn text(&self, slot: Slot) -> Option<&str> {
        match self.state(slot) {
            SlotState::Showing { text, .. } => Some(text),
            SlotState::Idle => None,
        }
    }

    pub fn kind(&self, slot: Slot) -> Option<StatusKind> {
        match self.state(slot) {
            SlotState::Showing { kind, .. } => Some(*kind),
            SlotState::Idle => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_status_expires_on_sweep() {
        let mut board = StatusBoard::new();
        board.show(Slot::Scan, "scanning", StatusKind::Neutral, Some(Duration::from_secs(5)));
        assert_eq!(board.text(Slot::Scan), Some("scanning"));

        // Not yet due.
        assert!(board.sweep(Instant::now()).is_empty());
        assert_eq!(board.text(Slot::Scan), Some("scanning"));

        let cleared = board.sweep(Instant::now() + Duration::from_secs(6));
        assert_eq!(cleared, [Slot::Scan]);
        assert_eq!(board.text(Slot::Scan), None);
    }

    #[test]
    fn persistent_status_survives_sweeps() {
        let mut board = StatusBoard::new();
        board.show(Slot::ConnectionBanner, "reconnect failed", StatusKind::Error, None);
        assert!(board.sweep(Instant::now() + Duration::from_secs(3600)).is_empty());
        assert_eq!(board.text(Slot::ConnectionBanner), Some("reconnect failed"));
    }

    #[test]
    fn superseding_replaces_the_armed_expiry() {
        let mut board = StatusBoard::new();
        board.show(Slot::SaveLed, "saving", StatusKind::Neutral, Some(Duration::from_millis(1)));
        board.show(Slot::SaveLed, "saved", StatusKind::Success, Some(Duration::from_secs(60)));

        // The first message's (already past) expiry must not clear the
        // newer text.
        assert!(board.sweep(Instant::now() + Duration::from_secs(1)).is_empty());
        assert_eq!(board.text(Slot::SaveLed), Some("saved"));
        assert_eq!(board.kind(Slot::SaveLed), Some(StatusKind::Success));
    }

    #[test]
    fn retitle_keeps_kind_and_expiry() {
        let mut board = StatusBoard::new();
        board.show(Slot::ConnectionBanner, "connecting", StatusKind::Connecting, None);
        board.retitle(Slot::ConnectionBanner, "connexion");
        assert_eq!(board.text(Slot::ConnectionBanner), Some("connexion"));
        assert_eq!(board.kind(Slot::ConnectionBanner), Some(StatusKind::Connecting));

        // Idle slots stay idle.
        board.retitle(Slot::Reset, "nope");
        assert_eq!(board.text(Slot::Reset), None);
    }

    #[test]
    fn pending_status_never_auto_clears() {
        let mut board = StatusBoard::new();
        board.show(Slot::ConnectWifi, "connecting...", StatusKind::Connecting, None);
        board.sweep(Instant::now() + Duration::from_secs(120));
        assert_eq!(board.kind(Slot::ConnectWifi), Some(StatusKind::Connecting));
    }
}
