//! Edit permission derived from the running flag

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::debug;

/// Publishes `can_edit = !running` to anyone who subscribes
#[derive(Debug)]
pub struct EditLockController {
    can_edit_tx: watch::Sender<bool>,
}

impl EditLockController {
    pub fn new(running: bool) -> Self {
        let (can_edit_tx, _) = watch::channel(!running);
        Self { can_edit_tx }
    }

    pub fn can_edit(&self) -> bool {
        *self.can_edit_tx.borrow()
    }

    /// Recompute the flag from the engine's running state
    pub fn refresh(&self, running: bool) {
        let changed = self.can_edit_tx.send_if_modified(|can_edit| {
            let next = !running;
            let changed = *can_edit != next;
            *can_edit = next;
            changed
        });
        if changed {
            debug!("Config editing {}", if running { "locked" } else { "unlocked" });
        }
    }

    /// Receiver for UI surfaces that enable/disable config inputs
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.can_edit_tx.subscribe()
    }
}

/// Operator-facing mode label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Stopped, a config field has focus
    Edit,
    /// Stopped, keys drive the clock
    Hotkey,
    /// Running, config is read-only
    Locked,
}

impl Mode {
    pub fn derive(running: bool, field_focused: bool) -> Self {
        match (running, field_focused) {
            (true, _) => Mode::Locked,
            (false, true) => Mode::Edit,
            (false, false) => Mode::Hotkey,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Mode::Edit => "EDIT MODE",
            Mode::Hotkey => "HOTKEY MODE",
            Mode::Locked => "LOCKED (RUNNING)",
        }
    }
}
