//! Countdown state owned by the timer engine

use serde::{Deserialize, Serialize};

/// Remaining time, running flag and alert de-duplication key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerState {
    pub remaining_seconds: u32,
    pub running: bool,
    /// Remaining value for which the last threshold alert fired
    pub last_alert_key: Option<u32>,
}

impl TimerState {
    /// Create a stopped timer showing `remaining_seconds`
    pub fn stopped(remaining_seconds: u32) -> Self {
        Self {
            remaining_seconds,
            running: false,
            last_alert_key: None,
        }
    }

    /// Check if the countdown is running
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Load a fresh countdown value and stop
    pub fn load(&mut self, remaining_seconds: u32) {
        self.remaining_seconds = remaining_seconds;
        self.running = false;
        self.last_alert_key = None;
    }
}
