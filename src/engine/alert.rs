//! Alert policy and dispatch
//!
//! [`evaluate`] is a pure decision over the remaining time. [`AlertTrigger`]
//! turns a decision into a playback request and hands it to an [`AlertSink`]
//! without waiting for playback to happen.

use std::{path::PathBuf, time::Duration};

use serde::Serialize;
use tracing::{debug, info};

use crate::state::{AlertPolicy, ClockConfig};

/// Threshold beep, short and high
pub const THRESHOLD_TONE_HZ: u32 = 1200;
pub const THRESHOLD_TONE: Duration = Duration::from_millis(150);

/// Expiry buzzer, longer and higher
pub const TERMINAL_TONE_HZ: u32 = 2000;
pub const TERMINAL_TONE: Duration = Duration::from_millis(800);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    /// Remaining time is at or below the alert threshold
    Threshold,
    /// The countdown just reached zero
    Terminal,
}

/// What to play for an alert
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlertSound {
    File(PathBuf),
    Tone { frequency_hz: u32, duration: Duration },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertRequest {
    pub kind: AlertKind,
    pub sound: AlertSound,
}

/// Destination for alert playback requests. Must return immediately.
pub trait AlertSink: Send {
    fn dispatch(&self, request: AlertRequest);
}

/// Decide which alert, if any, belongs to a new remaining value.
///
/// Zero is only ever evaluated by the tick that ends a countdown, so it
/// always yields the terminal alert and never a threshold alert.
pub fn evaluate(
    remaining: u32,
    threshold: u32,
    last_alert_key: Option<u32>,
    policy: AlertPolicy,
) -> Option<AlertKind> {
    if remaining == 0 {
        return Some(AlertKind::Terminal);
    }
    if remaining > threshold {
        return None;
    }
    match policy {
        AlertPolicy::EveryTick => Some(AlertKind::Threshold),
        AlertPolicy::OncePerValue if last_alert_key == Some(remaining) => None,
        AlertPolicy::OncePerValue => Some(AlertKind::Threshold),
    }
}

/// Turns alert decisions into playback requests
pub struct AlertTrigger {
    sink: Box<dyn AlertSink>,
}

impl AlertTrigger {
    pub fn new(sink: Box<dyn AlertSink>) -> Self {
        Self { sink }
    }

    /// Request playback for `kind` unless alerts are switched off
    pub fn fire(&self, kind: AlertKind, config: &ClockConfig) {
        if !config.alerts_enabled {
            debug!("Alerts disabled, skipping {:?} alert", kind);
            return;
        }

        let sound = match &config.alert_sound {
            Some(path) => AlertSound::File(path.clone()),
            None => match kind {
                AlertKind::Threshold => AlertSound::Tone {
                    frequency_hz: THRESHOLD_TONE_HZ,
                    duration: THRESHOLD_TONE,
                },
                AlertKind::Terminal => AlertSound::Tone {
                    frequency_hz: TERMINAL_TONE_HZ,
                    duration: TERMINAL_TONE,
                },
            },
        };

        info!("Firing {:?} alert", kind);
        self.sink.dispatch(AlertRequest { kind, sound });
    }
}

/// Sink that records requests, for tests
#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub(crate) struct RecordingSink {
    pub requests: std::sync::Arc<std::sync::Mutex<Vec<AlertRequest>>>,
}

#[cfg(test)]
impl RecordingSink {
    pub fn kinds(&self) -> Vec<AlertKind> {
        self.requests.lock().unwrap().iter().map(|r| r.kind).collect()
    }
}

#[cfg(test)]
impl AlertSink for RecordingSink {
    fn dispatch(&self, request: AlertRequest) {
        self.requests.lock().unwrap().push(request);
    }
}
