//! Main application state shared with the HTTP handlers

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Instant,
};
use chrono::{DateTime, Utc};
use tokio::sync::{oneshot, watch};
use tracing::{debug, warn};

use super::{ClockSnapshot, ConfigEdit};
use crate::{
    commands::{Action, Command, CommandSender},
    engine::{DisplayFrame, EditOutcome},
};

/// Handle to the clock controller plus server metadata
#[derive(Debug)]
pub struct AppState {
    /// Command channel into the clock controller
    pub commands: CommandSender,
    /// Latest clock snapshot published by the controller
    pub snapshot_rx: watch::Receiver<ClockSnapshot>,
    /// Display surfaces by name
    pub displays: HashMap<String, watch::Receiver<DisplayFrame>>,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    pub last_action: Arc<Mutex<Option<String>>>,
    pub last_action_time: Arc<Mutex<Option<DateTime<Utc>>>>,
}

impl AppState {
    /// Create a new AppState around a running controller
    pub fn new(
        commands: CommandSender,
        snapshot_rx: watch::Receiver<ClockSnapshot>,
        displays: HashMap<String, watch::Receiver<DisplayFrame>>,
        port: u16,
        host: String,
    ) -> Self {
        Self {
            commands,
            snapshot_rx,
            displays,
            start_time: Instant::now(),
            port,
            host,
            last_action: Arc::new(Mutex::new(None)),
            last_action_time: Arc::new(Mutex::new(None)),
        }
    }

    /// Send an operator action and wait for the resulting snapshot
    pub async fn send_action(&self, action: Action) -> Result<ClockSnapshot, String> {
        let (reply, reply_rx) = oneshot::channel();
        self.commands
            .send(Command::Action {
                action,
                reply: Some(reply),
            })
            .await
            .map_err(|_| "Clock controller is not running".to_string())?;

        let snapshot = reply_rx
            .await
            .map_err(|_| format!("Clock controller dropped {} without replying", action))?;

        self.record_action(action.name());
        Ok(snapshot)
    }

    /// Apply config edits; each edit gets its own outcome
    pub async fn edit_config(
        &self,
        edits: Vec<ConfigEdit>,
    ) -> Result<(Vec<EditOutcome>, ClockSnapshot), String> {
        let (reply, reply_rx) = oneshot::channel();
        self.commands
            .send(Command::EditConfig { edits, reply })
            .await
            .map_err(|_| "Clock controller is not running".to_string())?;

        let result = reply_rx
            .await
            .map_err(|_| "Clock controller dropped config edit without replying".to_string())?;

        self.record_action("config");
        Ok(result)
    }

    /// Report whether a config input has focus
    pub async fn set_focus(&self, focused: bool) -> Result<ClockSnapshot, String> {
        let (reply, reply_rx) = oneshot::channel();
        self.commands
            .send(Command::Focus {
                focused,
                reply: Some(reply),
            })
            .await
            .map_err(|_| "Clock controller is not running".to_string())?;

        reply_rx
            .await
            .map_err(|_| "Clock controller dropped focus change without replying".to_string())
    }

    /// Get the latest published snapshot
    pub fn get_snapshot(&self) -> ClockSnapshot {
        self.snapshot_rx.borrow().clone()
    }

    /// Get the latest frame of a display surface
    pub fn get_display(&self, name: &str) -> Option<DisplayFrame> {
        self.displays.get(name).map(|rx| rx.borrow().clone())
    }

    pub fn display_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.displays.keys().cloned().collect();
        names.sort();
        names
    }

    fn record_action(&self, action: &str) {
        debug!("Recording last action: {}", action);
        match self.last_action.lock() {
            Ok(mut last_action) => *last_action = Some(action.to_string()),
            Err(e) => warn!("Failed to lock last action: {}", e),
        }
        match self.last_action_time.lock() {
            Ok(mut last_time) => *last_time = Some(Utc::now()),
            Err(e) => warn!("Failed to lock last action time: {}", e),
        }
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }
}
