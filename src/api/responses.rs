//! API request and response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    engine::EditOutcome,
    state::{AlertPolicy, ClockSnapshot},
};

/// Response for operator commands
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub clock: ClockSnapshot,
}

impl ActionResponse {
    /// Build a response whose status reflects the running flag
    pub fn new(message: String, clock: ClockSnapshot) -> Self {
        let status = if clock.running { "running" } else { "stopped" };
        Self {
            status: status.to_string(),
            message,
            timestamp: Utc::now(),
            clock,
        }
    }
}

/// Optional body for POST /extend
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExtendRequest {
    pub amount: Option<u32>,
}

/// Body for PUT /config. Numeric fields are the raw field text.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigRequest {
    pub start_value: Option<String>,
    pub shot_duration: Option<String>,
    pub extension_amount: Option<String>,
    pub alert_threshold: Option<String>,
    pub normal_color: Option<String>,
    pub alert_color: Option<String>,
    /// Path of a custom alert sound; an empty string clears it
    pub alert_sound: Option<String>,
    pub alerts_enabled: Option<bool>,
    pub alert_policy: Option<AlertPolicy>,
}

/// Body for POST /config/focus
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FocusRequest {
    pub focused: bool,
}

/// Result of one field edit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldOutcome {
    pub field: String,
    pub outcome: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FieldOutcome {
    pub fn new(field: &str, outcome: &EditOutcome) -> Self {
        let (label, error) = match outcome {
            EditOutcome::Applied => ("applied", None),
            EditOutcome::Locked => ("locked", None),
            EditOutcome::Invalid(e) => ("invalid", Some(e.to_string())),
        };
        Self {
            field: field.to_string(),
            outcome: label.to_string(),
            error,
        }
    }
}

/// Response for PUT /config
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigResponse {
    /// True only if every requested field was applied
    pub applied: bool,
    pub fields: Vec<FieldOutcome>,
    pub timestamp: DateTime<Utc>,
    pub clock: ClockSnapshot,
}

/// Status response with server metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub clock: ClockSnapshot,
    pub displays: Vec<String>,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
