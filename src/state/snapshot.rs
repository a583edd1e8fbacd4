//! Published view of the clock for API clients

use serde::{Deserialize, Serialize};

use super::{ClockConfig, Color};
use crate::engine::Mode;

/// Everything a control panel needs to render the clock
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockSnapshot {
    pub remaining_seconds: u32,
    pub running: bool,
    pub last_alert_key: Option<u32>,
    pub mode: Mode,
    pub mode_label: String,
    pub can_edit: bool,
    /// Color currently shown on the displays
    pub color: Color,
    pub config: ClockConfig,
}
