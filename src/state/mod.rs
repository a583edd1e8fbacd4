//! State management module
//! 
//! This module contains the clock configuration, countdown state and the
//! shared handle the HTTP layer uses to talk to the clock controller.

pub mod app_state;
pub mod clock_config;
pub mod snapshot;
pub mod timer_state;

// Re-export main types
pub use app_state::AppState;
pub use clock_config::{
    accepts_numeric_input, AlertPolicy, ClockConfig, Color, ColorField, ConfigEdit, ConfigError,
    Features, NumericField,
};
pub use snapshot::ClockSnapshot;
pub use timer_state::TimerState;
