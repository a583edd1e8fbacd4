//! Configuration and CLI argument handling
//!
//! Every clock setting starts from a compiled-in default that can be
//! overridden at launch. Nothing is persisted between runs.

use std::{path::PathBuf, time::Duration};
use clap::Parser;
use tracing::warn;

use crate::state::{AlertPolicy, ClockConfig, Color, Features};

/// CLI argument parsing structure
#[derive(Debug, Parser)]
#[command(name = "shot-clock")]
#[command(about = "A shot clock controller with operator hotkeys and spectator displays")]
#[command(version)]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "20540")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,

    /// Seconds loaded by "start game"
    #[arg(long, default_value = "40", value_parser = clap::value_parser!(u32).range(1..))]
    pub start_value: u32,

    /// Seconds loaded by "reset"
    #[arg(long, default_value = "30", value_parser = clap::value_parser!(u32).range(1..))]
    pub shot_duration: u32,

    /// Seconds added by "extend"
    #[arg(long, default_value = "15")]
    pub extension: u32,

    /// Alert color and beeps start at this many seconds
    #[arg(long, default_value = "10")]
    pub alert_at: u32,

    /// Display color above the alert threshold
    #[arg(long, default_value = "white")]
    pub normal_color: String,

    /// Display color at or below the alert threshold
    #[arg(long, default_value = "red")]
    pub alert_color: String,

    /// Sound file played for alerts instead of the built-in tones
    #[arg(long)]
    pub alert_sound: Option<PathBuf>,

    /// Start with alert sounds switched off
    #[arg(long)]
    pub no_alerts: bool,

    /// Whether a threshold alert can repeat for the same value
    #[arg(long, value_enum, default_value_t = AlertPolicy::OncePerValue)]
    pub alert_policy: AlertPolicy,

    /// Countdown step in milliseconds
    #[arg(long, default_value = "1000", value_parser = clap::value_parser!(u64).range(1..))]
    pub tick_ms: u64,

    /// Only drive the controller display
    #[arg(long)]
    pub no_secondary_display: bool,

    /// Disable the "start game" staging value
    #[arg(long)]
    pub no_start_game: bool,

    /// Disallow custom alert sound files
    #[arg(long)]
    pub no_custom_sound: bool,

    /// Do not read hotkeys from stdin
    #[arg(long)]
    pub no_hotkeys: bool,

    /// Environment variable holding the access code required at startup
    #[arg(long)]
    pub access_code_env: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn features(&self) -> Features {
        Features {
            secondary_display: !self.no_secondary_display,
            custom_sound: !self.no_custom_sound,
            start_game: !self.no_start_game,
        }
    }

    /// Initial clock settings for this run
    pub fn clock_config(&self) -> ClockConfig {
        let alert_sound = match &self.alert_sound {
            Some(path) if self.no_custom_sound => {
                warn!("Custom sounds are disabled, ignoring {}", path.display());
                None
            }
            other => other.clone(),
        };

        ClockConfig {
            start_value: self.start_value,
            shot_duration: self.shot_duration,
            extension_amount: self.extension,
            alert_threshold: self.alert_at,
            normal_color: Color::new(&self.normal_color),
            alert_color: Color::new(&self.alert_color),
            alert_sound,
            alerts_enabled: !self.no_alerts,
            alert_policy: self.alert_policy,
        }
    }
}
