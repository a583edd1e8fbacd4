//! Operator-tunable clock parameters and the edits that change them

use std::{fmt, path::PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Opaque color token handed to display surfaces (e.g. `white`, `#ff0000`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Color(pub String);

impl Color {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How often a threshold alert may fire for the same remaining value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum AlertPolicy {
    /// One alert per distinct remaining value
    #[default]
    OncePerValue,
    /// An alert on every qualifying tick
    EveryTick,
}

/// Clock parameters, mutable only while the countdown is stopped
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockConfig {
    /// Value loaded by "start game"
    pub start_value: u32,
    /// Value loaded by "reset"
    pub shot_duration: u32,
    /// Seconds added by "extend"
    pub extension_amount: u32,
    /// Alerts and the alert color kick in at or below this value
    pub alert_threshold: u32,
    pub normal_color: Color,
    pub alert_color: Color,
    /// Custom alert sound; a synthesized tone is used when unset
    pub alert_sound: Option<PathBuf>,
    pub alerts_enabled: bool,
    pub alert_policy: AlertPolicy,
}

impl ClockConfig {
    /// Color the display should show for `remaining` seconds
    pub fn color_for(&self, remaining: u32) -> &Color {
        if remaining <= self.alert_threshold {
            &self.alert_color
        } else {
            &self.normal_color
        }
    }

    /// Apply a single edit. On error the previous value is kept.
    pub fn apply(&mut self, edit: ConfigEdit) -> Result<(), ConfigError> {
        match edit {
            ConfigEdit::Numeric(field, raw) => {
                let value = parse_count(field, &raw)?;
                *self.numeric_mut(field) = value;
            }
            ConfigEdit::Color(field, raw) => {
                let token = raw.trim();
                if token.is_empty() {
                    return Err(ConfigError::EmptyColor { field: field.name() });
                }
                let slot = match field {
                    ColorField::Normal => &mut self.normal_color,
                    ColorField::Alert => &mut self.alert_color,
                };
                *slot = Color::new(token);
            }
            ConfigEdit::AlertSound(path) => self.alert_sound = path,
            ConfigEdit::AlertsEnabled(enabled) => self.alerts_enabled = enabled,
            ConfigEdit::AlertPolicy(policy) => self.alert_policy = policy,
        }
        Ok(())
    }

    fn numeric_mut(&mut self, field: NumericField) -> &mut u32 {
        match field {
            NumericField::StartValue => &mut self.start_value,
            NumericField::ShotDuration => &mut self.shot_duration,
            NumericField::ExtensionAmount => &mut self.extension_amount,
            NumericField::AlertThreshold => &mut self.alert_threshold,
        }
    }
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            start_value: 40,
            shot_duration: 30,
            extension_amount: 15,
            alert_threshold: 10,
            normal_color: Color::new("white"),
            alert_color: Color::new("red"),
            alert_sound: None,
            alerts_enabled: true,
            alert_policy: AlertPolicy::default(),
        }
    }
}

/// Optional behaviors, all on unless switched off at launch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Features {
    /// Register a spectator display next to the controller display
    pub secondary_display: bool,
    /// Allow a custom alert sound file
    pub custom_sound: bool,
    /// Enable the "start game" staging value
    pub start_game: bool,
}

impl Default for Features {
    fn default() -> Self {
        Self {
            secondary_display: true,
            custom_sound: true,
            start_game: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumericField {
    StartValue,
    ShotDuration,
    ExtensionAmount,
    AlertThreshold,
}

impl NumericField {
    pub fn name(self) -> &'static str {
        match self {
            NumericField::StartValue => "start_value",
            NumericField::ShotDuration => "shot_duration",
            NumericField::ExtensionAmount => "extension_amount",
            NumericField::AlertThreshold => "alert_threshold",
        }
    }

    /// Durations must be strictly positive; extension and threshold may be zero
    fn requires_positive(self) -> bool {
        matches!(self, NumericField::StartValue | NumericField::ShotDuration)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorField {
    Normal,
    Alert,
}

impl ColorField {
    pub fn name(self) -> &'static str {
        match self {
            ColorField::Normal => "normal_color",
            ColorField::Alert => "alert_color",
        }
    }
}

/// A requested change to one [`ClockConfig`] field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigEdit {
    /// Raw text of a numeric field, as typed by the operator
    Numeric(NumericField, String),
    Color(ColorField, String),
    AlertSound(Option<PathBuf>),
    AlertsEnabled(bool),
    AlertPolicy(AlertPolicy),
}

impl ConfigEdit {
    /// Name of the field this edit targets
    pub fn field_name(&self) -> &'static str {
        match self {
            ConfigEdit::Numeric(field, _) => field.name(),
            ConfigEdit::Color(field, _) => field.name(),
            ConfigEdit::AlertSound(_) => "alert_sound",
            ConfigEdit::AlertsEnabled(_) => "alerts_enabled",
            ConfigEdit::AlertPolicy(_) => "alert_policy",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{field} is empty")]
    EmptyNumber { field: &'static str },

    #[error("{field} must contain digits only, got {input:?}")]
    NotNumeric { field: &'static str, input: String },

    #[error("{field} is out of range: {input}")]
    OutOfRange { field: &'static str, input: String },

    #[error("{field} must be greater than zero")]
    MustBePositive { field: &'static str },

    #[error("{field} is empty")]
    EmptyColor { field: &'static str },

    #[error("custom alert sounds are disabled")]
    CustomSoundDisabled,
}

/// Live keystroke filter for numeric fields: the proposed field contents are
/// accepted only if they consist of digits (an empty field is allowed mid-edit)
pub fn accepts_numeric_input(proposed: &str) -> bool {
    proposed.chars().all(|c| c.is_ascii_digit())
}

fn parse_count(field: NumericField, raw: &str) -> Result<u32, ConfigError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ConfigError::EmptyNumber { field: field.name() });
    }
    if !accepts_numeric_input(raw) {
        return Err(ConfigError::NotNumeric {
            field: field.name(),
            input: raw.to_string(),
        });
    }
    let value: u32 = raw.parse().map_err(|_| ConfigError::OutOfRange {
        field: field.name(),
        input: raw.to_string(),
    })?;
    if value == 0 && field.requires_positive() {
        return Err(ConfigError::MustBePositive { field: field.name() });
    }
    Ok(value)
}
