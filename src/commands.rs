//! Messages sent to the clock controller task.
//!
//! Operator actions, config edits and scheduler ticks all travel over the
//! same channel, so the engine only ever sees one message at a time. Callers
//! that need an answer attach a oneshot reply channel.

use std::fmt;

use tokio::sync::{mpsc, oneshot};

use crate::{
    engine::{EditOutcome, TickHandle},
    state::{ClockSnapshot, ConfigEdit},
};

/// Capacity of the controller command channel
pub const COMMAND_BUFFER: usize = 64;

/// Operator commands, identical for hotkeys and buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    StartGame,
    Start,
    Pause,
    Reset,
    /// Add time; `None` uses the configured extension
    Extend(Option<u32>),
    Quit,
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::StartGame => "start-game",
            Action::Start => "start",
            Action::Pause => "pause",
            Action::Reset => "reset",
            Action::Extend(_) => "extend",
            Action::Quit => "quit",
        }
    }

    /// Map a console hotkey to an action.
    ///
    /// Keys: `s` start, `p` pause, `x` reset, space (or a bare Enter) extend,
    /// `g` start game, `esc`/`q` quit.
    pub fn from_hotkey(key: &str) -> Option<Self> {
        // Space must be checked before trimming
        if key == " " || key.is_empty() {
            return Some(Action::Extend(None));
        }
        match key.trim().to_ascii_lowercase().as_str() {
            "s" => Some(Action::Start),
            "p" => Some(Action::Pause),
            "x" => Some(Action::Reset),
            "g" => Some(Action::StartGame),
            "space" => Some(Action::Extend(None)),
            "\u{1b}" | "esc" | "escape" | "q" => Some(Action::Quit),
            _ => None,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub enum Command {
    Action {
        action: Action,
        reply: Option<oneshot::Sender<ClockSnapshot>>,
    },
    EditConfig {
        edits: Vec<ConfigEdit>,
        reply: oneshot::Sender<(Vec<EditOutcome>, ClockSnapshot)>,
    },
    /// A config input gained or lost focus
    Focus {
        focused: bool,
        reply: Option<oneshot::Sender<ClockSnapshot>>,
    },
    /// Scheduled countdown step
    Tick(TickHandle),
}

pub type CommandSender = mpsc::Sender<Command>;

/// Create the controller command channel
pub fn create_command_channel() -> (CommandSender, mpsc::Receiver<Command>) {
    mpsc::channel(COMMAND_BUFFER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hotkeys_match_panel_bindings() {
        assert_eq!(Action::from_hotkey("s"), Some(Action::Start));
        assert_eq!(Action::from_hotkey("P"), Some(Action::Pause));
        assert_eq!(Action::from_hotkey("x"), Some(Action::Reset));
        assert_eq!(Action::from_hotkey(" "), Some(Action::Extend(None)));
        assert_eq!(Action::from_hotkey(""), Some(Action::Extend(None)));
        assert_eq!(Action::from_hotkey("g"), Some(Action::StartGame));
        assert_eq!(Action::from_hotkey("\u{1b}"), Some(Action::Quit));
        assert_eq!(Action::from_hotkey("esc"), Some(Action::Quit));
    }

    #[test]
    fn unknown_hotkeys_are_ignored() {
        assert_eq!(Action::from_hotkey("z"), None);
        assert_eq!(Action::from_hotkey("start"), None);
        assert_eq!(Action::from_hotkey("12"), None);
    }
}
