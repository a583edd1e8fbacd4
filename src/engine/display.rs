//! Projection of the countdown onto display surfaces

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::trace;

use crate::state::{ClockConfig, Color, TimerState};

/// What a display shows: the number and its color
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayFrame {
    pub remaining_seconds: u32,
    pub color: Color,
}

impl DisplayFrame {
    pub fn project(state: &TimerState, config: &ClockConfig) -> Self {
        Self {
            remaining_seconds: state.remaining_seconds,
            color: config.color_for(state.remaining_seconds).clone(),
        }
    }
}

/// A sink for display frames
pub trait DisplaySurface: Send {
    fn name(&self) -> &str;
    fn show(&self, frame: &DisplayFrame);
}

/// Surface backed by a watch channel; readers always see the latest frame
pub struct ChannelSurface {
    name: String,
    tx: watch::Sender<DisplayFrame>,
}

impl ChannelSurface {
    pub fn new(name: impl Into<String>, initial: DisplayFrame) -> (Self, watch::Receiver<DisplayFrame>) {
        let (tx, rx) = watch::channel(initial);
        (Self { name: name.into(), tx }, rx)
    }
}

impl DisplaySurface for ChannelSurface {
    fn name(&self) -> &str {
        &self.name
    }

    fn show(&self, frame: &DisplayFrame) {
        // Nobody watching is fine, the value is kept for later subscribers
        self.tx.send_replace(frame.clone());
    }
}

/// Pushes frames to every registered surface
#[derive(Default)]
pub struct DisplaySync {
    surfaces: Vec<Box<dyn DisplaySurface>>,
}

impl DisplaySync {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, surface: Box<dyn DisplaySurface>) {
        self.surfaces.push(surface);
    }

    pub fn surface_names(&self) -> Vec<&str> {
        self.surfaces.iter().map(|s| s.name()).collect()
    }

    pub fn refresh(&self, state: &TimerState, config: &ClockConfig) -> DisplayFrame {
        let frame = DisplayFrame::project(state, config);
        for surface in &self.surfaces {
            trace!("Display {} <- {} ({})", surface.name(), frame.remaining_seconds, frame.color);
            surface.show(&frame);
        }
        frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_uses_alert_color_at_threshold() {
        let config = ClockConfig::default();
        let frame = DisplayFrame::project(&TimerState::stopped(10), &config);
        assert_eq!(frame.remaining_seconds, 10);
        assert_eq!(frame.color, config.alert_color);

        let frame = DisplayFrame::project(&TimerState::stopped(11), &config);
        assert_eq!(frame.color, config.normal_color);
    }

    #[test]
    fn refresh_reaches_every_surface() {
        let config = ClockConfig::default();
        let blank = DisplayFrame::project(&TimerState::stopped(0), &config);
        let (controller, controller_rx) = ChannelSurface::new("controller", blank.clone());
        let (spectator, spectator_rx) = ChannelSurface::new("spectator", blank);

        let mut sync = DisplaySync::new();
        sync.register(Box::new(controller));
        sync.register(Box::new(spectator));
        assert_eq!(sync.surface_names(), vec!["controller", "spectator"]);

        sync.refresh(&TimerState::stopped(24), &config);
        assert_eq!(controller_rx.borrow().remaining_seconds, 24);
        assert_eq!(spectator_rx.borrow().remaining_seconds, 24);
        assert_eq!(spectator_rx.borrow().color.as_str(), "white");
    }
}
