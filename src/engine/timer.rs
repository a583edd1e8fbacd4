//! The countdown state machine
//!
//! ```text
//!              start()                       tick() at 1
//!  Stopped ─────────────────► Running ──────────────────────► Stopped (0)
//!     ▲                         │  │                          terminal alert
//!     │ pause() keeps value     │  │ tick() above 1:
//!     └─────────────────────────┘  │ decrement, alert check, re-arm
//!     ▲                            │
//!     └── reset() / start_game() ──┘  load shot_duration / start_value
//! ```
//!
//! `extend()` adds time in either state and leaves scheduling alone.

use std::time::Duration;

use tracing::{debug, info, warn};

use super::{
    alert::{self, AlertKind, AlertTrigger},
    display::DisplaySync,
    edit_lock::{EditLockController, Mode},
    scheduler::{Scheduler, TickHandle},
};
use crate::state::{ClockConfig, ClockSnapshot, ConfigEdit, ConfigError, Features, TimerState};

/// Default delay between ticks
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Result of a config edit request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    Applied,
    /// The countdown is running; the edit was dropped
    Locked,
    /// The value was unusable; the previous value is still in place
    Invalid(ConfigError),
}

pub struct TimerEngine<S> {
    config: ClockConfig,
    features: Features,
    state: TimerState,
    tick_interval: Duration,
    pending_tick: Option<TickHandle>,
    scheduler: S,
    alerts: AlertTrigger,
    display: DisplaySync,
    edit_lock: EditLockController,
}

impl<S: Scheduler> TimerEngine<S> {
    pub fn new(
        config: ClockConfig,
        features: Features,
        scheduler: S,
        alerts: AlertTrigger,
        display: DisplaySync,
    ) -> Self {
        let initial = if features.start_game {
            config.start_value
        } else {
            config.shot_duration
        };

        let engine = Self {
            config,
            features,
            state: TimerState::stopped(initial),
            tick_interval: TICK_INTERVAL,
            pending_tick: None,
            scheduler,
            alerts,
            display,
            edit_lock: EditLockController::new(false),
        };
        engine.refresh_display();
        engine
    }

    pub fn with_tick_interval(mut self, tick_interval: Duration) -> Self {
        self.tick_interval = tick_interval;
        self
    }

    pub fn config(&self) -> &ClockConfig {
        &self.config
    }

    pub fn state(&self) -> &TimerState {
        &self.state
    }

    pub fn pending_tick(&self) -> Option<TickHandle> {
        self.pending_tick
    }

    pub fn can_edit(&self) -> bool {
        self.edit_lock.can_edit()
    }

    pub fn edit_lock(&self) -> &EditLockController {
        &self.edit_lock
    }

    pub fn snapshot(&self, field_focused: bool) -> ClockSnapshot {
        let mode = Mode::derive(self.state.is_running(), field_focused);
        ClockSnapshot {
            remaining_seconds: self.state.remaining_seconds,
            running: self.state.is_running(),
            last_alert_key: self.state.last_alert_key,
            mode,
            mode_label: mode.label().to_string(),
            can_edit: self.can_edit(),
            color: self.config.color_for(self.state.remaining_seconds).clone(),
            config: self.config.clone(),
        }
    }

    /// Stage the opening value of a game
    pub fn start_game(&mut self) {
        if !self.features.start_game {
            warn!("Start game is disabled, ignoring");
            return;
        }
        self.cancel_pending();
        self.state.load(self.config.start_value);
        info!("Game staged at {}s", self.state.remaining_seconds);
        self.after_transition();
    }

    pub fn start(&mut self) {
        if self.state.is_running() {
            debug!("Already running, start ignored");
            return;
        }
        self.state.running = true;
        self.state.last_alert_key = None;
        info!("Countdown started at {}s", self.state.remaining_seconds);
        self.after_transition();
        self.arm();
    }

    /// Stop without touching the remaining time
    pub fn pause(&mut self) {
        self.cancel_pending();
        if self.state.is_running() {
            info!("Countdown paused at {}s", self.state.remaining_seconds);
        }
        self.state.running = false;
        self.after_transition();
    }

    pub fn reset(&mut self) {
        self.cancel_pending();
        self.state.load(self.config.shot_duration);
        info!("Shot clock reset to {}s", self.state.remaining_seconds);
        self.after_transition();
    }

    /// Add `amount` seconds, or the configured extension when `None`
    pub fn extend(&mut self, amount: Option<u32>) {
        let amount = amount.unwrap_or(self.config.extension_amount);
        self.state.remaining_seconds = self.state.remaining_seconds.saturating_add(amount);
        info!("Extended by {}s to {}s", amount, self.state.remaining_seconds);
        self.refresh_display();
    }

    /// Scheduled decrement. Stale handles and ticks after a stop are ignored.
    pub fn tick(&mut self, handle: TickHandle) {
        if !self.state.is_running() || self.pending_tick != Some(handle) {
            debug!("Ignoring stale tick {}", handle.id());
            return;
        }
        self.pending_tick = None;

        if self.state.remaining_seconds == 0 {
            // Started from an expired clock
            self.state.running = false;
            self.after_transition();
            return;
        }

        self.state.remaining_seconds -= 1;
        let remaining = self.state.remaining_seconds;
        let decision = alert::evaluate(
            remaining,
            self.config.alert_threshold,
            self.state.last_alert_key,
            self.config.alert_policy,
        );

        match decision {
            Some(AlertKind::Terminal) => {
                self.state.running = false;
                info!("Shot clock expired");
                self.after_transition();
                self.alerts.fire(AlertKind::Terminal, &self.config);
            }
            Some(AlertKind::Threshold) => {
                self.state.last_alert_key = Some(remaining);
                self.refresh_display();
                self.alerts.fire(AlertKind::Threshold, &self.config);
                self.arm();
            }
            None => {
                self.refresh_display();
                self.arm();
            }
        }
    }

    /// Apply a config edit if the countdown is stopped
    pub fn edit_config(&mut self, edit: ConfigEdit) -> EditOutcome {
        if !self.can_edit() {
            debug!("Config locked while running, dropping edit to {}", edit.field_name());
            return EditOutcome::Locked;
        }
        if matches!(edit, ConfigEdit::AlertSound(Some(_))) && !self.features.custom_sound {
            return EditOutcome::Invalid(ConfigError::CustomSoundDisabled);
        }

        let field = edit.field_name();
        match self.config.apply(edit) {
            Ok(()) => {
                debug!("Config {} updated", field);
                self.refresh_display();
                EditOutcome::Applied
            }
            Err(e) => {
                warn!("Keeping previous {}: {}", field, e);
                EditOutcome::Invalid(e)
            }
        }
    }

    fn arm(&mut self) {
        self.pending_tick = Some(self.scheduler.schedule(self.tick_interval));
    }

    fn cancel_pending(&mut self) {
        if let Some(handle) = self.pending_tick.take() {
            self.scheduler.cancel(handle);
        }
    }

    fn after_transition(&self) {
        self.refresh_display();
        self.edit_lock.refresh(self.state.is_running());
    }

    fn refresh_display(&self) {
        self.display.refresh(&self.state, &self.config);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{
        alert::RecordingSink,
        display::{ChannelSurface, DisplayFrame},
        scheduler::ManualScheduler,
    };
    use crate::state::{AlertPolicy, NumericField};
    use tokio::sync::watch;

    struct Rig {
        engine: TimerEngine<ManualScheduler>,
        alerts: RecordingSink,
        display: watch::Receiver<DisplayFrame>,
    }

    fn rig(config: ClockConfig) -> Rig {
        let alerts = RecordingSink::default();
        let mut sync = DisplaySync::new();
        let (surface, display) = ChannelSurface::new(
            "test",
            DisplayFrame::project(&TimerState::stopped(0), &config),
        );
        sync.register(Box::new(surface));
        let engine = TimerEngine::new(
            config,
            Features::default(),
            ManualScheduler::default(),
            AlertTrigger::new(Box::new(alerts.clone())),
            sync,
        );
        Rig { engine, alerts, display }
    }

    fn example_config() -> ClockConfig {
        ClockConfig {
            shot_duration: 30,
            alert_threshold: 10,
            extension_amount: 15,
            ..ClockConfig::default()
        }
    }

    /// Deliver the pending tick `n` times
    fn run_ticks(engine: &mut TimerEngine<ManualScheduler>, n: usize) {
        for _ in 0..n {
            let handle = engine.pending_tick().expect("tick should be pending");
            engine.tick(handle);
        }
    }

    #[test]
    fn starts_stopped_at_start_value() {
        let rig = rig(ClockConfig::default());
        assert_eq!(rig.engine.state(), &TimerState::stopped(40));
        assert!(rig.engine.can_edit());
        assert_eq!(rig.display.borrow().remaining_seconds, 40);
    }

    #[test]
    fn starts_at_shot_duration_without_start_game() {
        let config = ClockConfig::default();
        let mut engine = TimerEngine::new(
            config,
            Features {
                start_game: false,
                ..Features::default()
            },
            ManualScheduler::default(),
            AlertTrigger::new(Box::new(RecordingSink::default())),
            DisplaySync::new(),
        );
        assert_eq!(engine.state().remaining_seconds, 30);

        engine.extend(Some(3));
        engine.start_game();
        assert_eq!(engine.state().remaining_seconds, 33);
    }

    #[test]
    fn ticks_count_down_and_stop_at_zero() {
        let mut rig = rig(ClockConfig {
            alert_threshold: 0,
            ..ClockConfig::default()
        });
        rig.engine.reset();
        rig.engine.start();

        for n in 1..=30u32 {
            run_ticks(&mut rig.engine, 1);
            assert_eq!(rig.engine.state().remaining_seconds, 30 - n);
            assert_eq!(rig.engine.state().running, n < 30);
        }
        assert_eq!(rig.engine.pending_tick(), None);
        assert!(rig.engine.can_edit());
    }

    #[test]
    fn start_shows_value_before_first_tick_and_arms_one_interval() {
        let mut rig = rig(example_config());
        rig.engine.reset();
        rig.engine.start();

        assert!(rig.engine.state().running);
        assert!(!rig.engine.can_edit());
        assert_eq!(rig.display.borrow().remaining_seconds, 30);
        assert_eq!(rig.engine.scheduler.scheduled.len(), 1);
        assert_eq!(rig.engine.scheduler.scheduled[0].1, TICK_INTERVAL);
    }

    #[test]
    fn start_while_running_is_a_noop() {
        let mut rig = rig(example_config());
        rig.engine.start();
        let pending = rig.engine.pending_tick();
        rig.engine.start();
        assert_eq!(rig.engine.pending_tick(), pending);
        assert_eq!(rig.engine.scheduler.scheduled.len(), 1);
    }

    #[test]
    fn shot_example_fires_one_threshold_then_one_terminal() {
        let mut rig = rig(example_config());
        rig.engine.reset();
        assert_eq!(rig.engine.state().remaining_seconds, 30);
        rig.engine.start();

        run_ticks(&mut rig.engine, 20);
        assert_eq!(rig.engine.state().remaining_seconds, 10);
        assert_eq!(rig.alerts.kinds(), vec![AlertKind::Threshold]);
        assert_eq!(rig.engine.state().last_alert_key, Some(10));
        assert_eq!(rig.display.borrow().color.as_str(), "red");

        run_ticks(&mut rig.engine, 10);
        assert_eq!(rig.engine.state().remaining_seconds, 0);
        assert!(!rig.engine.state().running);

        let kinds = rig.alerts.kinds();
        assert_eq!(kinds.iter().filter(|k| **k == AlertKind::Terminal).count(), 1);
        assert_eq!(kinds.last(), Some(&AlertKind::Terminal));
        // 10 down to 1 each alert once, nothing extra at zero
        assert_eq!(kinds.iter().filter(|k| **k == AlertKind::Threshold).count(), 10);
    }

    #[test]
    fn reset_always_loads_shot_duration() {
        let mut rig = rig(example_config());
        rig.engine.start();
        run_ticks(&mut rig.engine, 3);
        rig.engine.extend(None);

        rig.engine.reset();
        assert_eq!(rig.engine.state(), &TimerState::stopped(30));
        assert_eq!(rig.engine.pending_tick(), None);
        assert!(rig.engine.can_edit());

        rig.engine.reset();
        assert_eq!(rig.engine.state(), &TimerState::stopped(30));
    }

    #[test]
    fn extend_adds_in_both_states_without_scheduling() {
        let mut rig = rig(example_config());
        rig.engine.reset();
        rig.engine.extend(None);
        assert_eq!(rig.engine.state().remaining_seconds, 45);
        assert_eq!(rig.engine.pending_tick(), None);

        rig.engine.start();
        let pending = rig.engine.pending_tick();
        rig.engine.extend(Some(7));
        assert_eq!(rig.engine.state().remaining_seconds, 52);
        assert_eq!(rig.engine.pending_tick(), pending);
        assert!(rig.engine.state().running);
    }

    #[test]
    fn extend_has_no_upper_bound() {
        let mut rig = rig(example_config());
        for _ in 0..100 {
            rig.engine.extend(Some(1_000));
        }
        assert_eq!(rig.engine.state().remaining_seconds, 100_040);
    }

    #[test]
    fn pause_then_start_resumes_same_value() {
        let mut rig = rig(example_config());
        rig.engine.reset();
        rig.engine.start();
        run_ticks(&mut rig.engine, 4);

        let first = rig.engine.pending_tick().unwrap();
        rig.engine.pause();
        assert_eq!(rig.engine.state().remaining_seconds, 26);
        assert!(!rig.engine.state().running);
        assert!(rig.engine.scheduler.cancelled.contains(&first));

        rig.engine.start();
        assert_eq!(rig.engine.state().remaining_seconds, 26);
        run_ticks(&mut rig.engine, 1);
        assert_eq!(rig.engine.state().remaining_seconds, 25);
    }

    #[test]
    fn stale_tick_is_ignored() {
        let mut rig = rig(example_config());
        rig.engine.reset();
        rig.engine.start();
        let stale = rig.engine.pending_tick().unwrap();

        rig.engine.pause();
        rig.engine.tick(stale);
        assert_eq!(rig.engine.state().remaining_seconds, 30);

        rig.engine.start();
        rig.engine.tick(stale);
        assert_eq!(rig.engine.state().remaining_seconds, 30);
        assert!(rig.engine.state().running);
    }

    #[test]
    fn cancelling_with_nothing_pending_is_safe() {
        let mut rig = rig(example_config());
        rig.engine.pause();
        rig.engine.pause();
        rig.engine.reset();
        rig.engine.start_game();
        assert!(rig.engine.scheduler.cancelled.is_empty());
        assert_eq!(rig.engine.state(), &TimerState::stopped(40));
    }

    #[test]
    fn start_game_mid_countdown_stages_fresh_game() {
        let mut rig = rig(ClockConfig {
            start_value: 40,
            ..example_config()
        });
        rig.engine.reset();
        rig.engine.start();
        run_ticks(&mut rig.engine, 25);
        assert_eq!(rig.engine.state().remaining_seconds, 5);
        assert!(rig.engine.state().last_alert_key.is_some());
        let pending = rig.engine.pending_tick().unwrap();

        rig.engine.start_game();
        assert_eq!(rig.engine.state(), &TimerState::stopped(40));
        assert!(rig.engine.scheduler.cancelled.contains(&pending));
        assert_eq!(rig.engine.pending_tick(), None);
        assert!(rig.engine.can_edit());
        assert_eq!(rig.display.borrow().remaining_seconds, 40);
    }

    #[test]
    fn edits_are_rejected_while_running() {
        let mut rig = rig(example_config());
        rig.engine.start();
        assert!(!rig.engine.can_edit());

        let outcome = rig
            .engine
            .edit_config(ConfigEdit::Numeric(NumericField::ShotDuration, "24".into()));
        assert_eq!(outcome, EditOutcome::Locked);
        assert_eq!(rig.engine.config().shot_duration, 30);
        assert!(!rig.engine.can_edit());

        rig.engine.pause();
        let outcome = rig
            .engine
            .edit_config(ConfigEdit::Numeric(NumericField::ShotDuration, "24".into()));
        assert_eq!(outcome, EditOutcome::Applied);
        rig.engine.reset();
        assert_eq!(rig.engine.state().remaining_seconds, 24);
    }

    #[test]
    fn invalid_edit_falls_back_to_last_value() {
        let mut rig = rig(example_config());
        let outcome = rig
            .engine
            .edit_config(ConfigEdit::Numeric(NumericField::ExtensionAmount, "".into()));
        assert!(matches!(outcome, EditOutcome::Invalid(ConfigError::EmptyNumber { .. })));

        rig.engine.reset();
        rig.engine.extend(None);
        assert_eq!(rig.engine.state().remaining_seconds, 45);
    }

    #[test]
    fn color_edit_refreshes_display() {
        let mut rig = rig(example_config());
        rig.engine.edit_config(ConfigEdit::Color(crate::state::ColorField::Normal, "lime".into()));
        assert_eq!(rig.display.borrow().color.as_str(), "lime");
    }

    #[test]
    fn custom_sound_requires_feature() {
        let mut engine = TimerEngine::new(
            ClockConfig::default(),
            Features {
                custom_sound: false,
                ..Features::default()
            },
            ManualScheduler::default(),
            AlertTrigger::new(Box::new(RecordingSink::default())),
            DisplaySync::new(),
        );
        let outcome = engine.edit_config(ConfigEdit::AlertSound(Some("/tmp/horn.wav".into())));
        assert_eq!(outcome, EditOutcome::Invalid(ConfigError::CustomSoundDisabled));
        assert_eq!(engine.edit_config(ConfigEdit::AlertSound(None)), EditOutcome::Applied);
    }

    #[test]
    fn once_per_value_skips_value_already_alerted_after_extension() {
        let mut rig = rig(ClockConfig {
            shot_duration: 12,
            alert_threshold: 10,
            ..ClockConfig::default()
        });
        rig.engine.reset();
        rig.engine.start();
        run_ticks(&mut rig.engine, 2);
        assert_eq!(rig.alerts.kinds().len(), 1);

        // Back above and down to 10 again in the same run
        rig.engine.extend(Some(1));
        run_ticks(&mut rig.engine, 1);
        assert_eq!(rig.engine.state().remaining_seconds, 10);
        assert_eq!(rig.alerts.kinds().len(), 1);
    }

    #[test]
    fn every_tick_policy_repeats_value() {
        let mut rig = rig(ClockConfig {
            shot_duration: 12,
            alert_threshold: 10,
            alert_policy: AlertPolicy::EveryTick,
            ..ClockConfig::default()
        });
        rig.engine.reset();
        rig.engine.start();
        run_ticks(&mut rig.engine, 2);
        rig.engine.extend(Some(1));
        run_ticks(&mut rig.engine, 1);
        assert_eq!(rig.alerts.kinds().len(), 2);
    }

    #[test]
    fn start_from_zero_stops_on_first_tick_without_alert() {
        let mut rig = rig(example_config());
        rig.engine.reset();
        rig.engine.start();
        run_ticks(&mut rig.engine, 30);
        let alerts_so_far = rig.alerts.kinds().len();

        rig.engine.start();
        assert!(rig.engine.state().running);
        run_ticks(&mut rig.engine, 1);
        assert!(!rig.engine.state().running);
        assert_eq!(rig.engine.state().remaining_seconds, 0);
        assert_eq!(rig.alerts.kinds().len(), alerts_so_far);
    }

    #[test]
    fn snapshot_reports_mode() {
        let mut rig = rig(example_config());
        assert_eq!(rig.engine.snapshot(false).mode, Mode::Hotkey);
        assert_eq!(rig.engine.snapshot(true).mode, Mode::Edit);
        rig.engine.start();
        let snapshot = rig.engine.snapshot(true);
        assert_eq!(snapshot.mode, Mode::Locked);
        assert_eq!(snapshot.mode_label, "LOCKED (RUNNING)");
        assert!(!snapshot.can_edit);
    }
}
