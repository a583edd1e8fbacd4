//! Clock controller background task
//!
//! Owns the [`TimerEngine`] and applies commands one at a time in arrival
//! order. After every command the current snapshot is published on a watch
//! channel for the HTTP layer.

use tokio::sync::{mpsc, watch};
use tracing::{debug, info};

use crate::{
    commands::{Action, Command},
    engine::{Scheduler, TimerEngine},
    state::ClockSnapshot,
};

pub struct ClockController<S> {
    engine: TimerEngine<S>,
    commands: mpsc::Receiver<Command>,
    snapshot_tx: watch::Sender<ClockSnapshot>,
    quit_tx: watch::Sender<bool>,
    /// UI focus on a config field, only used for the mode label
    field_focused: bool,
}

impl<S: Scheduler> ClockController<S> {
    pub fn new(engine: TimerEngine<S>, commands: mpsc::Receiver<Command>) -> Self {
        // The start value field has focus at launch
        let (snapshot_tx, _) = watch::channel(engine.snapshot(true));
        let (quit_tx, _) = watch::channel(false);
        Self {
            engine,
            commands,
            snapshot_tx,
            quit_tx,
            field_focused: true,
        }
    }

    pub fn subscribe_snapshots(&self) -> watch::Receiver<ClockSnapshot> {
        self.snapshot_tx.subscribe()
    }

    /// Flips to `true` once a quit command has been handled
    pub fn subscribe_quit(&self) -> watch::Receiver<bool> {
        self.quit_tx.subscribe()
    }

    pub fn subscribe_edit_lock(&self) -> watch::Receiver<bool> {
        self.engine.edit_lock().subscribe()
    }

    /// Process commands until quit or until every sender is gone
    pub async fn run(mut self) {
        info!("Starting clock controller task");

        while let Some(command) = self.commands.recv().await {
            match command {
                Command::Action { action, reply } => {
                    debug!("Controller received {}", action);
                    self.apply(action);
                    let snapshot = self.publish();
                    if let Some(reply) = reply {
                        let _ = reply.send(snapshot);
                    }
                    if action == Action::Quit {
                        info!("Quit requested, stopping clock controller");
                        self.quit_tx.send_replace(true);
                        break;
                    }
                }
                Command::EditConfig { edits, reply } => {
                    let outcomes: Vec<_> = edits
                        .into_iter()
                        .map(|edit| self.engine.edit_config(edit))
                        .collect();
                    let snapshot = self.publish();
                    let _ = reply.send((outcomes, snapshot));
                }
                Command::Focus { focused, reply } => {
                    self.field_focused = focused;
                    let snapshot = self.publish();
                    if let Some(reply) = reply {
                        let _ = reply.send(snapshot);
                    }
                }
                Command::Tick(handle) => {
                    self.engine.tick(handle);
                    self.publish();
                }
            }
        }

        info!("Clock controller task finished");
    }

    fn apply(&mut self, action: Action) {
        match action {
            Action::StartGame => self.engine.start_game(),
            Action::Start => {
                // Starting always leaves the config fields
                self.field_focused = false;
                self.engine.start();
            }
            Action::Pause => self.engine.pause(),
            Action::Reset => self.engine.reset(),
            Action::Extend(amount) => self.engine.extend(amount),
            Action::Quit => self.engine.pause(),
        }
    }

    fn publish(&self) -> ClockSnapshot {
        let snapshot = self.engine.snapshot(self.field_focused);
        self.snapshot_tx.send_replace(snapshot.clone());
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::{sync::oneshot, time};

    use super::*;
    use crate::{
        commands::{create_command_channel, CommandSender},
        engine::{
            alert::RecordingSink, AlertKind, AlertTrigger, DisplaySync, EditOutcome, Mode,
            TokioScheduler,
        },
        state::{ClockConfig, ConfigEdit, Features, NumericField},
    };

    fn build_controller(sink: RecordingSink) -> (CommandSender, ClockController<TokioScheduler<Command>>) {
        let (tx, rx) = create_command_channel();
        let engine = TimerEngine::new(
            ClockConfig::default(),
            Features::default(),
            TokioScheduler::new(tx.clone(), Command::Tick),
            AlertTrigger::new(Box::new(sink)),
            DisplaySync::new(),
        );
        (tx, ClockController::new(engine, rx))
    }

    async fn act(tx: &CommandSender, action: Action) -> ClockSnapshot {
        let (reply, rx) = oneshot::channel();
        tx.send(Command::Action {
            action,
            reply: Some(reply),
        })
        .await
        .unwrap();
        rx.await.unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn countdown_runs_to_expiry() {
        let sink = RecordingSink::default();
        let (tx, controller) = build_controller(sink.clone());
        let snapshots = controller.subscribe_snapshots();
        tokio::spawn(controller.run());

        let snapshot = act(&tx, Action::Reset).await;
        assert_eq!(snapshot.remaining_seconds, 30);

        let snapshot = act(&tx, Action::Start).await;
        assert!(snapshot.running);
        assert_eq!(snapshot.mode, Mode::Locked);

        time::sleep(Duration::from_millis(20_500)).await;
        assert_eq!(snapshots.borrow().remaining_seconds, 10);
        assert_eq!(sink.kinds(), vec![AlertKind::Threshold]);

        time::sleep(Duration::from_secs(10)).await;
        let snapshot = snapshots.borrow().clone();
        assert_eq!(snapshot.remaining_seconds, 0);
        assert!(!snapshot.running);
        assert!(snapshot.can_edit);
        assert_eq!(sink.kinds().last(), Some(&AlertKind::Terminal));
    }

    #[tokio::test(start_paused = true)]
    async fn pause_stops_ticks() {
        let (tx, controller) = build_controller(RecordingSink::default());
        let snapshots = controller.subscribe_snapshots();
        tokio::spawn(controller.run());

        act(&tx, Action::Start).await;
        time::sleep(Duration::from_millis(3_500)).await;
        let paused = act(&tx, Action::Pause).await;
        assert_eq!(paused.remaining_seconds, 37);

        time::sleep(Duration::from_secs(5)).await;
        assert_eq!(snapshots.borrow().remaining_seconds, 37);
        assert!(!snapshots.borrow().running);
    }

    #[tokio::test(start_paused = true)]
    async fn edits_are_locked_while_running() {
        let (tx, controller) = build_controller(RecordingSink::default());
        let mut edit_lock = controller.subscribe_edit_lock();
        tokio::spawn(controller.run());

        act(&tx, Action::Start).await;
        edit_lock.changed().await.unwrap();
        assert!(!*edit_lock.borrow());

        let (reply, rx) = oneshot::channel();
        tx.send(Command::EditConfig {
            edits: vec![ConfigEdit::Numeric(NumericField::ShotDuration, "24".into())],
            reply,
        })
        .await
        .unwrap();
        let (outcomes, snapshot) = rx.await.unwrap();
        assert_eq!(outcomes, vec![EditOutcome::Locked]);
        assert_eq!(snapshot.config.shot_duration, 30);
    }

    #[tokio::test(start_paused = true)]
    async fn launches_in_edit_mode() {
        let (tx, controller) = build_controller(RecordingSink::default());
        let snapshots = controller.subscribe_snapshots();
        assert_eq!(snapshots.borrow().mode, Mode::Edit);
        assert_eq!(snapshots.borrow().mode_label, "EDIT MODE");
        tokio::spawn(controller.run());

        let snapshot = act(&tx, Action::Reset).await;
        assert_eq!(snapshot.mode_label, "EDIT MODE");

        let snapshot = act(&tx, Action::Start).await;
        assert_eq!(snapshot.mode_label, "LOCKED (RUNNING)");
        let snapshot = act(&tx, Action::Pause).await;
        assert_eq!(snapshot.mode_label, "HOTKEY MODE");
    }

    #[tokio::test(start_paused = true)]
    async fn focus_changes_mode_label() {
        let (tx, controller) = build_controller(RecordingSink::default());
        tokio::spawn(controller.run());

        let (reply, rx) = oneshot::channel();
        tx.send(Command::Focus {
            focused: true,
            reply: Some(reply),
        })
        .await
        .unwrap();
        assert_eq!(rx.await.unwrap().mode_label, "EDIT MODE");

        let snapshot = act(&tx, Action::Start).await;
        assert_eq!(snapshot.mode_label, "LOCKED (RUNNING)");

        let snapshot = act(&tx, Action::Pause).await;
        assert_eq!(snapshot.mode_label, "HOTKEY MODE");
    }

    #[tokio::test(start_paused = true)]
    async fn quit_stops_controller() {
        let (tx, controller) = build_controller(RecordingSink::default());
        let quit = controller.subscribe_quit();
        let task = tokio::spawn(controller.run());

        act(&tx, Action::Start).await;
        let snapshot = act(&tx, Action::Quit).await;
        assert!(!snapshot.running);

        task.await.unwrap();
        assert!(*quit.borrow());
    }
}
