//! One-shot delayed ticks for the countdown
//!
//! The engine never sleeps itself. It asks a [`Scheduler`] to deliver a tick
//! after a delay and later hands the returned [`TickHandle`] back to
//! [`TimerEngine::tick`](super::TimerEngine::tick). The tokio implementation
//! posts the tick into the controller's command channel, so ticks re-enter
//! the engine through the same serialized path as operator commands.

use std::{collections::HashMap, time::Duration};

use tokio::{sync::mpsc, task::AbortHandle, time::Instant};
use tracing::debug;

/// Identifies one scheduled tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TickHandle(u64);

impl TickHandle {
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Run-once-after-delay / cancel abstraction used by the timer engine
pub trait Scheduler {
    /// Arm a tick that fires once after `delay`
    fn schedule(&mut self, delay: Duration) -> TickHandle;

    /// Cancel a pending tick. Unknown or already fired handles are ignored.
    fn cancel(&mut self, handle: TickHandle);
}

/// Scheduler backed by tokio timers that delivers ticks as channel messages
pub struct TokioScheduler<M> {
    tx: mpsc::Sender<M>,
    wrap: fn(TickHandle) -> M,
    next_id: u64,
    pending: HashMap<TickHandle, AbortHandle>,
}

impl<M> TokioScheduler<M> {
    /// Create a scheduler that sends `wrap(handle)` on `tx` when a tick is due
    pub fn new(tx: mpsc::Sender<M>, wrap: fn(TickHandle) -> M) -> Self {
        Self {
            tx,
            wrap,
            next_id: 0,
            pending: HashMap::new(),
        }
    }
}

impl<M: Send + 'static> Scheduler for TokioScheduler<M> {
    fn schedule(&mut self, delay: Duration) -> TickHandle {
        self.pending.retain(|_, task| !task.is_finished());

        let handle = TickHandle(self.next_id);
        self.next_id += 1;

        // Deadline is fixed now, not when the task is first polled
        let deadline = Instant::now() + delay;
        let tx = self.tx.clone();
        let message = (self.wrap)(handle);
        let task = tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            if tx.send(message).await.is_err() {
                debug!("Tick {} dropped, controller has shut down", handle.id());
            }
        });

        self.pending.insert(handle, task.abort_handle());
        handle
    }

    fn cancel(&mut self, handle: TickHandle) {
        if let Some(task) = self.pending.remove(&handle) {
            task.abort();
        }
    }
}

/// Scheduler that never fires on its own; tests deliver ticks by hand
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct ManualScheduler {
    next_id: u64,
    pub scheduled: Vec<(TickHandle, Duration)>,
    pub cancelled: Vec<TickHandle>,
}

#[cfg(test)]
impl Scheduler for ManualScheduler {
    fn schedule(&mut self, delay: Duration) -> TickHandle {
        let handle = TickHandle(self.next_id);
        self.next_id += 1;
        self.scheduled.push((handle, delay));
        handle
    }

    fn cancel(&mut self, handle: TickHandle) {
        self.cancelled.push(handle);
    }
}
