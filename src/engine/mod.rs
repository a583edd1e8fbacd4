//! Timer engine module
//!
//! The countdown state machine and the components it drives: the scheduler
//! that delivers ticks, the alert trigger, the edit lock and display sync.

pub mod alert;
pub mod display;
pub mod edit_lock;
pub mod scheduler;
pub mod timer;

// Re-export main types
pub use alert::{AlertKind, AlertRequest, AlertSink, AlertSound, AlertTrigger};
pub use display::{ChannelSurface, DisplayFrame, DisplaySurface, DisplaySync};
pub use edit_lock::{EditLockController, Mode};
pub use scheduler::{Scheduler, TickHandle, TokioScheduler};
pub use timer::{EditOutcome, TimerEngine, TICK_INTERVAL};
