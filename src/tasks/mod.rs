//! Background tasks module
//! 
//! This module contains the tasks that run alongside the HTTP server.

pub mod clock_controller;
pub mod hotkeys;

// Re-export main types
pub use clock_controller::ClockController;
pub use hotkeys::hotkey_task;
