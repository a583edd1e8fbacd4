//! Shot Clock - A shot clock controller service
//! 
//! This library provides the countdown engine, its alert and edit-lock
//! policies, and the HTTP and console surfaces used to drive it from an
//! operator panel and to feed spectator displays.

pub mod config;
pub mod commands;
pub mod engine;
pub mod state;
pub mod api;
pub mod services;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use engine::TimerEngine;
pub use state::AppState;
pub use api::create_router;
pub use utils::signals::shutdown_signal;
