//! External collaborator services module
//! 
//! This module contains the alert playback service and the optional
//! access gate checked before the controller starts.

pub mod access;
pub mod audio;

// Re-export main types
pub use access::AccessGate;
pub use audio::{create_audio_channel, AudioSender, AudioService};
