//! Studio session management
//!
//! This module provides the `StudioSession` abstraction that wires together:
//! - Device gate (capability check + access request)
//! - Take recorder (capture lifecycle, elapsed-time tick)
//! - Pending slot (the single unconfirmed take + its metadata draft)
//! - Recording store and playback manager
//! - Export and teardown

mod config;
mod session;
mod stats;

pub use config::SessionConfig;
pub use session::StudioSession;
pub use stats::{format_duration, StudioStats};
