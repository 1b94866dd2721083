//! Recording session management
//!
//! - `RecordingSession`: one recording's buffer, level, timing and capture task
//! - capture loop: blocking task pulling fixed-size chunks from a device
//! - `SessionRegistry`: id → session table; start, stop, query, save, discard

mod capture;
mod registry;
mod session;
mod stats;

pub use registry::SessionRegistry;
pub use session::RecordingSession;
pub use stats::SessionStats;

/// Registry-assigned session identifier; starts at 1 and is never reused
pub type SessionId = u64;
