//! HTTP API for controlling recording sessions
//!
//! - POST /recordings - Start a new recording
//! - GET /recordings - List sessions
//! - GET /recordings/:id - Session stats
//! - DELETE /recordings/:id - Discard without saving
//! - POST /recordings/:id/stop - Stop capturing
//! - POST /recordings/:id/save - Write the session to a WAV file and remove it
//! - GET /recordings/:id/level - Level of one session
//! - GET /recordings/:id/duration - Elapsed milliseconds
//! - GET /level - Level of any running session
//! - GET /health - Health check

mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::AppState;
