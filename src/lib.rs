// src/lib.rs
// Public library surface for the binaries and integration tests.

pub mod config;
pub mod mood;
pub mod phase;
pub mod result;
pub mod sentiment;
pub mod timers;

// Interaction state machine and its async handle
pub mod orchestrator;
pub mod session;

// HTTP surface & observability
pub mod api;
pub mod metrics;

// ---- Re-exports for stable public API ----
pub use crate::api::{create_router, AppState};
pub use crate::config::MoodConfig;
pub use crate::orchestrator::MoodSession;
pub use crate::session::{ImageHandle, Session, SessionSnapshot};
