//! Canary security-event monitor.
//!
//! Records hits on decoy routes and reported security events, and serves them
//! back through a filterable query API with a resolve/acknowledge workflow.
//!
//! Request flow: every request passes the Canary Detector first; anything
//! else is routed to the Recorder (writes), the Query Engine (reads) or the
//! Resolution State Manager (patch/delete), all backed by an [`EventStore`].

pub mod api;
pub mod canary;
pub mod client_addr;
pub mod config;
pub mod db;
pub mod error;
pub mod health;
pub mod query;
pub mod recorder;
pub mod resolution;
pub mod simulate;
pub mod store;

pub use api::{build_router, not_found_response, AppState, SharedState};
pub use canary::{CanaryDetector, DEFAULT_CANARY_PATHS};
pub use client_addr::{client_ip, ClientAddr};
pub use config::{ErrorPosture, ServerConfig};
pub use db::SqliteEventStore;
pub use error::{ApiError, StartupError};
pub use health::{check_health, HealthResponse, HealthVerdict};
pub use query::{EventQueryEngine, EventQueryParams};
pub use recorder::EventRecorder;
pub use resolution::ResolutionManager;
pub use simulate::{run_simulation, simulation_batch};
pub use store::EventStore;
