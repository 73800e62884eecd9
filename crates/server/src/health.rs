//! Unified health endpoint (`/health`, `/api/health`).
//!
//! Reports build info, storage reachability and the decoy configuration.
//! Storage failure turns the verdict to `degraded` and the status to 503.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::{AppState, SharedState};
use crate::config::ErrorPosture;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: HealthVerdict,
    pub service: String,
    pub version: String,
    pub storage: StorageHealth,
    pub canary_paths: usize,
    pub uptime_secs: i64,
    pub checked_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthVerdict {
    Ok,
    Degraded,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageHealth {
    pub db_ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub db_error: Option<String>,
}

pub async fn check_health(state: &AppState) -> HealthResponse {
    let storage = match state.store.ping().await {
        Ok(()) => StorageHealth {
            db_ok: true,
            db_error: None,
        },
        Err(e) => {
            tracing::warn!("health check: storage unreachable: {}", e);
            StorageHealth {
                db_ok: false,
                db_error: match state.posture {
                    ErrorPosture::Development => Some(e.to_string()),
                    ErrorPosture::Production => None,
                },
            }
        }
    };

    let now = Utc::now();
    HealthResponse {
        status: if storage.db_ok {
            HealthVerdict::Ok
        } else {
            HealthVerdict::Degraded
        },
        service: "canary-monitor".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        storage,
        canary_paths: state.canary.paths().count(),
        uptime_secs: (now - state.started_at).num_seconds(),
        checked_at: now,
    }
}

pub async fn health(State(state): State<SharedState>) -> impl IntoResponse {
    let report = check_health(&state).await;
    let status = match report.status {
        HealthVerdict::Ok => StatusCode::OK,
        HealthVerdict::Degraded => StatusCode::SERVICE_UNAVAILABLE,
    };
    (status, Json(report))
}
