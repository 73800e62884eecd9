// HTTP surface for the security event log

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    middleware,
    response::{IntoResponse, Json, Response},
    routing::{get, patch, post},
    Router,
};
use canary_core::{EventError, NewEvent};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::canary::{canary_guard, CanaryDetector};
use crate::client_addr::ClientAddr;
use crate::config::ErrorPosture;
use crate::error::ApiError;
use crate::health;
use crate::query::{EventQueryEngine, EventQueryParams};
use crate::recorder::EventRecorder;
use crate::resolution::ResolutionManager;
use crate::simulate::run_simulation;
use crate::store::EventStore;

// ============================================================================
// Application State
// ============================================================================

pub struct AppState {
    pub store: Arc<dyn EventStore>,
    pub recorder: EventRecorder,
    pub query: EventQueryEngine,
    pub resolution: ResolutionManager,
    pub canary: Arc<CanaryDetector>,
    pub posture: ErrorPosture,
    pub started_at: DateTime<Utc>,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new<I, P>(store: Arc<dyn EventStore>, canary_paths: I, posture: ErrorPosture) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        let recorder = EventRecorder::new(Arc::clone(&store));
        Self {
            query: EventQueryEngine::new(Arc::clone(&store)),
            resolution: ResolutionManager::new(Arc::clone(&store)),
            canary: Arc::new(CanaryDetector::new(canary_paths, recorder.clone())),
            recorder,
            store,
            posture,
            started_at: Utc::now(),
        }
    }

    fn fail(&self) -> impl Fn(EventError) -> ApiError + '_ {
        move |e| ApiError::new(e, self.posture)
    }
}

// ============================================================================
// API Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ResolveRequest {
    resolved: Option<bool>,
}

fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, EventError> {
    body.map(|Json(v)| v)
        .map_err(|rejection| EventError::validation(rejection.body_text()))
}

fn query_params<T>(query: Result<Query<T>, QueryRejection>) -> Result<T, EventError> {
    query
        .map(|Query(v)| v)
        .map_err(|rejection| EventError::validation(rejection.body_text()))
}

/// Shared 404 body for the router fallback and every canary hit.
pub fn not_found_response() -> Response {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "Not found" }))).into_response()
}

// ============================================================================
// Event Endpoints
// ============================================================================

async fn list_events(
    State(state): State<SharedState>,
    params: Result<Query<EventQueryParams>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let filter = query_params(params)
        .and_then(|p| p.to_filter())
        .map_err(state.fail())?;
    let events = state.query.list(&filter).await.map_err(state.fail())?;
    Ok(Json(json!({ "events": events })))
}

async fn create_event(
    State(state): State<SharedState>,
    body: Result<Json<NewEvent>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let candidate = json_body(body).map_err(state.fail())?;
    let event = state
        .recorder
        .record(&candidate)
        .await
        .map_err(state.fail())?;
    Ok((StatusCode::CREATED, Json(json!({ "event": event }))))
}

async fn get_event(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let event = state.query.get(&id).await.map_err(state.fail())?;
    Ok(Json(json!({ "event": event })))
}

async fn event_stats(State(state): State<SharedState>) -> Result<impl IntoResponse, ApiError> {
    let stats = state.query.stats().await.map_err(state.fail())?;
    Ok(Json(stats))
}

async fn resolve_event(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    body: Result<Json<ResolveRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let resolved = json_body(body)
        .and_then(|req| {
            req.resolved
                .ok_or_else(|| EventError::validation("resolved must be a boolean"))
        })
        .map_err(state.fail())?;

    let event = state
        .resolution
        .set_resolved(&id, resolved)
        .await
        .map_err(state.fail())?;
    Ok(Json(json!({ "event": event })))
}

async fn delete_event(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state.resolution.delete(&id).await.map_err(state.fail())?;
    Ok(Json(json!({ "deleted": true, "id": id })))
}

async fn simulate_attack(
    State(state): State<SharedState>,
    ClientAddr(ip): ClientAddr,
) -> Result<impl IntoResponse, ApiError> {
    let events = run_simulation(&state.recorder, &ip)
        .await
        .map_err(state.fail())?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "created": events.len(), "events": events })),
    ))
}

async fn fallback() -> Response {
    not_found_response()
}

// ============================================================================
// Router
// ============================================================================

/// Full application router. The canary guard wraps every route and the
/// fallback, so decoy paths are intercepted before any routing decision. CORS
/// sits outside the guard so decoy and unknown-path responses carry the same
/// headers.
pub fn build_router(state: SharedState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let canary = middleware::from_fn_with_state(Arc::clone(&state.canary), canary_guard);

    Router::new()
        .route("/health", get(health::health))
        .route("/api/health", get(health::health))
        .route("/events", get(list_events).post(create_event))
        .route("/events/stats", get(event_stats))
        .route("/events/:id", get(get_event).delete(delete_event))
        .route("/events/:id/resolve", patch(resolve_event))
        .route("/simulate-attack", post(simulate_attack))
        .fallback(fallback)
        .layer(canary)
        .layer(cors)
        .with_state(state)
}
