//! Canary Detector: decoy routes that record the caller and answer 404.
//!
//! Runs as the outermost middleware so decoy paths never reach routing or any
//! real handler. The decoy answer is the same body the router's fallback
//! returns, so a probe cannot tell a decoy from a path that does not exist.

use axum::{
    extract::{Request, State},
    http::{header::USER_AGENT, HeaderMap, Method},
    middleware::Next,
    response::Response,
};
use canary_core::event::{MAX_DETAILS_LEN, MAX_ENDPOINT_LEN};
use canary_core::{EventType, NewEvent};
use std::collections::BTreeSet;
use std::net::SocketAddr;
use std::sync::Arc;

use crate::api::not_found_response;
use crate::client_addr::{client_ip, peer_addr};
use crate::recorder::EventRecorder;

pub const DEFAULT_CANARY_PATHS: [&str; 6] = [
    "/admin",
    "/wp-admin",
    "/wp-login.php",
    "/.env",
    "/phpmyadmin",
    "/.git/config",
];

pub struct CanaryDetector {
    paths: BTreeSet<String>,
    recorder: EventRecorder,
}

impl CanaryDetector {
    pub fn new<I, P>(paths: I, recorder: EventRecorder) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
            recorder,
        }
    }

    /// Exact, case-sensitive match on the request path (query excluded).
    pub fn is_canary(&self, path: &str) -> bool {
        self.paths.contains(path)
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.paths.iter().map(String::as_str)
    }

    pub fn canary_event(
        &self,
        path: &str,
        method: &Method,
        headers: &HeaderMap,
        peer: Option<SocketAddr>,
    ) -> NewEvent {
        NewEvent::new(
            EventType::UnauthorizedAccess.as_str(),
            path.chars().take(MAX_ENDPOINT_LEN).collect::<String>(),
            client_ip(headers, peer),
        )
        .with_details(hit_details(method, headers))
    }

    /// Record a hit. Failures are logged and dropped; the caller always gets
    /// the decoy response.
    pub async fn record_hit(&self, candidate: &NewEvent) {
        tracing::warn!(
            endpoint = candidate.endpoint.as_deref().unwrap_or_default(),
            ip = candidate.ip_address.as_deref().unwrap_or_default(),
            "canary route hit"
        );
        if let Err(e) = self.recorder.record(candidate).await {
            tracing::warn!("canary hit not recorded: {}", e);
        }
    }
}

/// `"{METHOD} request"` plus the user-agent when present, cut to fit the
/// details bound so an oversized header cannot make the hit unrecordable.
fn hit_details(method: &Method, headers: &HeaderMap) -> String {
    let details = match headers
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|ua| !ua.is_empty())
    {
        Some(ua) => format!("{} request, user-agent: {}", method, ua),
        None => format!("{} request", method),
    };
    details.chars().take(MAX_DETAILS_LEN).collect()
}

/// Middleware entry point, installed with `from_fn_with_state`.
pub async fn canary_guard(
    State(detector): State<Arc<CanaryDetector>>,
    req: Request,
    next: Next,
) -> Response {
    if !detector.is_canary(req.uri().path()) {
        return next.run(req).await;
    }

    let candidate = detector.canary_event(
        req.uri().path(),
        req.method(),
        req.headers(),
        peer_addr(req.extensions()),
    );
    detector.record_hit(&candidate).await;

    not_found_response()
}
