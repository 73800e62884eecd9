//! Shared fixtures for in-process API tests.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::http::{HeaderName, HeaderValue};
use axum_test::TestServer;
use canary_core::error::Result;
use canary_core::{
    EventError, EventFilter, EventStats, Resolution, SecurityEvent, ValidatedEvent,
};
use canary_server::{build_router, AppState, ErrorPosture, EventStore, SqliteEventStore};
use std::sync::Arc;

pub const TEST_CANARIES: [&str; 3] = ["/admin", "/.env", "/wp-login.php"];

pub fn forwarded_for() -> HeaderName {
    HeaderName::from_static("x-forwarded-for")
}

pub fn ip(value: &'static str) -> HeaderValue {
    HeaderValue::from_static(value)
}

pub fn server_with_store(store: Arc<dyn EventStore>, posture: ErrorPosture) -> TestServer {
    let state = Arc::new(AppState::new(store, TEST_CANARIES, posture));
    TestServer::new(build_router(state)).unwrap()
}

pub fn test_server() -> TestServer {
    let store = Arc::new(SqliteEventStore::open_in_memory().unwrap());
    server_with_store(store, ErrorPosture::Development)
}

/// Store double whose every call fails like an unreachable database.
pub struct FailingStore;

fn down<T>() -> Result<T> {
    Err(EventError::storage("database is locked"))
}

#[async_trait]
impl EventStore for FailingStore {
    async fn insert(&self, _event: &ValidatedEvent) -> Result<SecurityEvent> {
        down()
    }

    async fn select(&self, _filter: &EventFilter) -> Result<Vec<SecurityEvent>> {
        down()
    }

    async fn get(&self, _id: &str) -> Result<Option<SecurityEvent>> {
        down()
    }

    async fn update_resolution(
        &self,
        _id: &str,
        _resolution: Resolution,
    ) -> Result<Option<SecurityEvent>> {
        down()
    }

    async fn delete(&self, _id: &str) -> Result<bool> {
        down()
    }

    async fn stats(&self) -> Result<EventStats> {
        down()
    }

    async fn ping(&self) -> Result<()> {
        down()
    }
}
