//! Simulation Generator: records one representative event per primary type.
//!
//! Runs through the Recorder so it shares its validation and failure rules.
//! The batch stops at the first failure; earlier events stay recorded.

use canary_core::error::Result;
use canary_core::{EventType, NewEvent, SecurityEvent};

use crate::recorder::EventRecorder;

/// (endpoint, details) template per primary event type.
fn template(event_type: EventType) -> (&'static str, &'static str) {
    match event_type {
        EventType::UnauthorizedAccess => ("/admin", "Simulated probe of decoy admin route"),
        EventType::DdosSuspected => ("/api/data", "Simulated burst of 1200 requests in 10s"),
        EventType::FailedLogin => ("/login", "Simulated repeated failed password for user admin"),
        EventType::SqliSuspected => ("/api/users", "Simulated payload: id=1' OR '1'='1"),
        EventType::TestEvent | EventType::ManualTest => ("/simulate-attack", "Simulated event"),
    }
}

/// The candidate events a simulation run will record, in order.
pub fn simulation_batch(ip_address: &str) -> Vec<NewEvent> {
    EventType::PRIMARY
        .iter()
        .map(|t| {
            let (endpoint, details) = template(*t);
            NewEvent::new(t.as_str(), endpoint, ip_address).with_details(details)
        })
        .collect()
}

pub async fn run_simulation(recorder: &EventRecorder, ip_address: &str) -> Result<Vec<SecurityEvent>> {
    let mut created = Vec::new();
    for candidate in simulation_batch(ip_address) {
        created.push(recorder.record(&candidate).await?);
    }
    tracing::info!(count = created.len(), ip = ip_address, "simulation batch recorded");
    Ok(created)
}
