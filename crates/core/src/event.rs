use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::{EventError, Result};

pub const MAX_EVENT_TYPE_LEN: usize = 64;
pub const MAX_ENDPOINT_LEN: usize = 2048;
pub const MAX_IP_ADDRESS_LEN: usize = 128;
pub const MAX_DETAILS_LEN: usize = 4096;

/// A persisted security event.
///
/// `id` and `created_at` are assigned by the store on insert. Everything except
/// the resolution pair is write-once.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SecurityEvent {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub event_type: String,
    pub endpoint: String,
    pub ip_address: String,
    pub details: Option<String>,
    pub resolved: bool,
    pub resolved_at: Option<DateTime<Utc>>,
}

impl SecurityEvent {
    pub fn resolution(&self) -> Resolution {
        Resolution {
            resolved: self.resolved,
            resolved_at: self.resolved_at,
        }
    }
}

/// Candidate event as submitted by a reporter.
///
/// Every field is optional on the wire so that a missing field is reported as
/// a validation failure rather than a deserialization rejection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewEvent {
    #[serde(default)]
    pub event_type: Option<String>,
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub ip_address: Option<String>,
    #[serde(default)]
    pub details: Option<String>,
}

impl NewEvent {
    pub fn new(
        event_type: impl Into<String>,
        endpoint: impl Into<String>,
        ip_address: impl Into<String>,
    ) -> Self {
        Self {
            event_type: Some(event_type.into()),
            endpoint: Some(endpoint.into()),
            ip_address: Some(ip_address.into()),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Check the required-field contract and input bounds.
    ///
    /// Required fields are trimmed and must be non-empty. Blank `details`
    /// collapses to `None`.
    pub fn validate(&self) -> Result<ValidatedEvent> {
        let event_type = required("event_type", self.event_type.as_deref(), MAX_EVENT_TYPE_LEN)?;
        let endpoint = required("endpoint", self.endpoint.as_deref(), MAX_ENDPOINT_LEN)?;
        let ip_address = required("ip_address", self.ip_address.as_deref(), MAX_IP_ADDRESS_LEN)?;

        let details = match self.details.as_deref().map(str::trim) {
            Some(d) if !d.is_empty() => {
                check_len("details", d, MAX_DETAILS_LEN)?;
                Some(d.to_string())
            }
            _ => None,
        };

        Ok(ValidatedEvent {
            event_type,
            endpoint,
            ip_address,
            details,
        })
    }
}

fn required(field: &str, value: Option<&str>, max: usize) -> Result<String> {
    let value = value.map(str::trim).unwrap_or_default();
    if value.is_empty() {
        return Err(EventError::validation(format!("{} is required", field)));
    }
    check_len(field, value, max)?;
    Ok(value.to_string())
}

fn check_len(field: &str, value: &str, max: usize) -> Result<()> {
    if value.chars().count() > max {
        return Err(EventError::validation(format!(
            "{} exceeds {} characters",
            field, max
        )));
    }
    Ok(())
}

/// An event that passed [`NewEvent::validate`]. Stores only accept this type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedEvent {
    event_type: String,
    endpoint: String,
    ip_address: String,
    details: Option<String>,
}

impl ValidatedEvent {
    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn ip_address(&self) -> &str {
        &self.ip_address
    }

    pub fn details(&self) -> Option<&str> {
        self.details.as_deref()
    }
}

/// Resolved flag and its timestamp, kept together so that `resolved_at` is
/// set exactly when `resolved` is true.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    resolved: bool,
    resolved_at: Option<DateTime<Utc>>,
}

impl Resolution {
    pub fn resolved_at(at: DateTime<Utc>) -> Self {
        Self {
            resolved: true,
            resolved_at: Some(at),
        }
    }

    pub fn unresolved() -> Self {
        Self {
            resolved: false,
            resolved_at: None,
        }
    }

    /// Target state for a resolve/unresolve request issued at `now`.
    pub fn target(resolved: bool, now: DateTime<Utc>) -> Self {
        if resolved {
            Self::resolved_at(now)
        } else {
            Self::unresolved()
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved
    }

    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.resolved_at
    }
}
