//! Query filters over the event log.
//!
//! A raw query (`limit`, `type`, `resolved`, `q`) normalizes into an
//! [`EventFilter`], which in turn expands into a [`Predicate`] tree:
//!
//! ```text
//! All[ EventTypeIs(type)?, ResolvedIs(flag)?, Any[endpoint~q, details~q, ip_address~q]? ]
//! ```
//!
//! `Predicate::matches` is the reference semantics. Storage adapters compile
//! the same tree into their own query language so filtering happens where the
//! data lives.

use serde::{Deserialize, Serialize};

use super::error::{EventError, Result};
use super::event::SecurityEvent;

pub const DEFAULT_LIMIT: usize = 200;
pub const MAX_LIMIT: usize = 500;
pub const MAX_SEARCH_LEN: usize = 256;

/// Text columns the free-text search runs over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextField {
    Endpoint,
    Details,
    IpAddress,
}

impl TextField {
    pub const SEARCHABLE: [TextField; 3] =
        [TextField::Endpoint, TextField::Details, TextField::IpAddress];

    pub fn column(&self) -> &'static str {
        match self {
            TextField::Endpoint => "endpoint",
            TextField::Details => "details",
            TextField::IpAddress => "ip_address",
        }
    }

    fn value<'a>(&self, event: &'a SecurityEvent) -> Option<&'a str> {
        match self {
            TextField::Endpoint => Some(&event.endpoint),
            TextField::Details => event.details.as_deref(),
            TextField::IpAddress => Some(&event.ip_address),
        }
    }
}

/// Composable predicate over security events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    EventTypeIs(String),
    ResolvedIs(bool),
    /// Case-insensitive substring match. Absent fields never match.
    FieldContains(TextField, String),
    /// Logical AND. Empty means "everything".
    All(Vec<Predicate>),
    /// Logical OR. Empty means "nothing".
    Any(Vec<Predicate>),
}

impl Predicate {
    pub fn matches(&self, event: &SecurityEvent) -> bool {
        match self {
            Predicate::EventTypeIs(t) => event.event_type == *t,
            Predicate::ResolvedIs(flag) => event.resolved == *flag,
            Predicate::FieldContains(field, needle) => field
                .value(event)
                .map(|v| contains_ignore_case(v, needle))
                .unwrap_or(false),
            Predicate::All(parts) => parts.iter().all(|p| p.matches(event)),
            Predicate::Any(parts) => parts.iter().any(|p| p.matches(event)),
        }
    }

    /// True when the predicate places no restriction on the result set.
    pub fn is_unrestricted(&self) -> bool {
        matches!(self, Predicate::All(parts) if parts.is_empty())
    }
}

/// Case folding for substring search. Storage adapters must fold with this
/// same function.
pub fn fold_case(text: &str) -> String {
    text.to_lowercase()
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    fold_case(haystack).contains(&fold_case(needle))
}

/// Normalized query filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventFilter {
    pub limit: usize,
    pub event_type: Option<String>,
    pub resolved: Option<bool>,
    pub search: Option<String>,
}

impl Default for EventFilter {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            event_type: None,
            resolved: None,
            search: None,
        }
    }
}

impl EventFilter {
    /// Build a filter from raw query-string values.
    ///
    /// - `limit`: absent or unparsable falls back to [`DEFAULT_LIMIT`]; anything
    ///   else is clamped into `1..=MAX_LIMIT`.
    /// - `event_type`: empty means no restriction.
    /// - `resolved`: only the literals `"true"` and `"false"` restrict.
    /// - `q`: searched verbatim, empty means no restriction. Longer than
    ///   [`MAX_SEARCH_LEN`] characters is a validation error.
    pub fn from_params(
        limit: Option<&str>,
        event_type: Option<&str>,
        resolved: Option<&str>,
        q: Option<&str>,
    ) -> Result<Self> {
        let search = q.filter(|s| !s.is_empty());
        if let Some(s) = search {
            if s.chars().count() > MAX_SEARCH_LEN {
                return Err(EventError::validation(format!(
                    "q exceeds {} characters",
                    MAX_SEARCH_LEN
                )));
            }
        }

        Ok(Self {
            limit: clamp_limit(limit),
            event_type: event_type.filter(|t| !t.is_empty()).map(str::to_string),
            resolved: match resolved {
                Some("true") => Some(true),
                Some("false") => Some(false),
                _ => None,
            },
            search: search.map(str::to_string),
        })
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit.clamp(1, MAX_LIMIT);
        self
    }

    pub fn with_type(mut self, event_type: impl Into<String>) -> Self {
        self.event_type = Some(event_type.into());
        self
    }

    pub fn with_resolved(mut self, resolved: bool) -> Self {
        self.resolved = Some(resolved);
        self
    }

    pub fn with_search(mut self, q: impl Into<String>) -> Self {
        self.search = Some(q.into());
        self
    }

    pub fn predicate(&self) -> Predicate {
        let mut parts = Vec::new();

        if let Some(t) = &self.event_type {
            parts.push(Predicate::EventTypeIs(t.clone()));
        }
        if let Some(flag) = self.resolved {
            parts.push(Predicate::ResolvedIs(flag));
        }
        if let Some(q) = &self.search {
            parts.push(Predicate::Any(
                TextField::SEARCHABLE
                    .iter()
                    .map(|f| Predicate::FieldContains(*f, q.clone()))
                    .collect(),
            ));
        }

        Predicate::All(parts)
    }
}

fn clamp_limit(raw: Option<&str>) -> usize {
    let Some(raw) = raw.map(str::trim) else {
        return DEFAULT_LIMIT;
    };
    match raw.parse::<i64>() {
        Ok(n) => n.clamp(1, MAX_LIMIT as i64) as usize,
        // digits-only but too large for i64 is still "more than the ceiling"
        Err(_) if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) => MAX_LIMIT,
        Err(_) => DEFAULT_LIMIT,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn event(event_type: &str, endpoint: &str, ip: &str, details: Option<&str>) -> SecurityEvent {
        SecurityEvent {
            id: "evt-1".to_string(),
            created_at: Utc::now(),
            event_type: event_type.to_string(),
            endpoint: endpoint.to_string(),
            ip_address: ip.to_string(),
            details: details.map(str::to_string),
            resolved: false,
            resolved_at: None,
        }
    }

    #[test]
    fn test_limit_defaults_and_clamps() {
        let limit = |raw| EventFilter::from_params(raw, None, None, None).unwrap().limit;
        assert_eq!(limit(None), 200);
        assert_eq!(limit(Some("abc")), 200);
        assert_eq!(limit(Some("1000")), 500);
        assert_eq!(limit(Some("500")), 500);
        assert_eq!(limit(Some("25")), 25);
        assert_eq!(limit(Some("0")), 1);
        assert_eq!(limit(Some("-4")), 1);
        assert_eq!(limit(Some("99999999999999999999")), 500);
    }

    #[test]
    fn test_resolved_is_tri_state() {
        let parse = |s| EventFilter::from_params(None, None, Some(s), None).unwrap().resolved;
        assert_eq!(parse("true"), Some(true));
        assert_eq!(parse("false"), Some(false));
        assert_eq!(parse(""), None);
        assert_eq!(parse("TRUE"), None);
        assert_eq!(parse("1"), None);
        assert_eq!(EventFilter::from_params(None, None, None, None).unwrap().resolved, None);
    }

    #[test]
    fn test_empty_type_and_query_are_unrestricted() {
        let filter = EventFilter::from_params(None, Some(""), None, Some("")).unwrap();
        assert_eq!(filter.event_type, None);
        assert_eq!(filter.search, None);
        assert!(filter.predicate().is_unrestricted());
    }

    #[test]
    fn test_search_keeps_surrounding_whitespace() {
        let filter = EventFilter::from_params(None, None, None, Some(" admin")).unwrap();
        assert_eq!(filter.search.as_deref(), Some(" admin"));

        let p = filter.predicate();
        assert!(p.matches(&event("x", "/ admin", "1.1.1.1", None)));
        assert!(!p.matches(&event("x", "/admin", "1.1.1.1", None)));
    }

    #[test]
    fn test_overlong_search_is_rejected() {
        let at_limit = "x".repeat(MAX_SEARCH_LEN);
        let filter = EventFilter::from_params(None, None, None, Some(&at_limit)).unwrap();
        assert_eq!(filter.search.unwrap().chars().count(), MAX_SEARCH_LEN);

        let long = format!("{}ZZZ", "a".repeat(MAX_SEARCH_LEN));
        let err = EventFilter::from_params(None, None, None, Some(&long)).unwrap_err();
        assert!(matches!(err, EventError::Validation(_)));
    }

    #[test]
    fn test_predicate_shape() {
        let filter = EventFilter::default()
            .with_type("ddos_suspected")
            .with_resolved(false)
            .with_search("admin");

        let Predicate::All(parts) = filter.predicate() else {
            panic!("expected All");
        };
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], Predicate::EventTypeIs("ddos_suspected".to_string()));
        assert_eq!(parts[1], Predicate::ResolvedIs(false));
        match &parts[2] {
            Predicate::Any(fields) => assert_eq!(fields.len(), 3),
            other => panic!("expected Any, got {:?}", other),
        }
    }

    #[test]
    fn test_search_matches_any_field_case_insensitively() {
        let p = EventFilter::default().with_search("ADMIN").predicate();

        assert!(p.matches(&event("x", "/admin", "1.1.1.1", None)));
        assert!(p.matches(&event("x", "/", "1.1.1.1", Some("probe of Admin panel"))));
        assert!(p.matches(&event("x", "/", "admin-gw.local", None)));
        assert!(!p.matches(&event("x", "/login", "1.1.1.1", Some("no match"))));
        assert!(!p.matches(&event("x", "/login", "1.1.1.1", None)));
    }

    #[test]
    fn test_search_folds_non_ascii_case() {
        let p = EventFilter::default().with_search("ÉCOLE").predicate();

        assert!(p.matches(&event("x", "/école", "1.1.1.1", None)));
        assert!(p.matches(&event("x", "/", "1.1.1.1", Some("Straße École"))));
        assert!(!p.matches(&event("x", "/ecole", "1.1.1.1", None)));
    }

    #[test]
    fn test_type_filter_holds_regardless_of_search() {
        let p = EventFilter::default()
            .with_type("ddos_suspected")
            .with_search("api")
            .predicate();

        assert!(p.matches(&event("ddos_suspected", "/api/data", "1.1.1.1", None)));
        assert!(!p.matches(&event("failed_login", "/api/data", "1.1.1.1", None)));
    }

    #[test]
    fn test_empty_any_matches_nothing() {
        assert!(!Predicate::Any(vec![]).matches(&event("x", "/", "1", None)));
        assert!(Predicate::All(vec![]).matches(&event("x", "/", "1", None)));
    }
}
