use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Conventional event classifications.
///
/// Storage keeps `event_type` as an open string so reporters may supply other
/// tags; this enum is the fixed label set consumers present.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    UnauthorizedAccess,
    DdosSuspected,
    FailedLogin,
    SqliSuspected,
    TestEvent,
    ManualTest,
}

impl EventType {
    pub const ALL: [EventType; 6] = [
        EventType::UnauthorizedAccess,
        EventType::DdosSuspected,
        EventType::FailedLogin,
        EventType::SqliSuspected,
        EventType::TestEvent,
        EventType::ManualTest,
    ];

    /// Types produced by the simulation batch, one of each.
    pub const PRIMARY: [EventType; 4] = [
        EventType::UnauthorizedAccess,
        EventType::DdosSuspected,
        EventType::FailedLogin,
        EventType::SqliSuspected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::UnauthorizedAccess => "unauthorized_access",
            EventType::DdosSuspected => "ddos_suspected",
            EventType::FailedLogin => "failed_login",
            EventType::SqliSuspected => "sqli_suspected",
            EventType::TestEvent => "test_event",
            EventType::ManualTest => "manual_test",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown event type: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_round_trip_through_from_str() {
        for t in EventType::ALL {
            assert_eq!(t.as_str().parse::<EventType>().unwrap(), t);
        }
        assert!("port_scan".parse::<EventType>().is_err());
    }

    #[test]
    fn test_serde_uses_snake_case_labels() {
        let json = serde_json::to_string(&EventType::SqliSuspected).unwrap();
        assert_eq!(json, "\"sqli_suspected\"");
    }
}
