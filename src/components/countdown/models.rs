use crate::error::{CountdownResult, Error};
use crate::markup::Element;
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Attribute holding the calendar identifier
pub const CALENDAR_ID_ATTRIBUTE: &str = "calendar-id";

/// Attribute holding the API key
pub const API_KEY_ATTRIBUTE: &str = "api-key";

/// Next-event details shown by one container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventInfo {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub title: String,
    pub location: Option<String>,
    pub link: String,
    /// Virtual "now" used for the countdown
    pub reference_now: DateTime<Utc>,
}

/// Lifecycle of one container's countdown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownStatus {
    /// Waiting for the calendar response
    Pending,
    /// Event rendered, ticker running
    Running,
    /// Calendar returned no upcoming events
    NoEvents,
    /// Request failed; failure message shown
    Failed,
    /// Container is missing a required attribute
    Invalid,
    /// Stopped through its handle
    Stopped,
}

impl CountdownStatus {
    /// Whether the initial fetch has been resolved one way or another
    pub fn is_settled(&self) -> bool {
        !matches!(self, CountdownStatus::Pending)
    }

    /// Value written to the container's state attribute
    pub fn as_str(&self) -> &'static str {
        match self {
            CountdownStatus::Pending => "pending",
            CountdownStatus::Running => "running",
            CountdownStatus::NoEvents => "no-events",
            CountdownStatus::Failed => "failed",
            CountdownStatus::Invalid => "invalid",
            CountdownStatus::Stopped => "stopped",
        }
    }
}

/// Point-in-time view of a running countdown
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountdownSnapshot {
    pub event: EventInfo,
    pub ticks: u64,
}

/// Settings read from a container's attributes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerConfig {
    pub calendar_id: String,
    pub api_key: String,
}

impl ContainerConfig {
    /// Read both required attributes, reporting every one that is missing
    pub fn from_element(element: &Element) -> CountdownResult<Self> {
        let read = |name: &str| {
            element
                .attribute(name)
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        };

        let calendar_id = read(CALENDAR_ID_ATTRIBUTE);
        let api_key = read(API_KEY_ATTRIBUTE);

        match (calendar_id, api_key) {
            (Some(calendar_id), Some(api_key)) => Ok(Self {
                calendar_id,
                api_key,
            }),
            (calendar_id, api_key) => {
                let mut missing = Vec::new();
                if calendar_id.is_none() {
                    missing.push(CALENDAR_ID_ATTRIBUTE);
                }
                if api_key.is_none() {
                    missing.push(API_KEY_ATTRIBUTE);
                }
                Err(Error::MissingAttributes(missing))
            }
        }
    }
}

/// Response body of the events listing endpoint
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventsResponse {
    #[serde(default)]
    pub items: Vec<ApiEvent>,
}

/// One event as returned by the calendar API
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiEvent {
    pub summary: Option<String>,
    pub location: Option<String>,
    pub html_link: Option<String>,
    #[serde(default)]
    pub start: ApiEventTime,
    #[serde(default)]
    pub end: ApiEventTime,
}

/// Start or end of an event; all-day events carry only `date`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiEventTime {
    pub date_time: Option<String>,
    pub date: Option<String>,
    pub time_zone: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_container_config_reads_attributes() {
        let element = Element::new("div")
            .with_attribute(CALENDAR_ID_ATTRIBUTE, "team")
            .with_attribute(API_KEY_ATTRIBUTE, " secret ");

        let config = ContainerConfig::from_element(&element).unwrap();
        assert_eq!(config.calendar_id, "team");
        assert_eq!(config.api_key, "secret");
    }

    #[test]
    fn test_container_config_reports_all_missing() {
        let element = Element::new("div").with_attribute(CALENDAR_ID_ATTRIBUTE, "");

        match ContainerConfig::from_element(&element) {
            Err(Error::MissingAttributes(missing)) => {
                assert_eq!(missing, vec![CALENDAR_ID_ATTRIBUTE, API_KEY_ATTRIBUTE]);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_status_settled_and_names() {
        assert!(!CountdownStatus::Pending.is_settled());
        assert!(CountdownStatus::Failed.is_settled());
        assert_eq!(CountdownStatus::NoEvents.as_str(), "no-events");
    }

    #[test]
    fn test_events_response_deserializes_google_shape() {
        let body = r#"{
            "kind": "calendar#events",
            "items": [{
                "summary": "Weekly stream",
                "htmlLink": "https://www.google.com/calendar/event?eid=abc",
                "start": {"dateTime": "2024-03-05T14:30:00Z"},
                "end": {"dateTime": "2024-03-05T16:00:00Z", "timeZone": "UTC"}
            }]
        }"#;

        let response: EventsResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.items.len(), 1);
        let event = &response.items[0];
        assert_eq!(event.summary.as_deref(), Some("Weekly stream"));
        assert!(event.location.is_none());
        assert_eq!(event.start.date_time.as_deref(), Some("2024-03-05T14:30:00Z"));
        assert_eq!(event.end.time_zone.as_deref(), Some("UTC"));
    }
}
