use super::models::{EventInfo, EventsResponse};
use super::time::event_info_from_api;
use crate::config::Config;
use crate::error::{fetch_error, parse_error, CountdownResult, Error};
use chrono::{DateTime, SecondsFormat, Utc};
use chrono_tz::Tz;
use reqwest::Client;
use tracing::{debug, info};
use url::Url;

/// Client for the calendar events listing endpoint
#[derive(Debug, Clone)]
pub struct CalendarClient {
    client: Client,
    base_url: String,
    calendar_domain: String,
    timezone: Tz,
}

impl CalendarClient {
    pub fn new(base_url: impl Into<String>, calendar_domain: impl Into<String>, timezone: Tz) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            calendar_domain: calendar_domain.into(),
            timezone,
        }
    }

    pub fn from_config(config: &Config) -> CountdownResult<Self> {
        Ok(Self::new(
            config.api_base_url.clone(),
            config.calendar_domain.clone(),
            config.tz()?,
        ))
    }

    /// URL listing upcoming single events ordered by start time
    pub fn events_url(&self, calendar_id: &str, api_key: &str, now: DateTime<Utc>) -> CountdownResult<Url> {
        let url_str = format!(
            "{}/calendars/{}%40{}/events",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(calendar_id),
            self.calendar_domain
        );

        let mut url = Url::parse(&url_str)
            .map_err(|e| fetch_error(&format!("Failed to parse URL: {}", e)))?;

        let time_min = now.to_rfc3339_opts(SecondsFormat::Millis, true);
        url.query_pairs_mut()
            .append_pair("orderBy", "startTime")
            .append_pair("singleEvents", "true")
            .append_pair("timeMin", &time_min)
            .append_pair("key", api_key);

        Ok(url)
    }

    /// Fetch the first upcoming event, or `None` when the calendar has none
    pub async fn fetch_next_event(
        &self,
        calendar_id: &str,
        api_key: &str,
        now: DateTime<Utc>,
    ) -> CountdownResult<Option<EventInfo>> {
        let url = self.events_url(calendar_id, api_key, now)?;
        debug!("Requesting next event for calendar {}", calendar_id);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| fetch_error(&format!("Failed to fetch events: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());
            return Err(Error::Http {
                status: status.as_u16(),
                body,
            });
        }

        let events: EventsResponse = response
            .json()
            .await
            .map_err(|e| parse_error(&format!("Failed to parse events response: {}", e)))?;

        let Some(first) = events.items.first() else {
            info!("Calendar {} has no upcoming events", calendar_id);
            return Ok(None);
        };

        event_info_from_api(first, now, self.timezone).map(Some)
    }
}
