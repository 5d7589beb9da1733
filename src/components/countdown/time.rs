use super::models::{ApiEvent, ApiEventTime, EventInfo};
use crate::error::{parse_error, CountdownResult};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;

/// Resolve an API start/end value to an instant.
///
/// Timed events use `dateTime`. All-day events only carry `date`, which is
/// taken as local midnight in the event's own zone, or `fallback` when the
/// event names none.
pub fn parse_event_time(time: &ApiEventTime, fallback: Tz) -> CountdownResult<DateTime<Utc>> {
    if let Some(date_time) = &time.date_time {
        let parsed = DateTime::parse_from_rfc3339(date_time)
            .map_err(|e| parse_error(&format!("Failed to parse datetime {}: {}", date_time, e)))?;
        return Ok(parsed.with_timezone(&Utc));
    }

    if let Some(date) = &time.date {
        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .map_err(|e| parse_error(&format!("Failed to parse date {}: {}", date, e)))?;
        let midnight = date
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| parse_error("Failed to create datetime"))?;
        let zone = time
            .time_zone
            .as_deref()
            .and_then(|name| name.parse::<Tz>().ok())
            .unwrap_or(fallback);
        let local = zone
            .from_local_datetime(&midnight)
            .earliest()
            .ok_or_else(|| parse_error("Invalid local time"))?;
        return Ok(local.with_timezone(&Utc));
    }

    Err(parse_error("Event time has neither dateTime nor date"))
}

/// Build the displayed event from the first API item
pub fn event_info_from_api(
    event: &ApiEvent,
    now: DateTime<Utc>,
    timezone: Tz,
) -> CountdownResult<EventInfo> {
    Ok(EventInfo {
        start_time: parse_event_time(&event.start, timezone)?,
        end_time: parse_event_time(&event.end, timezone)?,
        title: event.summary.clone().unwrap_or_default(),
        location: event.location.clone(),
        link: event.html_link.clone().unwrap_or_default(),
        reference_now: now,
    })
}
