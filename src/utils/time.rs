use chrono::{DateTime, Datelike, TimeZone, Utc};
use std::fmt::Display;

/// Ordinal form of a day of month (1st, 2nd, 3rd, 4th, ..., 11th, 21st)
pub fn ordinal(n: u32) -> String {
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{}{}", n, suffix)
}

/// Format a time as "March 5th @ 2:30:00 pm"
pub fn format_event_time<Tz>(time: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    format!(
        "{} {} @ {}",
        time.format("%B"),
        ordinal(time.day()),
        time.format("%-I:%M:%S %P")
    )
}

/// Describe `target` relative to `now`, e.g. "in 3 hours" or "2 days ago"
pub fn relative_time(target: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let millis = target.signed_duration_since(now).num_milliseconds();
    let phrase = humanize(millis.unsigned_abs() as f64);

    if millis > 0 {
        format!("in {}", phrase)
    } else {
        format!("{} ago", phrase)
    }
}

/// Pick the phrasing bucket for an absolute duration in milliseconds
fn humanize(millis: f64) -> String {
    let days_exact = millis / 86_400_000.0;
    let months_exact = days_exact * 4_800.0 / 146_097.0;

    let seconds = (millis / 1_000.0).round();
    let minutes = (millis / 60_000.0).round();
    let hours = (millis / 3_600_000.0).round();
    let days = days_exact.round();
    let months = months_exact.round();
    let years = (months_exact / 12.0).round();

    if seconds <= 44.0 {
        "a few seconds".to_string()
    } else if minutes <= 1.0 {
        "a minute".to_string()
    } else if minutes < 45.0 {
        format!("{} minutes", minutes)
    } else if hours <= 1.0 {
        "an hour".to_string()
    } else if hours < 22.0 {
        format!("{} hours", hours)
    } else if days <= 1.0 {
        "a day".to_string()
    } else if days < 26.0 {
        format!("{} days", days)
    } else if months <= 1.0 {
        "a month".to_string()
    } else if months < 11.0 {
        format!("{} months", months)
    } else if years <= 1.0 {
        "a year".to_string()
    } else {
        format!("{} years", years)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn base() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 5, 14, 30, 0).unwrap()
    }

    #[test]
    fn test_ordinal() {
        assert_eq!(ordinal(1), "1st");
        assert_eq!(ordinal(2), "2nd");
        assert_eq!(ordinal(3), "3rd");
        assert_eq!(ordinal(4), "4th");
        assert_eq!(ordinal(11), "11th");
        assert_eq!(ordinal(12), "12th");
        assert_eq!(ordinal(13), "13th");
        assert_eq!(ordinal(21), "21st");
        assert_eq!(ordinal(22), "22nd");
        assert_eq!(ordinal(23), "23rd");
        assert_eq!(ordinal(30), "30th");
        assert_eq!(ordinal(31), "31st");
    }

    #[test]
    fn test_format_event_time() {
        assert_eq!(format_event_time(&base()), "March 5th @ 2:30:00 pm");

        let morning = Utc.with_ymd_and_hms(2024, 12, 22, 0, 5, 9).unwrap();
        assert_eq!(format_event_time(&morning), "December 22nd @ 12:05:09 am");

        let noon = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        assert_eq!(format_event_time(&noon), "January 1st @ 12:00:00 pm");
    }

    #[test]
    fn test_format_event_time_in_named_zone() {
        let helsinki = base().with_timezone(&chrono_tz::Europe::Helsinki);
        assert_eq!(format_event_time(&helsinki), "March 5th @ 4:30:00 pm");
    }

    #[test]
    fn test_relative_time_future_buckets() {
        let now = base();
        let cases = [
            (Duration::seconds(10), "in a few seconds"),
            (Duration::seconds(50), "in a minute"),
            (Duration::minutes(5), "in 5 minutes"),
            (Duration::minutes(50), "in an hour"),
            (Duration::hours(3), "in 3 hours"),
            (Duration::hours(23), "in a day"),
            (Duration::days(4), "in 4 days"),
            (Duration::days(30), "in a month"),
            (Duration::days(100), "in 3 months"),
            (Duration::days(360), "in a year"),
            (Duration::days(365 * 3), "in 3 years"),
        ];

        for (offset, expected) in cases {
            assert_eq!(relative_time(now + offset, now), expected, "offset {offset}");
        }
    }

    #[test]
    fn test_relative_time_past_uses_ago() {
        let now = base();
        assert_eq!(relative_time(now - Duration::days(2), now), "2 days ago");
        assert_eq!(relative_time(now - Duration::minutes(30), now), "30 minutes ago");
        assert_eq!(relative_time(now, now), "a few seconds ago");
    }

    #[test]
    fn test_relative_time_rounds_to_nearest_unit() {
        let now = base();
        let target = now + Duration::hours(2) + Duration::minutes(40);
        assert_eq!(relative_time(target, now), "in 3 hours");
    }
}
