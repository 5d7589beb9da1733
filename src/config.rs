use crate::error::{config_error, env_error, CountdownResult};
use chrono_tz::Tz;
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// Default Google Calendar API root
pub const DEFAULT_API_BASE_URL: &str = "https://www.googleapis.com/calendar/v3";

/// Domain appended to every calendar identifier
pub const DEFAULT_CALENDAR_DOMAIN: &str = "group.calendar.google.com";

/// One second between countdown refreshes
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 1_000;

/// Main configuration structure for the countdown runner
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Path to the TOML page description
    pub page_path: String,
    /// Milliseconds between countdown refreshes
    pub tick_interval_ms: u64,
    /// Root of the calendar events API
    pub api_base_url: String,
    /// Domain suffix for calendar identifiers
    pub calendar_domain: String,
    /// Timezone used when formatting event times
    pub timezone: String,
    /// Print the rendered page whenever it changes
    pub display_page: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            page_path: String::from("page.toml"),
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
            api_base_url: String::from(DEFAULT_API_BASE_URL),
            calendar_domain: String::from(DEFAULT_CALENDAR_DOMAIN),
            timezone: String::from("UTC"),
            display_page: true,
        }
    }
}

impl Config {
    /// Load configuration from the environment, falling back to defaults
    pub fn load() -> CountdownResult<Self> {
        // Load .env file if it exists
        dotenv().ok();

        let defaults = Self::default();

        let page_path = env::var("PAGE_PATH").unwrap_or(defaults.page_path);

        let tick_interval_ms = match env::var("TICK_INTERVAL_MS") {
            Ok(value) => value
                .parse::<u64>()
                .map_err(|_| env_error("TICK_INTERVAL_MS"))?,
            Err(_) => defaults.tick_interval_ms,
        };

        let api_base_url = env::var("CALENDAR_API_BASE_URL").unwrap_or(defaults.api_base_url);
        let calendar_domain = env::var("CALENDAR_DOMAIN").unwrap_or(defaults.calendar_domain);
        let timezone = env::var("TIMEZONE").unwrap_or(defaults.timezone);

        let display_page = match env::var("DISPLAY_PAGE") {
            Ok(value) => value
                .parse::<bool>()
                .map_err(|_| env_error("DISPLAY_PAGE"))?,
            Err(_) => defaults.display_page,
        };

        let config = Config {
            page_path,
            tick_interval_ms,
            api_base_url,
            calendar_domain,
            timezone,
            display_page,
        };
        config.validate()?;

        Ok(config)
    }

    /// Reject values the countdown cannot run with
    pub fn validate(&self) -> CountdownResult<()> {
        if self.tick_interval_ms == 0 {
            return Err(config_error("Tick interval must be greater than zero"));
        }
        if url::Url::parse(&self.api_base_url).is_err() {
            return Err(config_error(&format!(
                "Invalid calendar API base URL: {}",
                self.api_base_url
            )));
        }
        self.tz()?;
        Ok(())
    }

    /// Interval between ticks
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Parsed display timezone
    pub fn tz(&self) -> CountdownResult<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|_| config_error(&format!("Unknown timezone: {}", self.timezone)))
    }
}
