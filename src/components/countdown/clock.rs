use chrono::{DateTime, Duration, Utc};

/// Source of the current time
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Always reports the same instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Clock that only moves when told to, one fixed step at a time.
///
/// The countdown advances this clock once per tick instead of sampling real
/// time, so it drifts from the wall clock over long sessions whenever ticks
/// fire late.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VirtualClock {
    origin: DateTime<Utc>,
    step: Duration,
    ticks: u64,
}

impl VirtualClock {
    pub fn new(origin: DateTime<Utc>, step: Duration) -> Self {
        Self {
            origin,
            step,
            ticks: 0,
        }
    }

    /// Move forward by exactly one step and return the new time
    pub fn advance(&mut self) -> DateTime<Utc> {
        self.ticks += 1;
        self.now()
    }

    pub fn origin(&self) -> DateTime<Utc> {
        self.origin
    }

    pub fn step(&self) -> Duration {
        self.step
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}

impl Clock for VirtualClock {
    /// Saturates at the latest representable instant
    fn now(&self) -> DateTime<Utc> {
        let elapsed = i64::try_from(self.ticks)
            .ok()
            .and_then(|ticks| self.step.num_milliseconds().checked_mul(ticks))
            .and_then(Duration::try_milliseconds)
            .unwrap_or(Duration::MAX);
        self.origin
            .checked_add_signed(elapsed)
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_virtual_clock_advances_by_whole_steps() {
        let origin = Utc.with_ymd_and_hms(2024, 3, 5, 12, 0, 0).unwrap();
        let mut clock = VirtualClock::new(origin, Duration::seconds(1));
        assert_eq!(clock.now(), origin);

        for _ in 0..90 {
            clock.advance();
        }

        assert_eq!(clock.ticks(), 90);
        assert_eq!(clock.now(), origin + Duration::seconds(90));
    }

    #[test]
    fn test_virtual_clock_ignores_wall_clock() {
        let origin = Utc.with_ymd_and_hms(2001, 1, 1, 0, 0, 0).unwrap();
        let mut clock = VirtualClock::new(origin, Duration::minutes(1));
        let after = clock.advance();
        assert_eq!(after, origin + Duration::minutes(1));
        assert!(after < Utc::now());
    }

    #[test]
    fn test_virtual_clock_counts_past_i32_ticks() {
        let origin = Utc.with_ymd_and_hms(2024, 3, 5, 12, 0, 0).unwrap();
        let mut clock = VirtualClock::new(origin, Duration::milliseconds(1));
        clock.ticks = i32::MAX as u64 + 10;
        assert_eq!(
            clock.now(),
            origin + Duration::milliseconds(i32::MAX as i64 + 10)
        );

        clock.step = Duration::days(365);
        clock.ticks = u64::MAX;
        assert_eq!(clock.now(), DateTime::<Utc>::MAX_UTC);
    }

    #[test]
    fn test_fixed_clock() {
        let instant = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(FixedClock(instant).now(), instant);
    }
}
