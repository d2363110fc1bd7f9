use chrono::{DateTime, FixedOffset, NaiveDate, Utc};

/// Clock abstracts access to the current timestamp so services remain deterministic in tests.
pub trait Clock: Send + Sync {
    /// Returns the current UTC timestamp.
    fn now(&self) -> DateTime<Utc>;

    /// Calendar date of `now()` as seen from `offset`.
    fn today_in(&self, offset: FixedOffset) -> NaiveDate {
        self.now().with_timezone(&offset).date_naive()
    }
}

/// Real-time clock backed by the system UTC time source.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock pinned to a single instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn today_follows_offset() {
        let clock = FixedClock(Utc.with_ymd_and_hms(2024, 3, 5, 20, 0, 0).unwrap());
        let utc = FixedOffset::east_opt(0).unwrap();
        let jst = FixedOffset::east_opt(9 * 3600).unwrap();
        assert_eq!(clock.today_in(utc), NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
        assert_eq!(clock.today_in(jst), NaiveDate::from_ymd_opt(2024, 3, 6).unwrap());
    }
}
