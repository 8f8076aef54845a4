use chrono::{DateTime, Utc};

/// Source of "now" for anything that stamps records.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Clone, Copy, Debug)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Month-and-year label attached to reviews, e.g. `Oct 2026`.
pub fn period_label(at: DateTime<Utc>) -> String {
    at.format("%b %Y").to_string()
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::{period_label, Clock, FixedClock};

    #[test]
    fn period_label_uses_abbreviated_month() {
        let clock = FixedClock(Utc.with_ymd_and_hms(2026, 10, 18, 9, 30, 0).unwrap());
        assert_eq!(period_label(clock.now()), "Oct 2026");
    }
}
