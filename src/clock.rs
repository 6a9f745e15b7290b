//! Host-supplied time source
//!
//! The ledger never reads the system clock directly. "Today" decides which
//! dates are in the future and anchors the duration windows, so it is passed
//! in through this trait.

use chrono::{DateTime, Local, NaiveDate, NaiveTime, TimeZone, Utc};

/// Source of the current instant and the current calendar date
pub trait Clock {
    /// Current instant, stamped on new transactions
    fn now(&self) -> DateTime<Utc>;

    /// Current calendar date in the user's time zone
    fn today(&self) -> NaiveDate;
}

/// Wall clock in the local time zone
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// A clock frozen at a given date, for tests and replays
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock {
    now: DateTime<Utc>,
    today: NaiveDate,
}

impl FixedClock {
    /// Freeze at noon UTC on `today`
    pub fn on(today: NaiveDate) -> Self {
        let noon = NaiveTime::from_hms_opt(12, 0, 0).unwrap_or(NaiveTime::MIN);
        Self {
            now: Utc.from_utc_datetime(&today.and_time(noon)),
            today,
        }
    }

    /// Move the clock to another date
    pub fn set_today(&mut self, today: NaiveDate) {
        *self = Self::on(today);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now
    }

    fn today(&self) -> NaiveDate {
        self.today
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }

    fn today(&self) -> NaiveDate {
        (**self).today()
    }
}
