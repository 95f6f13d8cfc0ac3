use chrono::{DateTime, NaiveDate, Utc};

/// Source of the current date and time.
pub trait Calendar: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemCalendar;

impl Calendar for SystemCalendar {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Always reports the same instant. Used by tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedCalendar(pub DateTime<Utc>);

impl Calendar for FixedCalendar {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
