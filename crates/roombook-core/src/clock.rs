use chrono::{DateTime, Local, NaiveDateTime, SecondsFormat, Utc};

/// Source of "now" for availability checks and record timestamps
pub trait Clock {
    /// Local wall-clock time, used to decide which slots are already past
    fn now(&self) -> NaiveDateTime;

    /// Absolute instant used for `createdAt` stamps
    fn timestamp(&self) -> DateTime<Utc>;
}

/// Reads the system clock. On wasm32 chrono goes through the JS `Date` object.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }

    fn timestamp(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock pinned to a single instant. The local wall clock is taken to be UTC.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    instant: NaiveDateTime,
}

impl FixedClock {
    pub fn new(instant: NaiveDateTime) -> Self {
        Self { instant }
    }

    /// Parse `YYYY-MM-DDTHH:MM[:SS]`
    pub fn at(instant: &str) -> Option<Self> {
        NaiveDateTime::parse_from_str(instant, "%Y-%m-%dT%H:%M:%S")
            .or_else(|_| NaiveDateTime::parse_from_str(instant, "%Y-%m-%dT%H:%M"))
            .ok()
            .map(Self::new)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.instant
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.instant.and_utc()
    }
}

/// Format an instant the way JavaScript's `Date.toISOString` does
pub fn iso_timestamp(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}
