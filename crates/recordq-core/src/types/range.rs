use crate::types::Timestamp;
use std::time::Duration;

///
/// DateRange
///
/// Inclusive `[start, end]` window over a date field.
/// `end == None` means "now", resolved when the range is executed.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct DateRange {
    pub start: Timestamp,
    pub end: Option<Timestamp>,
}

impl DateRange {
    /// Open-ended range from `start` up to the moment it runs.
    #[must_use]
    pub const fn since(start: Timestamp) -> Self {
        Self { start, end: None }
    }

    #[must_use]
    pub const fn between(start: Timestamp, end: Timestamp) -> Self {
        Self {
            start,
            end: Some(end),
        }
    }

    /// The trailing window `[now - duration, now]`, fixed at call time.
    #[must_use]
    pub fn last(duration: Duration) -> Self {
        let now = Timestamp::now();
        let start = now.checked_sub(duration).unwrap_or(Timestamp::MIN);

        Self::between(start, now)
    }

    /// Resolve the end bound, defaulting to the current time.
    #[must_use]
    pub fn resolved_end(&self) -> Timestamp {
        self.end.unwrap_or_else(Timestamp::now)
    }
}
