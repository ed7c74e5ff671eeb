use serde::{Deserialize, Serialize};
use std::{
    fmt::{self, Display},
    time::{Duration, SystemTime, UNIX_EPOCH},
};
use thiserror::Error as ThisError;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

///
/// TimestampError
///

#[derive(Debug, ThisError)]
pub enum TimestampError {
    #[error("timestamp parse error: {0}")]
    Parse(String),

    #[error("timestamp out of range")]
    OutOfRange,
}

///
/// Timestamp
/// (in milliseconds since the Unix epoch, signed)
///

#[derive(
    Clone, Copy, Debug, Default, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
#[repr(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    pub const EPOCH: Self = Self(0);
    pub const MIN: Self = Self(i64::MIN);
    pub const MAX: Self = Self(i64::MAX);

    /// Construct from milliseconds.
    #[must_use]
    pub const fn from_millis(ms: i64) -> Self {
        Self(ms)
    }

    /// Construct from seconds (saturating).
    #[must_use]
    pub const fn from_seconds(secs: i64) -> Self {
        Self(secs.saturating_mul(1_000))
    }

    #[must_use]
    pub const fn as_millis(self) -> i64 {
        self.0
    }

    /// Whole seconds, truncated toward negative infinity.
    #[must_use]
    pub const fn as_seconds(self) -> i64 {
        self.0.div_euclid(1_000)
    }

    /// Current wall-clock time.
    #[must_use]
    pub fn now() -> Self {
        Self::from(SystemTime::now())
    }

    #[must_use]
    pub fn checked_add(self, duration: Duration) -> Option<Self> {
        self.0.checked_add(duration_millis(duration)?).map(Self)
    }

    #[must_use]
    pub fn checked_sub(self, duration: Duration) -> Option<Self> {
        self.0.checked_sub(duration_millis(duration)?).map(Self)
    }

    pub fn parse_rfc3339(s: &str) -> Result<Self, TimestampError> {
        let dt = OffsetDateTime::parse(s, &Rfc3339)
            .map_err(|e| TimestampError::Parse(e.to_string()))?;
        let ms = dt.unix_timestamp_nanos() / 1_000_000;

        i64::try_from(ms)
            .map(Self)
            .map_err(|_| TimestampError::OutOfRange)
    }

    fn to_rfc3339(self) -> Option<String> {
        let nanos = i128::from(self.0) * 1_000_000;
        let dt = OffsetDateTime::from_unix_timestamp_nanos(nanos).ok()?;

        dt.format(&Rfc3339).ok()
    }
}

impl Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_rfc3339() {
            Some(s) => f.write_str(&s),
            None => write!(f, "{}ms", self.0),
        }
    }
}

impl From<SystemTime> for Timestamp {
    fn from(time: SystemTime) -> Self {
        match time.duration_since(UNIX_EPOCH) {
            Ok(since) => Self(duration_millis(since).unwrap_or(i64::MAX)),
            Err(err) => Self(
                duration_millis(err.duration())
                    .map_or(i64::MIN, |before| before.saturating_neg()),
            ),
        }
    }
}

fn duration_millis(duration: Duration) -> Option<i64> {
    i64::try_from(duration.as_millis()).ok()
}
