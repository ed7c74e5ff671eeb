mod range;
mod timestamp;
mod urn;

pub use range::DateRange;
pub use timestamp::{Timestamp, TimestampError};
pub use ulid::Ulid;
pub use urn::{Urn, UrnError};
