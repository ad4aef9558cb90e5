use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};

/// A point in time, expressed as signed nanoseconds since the process epoch.
///
/// Eight bytes instead of a full wall-clock timestamp. Values are only
/// meaningful against the epoch of the process that produced them; nothing
/// stops you from comparing values across runs, but the result is noise.
///
/// Arithmetic wraps on overflow. An `i64` nanosecond count spans roughly
/// ±292 years around the epoch.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct RelativeTime(i64);

impl RelativeTime {
    /// The epoch itself.
    pub const ZERO: RelativeTime = RelativeTime(0);

    pub const fn from_nanos(nanos: i64) -> Self {
        RelativeTime(nanos)
    }

    pub const fn as_nanos(self) -> i64 {
        self.0
    }

    /// Shift forward by `d` (backward if `d` is negative).
    pub fn add(self, d: Duration) -> RelativeTime {
        RelativeTime(self.0.wrapping_add(delta_nanos(d)))
    }

    /// Signed distance from `other` to `self`; positive when `self` is later.
    pub fn sub(self, other: RelativeTime) -> Duration {
        Duration::nanoseconds(self.0.wrapping_sub(other.0))
    }

    pub fn is_after(self, other: RelativeTime) -> bool {
        self > other
    }

    pub fn is_before(self, other: RelativeTime) -> bool {
        self < other
    }

    pub fn is_before_or_equal(self, other: RelativeTime) -> bool {
        self <= other
    }

    pub fn is_after_or_equal(self, other: RelativeTime) -> bool {
        self >= other
    }

    /// Time passed since `self`, measured against the process clock.
    ///
    /// # Panics
    ///
    /// Panics if the process clock cannot be established, like [`crate::now`].
    pub fn elapsed(self) -> Duration {
        crate::now().sub(self)
    }

    /// Approximate wall-clock instant for this value: `epoch + self`.
    ///
    /// The result is close to, but not necessarily equal to, a fresh wall
    /// clock read taken at the same moment, and it drifts from the host clock
    /// if the system time was adjusted after the epoch was captured. Meant for
    /// handing a deadline to APIs that only speak wall-clock time; use sparingly.
    pub fn to_wall_clock(self, epoch: DateTime<Utc>) -> DateTime<Utc> {
        epoch + Duration::nanoseconds(self.0)
    }
}

/// Nanoseconds in `d`, saturating at the `i64` bounds.
fn delta_nanos(d: Duration) -> i64 {
    match d.num_nanoseconds() {
        Some(n) => n,
        None if d < Duration::zero() => i64::MIN,
        None => i64::MAX,
    }
}

impl Add<Duration> for RelativeTime {
    type Output = RelativeTime;

    fn add(self, rhs: Duration) -> RelativeTime {
        RelativeTime::add(self, rhs)
    }
}

impl Add<std::time::Duration> for RelativeTime {
    type Output = RelativeTime;

    fn add(self, rhs: std::time::Duration) -> RelativeTime {
        let nanos = i64::try_from(rhs.as_nanos()).unwrap_or(i64::MAX);
        RelativeTime(self.0.wrapping_add(nanos))
    }
}

impl AddAssign<Duration> for RelativeTime {
    fn add_assign(&mut self, rhs: Duration) {
        *self = RelativeTime::add(*self, rhs);
    }
}

impl Sub<RelativeTime> for RelativeTime {
    type Output = Duration;

    fn sub(self, rhs: RelativeTime) -> Duration {
        RelativeTime::sub(self, rhs)
    }
}

impl Sub<Duration> for RelativeTime {
    type Output = RelativeTime;

    fn sub(self, rhs: Duration) -> RelativeTime {
        RelativeTime(self.0.wrapping_sub(delta_nanos(rhs)))
    }
}

impl SubAssign<Duration> for RelativeTime {
    fn sub_assign(&mut self, rhs: Duration) {
        *self = *self - rhs;
    }
}

impl From<RelativeTime> for i64 {
    fn from(t: RelativeTime) -> i64 {
        t.0
    }
}

impl From<i64> for RelativeTime {
    fn from(nanos: i64) -> Self {
        RelativeTime(nanos)
    }
}

impl fmt::Display for RelativeTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ns", self.0)
    }
}
