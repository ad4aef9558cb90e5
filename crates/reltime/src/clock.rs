use crate::error::ClockError;
use crate::time::RelativeTime;
use chrono::{DateTime, Utc};
use once_cell::sync::OnceCell;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

/// Process-wide clock. Set exactly once, on first use, even under concurrent
/// first access.
static CLOCK: OnceCell<RelativeClock> = OnceCell::new();

/// A fixed epoch and the means to measure time against it.
///
/// The epoch is captured twice over at the same moment: a monotonic
/// [`Instant`] that every `now()` is measured from, and the wall-clock
/// reading used only for diagnostics and [`RelativeTime::to_wall_clock`].
#[derive(Debug, Clone, Copy)]
pub struct RelativeClock {
    origin: Instant,
    wall: DateTime<Utc>,
}

impl RelativeClock {
    /// Capture a new epoch. Most code wants the shared [`clock()`] instead;
    /// this exists for callers that pass a clock down explicitly.
    pub fn start() -> Result<Self, ClockError> {
        let origin = Instant::now();
        let wall = wall_clock_at(SystemTime::now())?;

        tracing::debug!(epoch = %wall, "relative clock epoch captured");

        Ok(RelativeClock { origin, wall })
    }

    /// The wall-clock instant the epoch was captured at.
    pub fn epoch(&self) -> DateTime<Utc> {
        self.wall
    }

    /// Nanoseconds elapsed since the epoch.
    ///
    /// Truncates to `i64`, so a clock older than ~292 years wraps.
    pub fn now(&self) -> RelativeTime {
        RelativeTime::from_nanos(self.origin.elapsed().as_nanos() as i64)
    }

    /// `t` as an approximate wall-clock instant against this clock's epoch.
    pub fn to_wall_clock(&self, t: RelativeTime) -> DateTime<Utc> {
        t.to_wall_clock(self.wall)
    }
}

fn wall_clock_at(t: SystemTime) -> Result<DateTime<Utc>, ClockError> {
    let since_unix = t.duration_since(UNIX_EPOCH).map_err(|e| {
        ClockError::ClockUnavailable(format!("system time before Unix epoch: {}", e))
    })?;

    let secs = i64::try_from(since_unix.as_secs())
        .map_err(|e| ClockError::ClockUnavailable(format!("system time out of range: {}", e)))?;

    DateTime::<Utc>::from_timestamp(secs, since_unix.subsec_nanos()).ok_or_else(|| {
        ClockError::ClockUnavailable(format!("system time out of range: {}s", secs))
    })
}

/// The process-wide clock, establishing its epoch on first call.
pub fn clock() -> Result<&'static RelativeClock, ClockError> {
    CLOCK.get_or_try_init(RelativeClock::start)
}

pub fn try_now() -> Result<RelativeTime, ClockError> {
    Ok(clock()?.now())
}

pub fn try_epoch() -> Result<DateTime<Utc>, ClockError> {
    Ok(clock()?.epoch())
}

/// Current relative time against the process epoch.
///
/// # Panics
///
/// Panics if the host wall clock cannot be read when the epoch is first
/// established. Use [`try_now`] to handle that case.
pub fn now() -> RelativeTime {
    match try_now() {
        Ok(t) => t,
        Err(e) => panic!("reltime: {}", e),
    }
}

/// The static epoch all [`now`] values are measured from. Diagnostic only.
///
/// # Panics
///
/// Same as [`now`].
pub fn epoch() -> DateTime<Utc> {
    match try_epoch() {
        Ok(epoch) => epoch,
        Err(e) => panic!("reltime: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_independent_clocks_have_their_own_epoch() {
        let first = RelativeClock::start().expect("clock available");
        thread::sleep(Duration::from_millis(2));
        let second = RelativeClock::start().expect("clock available");

        assert!(first.now().is_after(second.now()));
    }

    #[test]
    fn test_clock_now_starts_near_zero() {
        let clock = RelativeClock::start().expect("clock available");
        let t = clock.now();

        assert!(t.as_nanos() >= 0);
        assert!(t.as_nanos() < 1_000_000_000, "fresh clock reported {}", t);
    }

    #[test]
    fn test_to_wall_clock_tracks_host_clock() {
        let clock = RelativeClock::start().expect("clock available");
        thread::sleep(Duration::from_millis(5));

        let reconstructed = clock.to_wall_clock(clock.now());
        let drift = (Utc::now() - reconstructed).num_milliseconds().abs();

        assert!(drift < 1_000, "drift too large: {}ms", drift);
        assert_eq!(clock.to_wall_clock(RelativeTime::ZERO), clock.epoch());
    }

    #[test]
    fn test_wall_clock_before_unix_epoch_is_unavailable() {
        let before = UNIX_EPOCH - Duration::from_secs(1);

        assert!(matches!(
            wall_clock_at(before),
            Err(ClockError::ClockUnavailable(_))
        ));
    }

    #[test]
    fn test_wall_clock_at_converts_exactly() {
        let t = UNIX_EPOCH + Duration::new(1_700_000_000, 123);
        let wall = wall_clock_at(t).expect("in range");

        assert_eq!(wall.timestamp(), 1_700_000_000);
        assert_eq!(wall.timestamp_subsec_nanos(), 123);
    }

    #[test]
    fn test_global_clock_is_shared() {
        let a = clock().expect("clock available") as *const RelativeClock;
        let b = clock().expect("clock available") as *const RelativeClock;
        assert_eq!(a, b);
    }
}
