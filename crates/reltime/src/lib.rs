//! Monotonic relative time, stored as an `i64` nanosecond count since an
//! arbitrary static epoch.
//!
//! The epoch is captured the first time the process clock is touched. A
//! [`RelativeTime`] is 8 bytes where a wall-clock timestamp would be 12 or
//! more, for code that only cares about ordering and elapsed time.
//!
//! ```
//! use std::time::Duration;
//!
//! struct MyThing {
//!     time: reltime::RelativeTime,
//! }
//!
//! let thing = MyThing { time: reltime::now() };
//!
//! std::thread::sleep(Duration::from_millis(100));
//!
//! let age = reltime::now() - thing.time;
//! assert!(age > chrono::Duration::milliseconds(50));
//! assert!(age < chrono::Duration::seconds(10));
//! ```

pub mod clock;
pub mod error;
pub mod time;

pub use clock::{clock, epoch, now, try_epoch, try_now, RelativeClock};
pub use error::ClockError;
pub use time::RelativeTime;
