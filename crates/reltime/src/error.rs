use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClockError {
    /// The host wall clock could not be read or converted into a `DateTime<Utc>`.
    #[error("Clock Unavailable: {0}")]
    ClockUnavailable(String),
}
