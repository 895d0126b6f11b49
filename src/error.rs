//! Unified error types for the roomlux control loop.
//!
//! A single `Error` enum that every subsystem can convert into, keeping the
//! top-level loop's error handling uniform. Sensor and transport failures
//! are recovered locally (skip this cycle, keep last known good value, log,
//! continue); only configuration errors are fatal, and only at startup.
//! All variants are `Copy` so they can be passed through the loop without
//! allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Every fallible operation in the control loop funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A sensor could not be read this cycle.
    Sensor(SensorError),
    /// The telemetry transport failed a publish or fetch.
    Transport(TransportError),
    /// Configuration is invalid or could not be loaded (fatal at startup).
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sensor(e) => write!(f, "sensor: {e}"),
            Self::Transport(e) => write!(f, "transport: {e}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

/// A bus or device failure during a sensor read. The corresponding field of
/// the tick's [`Reading`](crate::control::sampler::Reading) becomes absent
/// and the retry is deferred to the next scheduled sample tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// I2C transaction failed (NAK, arbitration loss, bus stuck).
    BusError,
    /// The device answered but the payload was malformed or incomplete.
    BadResponse,
    /// Reading is outside the physically plausible range.
    OutOfRange,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BusError => write!(f, "bus error"),
            Self::BadResponse => write!(f, "bad response"),
            Self::OutOfRange => write!(f, "reading out of range"),
        }
    }
}

impl From<SensorError> for Error {
    fn from(e: SensorError) -> Self {
        Self::Sensor(e)
    }
}

// ---------------------------------------------------------------------------
// Transport errors
// ---------------------------------------------------------------------------

/// A telemetry publish or fetch failure. Recovered via deferred retry on
/// the next scheduled sync cycle; triggers at most one reconnect attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportError {
    /// Connection to the broker/service is down.
    Disconnected,
    /// The publish was rejected or could not be queued.
    PublishFailed,
    /// The last-feed request failed or returned a non-success status.
    FetchFailed,
    /// The response body could not be parsed.
    BadPayload,
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnected => write!(f, "disconnected"),
            Self::PublishFailed => write!(f, "publish failed"),
            Self::FetchFailed => write!(f, "fetch failed"),
            Self::BadPayload => write!(f, "bad payload"),
        }
    }
}

impl From<TransportError> for Error {
    fn from(e: TransportError) -> Self {
        Self::Transport(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
