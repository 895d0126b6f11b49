//! Driven adapters — the outer ring.
//!
//! Implementations of the port traits against the real world: the
//! ThingSpeak transport, the process logger, and (behind the `rpi`
//! feature) Raspberry Pi GPIO and I2C sensors.

pub mod log_sink;
pub mod thingspeak;

#[cfg(feature = "rpi")]
pub mod gpio;
#[cfg(feature = "rpi")]
pub mod sensors;
