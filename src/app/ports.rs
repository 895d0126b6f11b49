//! Port traits — the boundary between the control core and the outside
//! world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ ControlService (domain)
//! ```
//!
//! Driven adapters (I2C sensors, GPIO, the telemetry transport, event
//! sinks) implement these traits. The
//! [`ControlService`](super::service::ControlService) consumes them via
//! generics, so the core never touches hardware or the network directly
//! and is fully testable with mocks.

use crate::error::{SensorError, TransportError};
use crate::telemetry::fields::FieldSet;

/// Digital level of an input pin. Buttons are pulled up: `Low` = pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    High,
    Low,
}

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: bus → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port for the two ambient sensors. Each call is independently
/// fallible; the sampler turns failures into absent reading fields.
pub trait SensorPort {
    /// Illuminance in lux.
    fn read_lux(&mut self) -> Result<f32, SensorError>;

    /// `(temperature °C, pressure hPa)` from the climate sensor.
    fn read_temperature_pressure(&mut self) -> Result<(f32, f32), SensorError>;
}

// ───────────────────────────────────────────────────────────────
// GPIO port (driven adapter: domain ↔ pins)
// ───────────────────────────────────────────────────────────────

/// Digital I/O for the buttons and the LED.
///
/// `read_pin` is infallible by contract: a GPIO read on a configured pin
/// cannot fail on the supported platforms, and the loop must not stall on
/// input polling.
pub trait GpioPort {
    /// Current level of an input pin.
    fn read_pin(&mut self, pin: u8) -> Level;

    /// Drive the LED at `percent` duty (0..=100, callers pass clamped
    /// values).
    fn set_brightness(&mut self, pin: u8, percent: u8);
}

// ───────────────────────────────────────────────────────────────
// Telemetry port (driven adapter: domain ↔ remote service)
// ───────────────────────────────────────────────────────────────

/// The remote telemetry transport.
///
/// Both calls are bounded by the transport's own timeouts; the core adds
/// none of its own and never retries synchronously within a tick. If the
/// implementation runs a background connection thread, its callbacks must
/// only log — shared state is mutated exclusively by the control loop.
pub trait TelemetryPort {
    /// Push an encoded field-set payload.
    fn publish(&mut self, payload: &str) -> Result<(), TransportError>;

    /// Pull the channel's last known field-set.
    fn fetch_last(&mut self) -> Result<FieldSet, TransportError>;

    /// Re-establish the connection after a failure. Idempotent.
    fn reconnect(&mut self) -> Result<(), TransportError>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The core emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port. The production adapter logs them; tests record
/// them to assert on transition counts.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}
